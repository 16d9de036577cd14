#![forbid(unsafe_code)]

pub mod api;
pub mod book_file;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dataset;
pub mod detail;
pub mod error;
pub mod logging;
pub mod model;
pub mod poller;
pub mod preview;
pub mod render;
pub mod session;
pub mod submission;
pub mod view;

#[cfg(test)]
mod testing;
