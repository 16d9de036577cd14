use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Backend base URL (default: $TULU_CONTRIB_API_URL, then the built-in URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit one QA pair.
    Submit(SubmitArgs),
    /// Preview a .json or .csv dataset locally, without uploading.
    Preview(PreviewArgs),
    /// Preview and bulk-upload a .json or .csv dataset.
    Upload(UploadArgs),
    /// List collected QA pairs.
    Data(DataArgs),
    /// Upload books and follow their processing.
    Books {
        #[command(subcommand)]
        command: BooksCommand,
    },
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Instruction in Tulu.
    #[arg(long)]
    pub instruction: String,

    /// Response in Tulu.
    #[arg(long)]
    pub response: String,

    /// Optional English translation of the instruction.
    #[arg(long, default_value = "")]
    pub en_instruction: String,

    /// Optional English translation of the response.
    #[arg(long, default_value = "")]
    pub en_response: String,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    pub file: PathBuf,

    /// Stop after the preview.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct DataArgs {
    /// Only show pairs containing this text (either language).
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum BooksCommand {
    /// List uploaded books and their processing status.
    List(BooksListArgs),
    /// Upload a PDF book.
    Upload(BooksUploadArgs),
    /// Show the extracted text of one book.
    Show(BooksShowArgs),
    /// Keep the book list on screen, refreshing every 5 seconds until Ctrl-C.
    Watch(BooksListArgs),
    /// Save the text of all completed books to one file.
    Download(BooksDownloadArgs),
}

#[derive(Debug, Args)]
pub struct BooksListArgs {
    /// Only show books whose filename contains this text.
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct BooksUploadArgs {
    pub file: PathBuf,

    /// Store the book without text extraction (archival mode).
    #[arg(long)]
    pub skip_ocr: bool,
}

#[derive(Debug, Args)]
pub struct BooksShowArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct BooksDownloadArgs {
    /// Output file path.
    #[arg(long)]
    pub out: PathBuf,

    /// Overwrite an existing output file.
    #[arg(long)]
    pub force: bool,
}
