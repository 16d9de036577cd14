use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use tulu_contrib::cli::{BooksCommand, Cli, Command};
use tulu_contrib::commands;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    tulu_contrib::logging::init().context("init logging")?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let api_url = cli.api_url;
    let api = || commands::connect(api_url.as_deref());
    match cli.command {
        Command::Preview(args) => commands::preview(args).await,
        Command::Submit(args) => commands::submit(api()?, args).await,
        Command::Upload(args) => commands::upload(api()?, args).await,
        Command::Data(args) => commands::data(api()?, args).await.context("data"),
        Command::Books { command } => match command {
            BooksCommand::List(args) => commands::books_list(api()?, args)
                .await
                .context("books list"),
            BooksCommand::Upload(args) => commands::books_upload(api()?, args).await,
            BooksCommand::Show(args) => commands::books_show(api()?, args)
                .await
                .context("books show"),
            BooksCommand::Watch(args) => commands::books_watch(api()?, args)
                .await
                .context("books watch"),
            BooksCommand::Download(args) => commands::books_download(api()?, args)
                .await
                .context("books download"),
        },
    }
}
