use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::api::{ContributionApi, HttpApi};
use crate::cli::{
    BooksDownloadArgs, BooksListArgs, BooksShowArgs, BooksUploadArgs, DataArgs, PreviewArgs,
    SubmitArgs, UploadArgs,
};
use crate::config::ApiConfig;
use crate::dataset;
use crate::detail::BookDetail;
use crate::model::{ManualEntryForm, StatusBanner};
use crate::poller::filter_books;
use crate::render;
use crate::session::ContributeSession;
use crate::view::{Mode, QaTab};

pub fn connect(api_url: Option<&str>) -> anyhow::Result<Arc<dyn ContributionApi>> {
    let config = ApiConfig::resolve(api_url).context("resolve api config")?;
    tracing::debug!(base_url = %config.base_url, "using api");
    Ok(Arc::new(HttpApi::new(config)?))
}

/// Prints a success banner; turns an error banner into the command's error.
fn report(banner: Option<&StatusBanner>) -> anyhow::Result<()> {
    match banner {
        Some(banner) if banner.is_error() => anyhow::bail!("{}", render::banner(banner)),
        Some(banner) => {
            println!("{}", render::banner(banner));
            Ok(())
        }
        None => Ok(()),
    }
}

pub async fn submit(api: Arc<dyn ContributionApi>, args: SubmitArgs) -> anyhow::Result<()> {
    let mut session = ContributeSession::new(api);
    session.view_mut().form = ManualEntryForm {
        instruction: args.instruction,
        response: args.response,
        translation_instruction: args.en_instruction,
        translation_response: args.en_response,
    };
    report(session.submit_manual().await)
}

pub async fn preview(args: PreviewArgs) -> anyhow::Result<()> {
    let selection = match crate::preview::select_dataset_file(&args.file).await {
        Ok(selection) => selection,
        Err(err) => return report(Some(&StatusBanner::error(err.to_string()))),
    };
    print!("{}", render::preview(&selection.file_name, &selection.preview));
    Ok(())
}

pub async fn upload(api: Arc<dyn ContributionApi>, args: UploadArgs) -> anyhow::Result<()> {
    let mut session = ContributeSession::new(api);
    session.switch_tab(QaTab::Bulk);
    report(session.select_dataset(&args.file).await)?;
    if let Some(selection) = &session.view().dataset {
        print!("{}", render::preview(&selection.file_name, &selection.preview));
    }
    if args.dry_run {
        tracing::info!("dry run; nothing uploaded");
        return Ok(());
    }
    report(session.submit_bulk().await)
}

pub async fn data(api: Arc<dyn ContributionApi>, args: DataArgs) -> anyhow::Result<()> {
    let records = dataset::fetch_records(api.as_ref()).await?;
    let query = args.search.unwrap_or_default();
    print!("{}", render::records(dataset::filter_records(&records, &query)));
    Ok(())
}

pub async fn books_list(
    api: Arc<dyn ContributionApi>,
    args: BooksListArgs,
) -> anyhow::Result<()> {
    let books = api.list_books().await.context("load books")?;
    let visible = filter_books(&books, args.search.as_deref().unwrap_or_default());
    print!("{}", render::book_list(&visible));
    Ok(())
}

pub async fn books_upload(
    api: Arc<dyn ContributionApi>,
    args: BooksUploadArgs,
) -> anyhow::Result<()> {
    let mut session = ContributeSession::new(api);
    // The duplicate check runs against the list as last fetched.
    session.books().refresh().await;
    session.view_mut().skip_ocr = args.skip_ocr;

    if let Some(rejected) = session.select_book(&args.file).await.cloned() {
        return report(Some(&rejected));
    }
    report(session.upload_book().await)
}

pub async fn books_show(
    api: Arc<dyn ContributionApi>,
    args: BooksShowArgs,
) -> anyhow::Result<()> {
    let mut session = ContributeSession::new(api);
    session.books().refresh().await;
    session.open_book(&args.id);
    let Some(detail) = session.resolve_detail().await else {
        anyhow::bail!("book view closed before loading: {}", args.id);
    };
    print!("{}", render::book_detail(detail));
    if let BookDetail::Unavailable { reason, .. } = detail {
        anyhow::bail!("book {} is unavailable: {reason}", args.id);
    }
    Ok(())
}

/// Prints the list, then reprints it whenever it changes, until Ctrl-C.
pub async fn books_watch(
    api: Arc<dyn ContributionApi>,
    args: BooksListArgs,
) -> anyhow::Result<()> {
    let mut session = ContributeSession::new(api);
    session.view_mut().book_search = args.search.unwrap_or_default();
    let mut snapshots = session.books().subscribe();
    session.books().refresh().await;
    snapshots.borrow_and_update();
    print_book_snapshot(&session);
    session.switch_mode(Mode::Books);
    tracing::info!("watching books; press Ctrl-C to stop");

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("listen for ctrl-c")?;
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                print_book_snapshot(&session);
            }
        }
    }

    session.switch_mode(Mode::Qa);
    session.shutdown().await;
    Ok(())
}

fn print_book_snapshot(session: &ContributeSession) {
    println!("--- {} ---", chrono::Local::now().format("%H:%M:%S"));
    print!("{}", render::book_list(&session.visible_books()));
}

pub async fn books_download(
    api: Arc<dyn ContributionApi>,
    args: BooksDownloadArgs,
) -> anyhow::Result<()> {
    let written = download_books_to(api.as_ref(), &args.out, args.force).await?;
    report(Some(&StatusBanner::success(format!(
        "Saved {written} bytes to {}",
        args.out.display()
    ))))
}

/// Streams every completed book into `path`. A failed download leaves no file behind.
pub async fn download_books_to(
    api: &dyn ContributionApi,
    path: &Path,
    force: bool,
) -> anyhow::Result<u64> {
    if !force
        && tokio::fs::try_exists(path)
            .await
            .with_context(|| format!("check output: {}", path.display()))?
    {
        anyhow::bail!("output already exists: {}", path.display());
    }

    let mut file = open_output(path, force).await?;
    let result = api.download_all_books(&mut file).await;
    drop(file);

    match result {
        Ok(written) => Ok(written),
        Err(err) => {
            if let Err(remove_err) = tokio::fs::remove_file(path).await {
                tracing::warn!(
                    path = %path.display(),
                    error = %remove_err,
                    "could not remove partial download"
                );
            }
            Err(err.context("download all books"))
        }
    }
}

async fn open_output(path: &Path, force: bool) -> anyhow::Result<tokio::fs::File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    options
        .open(path)
        .await
        .with_context(|| format!("open output: {}", path.display()))
}
