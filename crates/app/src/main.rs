use chrono::Utc;
use chronicle_core::{
    format_reading_time, ingest_file, render_sitemap, write_artifacts, ArtifactSource,
    ChronicleService, FileArtifactSource, HttpArtifactSource, IngestionOptions, JsonFileStore,
    QueryFilters, ReaderState, SearchIndexOrder,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "chronicle", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding chronicles.json and search-index.json
    #[arg(long, env = "CHRONICLE_DATA_DIR", default_value = "public/data")]
    data_dir: PathBuf,

    /// Load artifacts from this base URL instead of the data directory
    #[arg(long, env = "CHRONICLE_DATA_URL")]
    data_url: Option<String>,

    /// Local key/value file for bookmarks, progress and reading stats
    #[arg(long, env = "CHRONICLE_STATE_FILE", default_value = ".chronicle/state.json")]
    state_file: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Repair and parse the legacy database into the hierarchy and search index.
    Ingest {
        /// Legacy database file.
        #[arg(long, env = "CHRONICLE_SOURCE", default_value = "data/Buddha.src")]
        source: PathBuf,
        /// Write the search index in hierarchy order instead of source order.
        #[arg(long, default_value_t = false)]
        sort_index: bool,
    },
    #[command(flatten)]
    Reader(ReaderCommand),
}

#[derive(Subcommand)]
enum ReaderCommand {
    /// Run a boolean query: words, -excluded, "exact phrase", either|or.
    Search {
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        query: String,
        #[arg(long)]
        volume: Option<u32>,
        /// Only used together with --volume.
        #[arg(long)]
        part: Option<u32>,
    },
    /// Show a chapter and remember it as the last one read.
    Read {
        #[arg(long)]
        id: String,
        /// Print the chapter body.
        #[arg(long, default_value_t = false)]
        full: bool,
    },
    /// List volumes with their part and chapter counts.
    Volumes,
    /// Manage bookmarks.
    Bookmark {
        #[command(subcommand)]
        command: BookmarkCommand,
    },
    /// Show the last chapter read.
    Progress {
        /// Forget the last chapter read.
        #[arg(long, default_value_t = false)]
        clear: bool,
    },
    /// Show or update reading stats for a chapter.
    Stats {
        #[arg(long)]
        id: String,
        /// Seconds to add to the chapter's reading time.
        #[arg(long)]
        add_seconds: Option<u64>,
        /// Latest scroll position, in percent.
        #[arg(long)]
        scroll: Option<f64>,
    },
    /// Render sitemap.xml from the hierarchy.
    Sitemap {
        #[arg(long, default_value = "https://chronicle.insightsharing.org")]
        base_url: String,
        #[arg(long, default_value = "public/sitemap.xml")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum BookmarkCommand {
    Add {
        #[arg(long)]
        id: String,
    },
    Remove {
        #[arg(long)]
        id: String,
    },
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "chronicle boot"
    );

    let command = match cli.command {
        Command::Ingest { source, sort_index } => {
            return run_ingest(&source, &cli.data_dir, sort_index);
        }
        Command::Reader(command) => command,
    };

    let state = ReaderState::new(
        JsonFileStore::open(&cli.state_file).map_err(|error| anyhow::anyhow!(error.to_string()))?,
    );

    match &cli.data_url {
        Some(url) => {
            let source =
                HttpArtifactSource::new(url).map_err(|error| anyhow::anyhow!(error.to_string()))?;
            run_reader(ChronicleService::new(source), &state, command).await
        }
        None => {
            let source = FileArtifactSource::new(&cli.data_dir);
            run_reader(ChronicleService::new(source), &state, command).await
        }
    }
}

fn run_ingest(source: &Path, data_dir: &Path, sort_index: bool) -> anyhow::Result<()> {
    let options = IngestionOptions {
        index_order: if sort_index {
            SearchIndexOrder::Hierarchy
        } else {
            SearchIndexOrder::Source
        },
        ..IngestionOptions::default()
    };

    println!("Reading source database {}", source.display());
    let report =
        ingest_file(source, &options).map_err(|error| anyhow::anyhow!(error.to_string()))?;
    println!("Parsed {} records", report.records);

    if !report.duplicate_ids.is_empty() {
        warn!(
            "duplicate_ids={} in source={}",
            report.duplicate_ids.len(),
            source.display()
        );
    }

    let written = write_artifacts(&report, data_dir, &options)
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;
    println!("Saved to {}", written.hierarchy_path.display());
    println!(
        "Created search index with {} entries at {}",
        report.search_index.len(),
        written.search_index_path.display()
    );
    println!("source sha256={}", report.checksum);
    println!("Database parsing complete!");

    Ok(())
}

async fn run_reader<A>(
    service: ChronicleService<A>,
    state: &ReaderState<JsonFileStore>,
    command: ReaderCommand,
) -> anyhow::Result<()>
where
    A: ArtifactSource + Send + Sync,
{
    let store_error = |error: chronicle_core::StoreError| anyhow::anyhow!(error.to_string());

    match command {
        ReaderCommand::Search {
            query,
            volume,
            part,
        } => {
            let filters = QueryFilters { volume, part };
            let hits = service.search(&query, &filters).await;

            if hits.is_empty() {
                println!("No results found");
            } else {
                println!(
                    "Found {} result{}",
                    hits.len(),
                    if hits.len() == 1 { "" } else { "s" }
                );
            }
            for hit in hits {
                println!(
                    "[{}] Vol {} • Part {} • Ch {}  {}",
                    hit.id, hit.volume, hit.part, hit.chapter, hit.title
                );
                if !hit.excerpt.is_empty() {
                    println!("  {}...", hit.excerpt.replace('\n', " "));
                }
            }
        }
        ReaderCommand::Read { id, full } => {
            let location = service
                .lookup_chapter_by_id(&id)
                .await
                .ok_or_else(|| anyhow::anyhow!("chapter not found: {id}"))?;
            state.save_progress(&id).map_err(store_error)?;

            println!(
                "Volume {} • Part {} • Chapter {}",
                location.volume, location.part, location.chapter.chapter
            );
            println!("{}", location.chapter.title);
            println!(
                "pages {}-{}",
                location.chapter.start_page, location.chapter.end_page
            );
            if state.is_bookmarked(&id).map_err(store_error)? {
                println!("(bookmarked)");
            }
            if full {
                println!();
                println!("{}", location.chapter.content);
                println!();
            }

            if let Some(neighbors) = service.adjacent_chapters(&id).await {
                if let Some(previous) = neighbors.previous {
                    println!("previous: {} {}", previous.id, previous.title);
                }
                if let Some(next) = neighbors.next {
                    println!("next: {} {}", next.id, next.title);
                }
            }
        }
        ReaderCommand::Volumes => {
            for summary in service.volume_summaries().await {
                println!(
                    "Volume {}: {} parts • {} chapters",
                    summary.volume, summary.part_count, summary.chapter_count
                );
            }
        }
        ReaderCommand::Bookmark { command } => match command {
            BookmarkCommand::Add { id } => {
                let location = service
                    .lookup_chapter_by_id(&id)
                    .await
                    .ok_or_else(|| anyhow::anyhow!("chapter not found: {id}"))?;
                if state
                    .add_bookmark(&id, &location.chapter.title)
                    .map_err(store_error)?
                {
                    println!("bookmarked {id}");
                } else {
                    println!("{id} is already bookmarked");
                }
            }
            BookmarkCommand::Remove { id } => {
                if state.remove_bookmark(&id).map_err(store_error)? {
                    println!("removed bookmark {id}");
                } else {
                    println!("{id} was not bookmarked");
                }
            }
            BookmarkCommand::List => {
                for bookmark in state.bookmarks().map_err(store_error)? {
                    println!(
                        "{} {} ({})",
                        bookmark.id,
                        bookmark.title,
                        bookmark.date.to_rfc3339()
                    );
                }
            }
        },
        ReaderCommand::Progress { clear: true } => {
            state.clear_progress().map_err(store_error)?;
            println!("reading progress cleared");
        }
        ReaderCommand::Progress { clear: false } => match state.progress().map_err(store_error)? {
            Some(id) => {
                let title = service
                    .lookup_chapter_by_id(&id)
                    .await
                    .map(|location| location.chapter.title)
                    .unwrap_or_default();
                println!("last read: {id} {title}");
            }
            None => println!("nothing read yet"),
        },
        ReaderCommand::Stats {
            id,
            add_seconds,
            scroll,
        } => {
            let stats = if add_seconds.is_some() || scroll.is_some() {
                let previous = state.chapter_stats(&id).map_err(store_error)?;
                state
                    .record_reading(
                        &id,
                        add_seconds.unwrap_or(0),
                        scroll.unwrap_or(f64::from(previous.progress)),
                    )
                    .map_err(store_error)?
            } else {
                state.chapter_stats(&id).map_err(store_error)?
            };
            println!(
                "{id}: read {} • {}% scrolled",
                format_reading_time(stats.time),
                stats.progress
            );
        }
        ReaderCommand::Sitemap { base_url, out } => {
            let hierarchy = service.hierarchy().await;
            if hierarchy.is_empty() {
                anyhow::bail!("no chapters loaded; run `chronicle ingest` first");
            }
            if let Some(parent) = out.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&out, render_sitemap(&base_url, &hierarchy))?;
            println!("Sitemap written to {}", out.display());
        }
    }

    Ok(())
}
