use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

use common::endpoints::{job_id, page_url, result_url};
use common::{resolve_column, AppState, Filter, StreamClient, StreamOptions};
use jobdash::config::Config;
use jobdash::fetch::fetch_job;
use jobdash::live::{run_stream, TerminalSink, WsTransport};
use jobdash::logging::setup_logging;
use jobdash::view::{export_csv, interactive, print_table};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (.yaml, .yml or .toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow a job's live status, then show its results
    Status {
        /// Job page URL, or a bare job id
        target: String,
        /// Read-only: keep watching after the job is done
        #[arg(long)]
        view: bool,
        /// Stop once the job is done instead of showing the table
        #[arg(long)]
        no_table: bool,
        /// Sort the result table interactively
        #[arg(short, long)]
        interactive: bool,
    },
    /// Fetch a finished job and print its sessions
    Show {
        /// Job page URL, or a bare job id
        target: String,
        /// Column to click, in order; repeat a column to flip its direction
        #[arg(long = "sort")]
        sort: Vec<String>,
        /// Row filter: COLUMN=v1,v2, Date<YYYY-MM-DD or Date>YYYY-MM-DD
        #[arg(long = "filter")]
        filters: Vec<String>,
        /// Also write the table to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Sort the table interactively
        #[arg(short, long)]
        interactive: bool,
    },
}

struct ShowOptions {
    clicks: Vec<String>,
    filters: Vec<Filter>,
    csv: Option<PathBuf>,
    interactive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    setup_logging(&config.logging, cli.log_level.as_deref())?;
    log::debug!("Starting jobdash...");

    match cli.command {
        Commands::Status { target, view, no_table, interactive } => {
            let page = page_url(&target, &config.server.base_url)?;
            let options = StreamOptions {
                view_mode: view,
                timezone: config.timezone()?,
            };
            let mut client = StreamClient::new(&page, options)?;
            let mut transport = WsTransport;
            let mut sink = TerminalSink;

            let completion = tokio::select! {
                result = run_stream(&mut client, &mut transport, &mut sink) => result?,
                _ = tokio::signal::ctrl_c() => {
                    log::info!("interrupted");
                    return Ok(());
                }
            };
            println!("Job finished: {}", completion);

            if !no_table {
                let show = ShowOptions {
                    clicks: Vec::new(),
                    filters: Vec::new(),
                    csv: None,
                    interactive,
                };
                show_results(&config, &page, show).await?;
            }
        }
        Commands::Show { target, sort, filters, csv, interactive } => {
            let page = page_url(&target, &config.server.base_url)?;
            let filters = filters
                .iter()
                .map(|f| f.parse::<Filter>())
                .collect::<Result<Vec<_>>>()?;
            let show = ShowOptions {
                clicks: sort,
                filters,
                csv,
                interactive,
            };
            show_results(&config, &page, show).await?;
        }
    }

    Ok(())
}

async fn show_results(config: &Config, page: &Url, show: ShowOptions) -> Result<()> {
    let id = job_id(page).ok_or_else(|| anyhow!("No job id in {}", page))?;
    let url = result_url(page, &id);

    let client = reqwest::Client::new();
    let job = fetch_job(&client, &url)
        .await
        .with_context(|| format!("Could not load the results of job {}", id))?;

    let mut app = AppState::new(config.sort_state()?, show.filters);
    app.load_job(job);
    app.apply_sort();

    for click in &show.clicks {
        let column = resolve_column(click).ok_or_else(|| anyhow!("Unknown column: {}", click))?;
        app.on_column_activated(column);
    }

    let superscript = config.display.superscript_gm;
    let mut stdout = std::io::stdout();
    print_table(&app, superscript, &mut stdout)?;

    if let Some(ref path) = show.csv {
        export_csv(&app, path)?;
    }

    if show.interactive {
        let stdin = std::io::stdin();
        interactive(&mut app, superscript, stdin.lock(), &mut stdout)?;
    }

    Ok(())
}
