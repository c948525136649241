use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use topdeck_api::{BulkStatus, HttpApi, TopicsApi};
use topdeck_core::{SortField, SortSpec, TopicsQuery, DEFAULT_PER_PAGE};
use topdeck_ctrl::{ListController, MemoryPageStore, PageParams, PageStore};

#[derive(Parser, Debug)]
#[command(name = "topdeckctl", version, about = "Topdeck CLI")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Cluster scope
    #[arg(long = "cluster", global = true, env = "TOPDECK_CLUSTER", default_value = "local")]
    cluster: String,

    /// Console API base URL
    #[arg(long = "base-url", global = true, env = "TOPDECK_BASE_URL", default_value = "http://127.0.0.1:8080/")]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output {
    Human,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum SortArg {
    Name,
    Partitions,
    OutOfSync,
}

impl SortArg {
    fn field(self) -> SortField {
        match self {
            SortArg::Name => SortField::Name,
            SortArg::Partitions => SortField::TotalPartitions,
            SortArg::OutOfSync => SortField::OutOfSyncReplicas,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List one page of topics
    Ls {
        /// Filter by topic name
        #[arg(long = "search", default_value = "")]
        search: String,
        /// Sort column
        #[arg(long = "sort", value_enum)]
        sort: Option<SortArg>,
        /// Sort descending
        #[arg(long = "desc", action = ArgAction::SetTrue)]
        desc: bool,
        #[arg(long = "page", default_value_t = 1)]
        page: u32,
        #[arg(long = "per-page", default_value_t = DEFAULT_PER_PAGE)]
        per_page: u32,
        /// Hide internal topics
        #[arg(long = "no-internal", action = ArgAction::SetTrue)]
        no_internal: bool,
    },
    /// Delete topics (asks for confirmation)
    Rm {
        /// Topic names
        names: Vec<String>,
        /// Skip the confirmation prompt
        #[arg(long = "yes", action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Purge topic messages without deleting the topics
    Purge {
        /// Topic names
        names: Vec<String>,
        /// Restrict to a partition subset, e.g. "0,1,2"
        #[arg(long = "partitions")]
        partitions: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long = "yes", action = ArgAction::SetTrue)]
        yes: bool,
    },
}

fn init_tracing() {
    let env = std::env::var("TOPDECK_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("TOPDECK_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid TOPDECK_METRICS_ADDR; expected host:port");
        }
    }
}

fn parse_partitions(raw: &str) -> Result<Vec<u32>> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>().with_context(|| format!("invalid partition id: {}", s)))
        .collect()
}

fn confirm_on_stdin(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

fn report_bulk(output: Output, verb: &str, status: &BulkStatus) -> Result<()> {
    match output {
        Output::Json => println!("{}", serde_json::to_string_pretty(status)?),
        Output::Human => {
            if status.all_ok() {
                println!("{} {} topic(s)", verb, status.requested);
            } else {
                println!(
                    "{} {} of {} topic(s)",
                    verb,
                    status.requested - status.failed.len(),
                    status.requested
                );
                for f in &status.failed {
                    eprintln!("  {}: {}", f.name, f.reason);
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();

    let base = url::Url::parse(&cli.base_url)
        .with_context(|| format!("invalid base url: {}", cli.base_url))?;
    let api: Arc<dyn TopicsApi> = Arc::new(HttpApi::new(base));

    match cli.command {
        Commands::Ls { search, sort, desc, page, per_page, no_internal } => {
            let mut query = TopicsQuery::new(&cli.cluster);
            if !search.is_empty() {
                query.set_search(search);
            }
            if let Some(sort) = sort {
                let spec = if desc { SortSpec::desc(sort.field()) } else { SortSpec::asc(sort.field()) };
                query.set_sort(Some(spec));
            }
            if no_internal {
                query.set_show_internal(false);
            }
            // The page store is the source of truth for pagination; seed
            // it from the flags and read back what the controller gets.
            let nav = MemoryPageStore::new(PageParams { page, per_page });
            let params = nav.load();
            query.set_per_page(params.per_page);
            query.set_page(params.page);

            let mut ctrl = ListController::new(query, api, Box::new(nav), false);
            let listing = ctrl.listing();
            info!(cluster = %cli.cluster, page, per_page, "ls invoked");
            ctrl.mount().map_err(|e| anyhow!("fetch topics: {}", e))?;

            // Wait for the first page (configurable)
            let wait_secs = std::env::var("TOPDECK_WAIT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(8);
            let mut rx = listing.subscribe_epoch();
            let deadline = Instant::now() + Duration::from_secs(wait_secs);
            while *rx.borrow() == 0 {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                let rem = deadline.duration_since(now).min(Duration::from_secs(2));
                if tokio::time::timeout(rem, rx.changed()).await.is_err() {
                    break;
                }
            }
            let snap = listing.current();
            if snap.epoch == 0 {
                error!(cluster = %cli.cluster, "no topics page before deadline");
                return Err(anyhow!("timed out waiting for topics"));
            }

            match cli.output {
                Output::Json => println!("{}", serde_json::to_string_pretty(&*snap)?),
                Output::Human => {
                    if snap.topics.is_empty() {
                        println!("No topics found");
                    } else {
                        println!(
                            "{:<40} {:>10} {:>6} {:>12} {:>12} {:>12}",
                            "NAME", "PARTITIONS", "REPL", "OUT-OF-SYNC", "MESSAGES", "SIZE"
                        );
                        for t in &snap.topics {
                            let name = if t.internal {
                                format!("{} (internal)", t.name)
                            } else {
                                t.name.clone()
                            };
                            println!(
                                "{:<40} {:>10} {:>6} {:>12} {:>12} {:>12}",
                                name,
                                t.partition_count(),
                                t.replication_factor,
                                t.out_of_sync_replicas,
                                t.message_count,
                                t.size_bytes
                            );
                        }
                        println!("page {} of {}", ctrl.query().page(), snap.total_pages);
                    }
                }
            }
        }
        Commands::Rm { names, yes } => {
            if names.is_empty() {
                return Err(anyhow!("no topics given"));
            }
            let mut ctrl = ListController::new(
                TopicsQuery::new(&cli.cluster),
                api,
                Box::new(MemoryPageStore::default()),
                false,
            );
            for name in &names {
                ctrl.toggle_selected(name);
            }
            ctrl.request_delete()?;
            let go = yes || confirm_on_stdin(ctrl.prompt().unwrap_or("Proceed?"))?;
            if !go {
                ctrl.cancel();
                info!("delete cancelled");
                return Ok(());
            }
            let status = ctrl
                .confirm()?
                .await
                .context("bulk delete task")?
                .map_err(|e| anyhow!("bulk delete: {}", e))?;
            report_bulk(cli.output, "deleted", &status)?;
        }
        Commands::Purge { names, partitions, yes } => {
            if names.is_empty() {
                return Err(anyhow!("no topics given"));
            }
            let parts = partitions.as_deref().map(parse_partitions).transpose()?;
            let mut ctrl = ListController::new(
                TopicsQuery::new(&cli.cluster),
                api,
                Box::new(MemoryPageStore::default()),
                false,
            );
            for name in &names {
                ctrl.toggle_selected(name);
            }
            ctrl.set_purge_partitions(parts);
            ctrl.request_purge()?;
            let go = yes || confirm_on_stdin(ctrl.prompt().unwrap_or("Proceed?"))?;
            if !go {
                ctrl.cancel();
                info!("purge cancelled");
                return Ok(());
            }
            let status = ctrl
                .confirm()?
                .await
                .context("bulk purge task")?
                .map_err(|e| anyhow!("bulk purge: {}", e))?;
            report_bulk(cli.output, "purged", &status)?;
        }
    }
    Ok(())
}
