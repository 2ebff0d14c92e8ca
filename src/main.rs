use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use mentionwatch::dashboard::{self, Dashboard};
use mentionwatch::export;
use mentionwatch::feeds::backend::{BackendClient, SearchParams};
use mentionwatch::feeds::mock::MockSource;
use mentionwatch::feeds::{DashboardSource, DataOrigin, FeedData, MentionsQuery};
use mentionwatch::forms::{MentionDraft, NewKeyword};
use mentionwatch::mock::DatasetStore;
use mentionwatch::model::{Platform, Sentiment};
use mentionwatch::query::{self, KeywordSort, SentimentFilter, SortField, SortOrder, ViewConfig};
use mentionwatch::report;
use mentionwatch::table::MentionsTable;
use mentionwatch::{ApiError, Config};

/// Mentions fetched for the client-side table view.
const MENTIONS_FETCH_LIMIT: u32 = 100;

#[derive(Parser)]
#[command(name = "mentionwatch")]
#[command(about = "Brand mention monitoring: sentiment stats, trends and mentions", long_about = None)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Use generated sample data instead of the backend
    #[arg(long, global = true)]
    demo: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print stats, the weekly trend, alerts and the latest mentions
    Dashboard,
    /// Print the dashboard, then a stats line on every refresh until Ctrl-C
    Watch,
    /// Filter, sort and page mentions locally, optionally exporting to CSV
    Mentions {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "all")]
        sentiment: SentimentFilter,
        /// Day prefix, e.g. 2024-06-01
        #[arg(long)]
        date: Option<String>,
        #[arg(long, value_enum)]
        sort: Option<SortField>,
        #[arg(long, value_enum)]
        order: Option<SortOrder>,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
        /// Mention ids to select, comma separated
        #[arg(long, value_delimiter = ',')]
        select: Vec<i64>,
        /// Select every mention that passes the filters
        #[arg(long)]
        select_all: bool,
        /// Write the selected (or all filtered) mentions to CSV
        #[arg(long)]
        export: bool,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Search mentions on the backend
    Search {
        query: Option<String>,
        #[arg(long, value_enum)]
        sentiment: Option<Sentiment>,
        #[arg(long, value_enum)]
        platform: Option<Platform>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long, value_enum, default_value_t = SortField::CreatedAt)]
        sort: SortField,
        #[arg(long, value_enum, default_value_t = SortOrder::Desc)]
        order: SortOrder,
    },
    /// Manage tracked keywords
    Keywords {
        #[command(subcommand)]
        action: KeywordCommand,
    },
    /// Register a mention to monitor, once per platform
    AddMention {
        text: String,
        #[arg(long = "platform", value_enum, required = true)]
        platforms: Vec<Platform>,
        #[arg(long, value_enum)]
        sentiment: Option<Sentiment>,
        #[arg(long, allow_hyphen_values = true)]
        score: Option<f64>,
        #[arg(long)]
        url: Option<String>,
    },
    /// Ask the backend to regenerate its sample data
    GenerateMock,
    /// Check whether the backend is reachable
    Health,
}

#[derive(Subcommand)]
enum KeywordCommand {
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value_t = KeywordSort::Date)]
        sort: KeywordSort,
        #[arg(long, value_enum, default_value_t = SortOrder::Desc)]
        order: SortOrder,
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
    Add {
        keyword: String,
        #[arg(long, value_enum, default_value_t = Sentiment::Positive)]
        sentiment: Sentiment,
    },
    Delete {
        id: i64,
    },
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mentionwatch=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Logs a failed backend call and turns it into the message shown to the user.
fn user_error(action: &str, error: ApiError) -> anyhow::Error {
    match error {
        ApiError::Validation(e) => anyhow!("{}", e),
        other => {
            tracing::error!(error = %other, "failed to {}", action);
            anyhow!("Failed to {}. Please try again.", action)
        }
    }
}

struct App {
    config: Config,
    demo: bool,
    client: Arc<BackendClient>,
}

impl App {
    fn new(config: Config, demo: bool) -> Self {
        let client = Arc::new(BackendClient::new(&config.api.base_url, config.timeout()));
        Self {
            config,
            demo,
            client,
        }
    }

    fn mock_source(&self) -> Arc<dyn DashboardSource> {
        Arc::new(MockSource::new(DatasetStore::new(self.config.dashboard.mock_seed)))
    }

    fn dashboard(&self) -> Dashboard {
        if self.demo {
            return Dashboard::new(self.mock_source());
        }
        let dashboard = Dashboard::new(self.client.clone());
        if self.config.dashboard.fallback_to_mock {
            dashboard.with_fallback(self.mock_source())
        } else {
            dashboard
        }
    }
}

impl Commands {
    /// Commands with no local stand-in for the backend.
    fn needs_backend(&self) -> bool {
        matches!(
            self,
            Commands::Search { .. }
                | Commands::Keywords { .. }
                | Commands::AddMention { .. }
                | Commands::GenerateMock
                | Commands::Health
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(base_url = %config.api.base_url, demo = cli.demo, "starting");
    if cli.demo && cli.command.needs_backend() {
        bail!("This command needs the backend; run it without --demo");
    }
    let app = App::new(config, cli.demo);

    match cli.command {
        Commands::Dashboard => {
            let state = app.dashboard().load().await?;
            print!("{}", report::build_dashboard(&state));
        }
        Commands::Watch => {
            let dashboard = app.dashboard();
            let mut state = dashboard.load().await?;
            print!("{}", report::build_dashboard(&state));

            let (tx, mut rx) = mpsc::channel(8);
            let refresh = dashboard::spawn_refresh(
                dashboard.source_for(state.origin),
                app.config.refresh_interval(),
                tx,
            );
            loop {
                tokio::select! {
                    update = rx.recv() => match update {
                        Some(message) => {
                            state.apply(message);
                            println!(
                                "[{}] {}",
                                Utc::now().format("%H:%M:%S"),
                                report::stats_line(&state.stats)
                            );
                        }
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            drop(rx);
            refresh.abort();
        }
        Commands::Mentions {
            search,
            sentiment,
            date,
            sort,
            order,
            page,
            page_size,
            select,
            select_all,
            export,
            out_dir,
        } => {
            let query = MentionsQuery {
                limit: MENTIONS_FETCH_LIMIT,
                ..MentionsQuery::default()
            };
            let (origin, fetched) = app
                .dashboard()
                .mentions(&query)
                .await
                .context("Failed to load data. Please try again.")?;
            if origin == DataOrigin::Demo {
                eprintln!("Backend unavailable: showing generated sample data.");
            }

            let mut view = ViewConfig {
                page_size: page_size.unwrap_or(app.config.dashboard.page_size),
                ..ViewConfig::default()
            };
            if let Some(field) = sort {
                view.sort_field = field;
            }
            if let Some(order) = order {
                view.sort_order = order;
            }

            let mut table = MentionsTable::new(view);
            table.update_data(FeedData::Mentions(fetched));
            table.set_text_query(search);
            table.set_sentiment(sentiment);
            table.set_date_filter(date);
            table.go_to_page(page.saturating_sub(1));
            if select_all {
                table.toggle_all();
            }
            for id in select {
                table.toggle_row(id);
            }

            print!("{}", report::build_mentions_table(&table));

            if export {
                let dir = out_dir.unwrap_or_else(|| app.config.export.directory.clone());
                let path = export::export_to_dir(&dir, &table.export_rows(), Utc::now().date_naive())?;
                println!("Exported to {}", path.display());
            }
        }
        Commands::Search {
            query,
            sentiment,
            platform,
            start_date,
            end_date,
            limit,
            offset,
            sort,
            order,
        } => {
            let client = &app.client;
            let params = SearchParams {
                q: query,
                sentiment,
                platform,
                start_date,
                end_date,
                limit,
                offset,
                sort_by: sort,
                sort_order: order,
            };
            let page = client
                .search_mentions(&params)
                .await
                .map_err(|e| user_error("search mentions", e))?;

            let mut output = String::new();
            report::render_mention_rows(&mut output, &page.data, &Default::default());
            print!("{}", output);
            println!(
                "{} results, page {} of {}",
                page.pagination.total,
                if page.pagination.limit == 0 {
                    0
                } else {
                    page.pagination.offset / page.pagination.limit + 1
                },
                page.pagination.pages
            );
        }
        Commands::Keywords { action } => {
            let client = &app.client;
            match action {
                KeywordCommand::List {
                    search,
                    sort,
                    order,
                    limit,
                } => {
                    let page = client
                        .fetch_keywords(limit, 0)
                        .await
                        .context("Failed to load keywords")?;
                    let rows = query::filter_keywords(&page.data, &search, sort, order);
                    print!("{}", report::build_keywords(&rows));
                }
                KeywordCommand::Add { keyword, sentiment } => {
                    let form = NewKeyword::new(&keyword, sentiment)?;
                    let added = client
                        .add_keyword(&form)
                        .await
                        .map_err(|e| user_error("add keyword", e))?;
                    println!("Added keyword '{}' (id {})", added.keyword, added.id);
                }
                KeywordCommand::Delete { id } => {
                    client
                        .delete_keyword(id)
                        .await
                        .map_err(|e| user_error("delete keyword", e))?;
                    println!("Deleted keyword {}", id);
                }
            }
        }
        Commands::AddMention {
            text,
            platforms,
            sentiment,
            score,
            url,
        } => {
            let client = &app.client;
            let draft = MentionDraft {
                text,
                platforms,
                sentiment,
                score,
                url,
            };
            for submission in draft.into_submissions()? {
                let added = client
                    .add_mention(&submission)
                    .await
                    .map_err(|e| user_error("add mention", e))?;
                println!("Added mention {} on {}", added.id, added.platform);
            }
        }
        Commands::GenerateMock => {
            let generated = match app.client.generate_mock().await {
                Ok(success) => success,
                Err(e) => {
                    tracing::error!(error = %e, "failed to generate mock data");
                    false
                }
            };
            if generated {
                println!("Mock data generated");
            } else {
                bail!("Failed to generate mock data");
            }
        }
        Commands::Health => {
            if app.client.health().await {
                println!("Backend at {} is reachable", app.client.base_url());
            } else {
                bail!("Backend at {} is not reachable", app.client.base_url());
            }
        }
    }

    Ok(())
}
