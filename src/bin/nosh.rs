use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use futures::{stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use nosh_jet::{constants::*, Client, ClientConfigBuilder, Postcode};
use nosh_listing::{
    AppState, FetchOrchestrator, ListingStatus, ListingView, ListStateController, MemoryLocation,
    QueryLocation, ResponseOrdering, Store,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nosh", about = "Browse restaurants delivering to a postcode")]
struct CliArgs {
    #[command(subcommand)]
    pub subcommand: Command,

    #[command(flatten)]
    pub global_opts: GlobalOpts,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    #[arg(short = 'b', long, env = "NOSH_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    #[arg(long, env = "NOSH_PATH_FORMAT", default_value = DEFAULT_RESTAURANTS_PATH_FORMAT, global = true)]
    pub path_format: String,

    #[arg(short = 'c', long, env = "NOSH_COUNTRY", default_value = DEFAULT_COUNTRY, global = true)]
    pub country: String,

    #[arg(short = 'p', long, env = "NOSH_POSTCODE", default_value = DEFAULT_POSTCODE, global = true)]
    pub postcode: String,

    #[arg(short = 't', long, env = "NOSH_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    #[arg(long, env = "NOSH_LOG_LEVEL", default_value = "warn", global = true, help = "Used when RUST_LOG is unset")]
    pub log_level: String,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    #[clap(name = "lookup", about = "Print the raw restaurant list for one or more postcodes")]
    Lookup {
        #[arg(help = "Postcodes to look up, defaults to --postcode")]
        postcodes: Vec<String>,
    },

    #[clap(name = "browse", about = "Filter, sort and paginate restaurants like the listing page")]
    Browse {
        #[arg(short = 'q', long, default_value = "", help = "Listing query string, e.g. \"q=pizza&sort=reviews&page=2\"")]
        query: String,

        #[arg(long, help = "Apply every response even if a newer request was started")]
        last_response_wins: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.global_opts.log_level);

    let http = nosh_jet::default_http_client(args.global_opts.timeout_secs)?;
    let config = ClientConfigBuilder::default()
        .base_url(args.global_opts.base_url.clone())
        .path_format(args.global_opts.path_format.clone())
        .country(args.global_opts.country.clone())
        .build()?;
    let client = Client::new(http, &config)?;

    match args.subcommand {
        Command::Lookup { postcodes } => {
            let postcodes = if postcodes.is_empty() {
                vec![args.global_opts.postcode]
            } else {
                postcodes
            };

            let progress = ProgressBar::new(postcodes.len() as u64);
            progress.set_style(ProgressStyle::with_template(
                "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}",
            )?);
            let results = stream::iter(postcodes)
                .map(|postcode| {
                    let client = &client;
                    let progress = &progress;
                    async move {
                        let result = client.restaurants_by_raw_postcode(&postcode).await;
                        progress.inc(1);
                        match result {
                            Ok(restaurants) => {
                                json!({"postcode": postcode, "restaurants": restaurants})
                            }
                            Err(error) => {
                                json!({"postcode": postcode, "error": error.to_string()})
                            }
                        }
                    }
                })
                .buffer_unordered(4)
                .collect::<Vec<_>>()
                .await;
            progress.finish_and_clear();
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Browse {
            query,
            last_response_wins,
        } => {
            let postcode = Postcode::parse(&args.global_opts.postcode)?;
            let ordering = if last_response_wins {
                ResponseOrdering::LastResponseWins
            } else {
                ResponseOrdering::LatestRequestWins
            };
            let store = Arc::new(Store::new(
                AppState {
                    postcode,
                    ..Default::default()
                },
                ordering,
            ));
            let orchestrator = FetchOrchestrator::new(Arc::clone(&store), Arc::new(client));
            let mut controller = ListStateController::new(MemoryLocation::new(query));
            let mut selection = controller.selection();

            let spinner = ProgressBar::new_spinner();
            spinner.enable_steady_tick(Duration::from_millis(100));
            let fetch = orchestrator.start_fetch();
            let mut updates = store.subscribe();
            while let Some(state) = updates.next().await {
                if !state.restaurants.loading {
                    break;
                }
                spinner.set_message(format!("Looking up restaurants near {}", state.postcode));
            }
            spinner.finish_and_clear();
            fetch.await?;

            let state = store.state();
            let view = ListingView::build(&state.restaurants, &selection);
            let mut page = view.page(selection.page);
            if page.is_out_of_range() {
                tracing::info!(
                    page = selection.page,
                    total_pages = page.total_pages,
                    "page out of range, going back to the first page"
                );
                selection = controller.set_page(1);
                page = view.page(selection.page);
            }

            let output = json!({
                "postcode": state.postcode.as_str(),
                "query": controller.location().query(),
                "view": &view,
                "message": view.message(),
                "rangeLabel": page.range_label(),
                "visiblePages": page.visible_pages(),
                "page": &page,
                "restaurants": page.cards(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);

            if let ListingStatus::Failed(message) = &view.status {
                anyhow::bail!("failed to fetch restaurants: {message}");
            }
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
