mod run;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "klanavo-cli")]
#[command(about = "Search classified listings at a location or along a driving route")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search listings around a single location
    Search {
        /// Postal code or place name
        #[arg(long)]
        location: String,
        /// Free-text keywords
        #[arg(long)]
        query: Option<String>,
        /// Radius around the location in km
        #[arg(long, default_value = "10")]
        radius: u32,
        #[arg(long)]
        min_price: Option<u32>,
        #[arg(long)]
        max_price: Option<u32>,
        /// Numeric category id
        #[arg(long)]
        category: Option<u32>,
        /// Number of result pages to fetch (1-20)
        #[arg(long, default_value = "1")]
        pages: u32,
    },
    /// Search listings at postal codes sampled along a route
    Route {
        /// Start address or place
        #[arg(long)]
        start: String,
        /// Destination address or place
        #[arg(long = "ziel", alias = "destination")]
        destination: String,
        /// Radius around each postal code in km
        #[arg(long, default_value = "10")]
        radius: u32,
        /// Sampling distance along the route in km
        #[arg(long, default_value = "10")]
        step: f64,
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        min_price: Option<u32>,
        #[arg(long)]
        max_price: Option<u32>,
        #[arg(long)]
        category: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    execute(cli, klanavo_core::load_app_config).await
}

/// Runs `cli`, loading configuration only once a command needs it.
async fn execute<F>(cli: Cli, load_config: F) -> anyhow::Result<()>
where
    F: FnOnce() -> Result<klanavo_core::AppConfig, klanavo_core::ConfigError>,
{
    let Some(command) = cli.command else {
        println!("klanavo-cli ready; see --help for commands");
        return Ok(());
    };

    let config = load_config()?;
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(config.log_level.clone()))?;
    // Logs go to stderr so stdout stays pure JSON.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Search {
            location,
            query,
            radius,
            min_price,
            max_price,
            category,
            pages,
        } => {
            let filters = klanavo_core::SearchFilters {
                query,
                location: Some(location),
                radius_km: Some(radius),
                min_price,
                max_price,
                category_id: category,
                page_count: pages,
            };
            run::run_search(&config, &filters).await?;
        }
        Commands::Route {
            start,
            destination,
            radius,
            step,
            query,
            min_price,
            max_price,
            category,
        } => {
            let request = klanavo_search::RouteSearchRequest {
                radius,
                step,
                query,
                min_price,
                max_price,
                category,
                ..klanavo_search::RouteSearchRequest::new(&start, &destination)
            };
            run::run_route(&config, &request).await?;
        }
    }

    Ok(())
}
