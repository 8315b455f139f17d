//! ShopEase CLI - operator tools for the ShopEase backend.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog with filters
//! shopease products list --search mango --category Snacks --limit 6
//!
//! # Admin table sorted by likes
//! shopease products all --sort-by likes --order desc
//!
//! # Delete a product as an admin
//! shopease products delete 665f1c --admin-email admin@shop.io
//!
//! # Resolve a user's role
//! shopease users role shopper@shop.io
//!
//! # Serve a pending product request
//! shopease requests serve 6660aa
//! ```
//!
//! # Commands
//!
//! - `products` - list, admin table, detail, add, delete
//! - `upcoming` - list, publish
//! - `users` - list, role lookup, promote to admin
//! - `reviews` - moderation list, reviews of a product
//! - `requests` - serve queue, mark served
//! - `payments` - purchase history
//!
//! Results are printed to stdout as JSON; logs go to stderr.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shopease_client::{ClientConfig, ShopClient};

mod commands;

use commands::CliError;
use commands::payments::PaymentsAction;
use commands::products::ProductsAction;
use commands::requests::RequestsAction;
use commands::reviews::ReviewsAction;
use commands::upcoming::UpcomingAction;
use commands::users::UsersAction;

#[derive(Parser)]
#[command(name = "shopease")]
#[command(author, version, about = "ShopEase operator CLI")]
struct Cli {
    /// Backend base URL (overrides `SHOPEASE_API_BASE_URL`)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Catalog products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Upcoming products
    Upcoming {
        #[command(subcommand)]
        action: UpcomingAction,
    },
    /// Users and roles
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Reviews
    Reviews {
        #[command(subcommand)]
        action: ReviewsAction,
    },
    /// Product requests
    Requests {
        #[command(subcommand)]
        action: RequestsAction,
    },
    /// Membership payments
    Payments {
        #[command(subcommand)]
        action: PaymentsAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::debug!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopease_client=info,shopease_cli=info".into());

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.base_url.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(cli.json_logs);
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(cli.json_logs);

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn load_config(base_url: Option<&str>) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = base_url {
        config.api = ClientConfig::for_base_url(base_url)?.api;
    }
    Ok(config)
}

async fn run(command: Commands, config: &ClientConfig) -> Result<(), CliError> {
    let client = ShopClient::new(&config.api)?;

    match command {
        Commands::Products { action } => commands::products::run(&client, config, action).await,
        Commands::Upcoming { action } => commands::upcoming::run(&client, action).await,
        Commands::Users { action } => commands::users::run(&client, action).await,
        Commands::Reviews { action } => commands::reviews::run(&client, action).await,
        Commands::Requests { action } => commands::requests::run(&client, action).await,
        Commands::Payments { action } => commands::payments::run(&client, action).await,
    }
}
