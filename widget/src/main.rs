//! RateWidget
//!
//! Terminal currency converter: fetches reference rates, converts an amount
//! between two currencies and shows a small table of reference rates.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratewidget_common::{codes, CurrencyCode, MAJOR_CURRENCIES};
use ratewidget_fx::{FxConfig, HttpRateSource, RateStore};

mod render;
mod repl;
mod session;

use repl::Repl;
use session::ConverterSession;

/// RateWidget CLI
#[derive(Parser, Debug)]
#[command(name = "ratewidget")]
#[command(about = "Currency converter backed by a public exchange rate API")]
struct Args {
    /// Rate endpoint, queried as `<endpoint>?base=<pivot>`
    #[arg(long)]
    endpoint: Option<String>,

    /// Pivot currency the rates are requested in
    #[arg(long)]
    pivot: Option<CurrencyCode>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Convert an amount once and exit
    Convert {
        amount: String,
        from: CurrencyCode,
        to: CurrencyCode,
    },
    /// Print the reference-rate table
    Rates {
        /// Base currency of the table
        #[arg(long)]
        base: Option<CurrencyCode>,
    },
    /// Interactive converter reading commands from stdin (default)
    Interactive,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(args: &Args) -> anyhow::Result<FxConfig> {
    let mut config = FxConfig::from_env();

    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(pivot) = &args.pivot {
        config.pivot = pivot.clone();
    }
    if let Some(secs) = args.timeout_secs {
        config.request_timeout = std::time::Duration::from_secs(secs);
    }

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    let config = load_config(&args)?;
    info!(
        endpoint = %config.endpoint,
        pivot = %config.pivot,
        timeout_secs = config.request_timeout.as_secs(),
        "Starting RateWidget"
    );

    let source = HttpRateSource::new(config.endpoint.clone(), config.request_timeout)?;
    let store = Arc::new(RateStore::new(Arc::new(source)));
    let mut session =
        ConverterSession::new(store.clone(), config.pivot.clone(), config.stale_after_chrono());

    match args.command.unwrap_or(Mode::Interactive) {
        Mode::Convert { amount, from, to } => {
            session.refresh().await?;
            session.set_amount(&amount)?;
            session.set_from(from.code())?;
            session.set_to(to.code())?;
            let result = session.convert()?;
            print!("{}", render::conversion(&result));
        }
        Mode::Rates { base } => {
            let snapshot = session.refresh().await?;
            let base = base.unwrap_or_else(|| config.display_base.clone());
            let rows = session.reference_table(&base, &codes(&MAJOR_CURRENCIES))?;
            print!("{}", render::updated_at(&snapshot));
            print!("{}", render::reference_table(&rows));
        }
        Mode::Interactive => {
            let mut repl = Repl::new(session, config.display_base.clone(), std::io::stdout());
            repl.run(tokio::io::BufReader::new(tokio::io::stdin())).await?;
        }
    }

    let stats = store.stats();
    info!(
        refresh_attempts = stats.refresh_attempts,
        refresh_failures = stats.refresh_failures,
        "RateWidget done"
    );
    Ok(())
}
