//! Command-line shell around the portal clients
//!
//! Buys tickets or checks results for one session and prints the result
//! object as JSON on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! lotto-portal --session-id "$JSESSIONID" buy-lotto --count 3
//! lotto-portal buy-lotto --numbers 1,7,13,22,34,45 --numbers 3,9,15,27,38,41
//! lotto-portal buy-pension --username myaccount
//! lotto-portal check-lotto
//! ```

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, info};
use tracing_subscriber::{
    EnvFilter, Registry, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

use lotto_portal_client::{
    AccountClient, HttpTransport, LottoClient, NumberSet, PensionClient, PurchaseIntent,
    SessionContext,
    config::{ConfigLoader, LoggingSettings},
    utils::VERSION,
};

#[derive(Parser)]
#[command(author, version = VERSION, about, long_about = None)]
#[command(name = "lotto-portal")]
struct Cli {
    /// Session identifier (JSESSIONID) of a logged-in portal session
    #[arg(long, env = "LOTTO_PORTAL_SESSION_ID", hide_env_values = true)]
    session_id: Option<String>,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Buy 6/45 lotto tickets for the next round
    BuyLotto {
        /// Number of auto tickets (1-5)
        #[arg(long, default_value_t = 5, conflicts_with = "numbers")]
        count: u8,

        /// Manual ticket, six comma-separated numbers; repeat for more tickets
        #[arg(long, value_name = "N,N,N,N,N,N", value_parser = parse_number_set)]
        numbers: Vec<NumberSet>,
    },
    /// Buy the five-ticket pension 720 set for the next round
    BuyPension {
        /// Portal account name
        #[arg(long, env = "LOTTO_PORTAL_USERNAME")]
        username: String,
    },
    /// Check the newest 6/45 purchase of the last seven days
    CheckLotto,
    /// Check the newest pension purchase of the last seven days
    CheckPension,
    /// Show the deposit balance
    Balance,
}

#[derive(Serialize)]
struct BalanceOutput {
    balance: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let startup_level = std::env::var("LOTTO_PORTAL_LOG_LEVEL")
        .unwrap_or_else(|_| LoggingSettings::default().level);
    let filter = init_logging(cli.verbose, &startup_level);

    let settings = ConfigLoader::new().load(cli.config.as_deref())?;
    filter.reload(log_filter(
        cli.verbose || settings.logging.verbose,
        &settings.logging.level,
    ))?;
    debug!("Loaded settings: {:?}", settings);

    let Some(session_id) = cli.session_id.as_deref() else {
        anyhow::bail!("a session id is required (--session-id or LOTTO_PORTAL_SESSION_ID)");
    };
    let session = SessionContext::new(session_id)?;

    let transport = Arc::new(HttpTransport::new(&settings.network)?);
    let portal = Arc::new(settings.portal);

    let succeeded = match cli.command {
        Command::BuyLotto { count, numbers } => {
            let intent = if numbers.is_empty() {
                PurchaseIntent::lotto_auto(count)
            } else {
                PurchaseIntent::lotto_manual(numbers)
            };
            info!("Buying {} lotto ticket(s)", intent.count);
            let result = LottoClient::new(transport, portal)
                .purchase(&session, &intent)
                .await;
            print_json(&result)?;
            result.success
        }
        Command::BuyPension { username } => {
            let result = PensionClient::new(transport, portal)
                .purchase(&session, &PurchaseIntent::pension(), &username)
                .await;
            print_json(&result)?;
            result.success
        }
        Command::CheckLotto => {
            let result = LottoClient::new(transport, portal).check_winning(&session).await;
            print_json(&result)?;
            result.error_kind.is_none()
        }
        Command::CheckPension => {
            let result = PensionClient::new(transport, portal).check_winning(&session).await;
            print_json(&result)?;
            result.error_kind.is_none()
        }
        Command::Balance => {
            let balance = AccountClient::new(transport, portal).balance(&session).await?;
            print_json(&BalanceOutput { balance })?;
            true
        }
    };

    if !succeeded {
        std::process::exit(1);
    }

    Ok(())
}

/// Install the stderr subscriber; the returned handle swaps in the
/// configured level once settings are loaded
fn init_logging(verbose: bool, level: &str) -> reload::Handle<EnvFilter, Registry> {
    let (filter, handle) = reload::Layer::new(log_filter(verbose, level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    handle
}

/// `RUST_LOG` wins over the configured level
fn log_filter(verbose: bool, level: &str) -> EnvFilter {
    let default_level = if verbose { "debug" } else { level };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_number_set(raw: &str) -> Result<NumberSet, String> {
    let numbers = raw
        .split(',')
        .map(|n| n.trim().parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|e| format!("invalid number in {:?}: {}", raw, e))?;
    NumberSet::try_from(numbers).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_number_set() {
        let set = parse_number_set("1, 7,13,22,34,45").unwrap();
        assert_eq!(set.numbers(), &[1, 7, 13, 22, 34, 45]);

        assert!(parse_number_set("1,2,3").is_err());
        assert!(parse_number_set("1,2,3,4,5,x").is_err());
        assert!(parse_number_set("1,1,2,3,4,5").is_err());
    }

    #[test]
    fn test_buy_lotto_args() {
        let cli = Cli::try_parse_from([
            "lotto-portal",
            "--session-id",
            "abc",
            "buy-lotto",
            "--numbers",
            "1,2,3,4,5,6",
            "--numbers",
            "7,8,9,10,11,12",
        ])
        .unwrap();
        match cli.command {
            Command::BuyLotto { numbers, .. } => assert_eq!(numbers.len(), 2),
            _ => panic!("expected buy-lotto"),
        }
    }
}
