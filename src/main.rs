//! paynow-gateway - Paynow credential and connectivity check
//!
//! Loads configuration, opens a session against the configured Paynow
//! environment and prints the payment methods available to the merchant.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use rust_decimal::Decimal;
use tracing::{error, info};

use paynow_gateway::adapters::{PaynowProcessor, ReqwestConnector};
use paynow_gateway::config::AppConfig;
use paynow_gateway::domain::paynow::Currency;

/// List Paynow payment methods available for an optional amount and currency
#[derive(Debug, Parser)]
#[command(name = "paynow-gateway", version)]
struct Args {
    /// Amount in the main currency unit, e.g. 49.99
    amount: Option<Decimal>,

    /// Currency code: PLN, EUR, USD or GBP
    currency: Option<Currency>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = AppConfig::load()?;
    config.logging.init()?;

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let connector = Arc::new(
        ReqwestConnector::new()
            .with_timeout(Duration::from_secs(config.paynow.request_timeout_secs)),
    );
    let mut processor = PaynowProcessor::from_settings(&config.paynow, connector)?;

    info!(
        api_url = %processor.client().api_url(),
        sandbox = config.paynow.sandbox,
        "Checking Paynow credentials"
    );

    processor.client_mut().open().await?;
    let groups = processor
        .client()
        .get_payment_methods(args.amount, args.currency)
        .await;
    processor.client_mut().close();

    let groups = groups?;
    info!(groups = groups.len(), "Paynow credentials accepted");
    println!("{}", serde_json::to_string_pretty(&groups)?);

    Ok(())
}
