pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{Converter, ConverterState, RateProvider};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Convert {
        amount: Option<String>,
        from: Option<String>,
        to: Option<String>,
    },
    Currencies,
    Interactive,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxconv starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider: Arc<dyn RateProvider> = Arc::new(
        providers::exchangerate_api::ExchangeRateApiProvider::new(config.exchangerate_base_url()),
    );
    let mut stdout = std::io::stdout();

    match command {
        AppCommand::Convert { amount, from, to } => {
            let mut defaults = config.defaults.clone();
            if let Some(amount) = amount {
                defaults.amount = amount;
            }
            if let Some(from) = from {
                defaults.source = from;
            }
            if let Some(to) = to {
                defaults.target = to;
            }
            let state = ConverterState::new(&defaults, &config.currency_list_base);
            let mut converter = Converter::new(provider, state);
            cli::convert::run(&mut converter, &mut stdout).await
        }
        AppCommand::Currencies => {
            cli::currencies::run(provider.as_ref(), &config.currency_list_base, &mut stdout).await
        }
        AppCommand::Interactive => {
            let state = ConverterState::new(&config.defaults, &config.currency_list_base);
            let reader = tokio::io::BufReader::new(tokio::io::stdin());
            cli::interactive::run(provider, state, reader, &mut stdout).await
        }
    }
}
