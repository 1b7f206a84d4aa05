pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::bitcoins::Bitcoins;
use crate::core::config::AppConfig;
use crate::core::feed::{Feed, QuoteFetcher};
use crate::core::rates::{Direction, Rates};
use crate::core::state::StateHolder;
use crate::core::stocks::Stocks;
use crate::core::sync::Synchronizer;
use crate::providers::HgFinanceProvider;
use crate::store::Storage;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Rates,
    Bitcoins,
    Stocks {
        filter: Option<String>,
    },
    Convert {
        code: String,
        amount: f64,
        direction: Direction,
    },
    All,
}

/// One state holder per feed, sharing the provider and the store.
///
/// Each table is written by exactly one holder, so the cycle guard of that
/// holder covers every write to it.
pub struct App {
    rates: StateHolder<Rates>,
    bitcoins: StateHolder<Bitcoins>,
    stocks: StateHolder<Stocks>,
}

fn idle_holder<F: Feed>(
    provider: &Arc<HgFinanceProvider>,
    storage: &Storage,
    fields: &str,
) -> Result<StateHolder<F>> {
    let fetcher: Arc<dyn QuoteFetcher<F>> = provider.clone();
    let table = storage.table::<F::Entity>(F::TABLE)?;
    Ok(StateHolder::idle(Synchronizer::new(fetcher, table, fields)))
}

impl App {
    /// Builds the holders without starting any cycle.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let provider = Arc::new(HgFinanceProvider::new(&config.providers.hg_finance)?);
        let storage = Storage::open(config.store, &config.default_data_path()?)?;
        Ok(App {
            rates: idle_holder(&provider, &storage, &config.fields.rates)?,
            bitcoins: idle_holder(&provider, &storage, &config.fields.bitcoins)?,
            stocks: idle_holder(&provider, &storage, &config.fields.stocks)?,
        })
    }

    pub fn rates(&self) -> &StateHolder<Rates> {
        &self.rates
    }

    pub fn bitcoins(&self) -> &StateHolder<Bitcoins> {
        &self.bitcoins
    }

    pub fn stocks(&self) -> &StateHolder<Stocks> {
        &self.stocks
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("ratesnow starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let app = App::from_config(&config)?;

    match command {
        AppCommand::Rates => cli::rates::run(app.rates()).await,
        AppCommand::Bitcoins => cli::bitcoins::run(app.bitcoins()).await,
        AppCommand::Stocks { filter } => cli::stocks::run(app.stocks(), filter.as_deref()).await,
        AppCommand::Convert {
            code,
            amount,
            direction,
        } => cli::convert::run(app.rates(), &code, amount, direction).await,
        AppCommand::All => {
            let (rates, bitcoins, stocks) = cli::wait_with_spinner("Fetching finance data...", async {
                futures::join!(
                    app.rates().reload(),
                    app.bitcoins().reload(),
                    app.stocks().reload()
                )
            })
            .await;

            println!("{}\n", cli::rates::render(&rates));
            println!("{}\n", cli::bitcoins::render(&bitcoins));
            println!("{}", cli::stocks::render(&stocks, None));
            Ok(())
        }
    }
}
