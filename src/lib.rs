pub mod config;
pub mod core;
pub mod history;
pub mod input;
pub mod providers;
pub mod store;

use crate::config::AppConfig;
use crate::core::convert::ConversionEngine;
use crate::core::rates::{CurrencyCatalog, RateProvider};
use crate::history::ConversionLog;
use crate::input::{PromptOutcome, Prompter};
use crate::providers::caching::CachingRateProvider;
use crate::providers::fast_forex::FastForexClient;
use crate::store::DiskCache;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use console::style;
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};

pub async fn run(date: NaiveDate, config_path: Option<&str>) -> Result<()> {
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    let mut prompter = Prompter::new(stdin, stdout);
    run_with_io(date, config_path, &mut prompter).await
}

/// Same as [`run`], but over caller-supplied console streams so tests can
/// script a whole session.
pub async fn run_with_io<R: BufRead, W: Write>(
    date: NaiveDate,
    config_path: Option<&str>,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    info!("histfx starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    // Checked before the cache layout is touched or any request goes out.
    let api_key = config.api_key()?;

    let cache = DiskCache::new(config.cache_dir.clone());
    cache.ensure_layout()?;

    let client = FastForexClient::new(&config.provider.base_url, api_key)?;
    let today = Local::now().date_naive();
    let provider = CachingRateProvider::new(client, cache, today);

    // Without a catalog no currency code can be validated, so a failure
    // here ends the run.
    let catalog = provider
        .fetch_currencies()
        .await
        .context("could not load the currency catalog")?
        .currencies;
    debug!(currencies = catalog.len(), "catalog ready");

    let log = ConversionLog::new(config.history_file.clone());
    let engine = ConversionEngine::new(&provider, &log);

    let completed = run_session(prompter, &engine, &catalog, date).await?;
    info!(conversions = completed, "session finished");
    Ok(())
}

/// Prompts for conversion requests until the user ends the session. A
/// failed conversion is reported and the loop moves on to the next request.
pub async fn run_session<P: RateProvider, R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    engine: &ConversionEngine<'_, P>,
    catalog: &CurrencyCatalog,
    date: NaiveDate,
) -> Result<u64> {
    let mut completed = 0;
    loop {
        match prompter.read_request(catalog)? {
            PromptOutcome::End => break,
            PromptOutcome::Request(request) => match engine.execute(&request, date).await {
                Ok(conversion) => {
                    prompter.report(&conversion)?;
                    completed += 1;
                }
                Err(e) => {
                    warn!(error = %e, "conversion failed");
                    prompter.report(style(format!("Conversion failed: {e}")).red())?;
                }
            },
        }
    }
    Ok(completed)
}
