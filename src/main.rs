mod chat;
mod portfolio;
mod scraper;
mod session;
mod utils;

use std::num::NonZeroUsize;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Result, eyre};
use log::{debug, info, warn};

use crate::chat::agent::{OutreachAgent, SenderProfile};
use crate::chat::outreach::DraftGenerator;
use crate::portfolio::{DEFAULT_MAX_RESULTS, SharedPortfolio};
use crate::scraper::job::JobSource;
use crate::utils::cli::Args;
use crate::utils::config::{Config, config};
use crate::utils::log::Logger;
use crate::utils::prompt::{print_drafts, render_drafts, run_interactive};

const API_KEY_ENV: &str = "GROQ_API_KEY";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    Logger::init(args.verbosity);

    info!(
        "starting cold-mailer {}",
        format!("v{}", env!("CARGO_PKG_VERSION")).magenta()
    );

    let config: Config = config(args.config.clone())?;

    let api_key = config
        .llm
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .ok_or_else(|| {
            eyre!(
                "LLM API key not configured in config.toml and {} is not set",
                API_KEY_ENV
            )
        })?;

    let portfolio_path = args
        .portfolio
        .clone()
        .unwrap_or_else(|| config.portfolio.path.clone());
    let portfolio = Arc::new(SharedPortfolio::load(portfolio_path)?);
    let store = portfolio.snapshot();
    if store.is_empty() {
        warn!("portfolio {} has no usable entries", portfolio.path().display());
    }
    for entry in store.entries() {
        debug!("portfolio entry: [{}] {}", entry.skills().join(", "), entry.link());
    }
    info!(
        "portfolio ready: {} entries from {}",
        store.len(),
        portfolio.path().display()
    );

    let variations = args
        .variations
        .map(usize::from)
        .unwrap_or(config.outreach.variations);
    let variations = NonZeroUsize::new(variations)
        .ok_or_else(|| eyre!("outreach.variations must be at least 1"))?;
    let max_links = NonZeroUsize::new(config.portfolio.max_links).unwrap_or(DEFAULT_MAX_RESULTS);
    debug!("variations: {}, max links: {}", variations, max_links);

    let agent = OutreachAgent::new(
        api_key,
        &config.llm,
        SenderProfile::from(&config.outreach),
    );
    let generator = DraftGenerator::new(agent, portfolio, variations, max_links);

    let source = match (args.job_url, args.job_file) {
        (Some(url), _) => JobSource::Url(url),
        (None, Some(file)) => JobSource::File(file),
        (None, None) => return run_interactive(&generator).await,
    };

    let generated = generator.generate(&source).await?;
    info!(
        "drafted {} variations for {}",
        generated.drafts.len(),
        generated.job.role
    );
    print_drafts(&generated.drafts);

    if let Some(output) = args.output {
        tokio::fs::write(&output, render_drafts(&generated.drafts)).await?;
        info!("wrote drafts to {}", output.display());
    }

    Ok(())
}
