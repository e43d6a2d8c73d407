use std::path::PathBuf;
use std::sync::Arc;

use easy_config_store::ConfigStore;
use eyre::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub type Config = Arc<ConfigInner>;

pub fn config(path: PathBuf) -> Result<Config> {
    let config_store = ConfigStore::<ConfigInner>::read(path, "config".to_string())?;
    let inner = (*config_store).clone();

    info!("config parsing successful");
    debug!(
        "loaded configuration:\n{}",
        toml::to_string_pretty(&inner.redacted())?
    );

    Ok(Arc::new(inner))
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct ConfigInner {
    pub llm: LLMConfig,
    #[serde(default)]
    pub portfolio: PortfolioConfig,
    #[serde(default)]
    pub outreach: OutreachConfig,
}

impl ConfigInner {
    fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if cfg.llm.api_key.is_some() {
            cfg.llm.api_key = Some("<redacted>".to_string());
        }
        cfg
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct LLMConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct PortfolioConfig {
    #[serde(default = "default_portfolio_path")]
    pub path: PathBuf,
    #[serde(default = "default_max_links")]
    pub max_links: usize,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            path: default_portfolio_path(),
            max_links: default_max_links(),
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct OutreachConfig {
    #[serde(default = "default_variations")]
    pub variations: usize,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    pub sender_profile: Option<String>,
    pub portfolio_url: Option<String>,
    pub sender_email: Option<String>,
}

impl Default for OutreachConfig {
    fn default() -> Self {
        Self {
            variations: default_variations(),
            sender_name: default_sender_name(),
            sender_profile: None,
            portfolio_url: None,
            sender_email: None,
        }
    }
}

fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_llm_endpoint() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_retries() -> u32 {
    3
}

fn default_portfolio_path() -> PathBuf {
    PathBuf::from("portfolio.csv")
}

fn default_max_links() -> usize {
    2
}

fn default_variations() -> usize {
    3
}

fn default_sender_name() -> String {
    "A software engineer".to_string()
}

impl Default for ConfigInner {
    fn default() -> Self {
        let cfg = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.default.toml",));

        toml::from_str(cfg).unwrap() // should be okay
    }
}
