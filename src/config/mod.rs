use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::models::LeagueTemplate;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub storage: StorageConfig,
    pub crawl: CrawlConfig,
}

/// Scraper configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

/// What to crawl: the league seed list and the seasons to visit.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlConfig {
    /// Placeholders: `{base}`, `{slug}`, `{code}`, `{season}`.
    #[serde(default = "default_league_url_template")]
    pub league_url_template: String,

    #[serde(default = "default_seasons")]
    pub seasons: Vec<i32>,

    #[serde(default = "default_leagues")]
    pub leagues: Vec<LeagueTemplate>,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://www.transfermarkt.it".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_6) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/55.0.2883.95 Safari/537.36"
        .to_string()
}
fn default_db_path() -> PathBuf {
    PathBuf::from("data/transfermarkt.duckdb")
}
fn default_true() -> bool {
    true
}
fn default_league_url_template() -> String {
    "{base}/{slug}/startseite/wettbewerb/{code}/plus/?saison_id={season}".to_string()
}
fn default_seasons() -> Vec<i32> {
    vec![2015, 2016, 2017]
}
fn default_leagues() -> Vec<LeagueTemplate> {
    vec![
        LeagueTemplate::new("Seria A", "IT1", "serie-a"),
        LeagueTemplate::new("Premiere League", "GB1", "premiere-league"),
        LeagueTemplate::new("La Liga", "ES1", "la-liga"),
    ]
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            run_migrations: true,
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            league_url_template: default_league_url_template(),
            seasons: default_seasons(),
            leagues: default_leagues(),
        }
    }
}

/// Season starting years the crawler accepts.
pub const SEASON_RANGE: RangeInclusive<i32> = 1900..=2999;

impl CrawlConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self.seasons.iter().find(|s| !SEASON_RANGE.contains(s)) {
            bail!(
                "season {} outside {}..={}",
                bad,
                SEASON_RANGE.start(),
                SEASON_RANGE.end()
            );
        }
        Ok(())
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::Environment::with_prefix("TM")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to read configuration")?;

        let app_cfg: AppConfig = cfg.try_deserialize().context("Invalid configuration")?;
        app_cfg.crawl.validate().context("Invalid [crawl] configuration")?;
        Ok(app_cfg)
    }
}
