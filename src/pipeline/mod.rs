//! Pipeline orchestrator: ties seeds → scraper → storage together.
//!
//! One crawl walks seasons → leagues → teams strictly in order:
//!   1. Build the season's seed leagues and upsert them.
//!   2. For each league, fetch its roster page and upsert the teams.
//!   3. For each team, fetch its roster page and upsert the players.
//!
//! Every upsert commits on its own, so an aborted crawl keeps whatever was
//! saved before the failure. Re-running replaces rows by url.

use crate::config::AppConfig;
use crate::models::League;
use crate::scraper::{RosterSource, TransfermarktScraper};
use crate::seeds::build_leagues;
use crate::storage::{Repository, RunTotals};
use crate::utils::{Stage, StageTimer};
use anyhow::{Context, Result};
use tracing::{info, warn};

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> Result<PipelineStats> {
        let repo = Repository::open(&self.config.storage.db_path)
            .context("Failed to open DuckDB")?;

        if self.config.storage.run_migrations {
            repo.run_migrations()?;
        }

        let scraper = TransfermarktScraper::new(&self.config.scraper)
            .context("Failed to build scraper")?;

        self.run_with(&repo, &scraper).await
    }

    /// Crawl with an explicit store and source. The outcome is recorded in
    /// `scrape_runs` either way; a fatal error is then returned unchanged.
    pub async fn run_with<S: RosterSource + ?Sized>(
        &self,
        repo: &Repository,
        source: &S,
    ) -> Result<PipelineStats> {
        let run_id = repo.begin_scrape_run()?;
        let mut totals = RunTotals::default();

        let outcome = self.crawl(repo, source, &mut totals).await;

        let error = outcome.as_ref().err().map(|e| format!("{:#}", e));
        if let Err(e) = repo.finish_scrape_run(run_id, totals, error.as_deref()) {
            warn!("Could not record scrape run {}: {:#}", run_id, e);
        }
        outcome?;

        let stats = PipelineStats {
            seasons: self.config.crawl.seasons.len(),
            leagues_saved: totals.leagues,
            teams_saved: totals.teams,
            players_saved: totals.players,
        };
        info!(
            "=== Done: {} seasons | {} leagues | {} teams | {} players ===",
            stats.seasons, stats.leagues_saved, stats.teams_saved, stats.players_saved,
        );
        Ok(stats)
    }

    async fn crawl<S: RosterSource + ?Sized>(
        &self,
        repo: &Repository,
        source: &S,
        totals: &mut RunTotals,
    ) -> Result<()> {
        let crawl = &self.config.crawl;
        crawl.validate()?;

        for &season in &crawl.seasons {
            info!("processing season: {}", season);
            let _t = StageTimer::start(Stage::Season, season.to_string());

            let leagues = build_leagues(crawl, &self.config.scraper.base_url, season);
            info!("  saving leagues");
            totals.leagues += repo
                .upsert_leagues(&leagues)
                .with_context(|| format!("saving leagues for season {}", season))?;

            for league in &leagues {
                self.crawl_league(repo, source, league, season, totals).await?;
            }
        }

        Ok(())
    }

    async fn crawl_league<S: RosterSource + ?Sized>(
        &self,
        repo: &Repository,
        source: &S,
        league: &League,
        season: i32,
        totals: &mut RunTotals,
    ) -> Result<()> {
        info!("  processing {}", league.name);
        let _t = StageTimer::start(Stage::League, &league.name);
        let teams = source.fetch_teams(league, season).await?;

        info!("    saving teams");
        totals.teams += repo
            .upsert_teams(&teams)
            .with_context(|| format!("saving teams of {}", league.url))?;

        for team in &teams {
            info!("    processing {}", team.name);
            let players = source.fetch_players(team).await?;

            info!("      saving players");
            totals.players += repo
                .upsert_players(&players)
                .with_context(|| format!("saving players of {}", team.url))?;
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct PipelineStats {
    pub seasons: usize,
    pub leagues_saved: usize,
    pub teams_saved: usize,
    pub players_saved: usize,
}
