//! Seed builder: expands the configured league list into per-season League rows.

use crate::config::CrawlConfig;
use crate::models::{League, LeagueTemplate};

/// "2016" → "2016/2017"
pub fn season_label(season: i32) -> String {
    format!("{}/{}", season, season + 1)
}

/// Fill the league URL template for one (template, season) pair.
pub fn league_url(url_template: &str, base_url: &str, template: &LeagueTemplate, season: i32) -> String {
    url_template
        .replace("{base}", base_url.trim_end_matches('/'))
        .replace("{slug}", &template.slug)
        .replace("{code}", &template.code)
        .replace("{season}", &season.to_string())
}

pub fn build_league(url_template: &str, base_url: &str, template: &LeagueTemplate, season: i32) -> League {
    League {
        name: format!("{} {}", template.name, season_label(season)),
        url: league_url(url_template, base_url, template, season),
        saison: season.to_string(),
    }
}

/// All seed leagues for one season, in configuration order.
pub fn build_leagues(crawl: &CrawlConfig, base_url: &str, season: i32) -> Vec<League> {
    crawl
        .leagues
        .iter()
        .map(|t| build_league(&crawl.league_url_template, base_url, t, season))
        .collect()
}
