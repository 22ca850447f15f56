pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::config::ScraperConfig;
use crate::models::{League, Player, Team};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

use self::cleaner::{clean_player_rows, clean_team_links};
use self::http_client::HttpClient;
use self::parsers::{decode, parse_league_page, parse_team_page};

// ── Extraction ────────────────────────────────────────────────────────────────

/// League roster page → one Team per club link, in document order.
pub fn extract_teams(body: &[u8], league_url: &str, season: i32) -> Result<Vec<Team>> {
    let html = decode(body)?;
    let links = parse_league_page(html)?;
    Ok(clean_team_links(links, league_url, season))
}

/// Team roster page → the rows that are complete players. Irregular rows are
/// skipped; only an unreadable document is an error.
pub fn extract_players(body: &[u8], team_url: &str) -> Result<Vec<Player>> {
    let html = decode(body)?;
    let rows = parse_team_page(html)?;
    Ok(clean_player_rows(rows, team_url))
}

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable roster source abstraction.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn fetch_teams(&self, league: &League, season: i32) -> Result<Vec<Team>>;
    async fn fetch_players(&self, team: &Team) -> Result<Vec<Player>>;
}

// ── transfermarkt scraper ─────────────────────────────────────────────────────

pub struct TransfermarktScraper {
    client: HttpClient,
    base_url: Url,
}

impl TransfermarktScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid base_url {:?}", config.base_url))?;
        Ok(Self {
            client: HttpClient::new(config)?,
            base_url,
        })
    }

    /// Team hrefs are site-relative, e.g. /fc-barcelona/startseite/verein/131/saison_id/2017
    fn team_url(&self, href: &str) -> Result<Url> {
        self.base_url
            .join(href)
            .with_context(|| format!("Cannot resolve team href {:?}", href))
    }
}

#[async_trait]
impl RosterSource for TransfermarktScraper {
    async fn fetch_teams(&self, league: &League, season: i32) -> Result<Vec<Team>> {
        let body = self
            .client
            .get_bytes(&league.url)
            .await
            .with_context(|| format!("Failed to fetch league page {}", league.url))?;

        let teams = extract_teams(&body, &league.url, season)
            .with_context(|| format!("Failed to parse league page {}", league.url))?;
        debug!("{}: {} teams", league.name, teams.len());
        Ok(teams)
    }

    async fn fetch_players(&self, team: &Team) -> Result<Vec<Player>> {
        let url = self.team_url(&team.url)?;
        let body = self
            .client
            .get_bytes(url.as_str())
            .await
            .with_context(|| format!("Failed to fetch team page {}", url))?;

        let players = extract_players(&body, &team.url)
            .with_context(|| format!("Failed to parse team page {}", url))?;
        debug!("{}: {} players", team.name, players.len());
        Ok(players)
    }
}

#[cfg(test)]
mod tests {
    use super::http_client::test_server::serve_once;
    use super::parsers::fixtures::*;
    use super::*;

    #[test]
    fn test_extract_teams_from_bytes() {
        let html = league_page(&[("FC Barcelona", "/fc-barcelona/startseite/verein/131/saison_id/2017")]);
        let teams = extract_teams(html.as_bytes(), "https://league/ES1", 2017).unwrap();

        assert_eq!(
            teams,
            vec![Team {
                name: "FC Barcelona 2017/2018".into(),
                url: "/fc-barcelona/startseite/verein/131/saison_id/2017".into(),
                league: "https://league/ES1".into(),
            }]
        );
    }

    #[test]
    fn test_extract_teams_empty_page() {
        let html = league_page(&[]);
        assert!(extract_teams(html.as_bytes(), "https://league", 2016).unwrap().is_empty());
    }

    #[test]
    fn test_extract_players_drops_row_without_portrait() {
        let html = team_page(&[
            player_row("Marc-Andre ter Stegen", "/ter-stegen/profil/spieler/74857", "30/apr/1992 (25)", Some("ts.jpg")),
            player_row("Jasper Cillessen", "/cillessen/profil/spieler/61697", "22/apr/1989 (28)", None),
            r#"<tr><td colspan="4">Difensori</td></tr>"#.to_string(),
            player_row("Gerard Pique", "/pique/profil/spieler/18944", "02/feb/1987 (30)", Some("gp.jpg")),
        ]);
        let players = extract_players(html.as_bytes(), "/fc-barcelona").unwrap();

        // 4 rows, 2 incomplete
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "Marc-Andre ter Stegen");
        assert_eq!(players[0].img_url, "ts.jpg");
        assert_eq!(players[1].url, "/pique/profil/spieler/18944");
        assert_eq!(players[1].birth_date, "02/feb/1987 (30)");
    }

    #[test]
    fn test_blank_href_row_is_skipped_and_batch_saves() {
        let html = team_page(&[
            player_row("Good One", "/good-one/profil/spieler/1", "01/gen/1990 (27)", Some("g.jpg")),
            player_row("Blank Href", "", "02/gen/1991 (26)", Some("b.jpg")),
        ]);
        let players = extract_players(html.as_bytes(), "/lazio").unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "Good One");

        let repo = crate::storage::Repository::open_in_memory().unwrap();
        repo.run_migrations().unwrap();
        assert_eq!(repo.upsert_players(&players).unwrap(), 1);
        assert!(repo.get_player("/good-one/profil/spieler/1").unwrap().is_some());
    }

    #[test]
    fn test_extract_players_unreadable_document() {
        assert!(extract_players(&[0xc3, 0x28], "/team").is_err());
    }

    #[tokio::test]
    async fn test_fetch_players_from_local_server() {
        let html = team_page(&[player_row("Edin Dzeko", "/edin-dzeko/profil/spieler/27059", "17/mar/1986 (31)", Some("ed.jpg"))]);
        let (base, server) = serve_once("HTTP/1.1 200 OK", html.into_bytes()).await;
        let scraper = TransfermarktScraper::new(&ScraperConfig { base_url: base, ..ScraperConfig::default() }).unwrap();
        let team = Team { name: "Roma 2017/2018".into(), url: "/as-rom/kader/verein/12".into(), league: "IT1".into() };

        let players = scraper.fetch_players(&team).await.unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].team, "/as-rom/kader/verein/12");
        assert!(server.await.unwrap().starts_with("GET /as-rom/kader/verein/12 "));
    }

    #[tokio::test]
    async fn test_fetch_teams_fails_on_server_error() {
        let (base, server) = serve_once("HTTP/1.1 500 Internal Server Error", Vec::new()).await;
        let scraper = TransfermarktScraper::new(&ScraperConfig::default()).unwrap();
        let league = League { name: "Seria A 2017/2018".into(), url: format!("{}/serie-a", base), saison: "2017".into() };

        let err = scraper.fetch_teams(&league, 2017).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to fetch league page"));
        assert!(format!("{:#}", err).contains("500"));
        server.await.unwrap();
    }

    #[test]
    fn test_team_url_joins_base() {
        let scraper = TransfermarktScraper::new(&ScraperConfig::default()).unwrap();
        let url = scraper.team_url("/juventus/startseite/verein/506/saison_id/2016").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.transfermarkt.it/juventus/startseite/verein/506/saison_id/2016"
        );
    }
}
