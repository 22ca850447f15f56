use crate::models::{Player, RawPlayerRow, RawTeamLink, Team};
use crate::seeds::season_label;
use tracing::{debug, warn};

// ── League page → Team ────────────────────────────────────────────────────────

/// "FC Barcelona" + 2017 → "FC Barcelona 2017/2018". The href is kept as rendered.
pub fn link_to_team(link: RawTeamLink, league_url: &str, season: i32) -> Team {
    Team {
        name: format!("{} {}", link.text, season_label(season)),
        url: link.href,
        league: league_url.to_string(),
    }
}

pub fn clean_team_links(links: Vec<RawTeamLink>, league_url: &str, season: i32) -> Vec<Team> {
    links
        .into_iter()
        .map(|link| link_to_team(link, league_url, season))
        .collect()
}

// ── Team page → Player ────────────────────────────────────────────────────────

/// A complete row becomes a Player; a row lacking any required part yields None.
pub fn player_row_to_player(row: &RawPlayerRow, team_url: &str) -> Option<Player> {
    Some(Player {
        name: row.name.clone()?,
        url: row.url.clone()?,
        birth_date: row.birth_date.clone()?,
        img_url: row.img_url.clone()?,
        team: team_url.to_string(),
    })
}

/// Keeps complete rows in document order; everything else is logged and dropped.
pub fn clean_player_rows(rows: Vec<RawPlayerRow>, team_url: &str) -> Vec<Player> {
    let total = rows.len();
    let players: Vec<Player> = rows
        .iter()
        .filter_map(|row| {
            let player = player_row_to_player(row, team_url);
            if player.is_none() {
                warn!(
                    "{}: skipping roster row {} (missing {})",
                    team_url,
                    row.index,
                    row.missing().join(", ")
                );
            }
            player
        })
        .collect();

    let skipped = total - players.len();
    if skipped > 0 {
        debug!("{}: {} of {} roster rows skipped", team_url, skipped, total);
    }
    players
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn row(index: usize, name: &str, img: Option<&str>) -> RawPlayerRow {
        RawPlayerRow {
            index,
            name: Some(name.to_string()),
            url: Some(format!("/{}/profil/spieler/{}", name.to_lowercase(), index)),
            birth_date: Some("01/01/1990 (27)".to_string()),
            img_url: img.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_team_name_suffix() {
        let link = RawTeamLink {
            text: "FC Barcelona".into(),
            href: "/fc-barcelona/startseite/verein/131/saison_id/2017".into(),
        };
        let team = link_to_team(link, "https://league", 2017);

        assert_eq!(team.name, "FC Barcelona 2017/2018");
        assert_eq!(team.url, "/fc-barcelona/startseite/verein/131/saison_id/2017");
        assert_eq!(team.league, "https://league");
    }

    #[test]
    fn test_empty_links_give_no_teams() {
        assert!(clean_team_links(vec![], "https://league", 2015).is_empty());
    }

    #[test]
    fn test_incomplete_rows_are_skipped_in_order() {
        let rows = vec![
            row(0, "Alpha", Some("a.jpg")),
            row(1, "Bravo", None),
            row(2, "Charlie", Some("c.jpg")),
            RawPlayerRow { index: 3, ..Default::default() },
            row(4, "Delta", Some("d.jpg")),
        ];
        let players = clean_player_rows(rows, "/team");

        let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Alpha", "Charlie", "Delta"]);
        assert!(players.iter().all(|p| p.team == "/team"));
    }

    #[test]
    fn test_no_partial_player() {
        let mut r = row(0, "Echo", Some("e.jpg"));
        r.birth_date = None;
        assert_eq!(player_row_to_player(&r, "/team"), None);
    }
}
