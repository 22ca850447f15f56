use serde::{Deserialize, Serialize};

// ── Seed configuration ────────────────────────────────────────────────────────

/// Static league entry from configuration, expanded once per season.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeagueTemplate {
    pub name: String,
    pub code: String, // "IT1", "GB1", "ES1"
    pub slug: String, // "serie-a"
}

impl LeagueTemplate {
    pub fn new(name: &str, code: &str, slug: &str) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
            slug: slug.to_string(),
        }
    }
}

// ── League ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct League {
    pub name: String,   // "La Liga 2016/2017"
    pub url: String,    // canonical seed URL, unique key
    pub saison: String, // starting year, "2016"
}

// ── Team ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub name: String,   // "FC Barcelona 2017/2018"
    pub url: String,    // site-relative href, unique key
    pub league: String, // owning League.url
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub name: String,
    pub url: String,
    /// Cell text as rendered by the roster page, e.g. "24/06/1987 (30)".
    /// Only the surrounding whitespace of the markup is trimmed; the date is never parsed.
    pub birth_date: String,
    pub img_url: String,
    pub team: String, // owning Team.url
}

// ── Raw parser output ─────────────────────────────────────────────────────────

/// Team anchor from a league roster table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTeamLink {
    pub text: String,
    pub href: String,
}

/// One `<tr>` of a team roster table. Every field is optional because
/// rosters carry coach rows, separators and other irregular rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPlayerRow {
    pub index: usize, // position among the roster rows
    pub name: Option<String>,
    pub url: Option<String>,
    pub birth_date: Option<String>,
    pub img_url: Option<String>,
}

impl RawPlayerRow {
    /// Names of the required sub-elements this row lacks.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_none() || self.url.is_none() {
            missing.push("profile link");
        }
        if self.birth_date.is_none() {
            missing.push("birth date");
        }
        if self.img_url.is_none() {
            missing.push("portrait");
        }
        missing
    }
}
