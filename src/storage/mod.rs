use crate::models::{League, Player, Team};
use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use duckdb::{Connection, params};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

// ── Schema ────────────────────────────────────────────────────────────────────

const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS leagues (
    url         VARCHAR PRIMARY KEY,
    name        VARCHAR NOT NULL,
    saison      VARCHAR NOT NULL
);

CREATE TABLE IF NOT EXISTS teams (
    url         VARCHAR PRIMARY KEY,
    name        VARCHAR NOT NULL,
    -- leagues.url, not enforced
    league      VARCHAR NOT NULL
);

CREATE TABLE IF NOT EXISTS players (
    url         VARCHAR PRIMARY KEY,
    name        VARCHAR NOT NULL,
    birth_date  VARCHAR NOT NULL,
    img_url     VARCHAR NOT NULL,
    -- teams.url, not enforced
    team        VARCHAR NOT NULL
);

CREATE SEQUENCE IF NOT EXISTS scrape_runs_seq START 1;

CREATE TABLE IF NOT EXISTS scrape_runs (
    id          INTEGER PRIMARY KEY DEFAULT nextval('scrape_runs_seq'),
    started_at  TIMESTAMP NOT NULL,
    finished_at TIMESTAMP,
    status      VARCHAR NOT NULL DEFAULT 'running',
    leagues     INTEGER DEFAULT 0,
    teams       INTEGER DEFAULT 0,
    players     INTEGER DEFAULT 0,
    error_msg   VARCHAR
);

CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TIMESTAMP NOT NULL
);
"#;

// ── Tables ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Leagues,
    Teams,
    Players,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Leagues => "leagues",
            Table::Teams => "teams",
            Table::Players => "players",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {index} for table {table} has an empty url")]
    SchemaViolation { table: Table, index: usize },
}

/// Rejects the whole batch if any record lacks its key, then collapses
/// repeated keys so the last occurrence wins.
fn prepare_batch<'a, T>(table: Table, records: &'a [T], key: impl Fn(&T) -> &str) -> Result<Vec<&'a T>, StoreError> {
    if let Some(index) = records.iter().position(|r| key(r).trim().is_empty()) {
        return Err(StoreError::SchemaViolation { table, index });
    }

    let mut last: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    for (i, r) in records.iter().enumerate() {
        last.insert(key(r), i);
    }
    Ok(records
        .iter()
        .enumerate()
        .filter(|&(i, r)| last.get(key(r)) == Some(&i))
        .map(|(_, r)| r)
        .collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeRun {
    pub id: i64,
    pub started_at: NaiveDateTime,
    pub finished_at: Option<NaiveDateTime>,
    pub status: String,
    pub leagues: i64,
    pub teams: i64,
    pub players: i64,
    pub error_msg: Option<String>,
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create dir {:?}", parent))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open DuckDB at {:?}", path))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self { conn: Connection::open_in_memory()? })
    }

    pub fn run_migrations(&self) -> Result<()> {
        info!("Running migrations…");
        self.conn.execute_batch(DDL).context("DDL failed")?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, ?)",
            params![Utc::now().naive_utc()],
        )?;
        info!("Migrations done.");
        Ok(())
    }

    // ── Leagues ───────────────────────────────────────────────────────────────

    pub fn upsert_leagues(&self, leagues: &[League]) -> Result<usize> {
        let batch = prepare_batch(Table::Leagues, leagues, |l| l.url.as_str())?;
        if batch.is_empty() { return Ok(0); }

        let tx = self.conn.unchecked_transaction()?;
        for l in &batch {
            tx.execute(
                r#"INSERT INTO leagues (url, name, saison)
                   VALUES (?, ?, ?)
                   ON CONFLICT (url) DO UPDATE SET
                       name   = excluded.name,
                       saison = excluded.saison"#,
                params![l.url, l.name, l.saison],
            ).with_context(|| format!("upsert league {}", l.url))?;
        }
        tx.commit()?;
        Ok(batch.len())
    }

    pub fn get_league(&self, url: &str) -> Result<Option<League>> {
        let mut stmt = self.conn.prepare("SELECT url, name, saison FROM leagues WHERE url = ?")?;
        let league = stmt
            .query_map(params![url], |r| {
                Ok(League { url: r.get(0)?, name: r.get(1)?, saison: r.get(2)? })
            })?
            .next()
            .transpose()?;
        Ok(league)
    }

    // ── Teams ─────────────────────────────────────────────────────────────────

    pub fn upsert_teams(&self, teams: &[Team]) -> Result<usize> {
        let batch = prepare_batch(Table::Teams, teams, |t| t.url.as_str())?;
        if batch.is_empty() { return Ok(0); }

        let tx = self.conn.unchecked_transaction()?;
        for t in &batch {
            tx.execute(
                r#"INSERT INTO teams (url, name, league)
                   VALUES (?, ?, ?)
                   ON CONFLICT (url) DO UPDATE SET
                       name   = excluded.name,
                       league = excluded.league"#,
                params![t.url, t.name, t.league],
            ).with_context(|| format!("upsert team {}", t.url))?;
        }
        tx.commit()?;
        Ok(batch.len())
    }

    pub fn get_team(&self, url: &str) -> Result<Option<Team>> {
        let mut stmt = self.conn.prepare("SELECT url, name, league FROM teams WHERE url = ?")?;
        let team = stmt
            .query_map(params![url], |r| {
                Ok(Team { url: r.get(0)?, name: r.get(1)?, league: r.get(2)? })
            })?
            .next()
            .transpose()?;
        Ok(team)
    }

    // ── Players ───────────────────────────────────────────────────────────────

    /// Upsert players — a re-scraped profile replaces the whole row.
    pub fn upsert_players(&self, players: &[Player]) -> Result<usize> {
        let batch = prepare_batch(Table::Players, players, |p| p.url.as_str())?;
        if batch.is_empty() { return Ok(0); }

        let tx = self.conn.unchecked_transaction()?;
        let sql = r#"
            INSERT INTO players (url, name, birth_date, img_url, team)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (url) DO UPDATE SET
                name       = excluded.name,
                birth_date = excluded.birth_date,
                img_url    = excluded.img_url,
                team       = excluded.team
        "#;

        for p in &batch {
            tx.execute(sql, params![p.url, p.name, p.birth_date, p.img_url, p.team])
                .with_context(|| format!("upsert player {}", p.url))?;
        }

        tx.commit()?;
        Ok(batch.len())
    }

    pub fn get_player(&self, url: &str) -> Result<Option<Player>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, name, birth_date, img_url, team FROM players WHERE url = ?"
        )?;
        let player = stmt
            .query_map(params![url], |r| {
                Ok(Player {
                    url: r.get(0)?,
                    name: r.get(1)?,
                    birth_date: r.get(2)?,
                    img_url: r.get(3)?,
                    team: r.get(4)?,
                })
            })?
            .next()
            .transpose()?;
        Ok(player)
    }

    pub fn count(&self, table: Table) -> Result<i64> {
        let mut s = self.conn.prepare(&format!("SELECT COUNT(*) FROM {}", table))?;
        Ok(s.query_row([], |r| r.get(0))?)
    }

    // ── Scrape run log ────────────────────────────────────────────────────────

    pub fn begin_scrape_run(&self) -> Result<i64> {
        let id: i64 = self.conn.query_row(
            "INSERT INTO scrape_runs (started_at, status) VALUES (?, 'running') RETURNING id",
            params![Utc::now().naive_utc()],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    pub fn finish_scrape_run(
        &self, run_id: i64, totals: RunTotals, error: Option<&str>,
    ) -> Result<()> {
        self.conn.execute(
            r#"UPDATE scrape_runs SET
               finished_at = ?, status = ?,
               leagues = ?, teams = ?, players = ?, error_msg = ?
               WHERE id = ?"#,
            params![
                Utc::now().naive_utc(),
                if error.is_none() { "success" } else { "error" },
                totals.leagues as i64, totals.teams as i64, totals.players as i64,
                error, run_id,
            ],
        )?;
        Ok(())
    }

    pub fn last_scrape_run(&self) -> Result<Option<ScrapeRun>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT id, started_at, finished_at, status, leagues, teams, players, error_msg
               FROM scrape_runs ORDER BY id DESC LIMIT 1"#,
        )?;
        let run = stmt
            .query_map([], |r| {
                Ok(ScrapeRun {
                    id: r.get(0)?,
                    started_at: r.get(1)?,
                    finished_at: r.get(2)?,
                    status: r.get(3)?,
                    leagues: r.get(4)?,
                    teams: r.get(5)?,
                    players: r.get(6)?,
                    error_msg: r.get(7)?,
                })
            })?
            .next()
            .transpose()?;
        Ok(run)
    }
}

/// Rows saved during one crawl, per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub leagues: usize,
    pub teams: usize,
    pub players: usize,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
