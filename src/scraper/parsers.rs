use crate::models::{RawPlayerRow, RawTeamLink};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

// ── Selectors ─────────────────────────────────────────────────────────────────

/// Club links in the league standings/roster table.
const TEAM_LINK_SEL: &str = "#yw1 table.items tbody tr td:nth-child(2) a.vereinprofil_tooltip";

/// Top-level roster rows only; the inline tables nested in each row have rows too.
const ROSTER_ROW_SEL: &str = "#yw1 table.items > tbody > tr";

/// Profile link inside the player cell (the small-screen variant carries the full name).
const PLAYER_LINK_SEL: &str = "td.hauptlink span.show-for-small a.spielprofil_tooltip";

const PORTRAIT_SEL: &str = "table.inline-table img";

/// Lazy-loaded portraits keep the real image URL here; `src` is a placeholder.
const PORTRAIT_ATTR: &str = "data-src";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: &'static str, reason: String },

    #[error("team link `{0}` has no href")]
    MissingHref(String),
}

fn selector(s: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(s).map_err(|e| ParseError::Selector {
        selector: s,
        reason: format!("{:?}", e),
    })
}

/// `href` of an anchor; a blank value counts as absent.
fn href_of(el: ElementRef) -> Option<String> {
    el.value()
        .attr("href")
        .filter(|h| !h.trim().is_empty())
        .map(|h| h.to_string())
}

fn text_of(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Raw response body → document text. Invalid UTF-8 is the one way a page
/// can be unreadable; html5ever itself recovers from any markup.
pub fn decode(body: &[u8]) -> Result<&str, ParseError> {
    Ok(std::str::from_utf8(body)?)
}

// ── League page ───────────────────────────────────────────────────────────────

pub fn parse_league_page(html: &str) -> Result<Vec<RawTeamLink>, ParseError> {
    let doc = Html::parse_document(html);
    let link_sel = selector(TEAM_LINK_SEL)?;

    doc.select(&link_sel)
        .map(|a| {
            let text = text_of(a);
            match href_of(a) {
                Some(href) => Ok(RawTeamLink { text, href }),
                None => Err(ParseError::MissingHref(text)),
            }
        })
        .collect()
}

// ── Team page ─────────────────────────────────────────────────────────────────

/// One raw row per roster `<tr>`, whether or not it looks like a player.
pub fn parse_team_page(html: &str) -> Result<Vec<RawPlayerRow>, ParseError> {
    let doc = Html::parse_document(html);
    let row_sel = selector(ROSTER_ROW_SEL)?;
    let link_sel = selector(PLAYER_LINK_SEL)?;
    let img_sel = selector(PORTRAIT_SEL)?;

    let rows = doc
        .select(&row_sel)
        .enumerate()
        .map(|(index, tr)| {
            let cells: Vec<ElementRef> = tr
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().name() == "td")
                .collect();

            let player_cell = cells.get(1);
            let link = player_cell.and_then(|td| td.select(&link_sel).next());

            RawPlayerRow {
                index,
                name: link.map(text_of),
                url: link.and_then(href_of),
                birth_date: cells.get(2).map(|td| text_of(*td)),
                img_url: player_cell
                    .and_then(|td| td.select(&img_sel).next())
                    .and_then(|img| img.value().attr(PORTRAIT_ATTR))
                    .map(|s| s.to_string()),
            }
        })
        .collect();

    Ok(rows)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod fixtures {
    /// League roster page wrapping the given `<tr>` rows.
    pub fn league_page(rows: &[(&str, &str)]) -> String {
        let body: String = rows
            .iter()
            .map(|(name, href)| {
                format!(
                    r#"<tr><td class="zentriert no-border-rechts"><img src="/wappen.png"></td>
                       <td class="hauptlink"><a class="vereinprofil_tooltip" href="{href}">{name}</a></td>
                       <td class="zentriert"><a href="{href}">28</a></td></tr>"#
                )
            })
            .collect();
        format!(
            r#"<html><body><div id="yw1" class="grid-view"><table class="items">
               <thead><tr><th>#</th><th>Club</th><th>Rosa</th></tr></thead>
               <tbody>{body}</tbody></table></div></body></html>"#
        )
    }

    /// A well-formed player row; `img` is None to drop the portrait.
    pub fn player_row(name: &str, href: &str, born: &str, img: Option<&str>) -> String {
        let portrait = img
            .map(|src| format!(r#"<img class="bilderrahmen-fixed lazy" src="data:image/gif;base64,R0lGOD" data-src="{src}">"#))
            .unwrap_or_default();
        format!(
            r#"<tr class="odd">
                 <td class="zentriert rueckennummer"><div class="rn_nummer">1</div></td>
                 <td class="posrela"><table class="inline-table">
                   <tr><td rowspan="2">{portrait}</td>
                       <td class="hauptlink"><span class="hide-for-small"><a class="spielprofil_tooltip" href="{href}">{short}</a></span>
                       <span class="show-for-small"><a class="spielprofil_tooltip" href="{href}">{name}</a></span></td></tr>
                   <tr><td>Portiere</td></tr>
                 </table></td>
                 <td class="zentriert">{born}</td>
                 <td class="zentriert"><img class="flaggenrahmen" src="/flag.png"></td>
               </tr>"#,
            short = name.split(' ').last().unwrap_or(name),
        )
    }

    pub fn team_page(rows: &[String]) -> String {
        format!(
            r#"<html><body><div id="yw1" class="grid-view"><table class="items">
               <thead><tr><th>#</th><th>Giocatore</th><th>Nato</th><th>Naz.</th></tr></thead>
               <tbody>{}</tbody></table></div></body></html>"#,
            rows.concat()
        )
    }
}
