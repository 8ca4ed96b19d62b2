use ::scraper::{ElementRef, Html, Selector};
use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::context::ScraperContext;
use crate::error::{Result, ScrapeError};
use crate::model::{AgentStats, Player, PlayerTeam};
use crate::scraper::{self, href_segment, select_text};
use crate::utils::{clean_number_string, clean_string, get_image_url, BASE_URL};

/// Fetch a player profile: header, social links, per-agent statistics,
/// current and past teams, and total winnings.
#[instrument(skip(ctx))]
pub async fn get_player(ctx: &ScraperContext, id: &str) -> Result<Player> {
    let body = scraper::fetch_page(ctx, &format!("{BASE_URL}/player/{id}")).await?;
    let document = Html::parse_document(&body);
    parse_player_page(&document, id)
}

pub(crate) fn parse_player_page(document: &Html, id: &str) -> Result<Player> {
    let header_selector = Selector::parse("div.player-header")?;
    let header = document
        .select(&header_selector)
        .next()
        .ok_or(ScrapeError::ElementNotFound {
            context: "player header",
        })?;

    let alias_selector = Selector::parse("h1")?;
    let alias = clean_string(&select_text(&header, &alias_selector));

    let name_selector = Selector::parse("h2")?;
    let name = clean_string(&select_text(&header, &name_selector));

    let img_selector = Selector::parse("img")?;
    let img = header
        .select(&img_selector)
        .next()
        .and_then(|e| e.value().attr("src"))
        .map(get_image_url)
        .unwrap_or_default();

    let country_selector = Selector::parse("div.ge-text-light")?;
    let country = clean_string(&select_text(&header, &country_selector));

    let link_selector = Selector::parse("a")?;
    let mut twitter = None;
    let mut twitch = None;
    for link in header.select(&link_selector) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if href.contains("twitter.com") || href.contains("x.com") {
            twitter = Some(clean_string(&link.text().collect::<String>()));
        } else if href.contains("twitch.tv") {
            twitch = Some(href.to_string());
        }
    }

    let agents = parse_agent_table(document)?;
    let (current_team, past_teams) = parse_team_sections(document)?;
    let total_winnings = parse_total_winnings(document)?;

    debug!(id, agents = agents.len(), "parsed player profile");

    Ok(Player {
        id: id.to_string(),
        alias,
        name,
        img,
        country,
        twitter,
        twitch,
        current_team,
        past_teams,
        total_winnings,
        agents,
    })
}

fn parse_agent_table(document: &Html) -> Result<Vec<AgentStats>> {
    let body_selector = Selector::parse("tbody")?;
    let Some(body) = document.select(&body_selector).next() else {
        return Ok(Vec::new());
    };

    let row_selector = Selector::parse("tr")?;
    let agents = body
        .select(&row_selector)
        .filter_map(|row| match parse_agent_row(&row) {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(error = %e, "skipping unparsable agent row");
                None
            }
        })
        .collect_vec();
    Ok(agents)
}

/// One row of the agent overview table, 17 columns wide: the agent cell, a
/// combined "(count) percent%" usage cell, then fifteen numeric columns.
fn parse_agent_row(row: &ElementRef) -> Result<AgentStats> {
    let cell_selector = Selector::parse("td")?;
    let img_selector = Selector::parse("img")?;

    let cells = row.select(&cell_selector).collect_vec();
    if cells.len() < 17 {
        return Err(ScrapeError::ElementNotFound {
            context: "agent stats columns",
        });
    }

    let icon = cells[0]
        .select(&img_selector)
        .next()
        .ok_or(ScrapeError::ElementNotFound {
            context: "agent icon",
        })?;
    let name = icon.value().attr("alt").unwrap_or_default().to_string();
    let img = icon
        .value()
        .attr("src")
        .map(get_image_url)
        .unwrap_or_default();

    let usage = clean_string(&cells[1].text().collect::<String>());
    let (count, percent) = usage
        .split_whitespace()
        .collect_tuple()
        .unwrap_or(("", ""));
    let count = clean_number_string(&count.replace(['(', ')'], "")) as i64;
    let percent = clean_number_string(percent);

    let number = |i: usize| clean_number_string(&cells[i].text().collect::<String>());

    Ok(AgentStats {
        name,
        img,
        count,
        percent,
        rounds: number(2) as i64,
        rating: number(3),
        acs: number(4),
        kd: number(5),
        adr: number(6),
        kast: number(7),
        kpr: number(8),
        apr: number(9),
        fkpr: number(10),
        fdpr: number(11),
        kills: number(12) as i64,
        deaths: number(13) as i64,
        assists: number(14) as i64,
        first_kills: number(15) as i64,
        first_deaths: number(16) as i64,
    })
}

fn parse_team_sections(document: &Html) -> Result<(Option<PlayerTeam>, Vec<PlayerTeam>)> {
    let container_selector = Selector::parse("div.player-summary-container-1")?;
    let Some(container) = document.select(&container_selector).next() else {
        return Ok((None, Vec::new()));
    };

    let heading_selector = Selector::parse("h2")?;
    let anchor_selector = Selector::parse("a")?;

    let mut current_team = None;
    let mut past_teams = Vec::new();
    for heading in container.select(&heading_selector) {
        let title = clean_string(&heading.text().collect::<String>()).to_lowercase();
        let Some(section) = next_element(&heading) else {
            continue;
        };
        match title.as_str() {
            "current teams" => {
                current_team = section
                    .select(&anchor_selector)
                    .next()
                    .and_then(|a| parse_team_link(&a));
            }
            "past teams" => {
                past_teams = section
                    .select(&anchor_selector)
                    .filter_map(|a| parse_team_link(&a))
                    .collect_vec();
            }
            _ => {}
        }
    }
    Ok((current_team, past_teams))
}

fn parse_team_link(anchor: &ElementRef) -> Option<PlayerTeam> {
    let id = href_segment(anchor.value().attr("href").unwrap_or_default(), 2)?;

    let name_selector = Selector::parse("div div").ok()?;
    let name = clean_string(&select_text(anchor, &name_selector));

    let img_selector = Selector::parse("img").ok()?;
    let img = anchor
        .select(&img_selector)
        .next()
        .and_then(|e| e.value().attr("src"))
        .map(get_image_url)
        .unwrap_or_default();

    Some(PlayerTeam { id, name, img })
}

/// Total winnings sit under the "Event Placements" heading as a dollar
/// amount with thousands separators.
fn parse_total_winnings(document: &Html) -> Result<Option<f64>> {
    let container_selector = Selector::parse("div.player-summary-container-2")?;
    let Some(container) = document.select(&container_selector).next() else {
        return Ok(None);
    };

    let heading_selector = Selector::parse("h2")?;
    let span_selector = Selector::parse("span")?;
    for heading in container.select(&heading_selector) {
        let title = clean_string(&heading.text().collect::<String>()).to_lowercase();
        if title != "event placements" {
            continue;
        }
        let Some(section) = next_element(&heading) else {
            continue;
        };
        let amount = select_text(&section, &span_selector)
            .trim_start_matches('$')
            .replace(',', "");
        if amount.is_empty() {
            return Ok(None);
        }
        return Ok(Some(clean_number_string(&amount)));
    }
    Ok(None)
}

fn next_element<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER_PAGE: &str = r#"
    <html><body>
      <div class="player-header">
        <img src="/img/base/ph/sil.png">
        <h1 class="wf-title">TenZ</h1>
        <h2 class="player-real-name">Tyson Ngo</h2>
        <div class="ge-text-light">Canada</div>
        <a href="https://twitter.com/TenZOfficial">@TenZOfficial</a>
        <a href="https://www.twitch.tv/TenZ">twitch.tv/TenZ</a>
      </div>
      <div class="player-summary-container-1">
        <h2 class="wf-label">Current Teams</h2>
        <div class="wf-card">
          <a href="/team/2/sentinels">
            <img src="//owcdn.net/img/sen.png">
            <div style="flex:1">
              <div>Sentinels</div>
              <div class="ge-text-light">joined Apr 2021</div>
            </div>
          </a>
        </div>
        <h2 class="wf-label">Past Teams</h2>
        <div class="wf-card">
          <a href="/team/120/cloud9">
            <img src="//owcdn.net/img/c9.png">
            <div style="flex:1">
              <div>Cloud9</div>
            </div>
          </a>
        </div>
      </div>
      <div class="player-summary-container-2">
        <h2 class="wf-label">Event Placements</h2>
        <div class="wf-card">
          <div><span>$152,344</span></div>
        </div>
      </div>
      <table class="wf-table">
        <tbody>
          <tr>
            <td><img alt="jett" src="/img/vlr/game/agents/jett.png"></td>
            <td>(20) 35%</td>
            <td>412</td>
            <td>1.18</td>
            <td>251.3</td>
            <td>1.25</td>
            <td>158.7</td>
            <td>72%</td>
            <td>0.91</td>
            <td>0.22</td>
            <td>0.21</td>
            <td>0.12</td>
            <td>375</td>
            <td>300</td>
            <td>91</td>
            <td>87</td>
            <td>49</td>
          </tr>
        </tbody>
      </table>
    </body></html>
    "#;

    #[test]
    fn parses_full_player_profile() {
        let document = Html::parse_document(PLAYER_PAGE);
        let player = parse_player_page(&document, "729").unwrap();

        assert_eq!(player.id, "729");
        assert_eq!(player.alias, "TenZ");
        assert_eq!(player.name, "Tyson Ngo");
        assert_eq!(player.country, "Canada");
        assert_eq!(player.twitter.as_deref(), Some("@TenZOfficial"));
        assert_eq!(player.twitch.as_deref(), Some("https://www.twitch.tv/TenZ"));
        assert_eq!(player.total_winnings, Some(152344.0));

        let current = player.current_team.as_ref().unwrap();
        assert_eq!(current.id, "2");
        assert_eq!(current.name, "Sentinels");
        assert_eq!(player.past_teams.len(), 1);
        assert_eq!(player.past_teams[0].id, "120");
        assert_eq!(player.past_teams[0].name, "Cloud9");
    }

    #[test]
    fn parses_agent_stat_columns() {
        let document = Html::parse_document(PLAYER_PAGE);
        let player = parse_player_page(&document, "729").unwrap();
        assert_eq!(player.agents.len(), 1);

        let jett = &player.agents[0];
        assert_eq!(jett.name, "jett");
        assert_eq!(jett.count, 20);
        assert_eq!(jett.percent, 35.0);
        assert_eq!(jett.rounds, 412);
        assert_eq!(jett.rating, 1.18);
        assert_eq!(jett.acs, 251.3);
        assert_eq!(jett.kast, 72.0);
        assert_eq!(jett.kills, 375);
        assert_eq!(jett.first_deaths, 49);
    }

    #[test]
    fn profile_without_teams_or_winnings() {
        let page = PLAYER_PAGE
            .replace("Current Teams", "Something Else")
            .replace("Past Teams", "Other")
            .replace("Event Placements", "Recent Results");
        let document = Html::parse_document(&page);
        let player = parse_player_page(&document, "729").unwrap();
        assert_eq!(player.current_team, None);
        assert!(player.past_teams.is_empty());
        assert_eq!(player.total_winnings, None);
    }
}
