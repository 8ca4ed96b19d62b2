use std::str::FromStr;

use ::scraper::{CaseSensitivity, ElementRef, Html, Selector};
use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use futures::future::try_join_all;
use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::context::ScraperContext;
use crate::error::{Result, ScrapeError};
use crate::model::{
    Agent, MapData, MapTeamScore, MatchDetail, MatchDetailTeam, MatchEvent, MatchStatus,
    MatchSummary, MatchTeam, MatchVideos, PreviousEncounter, Round, RoundSide, RoundWinner,
    ScoreboardRow, Video, WinType,
};
use crate::scraper::{self, href_segment, parse_day_label, select_attr, select_text};
use crate::utils::{
    clean_number_string, clean_string, expand_url, fix_datetime_tz, get_image_url, simplify_name,
    BASE_URL,
};

const MATCH_TIME_FORMAT: &str = "%I:%M %p";

/// Fetch the site-wide match list across `pages` pages of upcoming and live
/// matches, then backfill event ids from the name lookup table.
#[instrument(skip(ctx))]
pub async fn get_matches(ctx: &ScraperContext, pages: u32) -> Result<Vec<MatchSummary>> {
    let fetched = try_join_all((1..=pages).map(|page| fetch_match_page(ctx, page))).await?;
    let mut matches = fetched.into_iter().flatten().collect_vec();

    let keys = matches
        .iter()
        .map(|m| simplify_name(&m.event))
        .collect_vec();
    let ids = ctx.cache.hmget("event", &keys).await;
    for (summary, id) in matches.iter_mut().zip(ids) {
        summary.event_id = id;
    }

    debug!(count = matches.len(), "parsed match list");
    Ok(matches)
}

async fn fetch_match_page(ctx: &ScraperContext, page: u32) -> Result<Vec<MatchSummary>> {
    let body = scraper::fetch_page(ctx, &format!("{BASE_URL}/matches/?page={page}")).await?;
    let document = Html::parse_document(&body);
    parse_match_list(&document, ctx.settings.source_timezone)
}

pub(crate) fn parse_match_list(document: &Html, tz: Tz) -> Result<Vec<MatchSummary>> {
    let selector = Selector::parse("div#wrapper :is(div.wf-label.mod-large, a.match-item)")?;
    let mut matches = Vec::new();
    let mut last_date = None;
    for element in document.select(&selector) {
        if element
            .value()
            .has_class("wf-label", CaseSensitivity::CaseSensitive)
        {
            last_date = parse_day_label(&element.text().collect::<String>());
        } else {
            match parse_match_item(&element, last_date, tz) {
                Ok(item) => matches.push(item),
                Err(e) => warn!(error = %e, "skipping unparsable match item"),
            }
        }
    }
    Ok(matches)
}

fn parse_match_item(
    element: &ElementRef,
    date: Option<NaiveDate>,
    tz: Tz,
) -> Result<MatchSummary> {
    let href = element.value().attr("href").unwrap_or_default();
    let id = href_segment(href, 1).ok_or(ScrapeError::ElementNotFound {
        context: "match item href",
    })?;

    let status_selector = Selector::parse("div.ml-status")?;
    let status = MatchStatus::from_str(&select_text(element, &status_selector).to_lowercase())
        .unwrap_or_default();

    let time_selector = Selector::parse("div.match-item-time")?;
    let time_text = select_text(element, &time_selector);
    let time = if time_text.to_lowercase().contains("tbd") {
        None
    } else {
        NaiveTime::parse_from_str(&time_text, MATCH_TIME_FORMAT)
            .ok()
            .and_then(|t| date.map(|d| fix_datetime_tz(d.and_time(t), tz)))
    };

    let team_selector = Selector::parse("div.match-item-vs-team")?;
    let (team1, team2) = element
        .select(&team_selector)
        .map(|team| parse_summary_team(&team))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .collect_tuple()
        .ok_or(ScrapeError::ElementNotFound {
            context: "match item teams",
        })?;

    let series_selector = Selector::parse("div.match-item-event-series")?;
    let series = clean_string(&select_text(element, &series_selector));

    let event_selector = Selector::parse("div.match-item-event.text-of")?;
    let event = element
        .select(&event_selector)
        .filter_map(|t| t.text().last())
        .map(clean_string)
        .last()
        .unwrap_or_default();

    Ok(MatchSummary {
        id,
        team1,
        team2,
        status,
        time,
        event,
        event_id: None,
        series,
    })
}

fn parse_summary_team(team: &ElementRef) -> Result<MatchTeam> {
    let name_selector = Selector::parse("div.match-item-vs-team-name")?;
    let name = clean_string(&select_text(team, &name_selector));

    let score_selector = Selector::parse("div.match-item-vs-team-score")?;
    let score_text = clean_string(&select_text(team, &score_selector));
    let score = if !score_text.is_empty() && score_text.chars().all(|c| c.is_ascii_digit()) {
        score_text.parse().ok()
    } else {
        None
    };

    Ok(MatchTeam { name, score })
}

/// Fetch one match's detail page: header, event block, streams and VODs,
/// per-map rounds and scoreboards, and previous head-to-head meetings.
#[instrument(skip(ctx))]
pub async fn get_match(ctx: &ScraperContext, id: &str) -> Result<MatchDetail> {
    let body = scraper::fetch_page(ctx, &format!("{BASE_URL}/{id}")).await?;
    let document = Html::parse_document(&body);
    parse_match_page(&document, id)
}

pub(crate) fn parse_match_page(document: &Html, id: &str) -> Result<MatchDetail> {
    let header_selector = Selector::parse("div.match-header")?;
    let header = document
        .select(&header_selector)
        .next()
        .ok_or(ScrapeError::ElementNotFound {
            context: "match header",
        })?;

    let link_selector = Selector::parse("a.match-header-link")?;
    let name_selector = Selector::parse("div.wf-title-med")?;
    let img_selector = Selector::parse("img")?;
    let teams = header
        .select(&link_selector)
        .map(|link| {
            let name = clean_string(&select_text(&link, &name_selector));
            let img = link
                .select(&img_selector)
                .next()
                .and_then(|e| e.value().attr("src"))
                .map(get_image_url)
                .unwrap_or_default();
            MatchDetailTeam { name, img }
        })
        .collect_vec();

    let score_selector = Selector::parse("div.match-header-vs-score div.js-spoiler")?;
    let score = header
        .select(&score_selector)
        .next()
        .map(|spoiler| {
            spoiler
                .text()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .join("")
        })
        .unwrap_or_default();

    let note_selector = Selector::parse("div.match-header-note")?;
    let note = clean_string(
        &header
            .select(&note_selector)
            .next()
            .map(|e| e.text().collect::<String>())
            .unwrap_or_default(),
    );
    let bans = note
        .split(';')
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect_vec();

    let event = parse_match_event(&header)?;
    let videos = parse_match_videos(document)?;
    let data = parse_maps(document)?;
    let previous_encounters = parse_previous_encounters(document, &teams)?;

    Ok(MatchDetail {
        id: id.to_string(),
        teams,
        score,
        note,
        bans,
        event,
        videos,
        data,
        previous_encounters,
    })
}

fn parse_match_event(header: &ElementRef) -> Result<MatchEvent> {
    let event_selector = Selector::parse("a.match-header-event")?;
    let anchor = header
        .select(&event_selector)
        .next()
        .ok_or(ScrapeError::ElementNotFound {
            context: "match header event",
        })?;

    let id = href_segment(anchor.value().attr("href").unwrap_or_default(), 2).ok_or(
        ScrapeError::ElementNotFound {
            context: "match header event href",
        },
    )?;

    let img_selector = Selector::parse("img")?;
    let img = anchor
        .select(&img_selector)
        .next()
        .and_then(|e| e.value().attr("src"))
        .map(get_image_url)
        .unwrap_or_default();

    let series_selector = Selector::parse("div div")?;
    let series = clean_string(&select_text(&anchor, &series_selector));

    let stage_selector = Selector::parse("div.match-header-event-series")?;
    let stage = clean_string(
        &anchor
            .select(&stage_selector)
            .next()
            .map(|e| e.text().collect::<String>())
            .unwrap_or_default(),
    );

    let date_selector = Selector::parse("div.match-header-date div.moment-tz-convert")?;
    let date = header
        .select(&date_selector)
        .map(|e| clean_string(&e.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .join(" ");

    let patch_selector = Selector::parse("div.match-header-date div[style*=italic]")?;
    let patch = header
        .select(&patch_selector)
        .next()
        .map(|e| clean_string(&e.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    Ok(MatchEvent {
        id,
        img,
        series,
        stage,
        date,
        patch,
    })
}

fn parse_match_videos(document: &Html) -> Result<MatchVideos> {
    let stream_selector = Selector::parse("div.match-streams div.match-streams-btn")?;
    let anchor_selector = Selector::parse("a")?;

    let streams = document
        .select(&stream_selector)
        .filter_map(|button| {
            let name = clean_string(&button.text().collect::<String>());
            let url = button
                .value()
                .attr("href")
                .map(|h| h.to_string())
                .or_else(|| select_attr(&button, &anchor_selector, "href"))?;
            Some(Video {
                name,
                url: expand_url(&url)?,
            })
        })
        .collect_vec();

    let vod_selector = Selector::parse("div.match-vods a.wf-card")?;
    let vods = document
        .select(&vod_selector)
        .filter_map(|anchor| {
            let url = expand_url(anchor.value().attr("href")?)?;
            let name = clean_string(&anchor.text().collect::<String>());
            Some(Video { name, url })
        })
        .collect_vec();

    Ok(MatchVideos { streams, vods })
}

fn parse_maps(document: &Html) -> Result<Vec<MapData>> {
    let game_selector = Selector::parse("div.vm-stats-game")?;
    let mut maps = Vec::new();
    for game in document.select(&game_selector) {
        // The "all" pane aggregates every map; skip it.
        if game.value().attr("data-game-id") == Some("all") {
            continue;
        }
        maps.push(parse_map(&game)?);
    }
    Ok(maps)
}

fn parse_map(game: &ElementRef) -> Result<MapData> {
    let map_selector = Selector::parse("div.map div span")?;
    let map = select_text(game, &map_selector);

    let team_selector = Selector::parse("div.team")?;
    let name_selector = Selector::parse("div.team-name")?;
    let score_selector = Selector::parse("div.score")?;
    let teams = game
        .select(&team_selector)
        .map(|team| {
            let name = clean_string(&select_text(&team, &name_selector));
            let score_text = clean_string(&select_text(&team, &score_selector));
            let score = if !score_text.is_empty() && score_text.chars().all(|c| c.is_ascii_digit())
            {
                score_text.parse().ok()
            } else {
                None
            };
            MapTeamScore { name, score }
        })
        .collect_vec();

    let rounds = parse_rounds(game)?;
    let members = parse_scoreboard(game)?;

    Ok(MapData {
        map,
        teams,
        members,
        rounds,
    })
}

/// Round columns only show cumulative scores, so the winner is inferred by
/// comparing each column against the previous one: the side whose count
/// stayed flat lost the round.
fn parse_rounds(game: &ElementRef) -> Result<Vec<Round>> {
    let col_selector = Selector::parse("div.vlr-rounds div.vlr-rounds-row-col")?;
    let num_selector = Selector::parse("div.rnd-num")?;
    let score_selector = Selector::parse("div.rnd-currscore")?;
    let win_selector = Selector::parse("div.rnd-sq.mod-win")?;
    let img_selector = Selector::parse("img")?;

    let mut rounds = Vec::new();
    let mut previous = (0u32, 0u32);
    for col in game.select(&col_selector) {
        // The leading column holds the team logos, not a round.
        if col.select(&score_selector).next().is_none() {
            continue;
        }
        let round_score = select_text(&col, &score_selector);
        let round_number = clean_number_string(&select_text(&col, &num_selector)) as u32;

        let parsed: Option<(u32, u32)> = round_score
            .split('-')
            .map(|part| part.trim().parse().ok())
            .collect::<Option<Vec<u32>>>()
            .and_then(|v| v.into_iter().collect_tuple());

        let winner = match parsed {
            Some((team1, team2)) => {
                let winner = if previous.0 == team1 {
                    RoundWinner::Team2
                } else if previous.1 == team2 {
                    RoundWinner::Team1
                } else {
                    RoundWinner::Unknown
                };
                previous = (team1, team2);
                winner
            }
            None => RoundWinner::Unknown,
        };

        let win_square = col.select(&win_selector).next();
        let side = win_square.and_then(|sq| {
            if sq
                .value()
                .has_class("mod-t", CaseSensitivity::CaseSensitive)
            {
                Some(RoundSide::Attack)
            } else if sq
                .value()
                .has_class("mod-ct", CaseSensitivity::CaseSensitive)
            {
                Some(RoundSide::Defense)
            } else {
                None
            }
        });

        let win_type = win_square
            .and_then(|sq| sq.select(&img_selector).next())
            .and_then(|icon| icon.value().attr("src"))
            .map(win_type_from_icon)
            .unwrap_or(WinType::NotPlayed);

        rounds.push(Round {
            round_number,
            round_score,
            winner,
            side,
            win_type,
        });
    }
    Ok(rounds)
}

fn win_type_from_icon(src: &str) -> WinType {
    if src.contains("elim") {
        WinType::Elimination
    } else if src.contains("time") {
        WinType::TimeOut
    } else if src.contains("defuse") {
        WinType::Defused
    } else if src.contains("boom") {
        WinType::SpikedOut
    } else {
        WinType::NotPlayed
    }
}

fn parse_scoreboard(game: &ElementRef) -> Result<Vec<ScoreboardRow>> {
    let row_selector = Selector::parse("table.wf-table-inset.mod-overview tbody tr")?;
    let name_selector = Selector::parse("td.mod-player div.text-of")?;
    let team_selector = Selector::parse("td.mod-player div.ge-text-light")?;
    let agent_selector = Selector::parse("td.mod-agents img")?;
    let stat_selector = Selector::parse("td.mod-stat")?;
    let both_selector = Selector::parse("span.side.mod-both")?;
    let kills_selector = Selector::parse("td.mod-vlr-kills span.side.mod-both")?;
    let deaths_selector = Selector::parse("td.mod-vlr-deaths span.side.mod-both")?;
    let assists_selector = Selector::parse("td.mod-vlr-assists span.side.mod-both")?;

    let mut rows = Vec::new();
    for row in game.select(&row_selector) {
        let name = clean_string(&select_text(&row, &name_selector));
        if name.is_empty() {
            continue;
        }
        let team = clean_string(&select_text(&row, &team_selector));

        let agents = row
            .select(&agent_selector)
            .filter_map(|img| {
                let title = img.value().attr("title")?.to_string();
                let src = img.value().attr("src")?;
                Some(Agent {
                    title,
                    img: get_image_url(src),
                })
            })
            .collect_vec();

        // Stat cells carry attack/defense/both splits; only the combined
        // value is kept. ACS, ADR and HS% sit at fixed column offsets.
        let stats = row
            .select(&stat_selector)
            .map(|cell| clean_number_string(&select_text(&cell, &both_selector)) as i64)
            .collect_vec();
        let stat_at = |i: usize| stats.get(i).copied().unwrap_or(0);

        let kill_stat =
            |selector: &Selector| clean_number_string(&select_text(&row, selector)) as i64;

        rows.push(ScoreboardRow {
            name,
            team,
            agents,
            acs: stat_at(0),
            kills: kill_stat(&kills_selector),
            deaths: kill_stat(&deaths_selector),
            assists: kill_stat(&assists_selector),
            adr: stat_at(5),
            headshot_percent: stat_at(6),
        });
    }
    Ok(rows)
}

fn parse_previous_encounters(
    document: &Html,
    teams: &[MatchDetailTeam],
) -> Result<Vec<PreviousEncounter>> {
    let item_selector = Selector::parse("div.match-h2h-matches a.wf-module-item.mod-h2h")?;
    let score1_selector = Selector::parse("span.rf")?;
    let score2_selector = Selector::parse("span.ra")?;

    let encounters = document
        .select(&item_selector)
        .filter_map(|anchor| {
            let match_id = href_segment(anchor.value().attr("href").unwrap_or_default(), 1)?;
            let scores = vec![
                select_text(&anchor, &score1_selector),
                select_text(&anchor, &score2_selector),
            ];
            let encounter_teams = teams
                .iter()
                .enumerate()
                .map(|(i, team)| MatchTeam {
                    name: team.name.clone(),
                    score: scores.get(i).and_then(|s| s.parse().ok()),
                })
                .collect_vec();
            Some(PreviousEncounter {
                match_id,
                teams: encounter_teams,
            })
        })
        .collect_vec();
    Ok(encounters)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATCH_LIST_PAGE: &str = r#"
    <html><body><div id="wrapper">
      <div class="wf-label mod-large">Sat, January 25, 2025 Today</div>
      <div class="wf-card">
        <a class="match-item" href="/510272/sen-vs-fnc-champions-2025">
          <div class="match-item-time">1:00 PM</div>
          <div class="ml-status">LIVE</div>
          <div class="match-item-vs">
            <div class="match-item-vs-team">
              <div class="match-item-vs-team-name">Sentinels</div>
              <div class="match-item-vs-team-score">1</div>
            </div>
            <div class="match-item-vs-team">
              <div class="match-item-vs-team-name">FNATIC</div>
              <div class="match-item-vs-team-score">0</div>
            </div>
          </div>
          <div class="match-item-event text-of">
            <div class="match-item-event-series text-of">Group Stage: Round 1</div>
            Champions 2025
          </div>
        </a>
      </div>
    </div></body></html>
    "#;

    #[test]
    fn parses_live_match_with_scores() {
        let document = Html::parse_document(MATCH_LIST_PAGE);
        let matches = parse_match_list(&document, chrono_tz::America::New_York).unwrap();
        assert_eq!(matches.len(), 1);

        let item = &matches[0];
        assert_eq!(item.id, "510272");
        assert_eq!(item.status, MatchStatus::Live);
        assert_eq!(item.team1.name, "Sentinels");
        assert_eq!(item.team1.score, Some(1));
        assert_eq!(item.team2.score, Some(0));
        assert_eq!(item.event, "Champions 2025");
        assert_eq!(item.event_id, None);
        assert_eq!(item.series, "Group Stage: Round 1");
        assert_eq!(
            item.time.unwrap().to_rfc3339(),
            "2025-01-25T18:00:00+00:00"
        );
    }

    const ROUNDS_FRAGMENT: &str = r#"
    <div class="vm-stats-game" data-game-id="1">
      <div class="vlr-rounds">
        <div class="vlr-rounds-row-col">
          <div class="team">SEN</div>
        </div>
        <div class="vlr-rounds-row-col" title="1-0">
          <div class="rnd-num">1</div>
          <div class="rnd-currscore">1-0</div>
          <div class="rnd-sq mod-win mod-t"><img src="/img/vlr/game/round/elim.webp"></div>
        </div>
        <div class="vlr-rounds-row-col" title="1-1">
          <div class="rnd-num">2</div>
          <div class="rnd-currscore">1-1</div>
          <div class="rnd-sq mod-win mod-ct"><img src="/img/vlr/game/round/defuse.webp"></div>
        </div>
        <div class="vlr-rounds-row-col" title="2-1">
          <div class="rnd-num">3</div>
          <div class="rnd-currscore">2-1</div>
          <div class="rnd-sq mod-win mod-t"><img src="/img/vlr/game/round/boom.webp"></div>
        </div>
        <div class="vlr-rounds-row-col">
          <div class="rnd-num">4</div>
          <div class="rnd-currscore"></div>
        </div>
      </div>
    </div>
    "#;

    #[test]
    fn round_winners_follow_cumulative_scores() {
        let document = Html::parse_document(ROUNDS_FRAGMENT);
        let game_selector = Selector::parse("div.vm-stats-game").unwrap();
        let game = document.select(&game_selector).next().unwrap();

        let rounds = parse_rounds(&game).unwrap();
        assert_eq!(rounds.len(), 4);

        assert_eq!(rounds[0].winner, RoundWinner::Team1);
        assert_eq!(rounds[0].side, Some(RoundSide::Attack));
        assert_eq!(rounds[0].win_type, WinType::Elimination);

        assert_eq!(rounds[1].winner, RoundWinner::Team2);
        assert_eq!(rounds[1].side, Some(RoundSide::Defense));
        assert_eq!(rounds[1].win_type, WinType::Defused);

        assert_eq!(rounds[2].winner, RoundWinner::Team1);
        assert_eq!(rounds[2].win_type, WinType::SpikedOut);

        // Unplayed trailing round: empty title, no win square.
        assert_eq!(rounds[3].winner, RoundWinner::Unknown);
        assert_eq!(rounds[3].side, None);
        assert_eq!(rounds[3].win_type, WinType::NotPlayed);
    }

    const SCOREBOARD_FRAGMENT: &str = r#"
    <div class="vm-stats-game" data-game-id="1">
      <table class="wf-table-inset mod-overview">
        <tbody>
          <tr>
            <td class="mod-player">
              <div class="text-of">TenZ</div>
              <div class="ge-text-light">SEN</div>
            </td>
            <td class="mod-agents"><img title="jett" src="/img/vlr/game/agents/jett.png"></td>
            <td class="mod-stat"><span class="stats-sq"><span class="side mod-side mod-both">291</span></span></td>
            <td class="mod-stat mod-vlr-kills"><span class="stats-sq"><span class="side mod-both">24</span></span></td>
            <td class="mod-stat mod-vlr-deaths"><span class="stats-sq">/<span class="side mod-both">13</span>/</span></td>
            <td class="mod-stat mod-vlr-assists"><span class="stats-sq"><span class="side mod-both">4</span></span></td>
            <td class="mod-stat"><span class="stats-sq"><span class="side mod-both">+11</span></span></td>
            <td class="mod-stat"><span class="stats-sq"><span class="side mod-both">182</span></span></td>
            <td class="mod-stat"><span class="stats-sq"><span class="side mod-both">32%</span></span></td>
          </tr>
        </tbody>
      </table>
    </div>
    "#;

    #[test]
    fn scoreboard_row_maps_stat_columns() {
        let document = Html::parse_document(SCOREBOARD_FRAGMENT);
        let game_selector = Selector::parse("div.vm-stats-game").unwrap();
        let game = document.select(&game_selector).next().unwrap();

        let rows = parse_scoreboard(&game).unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.name, "TenZ");
        assert_eq!(row.team, "SEN");
        assert_eq!(row.agents.len(), 1);
        assert_eq!(row.agents[0].title, "jett");
        assert_eq!(row.acs, 291);
        assert_eq!(row.kills, 24);
        assert_eq!(row.deaths, 13);
        assert_eq!(row.assists, 4);
        assert_eq!(row.adr, 182);
        assert_eq!(row.headshot_percent, 32);
    }
}
