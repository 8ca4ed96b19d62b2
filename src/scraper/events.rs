use std::collections::HashSet;
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
    Event, EventDetail, EventMatch, EventMatchTeam, EventStanding, EventStatus, EventTeam,
    MatchStatus, Prize, PrizeTeam,
};
use crate::scraper::{self, href_segment, parse_day_label, select_mod_class, select_text};
use crate::utils::{clean_number_string, clean_string, fix_datetime_tz, get_image_url, simplify_name, BASE_URL};

const MATCH_TIME_FORMAT: &str = "%I:%M %p";

/// Fetch the events overview page and parse both the upcoming and the
/// completed columns.
#[instrument(skip(ctx))]
pub async fn get_events(ctx: &ScraperContext) -> Result<Vec<Event>> {
    let body = scraper::fetch_page(ctx, &format!("{BASE_URL}/events/")).await?;
    let events = {
        let document = Html::parse_document(&body);
        parse_events_document(&document)?
    };

    if ctx.settings.enable_id_map {
        for event in &events {
            ctx.cache
                .hset("event", &simplify_name(&event.title), &event.id)
                .await;
        }
    }

    debug!(count = events.len(), "parsed events page");
    Ok(events)
}

pub(crate) fn parse_events_document(document: &Html) -> Result<Vec<Event>> {
    let card_selector = Selector::parse("div.events-container-col a.wf-card")?;
    let events = document
        .select(&card_selector)
        .filter_map(|card| match parse_event_card(&card) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(error = %e, "skipping unparsable event card");
                None
            }
        })
        .collect();
    Ok(events)
}

fn parse_event_card(card: &ElementRef) -> Result<Event> {
    let href = card.value().attr("href").unwrap_or_default();
    let id = href_segment(href, 2).ok_or(ScrapeError::ElementNotFound {
        context: "event card href",
    })?;

    let title_selector = Selector::parse("div.event-item-title")?;
    let title = clean_string(&select_text(card, &title_selector));

    let status_selector = Selector::parse("span.event-item-desc-item-status")?;
    let status = EventStatus::from_str(&select_text(card, &status_selector)).unwrap_or_default();

    let prize_selector = Selector::parse("div.mod-prize")?;
    let prize = select_text(card, &prize_selector);

    let dates_selector = Selector::parse("div.mod-dates")?;
    let dates = select_text(card, &dates_selector);

    let location_selector = Selector::parse("div.mod-location i.flag")?;
    let location = select_mod_class(card, &location_selector);

    let thumb_selector = Selector::parse("div.event-item-thumb img")?;
    let img = card
        .select(&thumb_selector)
        .next()
        .and_then(|icon| icon.value().attr("src"))
        .map(get_image_url)
        .unwrap_or_default();

    Ok(Event {
        id,
        title,
        status,
        prize,
        dates,
        location,
        img,
    })
}

/// Fetch one event's detail page plus its match list, fanning out to stage
/// pages for the participating teams where the event is split into stages.
#[instrument(skip(ctx))]
pub async fn get_event(ctx: &ScraperContext, id: &str) -> Result<EventDetail> {
    let matches = get_event_matches(ctx, id).await?;
    let stage_names: HashSet<String> = matches
        .iter()
        .map(|m| m.stage.clone())
        .filter(|s| !s.is_empty())
        .collect();

    let body = scraper::fetch_page(ctx, &format!("{BASE_URL}/event/{id}")).await?;
    let page = {
        let document = Html::parse_document(&body);
        parse_event_page(&document, &stage_names)?
    };

    let teams = if page.stage_urls.is_empty() {
        page.teams
    } else {
        let stage_teams =
            try_join_all(page.stage_urls.iter().map(|url| fetch_stage_teams(ctx, url))).await?;
        dedup_teams(stage_teams.into_iter().flatten())
    };

    if ctx.settings.enable_id_map {
        for team in &teams {
            ctx.cache
                .hset("team", &simplify_name(&team.name), &team.id)
                .await;
        }
    }

    debug!(id, teams = teams.len(), matches = matches.len(), "parsed event detail");

    Ok(EventDetail {
        id: id.to_string(),
        title: page.title,
        subtitle: page.subtitle,
        dates: page.dates,
        prize: page.prize,
        location: page.location,
        status: page.status,
        img: page.img,
        prizes: page.prizes,
        teams,
        matches,
        standings: page.standings,
    })
}

/// Everything parsed off the event overview page itself.
struct EventPage {
    title: String,
    subtitle: String,
    dates: String,
    prize: String,
    location: String,
    img: String,
    status: EventStatus,
    prizes: Vec<Prize>,
    standings: Vec<EventStanding>,
    teams: Vec<EventTeam>,
    stage_urls: Vec<String>,
}

fn parse_event_page(document: &Html, stage_names: &HashSet<String>) -> Result<EventPage> {
    let header_selector = Selector::parse("div.event-header")?;
    let header = document
        .select(&header_selector)
        .next()
        .ok_or(ScrapeError::ElementNotFound {
            context: "event header",
        })?;

    let title_selector = Selector::parse("h1.wf-title")?;
    let title = clean_string(&select_text(&header, &title_selector));

    let subtitle_selector = Selector::parse("h2.event-desc-subtitle")?;
    let subtitle = clean_string(&select_text(&header, &subtitle_selector));

    let value_selector = Selector::parse("div.event-desc-item-value")?;
    let values = header.select(&value_selector).collect_vec();
    let dates = values
        .first()
        .map(|v| clean_string(&v.text().collect::<String>()))
        .unwrap_or_default();
    let prize = values
        .get(1)
        .map(|v| clean_string(&v.text().collect::<String>()))
        .unwrap_or_default();
    let flag_selector = Selector::parse("i.flag")?;
    let location = values
        .get(2)
        .map(|v| {
            let text = clean_string(&v.text().collect::<String>());
            if text.is_empty() {
                select_mod_class(v, &flag_selector)
            } else {
                text
            }
        })
        .unwrap_or_default();

    let thumb_selector = Selector::parse("div.event-header-thumb img")?;
    let img = header
        .select(&thumb_selector)
        .next()
        .and_then(|e| e.value().attr("src"))
        .map(get_image_url)
        .unwrap_or_default();

    let prizes = parse_prizes(document)?;
    let status = parse_event_status(document)?;
    let standings = parse_event_standings(document)?;

    // Stage sub-pages carry their own team rosters; only stages that
    // actually have matches are worth fetching.
    let subnav_selector = Selector::parse("div.wf-subnav a.wf-subnav-item")?;
    let stage_title_selector = Selector::parse("div.wf-subnav-item-title")?;
    let stage_urls = document
        .select(&subnav_selector)
        .filter_map(|a| {
            let stage_name = clean_string(&select_text(&a, &stage_title_selector));
            if !stage_names.contains(&stage_name) {
                return None;
            }
            a.value()
                .attr("href")
                .map(|href| format!("{BASE_URL}{href}"))
        })
        .collect_vec();

    let teams = if stage_urls.is_empty() {
        parse_event_teams(document)?
    } else {
        Vec::new()
    };

    Ok(EventPage {
        title,
        subtitle,
        dates,
        prize,
        location,
        img,
        status,
        prizes,
        standings,
        teams,
        stage_urls,
    })
}

/// The sidebar shows one label per match section; two sections (upcoming and
/// completed) mean the event is running, a single section tells us which end
/// of its lifecycle it is at.
fn parse_event_status(document: &Html) -> Result<EventStatus> {
    let label_selector = Selector::parse("div.event-sidebar-matches h2.wf-label.mod-large")?;
    let labels = document
        .select(&label_selector)
        .map(|l| clean_string(&l.text().collect::<String>()))
        .collect_vec();

    Ok(match labels.len() {
        2 => EventStatus::Ongoing,
        1 => {
            let first_word = labels[0]
                .split(' ')
                .next()
                .unwrap_or_default()
                .to_lowercase();
            if first_word == "upcoming" {
                EventStatus::Upcoming
            } else {
                EventStatus::Completed
            }
        }
        _ => EventStatus::Unknown,
    })
}

fn parse_prizes(document: &Html) -> Result<Vec<Prize>> {
    let table_selector = Selector::parse("table.wf-table")?;
    let Some(table) = document.select(&table_selector).last() else {
        return Ok(Vec::new());
    };

    let row_selector = Selector::parse("tbody tr")?;
    let cell_selector = Selector::parse("td")?;
    let anchor_selector = Selector::parse("a")?;
    let name_selector = Selector::parse("div.standing-item-team-name")?;
    let country_selector = Selector::parse("div.ge-text-light")?;
    let img_selector = Selector::parse("img")?;

    let mut prizes = Vec::new();
    for row in table.select(&row_selector).take(3) {
        let cells = row.select(&cell_selector).collect_vec();
        if cells.len() < 3 {
            continue;
        }
        let position = clean_string(&cells[0].text().collect::<String>());
        let prize = clean_string(&cells[1].text().collect::<String>());

        let team_cell = &cells[2];
        let team = team_cell.select(&anchor_selector).next().and_then(|anchor| {
            let id = href_segment(anchor.value().attr("href").unwrap_or_default(), 2)?;
            let name = clean_string(&select_text(team_cell, &name_selector));
            let country = clean_string(&select_text(team_cell, &country_selector));
            let img = team_cell
                .select(&img_selector)
                .next()
                .and_then(|e| e.value().attr("src"))
                .map(get_image_url)
                .unwrap_or_default();
            Some(PrizeTeam {
                id,
                name,
                img,
                country,
            })
        });

        prizes.push(Prize {
            position,
            prize,
            team,
        });
    }
    Ok(prizes)
}

async fn fetch_stage_teams(ctx: &ScraperContext, url: &str) -> Result<Vec<EventTeam>> {
    let body = scraper::fetch_page(ctx, url).await?;
    let document = Html::parse_document(&body);
    let container_selector = Selector::parse("div.event-teams-container")?;
    match document.select(&container_selector).next() {
        Some(container) => parse_team_cards(&container),
        None => Ok(Vec::new()),
    }
}

fn parse_event_teams(document: &Html) -> Result<Vec<EventTeam>> {
    let container_selector = Selector::parse("div.event-teams-container")?;
    match document.select(&container_selector).next() {
        Some(container) => parse_team_cards(&container),
        None => Ok(Vec::new()),
    }
}

fn parse_team_cards(container: &ElementRef) -> Result<Vec<EventTeam>> {
    let card_selector = Selector::parse("div.wf-card.event-team")?;
    let name_selector = Selector::parse("a.event-team-name")?;
    let img_selector = Selector::parse("img.event-team-players-mask-team")?;
    let seed_selector = Selector::parse("div.wf-module-item")?;

    let teams = container
        .select(&card_selector)
        .filter_map(|card| {
            let anchor = card.select(&name_selector).next()?;
            let name = clean_string(&anchor.text().collect::<String>());
            // Bracket placeholders are not participants.
            if name.to_lowercase() == "tbd" {
                return None;
            }
            let id = href_segment(anchor.value().attr("href").unwrap_or_default(), 2)?;
            let img = card
                .select(&img_selector)
                .next()
                .and_then(|e| e.value().attr("src"))
                .map(get_image_url)
                .unwrap_or_default();
            let seed = card
                .select(&seed_selector)
                .next()
                .map(|e| clean_string(&e.text().collect::<String>()))
                .filter(|s| !s.is_empty());
            Some(EventTeam {
                id,
                name,
                img,
                seed,
            })
        })
        .collect_vec();
    Ok(teams)
}

/// Merge stage rosters, deduplicating by team id. Last seen wins, first-seen
/// position is kept.
fn dedup_teams(teams: impl Iterator<Item = EventTeam>) -> Vec<EventTeam> {
    let mut merged: Vec<EventTeam> = Vec::new();
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for team in teams {
        match index.get(&team.id) {
            Some(&i) => merged[i] = team,
            None => {
                index.insert(team.id.clone(), merged.len());
                merged.push(team);
            }
        }
    }
    merged
}

/// Fetch and parse an event's full match list (all series).
#[instrument(skip(ctx))]
pub async fn get_event_matches(ctx: &ScraperContext, id: &str) -> Result<Vec<EventMatch>> {
    let body =
        scraper::fetch_page(ctx, &format!("{BASE_URL}/event/matches/{id}/?series_id=all")).await?;
    let document = Html::parse_document(&body);
    parse_event_matches(&document, ctx.settings.source_timezone)
}

pub(crate) fn parse_event_matches(document: &Html, tz: Tz) -> Result<Vec<EventMatch>> {
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
            match parse_event_match(&element, last_date, tz) {
                Ok(item) => matches.push(item),
                Err(e) => warn!(error = %e, "skipping unparsable match item"),
            }
        }
    }
    Ok(matches)
}

fn parse_event_match(
    element: &ElementRef,
    date: Option<NaiveDate>,
    tz: Tz,
) -> Result<EventMatch> {
    let href = element.value().attr("href").unwrap_or_default();
    let id = href_segment(href, 1).ok_or(ScrapeError::ElementNotFound {
        context: "match item href",
    })?;

    let status_selector = Selector::parse("div.ml-status")?;
    let status =
        MatchStatus::from_str(&select_text(element, &status_selector).to_lowercase())
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

    let eta_selector = Selector::parse("div.ml-eta")?;
    let eta = if matches!(status, MatchStatus::Live | MatchStatus::Tbd) {
        None
    } else {
        Some(select_text(element, &eta_selector)).filter(|s| !s.is_empty())
    };

    let team_selector = Selector::parse("div.match-item-vs-team")?;
    let teams = element
        .select(&team_selector)
        .map(|team| parse_event_match_team(&team))
        .collect::<Result<Vec<_>>>()?;

    let series_selector = Selector::parse("div.match-item-event-series")?;
    let round = clean_string(&select_text(element, &series_selector));

    let event_selector = Selector::parse("div.match-item-event.text-of")?;
    let stage = element
        .select(&event_selector)
        .filter_map(|t| t.text().last())
        .map(clean_string)
        .last()
        .unwrap_or_default();

    Ok(EventMatch {
        id,
        status,
        time,
        eta,
        teams,
        round,
        stage,
    })
}

fn parse_event_match_team(team: &ElementRef) -> Result<EventMatchTeam> {
    let name_selector = Selector::parse("div.match-item-vs-team-name")?;
    let name = clean_string(&select_text(team, &name_selector));

    let flag_selector = Selector::parse("span.flag")?;
    let region = select_mod_class(team, &flag_selector);

    let score_selector = Selector::parse("div.match-item-vs-team-score")?;
    let score_text = clean_string(&select_text(team, &score_selector));
    // A dash or empty cell means "not yet played", which is distinct from 0.
    let score = if !score_text.is_empty() && score_text.chars().all(|c| c.is_ascii_digit()) {
        score_text.parse().ok()
    } else {
        None
    };

    Ok(EventMatchTeam {
        name,
        region,
        score,
    })
}

fn parse_event_standings(document: &Html) -> Result<Vec<EventStanding>> {
    let groups_selector = Selector::parse("div.event-groups-container")?;
    let table_selector = Selector::parse("table.wf-table.mod-simple.mod-group")?;

    let mut standings = Vec::new();
    if let Some(groups) = document.select(&groups_selector).next() {
        for table in groups.select(&table_selector) {
            let group_selector = Selector::parse("thead tr th")?;
            let group = clean_string(&select_text(&table, &group_selector));
            parse_standings_rows(&table, Some(group), &mut standings)?;
        }
    } else if let Some(table) = document.select(&table_selector).next() {
        parse_standings_rows(&table, None, &mut standings)?;
    }
    Ok(standings)
}

/// Group tables come in three column layouts: five columns with a combined
/// "W–L" record, six with a leading logo cell, and seven or more with
/// separate win/loss/tie columns.
fn parse_standings_rows(
    table: &ElementRef,
    group: Option<String>,
    standings: &mut Vec<EventStanding>,
) -> Result<()> {
    let row_selector = Selector::parse("tbody tr")?;
    let cell_selector = Selector::parse("td")?;
    let name_selector = Selector::parse("div.event-group-team-name.text-of")?;
    let img_selector = Selector::parse("img")?;

    for row in table.select(&row_selector) {
        let cells = row.select(&cell_selector).collect_vec();
        if cells.len() < 5 {
            continue;
        }

        let logo = cells[0]
            .select(&img_selector)
            .next()
            .and_then(|e| e.value().attr("src"))
            .map(get_image_url)
            .unwrap_or_default();

        let number = |cell: &ElementRef| clean_number_string(&cell.text().collect::<String>()) as i64;
        let record = |cell: &ElementRef| -> (i64, i64) {
            clean_string(&cell.text().collect::<String>())
                .split('–')
                .map(|part| part.trim().parse().unwrap_or(0))
                .collect_tuple()
                .unwrap_or((0, 0))
        };

        let (team_cell, wins, losses, ties, map_difference, round_difference, round_delta) =
            match cells.len() {
                6 => {
                    let (wins, losses) = record(&cells[2]);
                    (&cells[1], wins, losses, 0, number(&cells[3]), number(&cells[4]), number(&cells[5]))
                }
                n if n > 6 => (
                    &cells[0],
                    number(&cells[1]),
                    number(&cells[2]),
                    number(&cells[3]),
                    number(&cells[4]),
                    number(&cells[5]),
                    number(&cells[6]),
                ),
                _ => {
                    let (wins, losses) = record(&cells[1]);
                    (&cells[0], wins, losses, 0, number(&cells[2]), number(&cells[3]), number(&cells[4]))
                }
            };

        let Some(name_div) = team_cell.select(&name_selector).next() else {
            continue;
        };
        let (team, country) = name_div
            .text()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect_tuple()
            .unwrap_or_else(|| {
                (
                    clean_string(&name_div.text().collect::<String>()),
                    String::new(),
                )
            });

        standings.push(EventStanding {
            group: group.clone(),
            logo,
            team,
            country,
            wins,
            losses,
            ties,
            map_difference,
            round_difference,
            round_delta,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENTS_PAGE: &str = r#"
    <html><body><div id="wrapper">
      <div class="events-container-col">
        <a class="wf-card" href="/event/2097/champions-2025">
          <div class="event-item-thumb"><img src="//owcdn.net/img/champions.png"></div>
          <div class="event-item-title">
            Champions 2025
          </div>
          <div class="event-item-desc-item">
            <span class="event-item-desc-item-status">ongoing</span>
          </div>
          <div class="event-item-desc-item mod-prize">
            $2,250,000
            <span>Prize</span>
          </div>
          <div class="event-item-desc-item mod-dates">
            Sep 12&ndash;Oct 5
            <span>Dates</span>
          </div>
          <div class="event-item-desc-item mod-location">
            <i class="flag mod-fr"></i>
          </div>
        </a>
      </div>
    </div></body></html>
    "#;

    #[test]
    fn parses_a_single_event_card() {
        let document = Html::parse_document(EVENTS_PAGE);
        let events = parse_events_document(&document).unwrap();
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.id, "2097");
        assert_eq!(event.title, "Champions 2025");
        assert_eq!(event.status, EventStatus::Ongoing);
        assert_eq!(event.prize, "$2,250,000");
        assert_eq!(event.dates, "Sep 12–Oct 5");
        assert_eq!(event.location, "fr");
        assert_eq!(event.img, "https://owcdn.net/img/champions.png");
    }

    #[test]
    fn parsing_is_idempotent() {
        let document = Html::parse_document(EVENTS_PAGE);
        let first = parse_events_document(&document).unwrap();
        let second = parse_events_document(&document).unwrap();
        assert_eq!(first, second);
    }

    const EVENT_MATCHES_PAGE: &str = r#"
    <html><body><div id="wrapper">
      <div class="wf-label mod-large">Sat, January 25, 2025</div>
      <div class="wf-card">
        <a class="match-item" href="/510272/sen-vs-fnc-champions-2025">
          <div class="match-item-time">1:00 PM</div>
          <div class="ml-status">Upcoming</div>
          <div class="ml-eta">2h 10m</div>
          <div class="match-item-vs">
            <div class="match-item-vs-team">
              <div class="match-item-vs-team-name">Sentinels</div>
              <span class="flag mod-us"></span>
              <div class="match-item-vs-team-score">–</div>
            </div>
            <div class="match-item-vs-team">
              <div class="match-item-vs-team-name">FNATIC</div>
              <span class="flag mod-eu"></span>
              <div class="match-item-vs-team-score">–</div>
            </div>
          </div>
          <div class="match-item-event text-of">
            <div class="match-item-event-series text-of">Group Stage: Round 1</div>
            Main Event
          </div>
        </a>
        <a class="match-item" href="/510270/drx-vs-th-champions-2025">
          <div class="match-item-time">10:00 AM</div>
          <div class="ml-status">Completed</div>
          <div class="ml-eta">3h ago</div>
          <div class="match-item-vs">
            <div class="match-item-vs-team">
              <div class="match-item-vs-team-name">DRX</div>
              <span class="flag mod-kr"></span>
              <div class="match-item-vs-team-score">2</div>
            </div>
            <div class="match-item-vs-team">
              <div class="match-item-vs-team-name">Team Heretics</div>
              <span class="flag mod-eu"></span>
              <div class="match-item-vs-team-score">0</div>
            </div>
          </div>
          <div class="match-item-event text-of">
            <div class="match-item-event-series text-of">Group Stage: Round 1</div>
            Main Event
          </div>
        </a>
      </div>
    </div></body></html>
    "#;

    #[test]
    fn upcoming_matches_never_carry_scores() {
        let document = Html::parse_document(EVENT_MATCHES_PAGE);
        let matches = parse_event_matches(&document, chrono_tz::America::New_York).unwrap();
        assert_eq!(matches.len(), 2);

        let upcoming = &matches[0];
        assert_eq!(upcoming.id, "510272");
        assert_eq!(upcoming.status, MatchStatus::Upcoming);
        assert_eq!(upcoming.teams[0].score, None);
        assert_eq!(upcoming.teams[1].score, None);
        assert_eq!(upcoming.round, "Group Stage: Round 1");
        assert_eq!(upcoming.stage, "Main Event");
        // 1 PM Eastern in January is 6 PM UTC.
        assert_eq!(
            upcoming.time.unwrap().to_rfc3339(),
            "2025-01-25T18:00:00+00:00"
        );

        let completed = &matches[1];
        assert_eq!(completed.status, MatchStatus::Completed);
        assert_eq!(completed.teams[0].score, Some(2));
        assert_eq!(completed.teams[1].score, Some(0));
    }

    #[test]
    fn tbd_time_yields_no_timestamp() {
        let page = EVENT_MATCHES_PAGE.replace("1:00 PM", "TBD");
        let document = Html::parse_document(&page);
        let matches = parse_event_matches(&document, chrono_tz::America::New_York).unwrap();
        assert_eq!(matches[0].time, None);
    }

    const STANDINGS_TABLE: &str = r#"
    <html><body>
      <div class="event-groups-container">
        <table class="wf-table mod-simple mod-group">
          <thead><tr><th>Group A</th></tr></thead>
          <tbody>
            <tr>
              <td>
                <img src="//owcdn.net/img/sen.png">
                <div class="event-group-team-name text-of">
                  Sentinels
                  <div>United States</div>
                </div>
              </td>
              <td>3–1</td>
              <td>+4</td>
              <td>+21</td>
              <td>+17</td>
            </tr>
          </tbody>
        </table>
      </div>
    </body></html>
    "#;

    #[test]
    fn parses_five_column_group_standings() {
        let document = Html::parse_document(STANDINGS_TABLE);
        let standings = parse_event_standings(&document).unwrap();
        assert_eq!(standings.len(), 1);

        let row = &standings[0];
        assert_eq!(row.group.as_deref(), Some("Group A"));
        assert_eq!(row.team, "Sentinels");
        assert_eq!(row.country, "United States");
        assert_eq!(row.wins, 3);
        assert_eq!(row.losses, 1);
        assert_eq!(row.ties, 0);
        assert_eq!(row.map_difference, 4);
        assert_eq!(row.round_difference, 21);
        assert_eq!(row.round_delta, 17);
    }

    const PRIZES_TABLE: &str = r#"
    <html><body>
      <table class="wf-table">
        <tbody>
          <tr>
            <td>1st</td>
            <td>$1,000,000</td>
            <td>
              <a href="/team/2/sentinels"></a>
              <div class="standing-item-team-name">
                Sentinels
              </div>
              <div class="ge-text-light">United States</div>
              <img src="//owcdn.net/img/sen.png">
            </td>
          </tr>
          <tr>
            <td>2nd</td>
            <td>$400,000</td>
            <td></td>
          </tr>
        </tbody>
      </table>
    </body></html>
    "#;

    #[test]
    fn prize_rows_tolerate_missing_teams() {
        let document = Html::parse_document(PRIZES_TABLE);
        let prizes = parse_prizes(&document).unwrap();
        assert_eq!(prizes.len(), 2);

        let first = &prizes[0];
        assert_eq!(first.position, "1st");
        assert_eq!(first.prize, "$1,000,000");
        let team = first.team.as_ref().unwrap();
        assert_eq!(team.id, "2");
        assert_eq!(team.name, "Sentinels");
        assert_eq!(team.country, "United States");

        assert_eq!(prizes[1].team, None);
    }

    #[test]
    fn event_status_from_sidebar_labels() {
        let two = r#"<div class="event-sidebar-matches">
            <h2 class="wf-label mod-large">Upcoming Matches</h2>
            <h2 class="wf-label mod-large">Completed Matches</h2>
        </div>"#;
        let document = Html::parse_document(two);
        assert_eq!(parse_event_status(&document).unwrap(), EventStatus::Ongoing);

        let one = r#"<div class="event-sidebar-matches">
            <h2 class="wf-label mod-large">Upcoming Matches</h2>
        </div>"#;
        let document = Html::parse_document(one);
        assert_eq!(parse_event_status(&document).unwrap(), EventStatus::Upcoming);

        let document = Html::parse_document("<div></div>");
        assert_eq!(parse_event_status(&document).unwrap(), EventStatus::Unknown);
    }
}
