use ::scraper::{ElementRef, Html, Selector};
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::context::ScraperContext;
use crate::error::{Result, ScrapeError};
use crate::model::{RosterMember, Team, TeamCompletedMatch, TeamUpcomingMatch};
use crate::scraper::{self, href_segment, select_attr, select_text};
use crate::utils::{
    clean_number_string, clean_string, fix_datetime_tz, get_image_url, normalize_name,
    simplify_name, BASE_URL,
};

const MATCH_DATE_FORMATS: &[&str] = &[
    "%m/%d/%y %I:%M %p",
    "%B %e, %Y %I:%M %p",
    "%b %e, %Y %I:%M %p",
];

/// Fetch a team profile: header data, roster, and the upcoming and completed
/// match tabs, all three pages fetched concurrently.
#[instrument(skip(ctx))]
pub async fn get_team(ctx: &ScraperContext, id: &str) -> Result<Team> {
    let main_url = format!("{BASE_URL}/team/{id}");
    let upcoming_url = format!("{BASE_URL}/team/matches/{id}/?group=upcoming");
    let completed_url = format!("{BASE_URL}/team/matches/{id}/?group=completed");
    let (main_body, upcoming_body, completed_body) = futures::try_join!(
        scraper::fetch_page(ctx, &main_url),
        scraper::fetch_page(ctx, &upcoming_url),
        scraper::fetch_page(ctx, &completed_url),
    )?;

    let tz = ctx.settings.source_timezone;
    let team = {
        let main = Html::parse_document(&main_body);
        let upcoming_doc = Html::parse_document(&upcoming_body);
        let completed_doc = Html::parse_document(&completed_body);

        let upcoming = parse_upcoming_matches(&upcoming_doc, tz)?;
        let completed = parse_completed_matches(&completed_doc, tz)?;
        parse_team_page(&main, id, upcoming, completed)?
    };

    if ctx.settings.enable_id_map {
        for key in name_lookup_keys(&team.name) {
            ctx.cache.hset("team", &key, id).await;
        }
    }

    debug!(id, roster = team.roster.len(), "parsed team profile");
    Ok(team)
}

/// Lookup keys a team is registered under. Names like "Sentinels (SEN)" get
/// both the full form and each part registered.
fn name_lookup_keys(name: &str) -> Vec<String> {
    let mut keys = vec![simplify_name(name)];
    if let Some((base, rest)) = name.split_once('(') {
        let alias = rest.trim_end_matches(')');
        keys.push(simplify_name(base.trim()));
        keys.push(simplify_name(alias.trim()));
    }
    keys.retain(|k| !k.is_empty());
    keys.dedup();
    keys
}

fn parse_team_page(
    document: &Html,
    id: &str,
    upcoming: Vec<TeamUpcomingMatch>,
    completed: Vec<TeamCompletedMatch>,
) -> Result<Team> {
    let header_selector = Selector::parse("div.team-header")?;
    let header = document
        .select(&header_selector)
        .next()
        .ok_or(ScrapeError::ElementNotFound {
            context: "team header",
        })?;

    let name_selector = Selector::parse("h1")?;
    let name = clean_string(&select_text(&header, &name_selector));

    let tag_selector = Selector::parse("h2")?;
    let tag = clean_string(&select_text(&header, &tag_selector));

    let img_selector = Selector::parse("img")?;
    let img = header
        .select(&img_selector)
        .next()
        .and_then(|e| e.value().attr("src"))
        .map(get_image_url)
        .unwrap_or_default();

    let country_selector = Selector::parse("div.team-header-country")?;
    let country = clean_string(&select_text(&header, &country_selector));

    let link_selector = Selector::parse("div.team-header-links a")?;
    let mut website = None;
    let mut twitter = None;
    for link in header.select(&link_selector) {
        let Some(href) = link.value().attr("href").filter(|h| !h.is_empty()) else {
            continue;
        };
        if href.contains("twitter.com") || href.contains("x.com") {
            twitter = Some(href.to_string());
        } else {
            website = Some(href.to_string());
        }
    }

    let summary_selector = Selector::parse("div.team-summary-container-1")?;
    let summary = document
        .select(&summary_selector)
        .next()
        .ok_or(ScrapeError::ElementNotFound {
            context: "team summary",
        })?;

    // Rank is missing for some teams; it defaults to 0 rather than failing.
    let rank_selector = Selector::parse("div.rank-num")?;
    let rank = clean_number_string(&select_text(&summary, &rank_selector)) as u32;

    let region_selector = Selector::parse("div.rating-txt")?;
    let region = clean_string(&select_text(&summary, &region_selector));

    let roster = parse_roster(&summary)?;

    Ok(Team {
        id: id.to_string(),
        normalized_name: normalize_name(&name),
        name,
        tag,
        img,
        website,
        twitter,
        country,
        rank,
        region,
        roster,
        upcoming,
        completed,
    })
}

fn parse_roster(summary: &ElementRef) -> Result<Vec<RosterMember>> {
    let item_selector = Selector::parse("div.team-roster-item")?;
    let anchor_selector = Selector::parse("a")?;
    let alias_selector = Selector::parse("div.team-roster-item-name-alias")?;
    let name_selector = Selector::parse("div.team-roster-item-name-real")?;
    let role_selector = Selector::parse("div.team-roster-item-name-role")?;
    let captain_selector = Selector::parse("i.fa.fa-star")?;
    let img_selector = Selector::parse("div.team-roster-item-img img")?;

    let roster = summary
        .select(&item_selector)
        .filter_map(|item| {
            let href = select_attr(&item, &anchor_selector, "href")?;
            let id = href_segment(&href, 2)?;
            let alias = clean_string(&select_text(&item, &alias_selector));
            let name = Some(clean_string(&select_text(&item, &name_selector)))
                .filter(|n| !n.is_empty());
            let role = Some(clean_string(&select_text(&item, &role_selector)))
                .filter(|r| !r.is_empty())
                .or_else(|| select_attr(&item, &captain_selector, "title"));
            let img = select_attr(&item, &img_selector, "src")
                .map(|src| get_image_url(&src))
                .unwrap_or_default();
            Some(RosterMember {
                id,
                alias,
                name,
                role,
                img,
            })
        })
        .collect_vec();
    Ok(roster)
}

fn parse_upcoming_matches(document: &Html, tz: Tz) -> Result<Vec<TeamUpcomingMatch>> {
    let card_selector = Selector::parse("a.wf-card.fc-flex.m-item")?;
    let eta_selector = Selector::parse("span.rm-item-score-eta")?;

    let mut matches = Vec::new();
    for card in document.select(&card_selector) {
        let parsed = parse_match_card(&card, tz);
        let Some(card_data) = log_skipped(parsed) else {
            continue;
        };
        let eta = select_text(&card, &eta_selector);
        matches.push(TeamUpcomingMatch {
            id: card_data.id,
            event: card_data.event,
            stage: card_data.stage,
            opponent: card_data.opponent,
            eta,
            date: card_data.date,
        });
    }
    Ok(matches)
}

fn parse_completed_matches(document: &Html, tz: Tz) -> Result<Vec<TeamCompletedMatch>> {
    let card_selector = Selector::parse("a.wf-card.fc-flex.m-item")?;
    let result_selector = Selector::parse("div.m-item-result")?;

    let mut matches = Vec::new();
    for card in document.select(&card_selector) {
        let parsed = parse_match_card(&card, tz);
        let Some(card_data) = log_skipped(parsed) else {
            continue;
        };
        let score = card
            .select(&result_selector)
            .next()
            .map(|r| {
                r.text()
                    .map(|t| t.trim())
                    .filter(|t| !t.is_empty())
                    .join("")
            })
            .unwrap_or_default();
        matches.push(TeamCompletedMatch {
            id: card_data.id,
            event: card_data.event,
            stage: card_data.stage,
            opponent: card_data.opponent,
            score,
            date: card_data.date,
        });
    }
    Ok(matches)
}

fn log_skipped<T>(parsed: Result<T>) -> Option<T> {
    match parsed {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "skipping unparsable team match card");
            None
        }
    }
}

struct MatchCard {
    id: String,
    event: String,
    stage: String,
    opponent: String,
    date: chrono::DateTime<chrono::Utc>,
}

fn parse_match_card(card: &ElementRef, tz: Tz) -> Result<MatchCard> {
    let id = href_segment(card.value().attr("href").unwrap_or_default(), 1).ok_or(
        ScrapeError::ElementNotFound {
            context: "team match card href",
        },
    )?;

    // The event block holds the event name on the first line and the stage
    // on the rest.
    let event_selector = Selector::parse("div.m-item-event.text-of")?;
    let lines = card
        .select(&event_selector)
        .next()
        .map(|e| {
            e.text()
                .map(|t| t.trim().replace('\t', ""))
                .filter(|t| !t.is_empty())
                .collect_vec()
        })
        .unwrap_or_default();
    let (event, stage) = match lines.split_first() {
        Some((event, rest)) => (event.clone(), rest.join("")),
        None => (String::new(), String::new()),
    };

    let opponent_selector = Selector::parse("div.m-item-team.mod-right div.m-item-team-name")?;
    let opponent = clean_string(&select_text(card, &opponent_selector));

    let date_selector = Selector::parse("div.m-item-date")?;
    let date_text = card
        .select(&date_selector)
        .next()
        .map(|e| {
            e.text()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .join(" ")
        })
        .unwrap_or_default();
    let naive = MATCH_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&date_text, format).ok())
        .ok_or(ScrapeError::ElementNotFound {
            context: "team match card date",
        })?;

    Ok(MatchCard {
        id,
        event,
        stage,
        opponent,
        date: fix_datetime_tz(naive, tz),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEAM_PAGE: &str = r#"
    <html><body>
      <div class="team-header">
        <img src="//owcdn.net/img/sen.png">
        <h1 class="wf-title">Sentinels</h1>
        <h2 class="team-header-tag">SEN</h2>
        <div class="team-header-country">United States</div>
        <div class="team-header-links">
          <a href="https://sentinels.gg">sentinels.gg</a>
          <a href="https://twitter.com/Sentinels">@Sentinels</a>
        </div>
      </div>
      <div class="team-summary-container-1">
        <div class="rank-num mod-">4</div>
        <div class="rating-txt">North America</div>
        <div class="team-roster-item">
          <a href="/player/729/tenz"></a>
          <div class="team-roster-item-img"><img src="/img/base/ph/sil.png"></div>
          <div class="team-roster-item-name-alias">TenZ</div>
          <div class="team-roster-item-name-real">Tyson Ngo</div>
        </div>
        <div class="team-roster-item">
          <a href="/player/4004/johnqt"></a>
          <div class="team-roster-item-img"><img src="/img/base/ph/sil.png"></div>
          <div class="team-roster-item-name-alias">johnqt <i class="fa fa-star" title="Team Captain"></i></div>
        </div>
      </div>
    </body></html>
    "#;

    #[test]
    fn parses_team_header_and_roster() {
        let document = Html::parse_document(TEAM_PAGE);
        let team = parse_team_page(&document, "2", Vec::new(), Vec::new()).unwrap();

        assert_eq!(team.id, "2");
        assert_eq!(team.name, "Sentinels");
        assert_eq!(team.normalized_name, "sentinels");
        assert_eq!(team.tag, "SEN");
        assert_eq!(team.country, "United States");
        assert_eq!(team.website.as_deref(), Some("https://sentinels.gg"));
        assert_eq!(
            team.twitter.as_deref(),
            Some("https://twitter.com/Sentinels")
        );
        assert_eq!(team.rank, 4);
        assert_eq!(team.region, "North America");

        assert_eq!(team.roster.len(), 2);
        assert_eq!(team.roster[0].id, "729");
        assert_eq!(team.roster[0].alias, "TenZ");
        assert_eq!(team.roster[0].name.as_deref(), Some("Tyson Ngo"));
        assert_eq!(team.roster[0].role, None);
        assert_eq!(team.roster[1].role.as_deref(), Some("Team Captain"));
    }

    #[test]
    fn missing_rank_defaults_to_zero() {
        let page = TEAM_PAGE.replace(r#"<div class="rank-num mod-">4</div>"#, "");
        let document = Html::parse_document(&page);
        let team = parse_team_page(&document, "2", Vec::new(), Vec::new()).unwrap();
        assert_eq!(team.rank, 0);
    }

    const MATCHES_PAGE: &str = r#"
    <html><body>
      <a class="wf-card fc-flex m-item" href="/510272/sen-vs-fnc-champions-2025">
        <div class="m-item-event text-of">
          Champions 2025
          <span>Group Stage: Round 1</span>
        </div>
        <div class="m-item-team mod-right">
          <div class="m-item-team-name">FNATIC</div>
        </div>
        <span class="rm-item-score-eta">2d 3h</span>
        <div class="m-item-date">
          <div>1/25/25</div>
          1:00 PM
        </div>
      </a>
    </body></html>
    "#;

    #[test]
    fn parses_upcoming_match_card() {
        let document = Html::parse_document(MATCHES_PAGE);
        let matches = parse_upcoming_matches(&document, chrono_tz::America::New_York).unwrap();
        assert_eq!(matches.len(), 1);

        let item = &matches[0];
        assert_eq!(item.id, "510272");
        assert_eq!(item.event, "Champions 2025");
        assert_eq!(item.stage, "Group Stage: Round 1");
        assert_eq!(item.opponent, "FNATIC");
        assert_eq!(item.eta, "2d 3h");
        assert_eq!(item.date.to_rfc3339(), "2025-01-25T18:00:00+00:00");
    }

    #[test]
    fn parses_completed_match_card() {
        let page = MATCHES_PAGE.replace(
            r#"<span class="rm-item-score-eta">2d 3h</span>"#,
            r#"<div class="m-item-result"><span>2</span>:<span>0</span></div>"#,
        );
        let document = Html::parse_document(&page);
        let matches = parse_completed_matches(&document, chrono_tz::America::New_York).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].score, "2:0");
        assert_eq!(matches[0].opponent, "FNATIC");
    }

    #[test]
    fn parenthesised_names_register_both_forms() {
        let keys = name_lookup_keys("Sentinels (SEN)");
        assert_eq!(
            keys,
            vec![
                "sentinels_(sen)".to_string(),
                "sentinels".to_string(),
                "sen".to_string()
            ]
        );
    }
}
