use ::scraper::{Html, Selector};
use futures::future::try_join_all;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::context::ScraperContext;
use crate::error::Result;
use crate::model::{Ranking, TeamRanking};
use crate::scraper::{self, href_segment, titlecase_words};
use crate::utils::{clean_number_string, clean_string, get_image_url, BASE_URL};

/// Fetch the world rankings: the rankings landing page lists one nav entry
/// per region, each region page is fetched concurrently.
#[instrument(skip(ctx))]
pub async fn get_rankings(ctx: &ScraperContext) -> Result<Vec<Ranking>> {
    let body = scraper::fetch_page(ctx, &format!("{BASE_URL}/rankings")).await?;
    let region_paths = {
        let document = Html::parse_document(&body);
        parse_region_paths(&document)?
    };

    let rankings =
        try_join_all(region_paths.iter().map(|path| fetch_region(ctx, path))).await?;
    debug!(regions = rankings.len(), "parsed rankings");
    Ok(rankings)
}

fn parse_region_paths(document: &Html) -> Result<Vec<String>> {
    let nav_selector = Selector::parse("div.wf-nav.mod-collapsible a")?;
    // The first nav entry is the "World" overview, not a region.
    let paths = document
        .select(&nav_selector)
        .skip(1)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.to_string())
        .collect_vec();
    Ok(paths)
}

async fn fetch_region(ctx: &ScraperContext, path: &str) -> Result<Ranking> {
    let body = scraper::fetch_page(ctx, &format!("{BASE_URL}{path}")).await?;
    let document = Html::parse_document(&body);
    parse_region(&document, path)
}

pub(crate) fn parse_region(document: &Html, path: &str) -> Result<Ranking> {
    let region = region_from_path(path);

    let item_selector = Selector::parse("div.rank-item.wf-card.fc-flex")?;
    let anchor_selector = Selector::parse("a")?;
    let img_selector = Selector::parse("img")?;
    let rank_selector = Selector::parse("div.rank-item-rank")?;
    let rating_selector = Selector::parse("div.rank-item-rating")?;
    let country_selector = Selector::parse("div.rank-item-team-country")?;

    let teams = document
        .select(&item_selector)
        .filter_map(|item| {
            let anchor = item.select(&anchor_selector).next()?;
            let id = href_segment(anchor.value().attr("href").unwrap_or_default(), 2)?;
            let name = anchor
                .value()
                .attr("data-sort-value")
                .unwrap_or_default()
                .to_string();
            let logo = item
                .select(&img_selector)
                .next()
                .and_then(|e| e.value().attr("src"))
                .map(get_image_url)
                .unwrap_or_default();
            let rank = clean_number_string(&scraper::select_text(&item, &rank_selector)) as u32;
            let points = clean_number_string(&scraper::select_text(&item, &rating_selector)) as u32;
            let country = clean_string(&scraper::select_text(&item, &country_selector));
            Some(TeamRanking {
                id,
                name,
                logo,
                rank,
                points,
                country,
            })
        })
        .collect_vec();

    Ok(Ranking { region, teams })
}

/// "/rankings/north-america" becomes "North America".
fn region_from_path(path: &str) -> String {
    let last = path.trim_end_matches('/').split('/').last().unwrap_or_default();
    titlecase_words(&last.split('-').join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_names_come_from_the_path() {
        assert_eq!(region_from_path("/rankings/north-america"), "North America");
        assert_eq!(region_from_path("/rankings/europe"), "Europe");
        assert_eq!(region_from_path("/rankings/la-s"), "La S");
    }

    const REGION_PAGE: &str = r#"
    <html><body>
      <div class="rank-item wf-card fc-flex">
        <div class="rank-item-rank">1</div>
        <a href="/team/2/sentinels" data-sort-value="Sentinels">
          <img src="//owcdn.net/img/sen.png">
        </a>
        <div class="rank-item-team-country">United States</div>
        <div class="rank-item-rating">712</div>
      </div>
      <div class="rank-item wf-card fc-flex">
        <div class="rank-item-rank">2</div>
        <a href="/team/188/cloud9" data-sort-value="Cloud9">
          <img src="//owcdn.net/img/c9.png">
        </a>
        <div class="rank-item-rating">645</div>
      </div>
    </body></html>
    "#;

    #[test]
    fn parses_region_rank_items() {
        let document = Html::parse_document(REGION_PAGE);
        let ranking = parse_region(&document, "/rankings/north-america").unwrap();

        assert_eq!(ranking.region, "North America");
        assert_eq!(ranking.teams.len(), 2);
        assert_eq!(ranking.teams[0].id, "2");
        assert_eq!(ranking.teams[0].name, "Sentinels");
        assert_eq!(ranking.teams[0].rank, 1);
        assert_eq!(ranking.teams[0].points, 712);
        assert_eq!(ranking.teams[0].country, "United States");
        assert_eq!(ranking.teams[1].name, "Cloud9");
    }
}
