use ::scraper::{Html, Selector};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::context::ScraperContext;
use crate::error::Result;
use crate::model::{CircuitStanding, Standings, TeamStanding};
use crate::scraper::{self, href_segment, select_text};
use crate::utils::{clean_number_string, clean_string, get_image_url, BASE_URL};

/// Fetch the championship-points standings for one VCT year, one group per
/// regional circuit.
#[instrument(skip(ctx))]
pub async fn get_standings(ctx: &ScraperContext, year: i32) -> Result<Standings> {
    let body =
        scraper::fetch_page(ctx, &format!("{BASE_URL}/vct-{year}/standings")).await?;
    let document = Html::parse_document(&body);
    let standings = parse_standings(&document, year)?;
    debug!(year, circuits = standings.circuits.len(), "parsed standings");
    Ok(standings)
}

pub(crate) fn parse_standings(document: &Html, year: i32) -> Result<Standings> {
    let group_selector = Selector::parse("div.eg-standing-group")?;
    let label_selector = Selector::parse("div.wf-label")?;
    let row_selector = Selector::parse("table tr")?;
    let team_cell_selector = Selector::parse("td.eg-standing-group-team")?;
    let anchor_selector = Selector::parse("a")?;
    let img_selector = Selector::parse("img")?;
    let name_selector = Selector::parse("div.text-of")?;
    let cell_selector = Selector::parse("td")?;

    let mut circuits = Vec::new();
    for group in document.select(&group_selector) {
        let region = clean_string(&select_text(&group, &label_selector));

        let mut teams = Vec::new();
        // Rank is the 1-based row position, not read off the page.
        let mut rank = 1u32;
        for row in group.select(&row_selector) {
            let Some(team_cell) = row.select(&team_cell_selector).next() else {
                continue;
            };
            let Some(anchor) = team_cell.select(&anchor_selector).next() else {
                continue;
            };
            let Some(id) = href_segment(anchor.value().attr("href").unwrap_or_default(), 2)
            else {
                continue;
            };

            let logo = anchor
                .select(&img_selector)
                .next()
                .and_then(|e| e.value().attr("src"))
                .map(get_image_url)
                .unwrap_or_default();

            // The name block holds the team name and the country on separate
            // lines.
            let (name, country) = anchor
                .select(&name_selector)
                .next()
                .map(|block| {
                    let lines = block
                        .text()
                        .map(|t| t.trim())
                        .filter(|t| !t.is_empty())
                        .collect_vec();
                    (
                        lines.first().map(|s| s.to_string()).unwrap_or_default(),
                        lines.get(1).map(|s| s.to_string()).unwrap_or_default(),
                    )
                })
                .unwrap_or_default();

            // Points read like "12 pts"; only the leading number counts.
            let points = row
                .select(&cell_selector)
                .nth(1)
                .and_then(|cell| {
                    let text = clean_string(&cell.text().collect::<String>());
                    text.split_whitespace()
                        .next()
                        .map(|n| clean_number_string(n) as u32)
                })
                .unwrap_or(0);

            teams.push(TeamStanding {
                id,
                name,
                logo,
                rank,
                points,
                country,
            });
            rank += 1;
        }
        circuits.push(CircuitStanding { region, teams });
    }

    Ok(Standings { year, circuits })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDINGS_PAGE: &str = r#"
    <html><body>
      <div class="eg-standing-group">
        <div class="wf-label">Americas</div>
        <table>
          <tr><th>Team</th><th>Points</th></tr>
          <tr>
            <td class="eg-standing-group-team">
              <a href="/team/2/sentinels">
                <img src="//owcdn.net/img/sen.png">
                <div class="text-of">
                  <div>Sentinels</div>
                  <div>United States</div>
                </div>
              </a>
            </td>
            <td>12 pts</td>
          </tr>
          <tr>
            <td class="eg-standing-group-team">
              <a href="/team/1034/nrg">
                <img src="//owcdn.net/img/nrg.png">
                <div class="text-of">
                  <div>NRG</div>
                  <div>United States</div>
                </div>
              </a>
            </td>
            <td>9 pts</td>
          </tr>
        </table>
      </div>
      <div class="eg-standing-group">
        <div class="wf-label">EMEA</div>
        <table>
          <tr><th>Team</th><th>Points</th></tr>
          <tr>
            <td class="eg-standing-group-team">
              <a href="/team/1001/fnatic">
                <img src="//owcdn.net/img/fnc.png">
                <div class="text-of">
                  <div>FNATIC</div>
                  <div>United Kingdom</div>
                </div>
              </a>
            </td>
            <td>15 pts</td>
          </tr>
        </table>
      </div>
    </body></html>
    "#;

    #[test]
    fn groups_become_circuits_with_positional_ranks() {
        let document = Html::parse_document(STANDINGS_PAGE);
        let standings = parse_standings(&document, 2025).unwrap();

        assert_eq!(standings.year, 2025);
        assert_eq!(standings.circuits.len(), 2);

        let americas = &standings.circuits[0];
        assert_eq!(americas.region, "Americas");
        assert_eq!(americas.teams.len(), 2);
        assert_eq!(americas.teams[0].id, "2");
        assert_eq!(americas.teams[0].name, "Sentinels");
        assert_eq!(americas.teams[0].country, "United States");
        assert_eq!(americas.teams[0].rank, 1);
        assert_eq!(americas.teams[0].points, 12);
        assert_eq!(americas.teams[1].rank, 2);
        assert_eq!(americas.teams[1].points, 9);

        let emea = &standings.circuits[1];
        assert_eq!(emea.region, "EMEA");
        assert_eq!(emea.teams[0].name, "FNATIC");
        assert_eq!(emea.teams[0].rank, 1);
    }

    #[test]
    fn header_rows_are_skipped() {
        let document = Html::parse_document(STANDINGS_PAGE);
        let standings = parse_standings(&document, 2025).unwrap();
        // The th-only header row contributes no team.
        assert!(standings.circuits.iter().all(|c| !c.teams.is_empty()));
    }
}
