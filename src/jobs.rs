use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Utc};
use itertools::Itertools;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::context::ScraperContext;
use crate::error::Result;
use crate::model::{
    Event, MatchStatus, MatchSummary, NewsItem, Ranking, Standings,
};
use crate::notify::{Notification, Notifier};
use crate::scraper::{events, matches, news, rankings, standings};
use crate::utils::simplify_name;

const MATCHES_INTERVAL: Duration = Duration::from_secs(5 * 60);
const EVENTS_INTERVAL: Duration = Duration::from_secs(30 * 60);
const NEWS_INTERVAL: Duration = Duration::from_secs(30 * 60);
const RANKINGS_INTERVAL: Duration = Duration::from_secs(30 * 60);
const STANDINGS_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
const NOTIFY_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Matches starting within this window get a push notification.
const NOTIFY_WINDOW_SECS: i64 = 900;

/// Match-list pages covered by the refresh job.
const MATCH_LIST_PAGES: u32 = 3;

/// Spawns the fixed-cadence refresh jobs that keep the cache warm, plus the
/// push-notification job. Every job logs failures and keeps running; a
/// scrape error never takes the scheduler down.
pub struct Scheduler {
    ctx: ScraperContext,
    notifier: Arc<dyn Notifier>,
}

impl Scheduler {
    pub fn new(ctx: ScraperContext, notifier: Arc<dyn Notifier>) -> Self {
        Self { ctx, notifier }
    }

    pub fn start(&self) -> Vec<JoinHandle<()>> {
        vec![
            self.spawn_refresh("matches", MATCHES_INTERVAL, refresh_matches),
            self.spawn_refresh("events", EVENTS_INTERVAL, refresh_events),
            self.spawn_refresh("news", NEWS_INTERVAL, refresh_news),
            self.spawn_refresh("rankings", RANKINGS_INTERVAL, refresh_rankings),
            self.spawn_refresh("standings", STANDINGS_INTERVAL, refresh_standings),
            self.spawn_notify(),
        ]
    }

    fn spawn_refresh<F, Fut>(&self, name: &'static str, period: Duration, job: F) -> JoinHandle<()>
    where
        F: Fn(ScraperContext) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<()>> + Send,
    {
        let ctx = self.ctx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if let Err(e) = job(ctx.clone()).await {
                    warn!(job = name, error = %e, "refresh job failed");
                }
            }
        })
    }

    fn spawn_notify(&self) -> JoinHandle<()> {
        let ctx = self.ctx.clone();
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(NOTIFY_INTERVAL);
            loop {
                interval.tick().await;
                if let Err(e) = notify_upcoming(&ctx, notifier.as_ref()).await {
                    warn!(error = %e, "notification job failed");
                }
            }
        })
    }
}

async fn store<T: Serialize>(ctx: &ScraperContext, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => {
            ctx.cache.set(key, &json, ctx.settings.cache_ttl_secs).await;
            info!(key, "cache refreshed");
        }
        Err(e) => warn!(key, error = %e, "failed to serialize cache payload"),
    }
}

async fn refresh_matches(ctx: ScraperContext) -> Result<()> {
    let items = matches::get_matches(&ctx, MATCH_LIST_PAGES).await?;
    store(&ctx, "matches", &items).await;
    Ok(())
}

async fn refresh_events(ctx: ScraperContext) -> Result<()> {
    let items = events::get_events(&ctx).await?;
    store(&ctx, "events", &items).await;
    Ok(())
}

async fn refresh_news(ctx: ScraperContext) -> Result<()> {
    let items = news::get_news(&ctx).await?;
    store(&ctx, "news", &items).await;
    Ok(())
}

async fn refresh_rankings(ctx: ScraperContext) -> Result<()> {
    let items = rankings::get_rankings(&ctx).await?;
    store(&ctx, "rankings", &items).await;
    Ok(())
}

async fn refresh_standings(ctx: ScraperContext) -> Result<()> {
    let year = Utc::now().year();
    let items = standings::get_standings(&ctx, year).await?;
    store(&ctx, &standings_key(year), &items).await;
    Ok(())
}

fn standings_key(year: i32) -> String {
    format!("standings_{year}")
}

/// Cache read with a live-parse fallback: the cache is an optimization,
/// never a correctness dependency.
async fn cached<T: serde::de::DeserializeOwned>(ctx: &ScraperContext, key: &str) -> Option<T> {
    let raw = ctx.cache.get(key).await?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "discarding undecodable cache entry");
            None
        }
    }
}

pub async fn cached_matches(ctx: &ScraperContext) -> Result<Vec<MatchSummary>> {
    match cached(ctx, "matches").await {
        Some(items) => Ok(items),
        None => matches::get_matches(ctx, MATCH_LIST_PAGES).await,
    }
}

pub async fn cached_events(ctx: &ScraperContext) -> Result<Vec<Event>> {
    match cached(ctx, "events").await {
        Some(items) => Ok(items),
        None => events::get_events(ctx).await,
    }
}

pub async fn cached_news(ctx: &ScraperContext) -> Result<Vec<NewsItem>> {
    match cached(ctx, "news").await {
        Some(items) => Ok(items),
        None => news::get_news(ctx).await,
    }
}

pub async fn cached_rankings(ctx: &ScraperContext) -> Result<Vec<Ranking>> {
    match cached(ctx, "rankings").await {
        Some(items) => Ok(items),
        None => rankings::get_rankings(ctx).await,
    }
}

pub async fn cached_standings(ctx: &ScraperContext, year: i32) -> Result<Standings> {
    match cached(ctx, &standings_key(year)).await {
        Some(items) => Ok(items),
        None => standings::get_standings(ctx, year).await,
    }
}

#[instrument(skip(ctx, notifier))]
async fn notify_upcoming(ctx: &ScraperContext, notifier: &dyn Notifier) -> Result<()> {
    let now = Utc::now();
    let upcoming = cached_matches(ctx)
        .await?
        .into_iter()
        .filter(|m| starts_within_window(m, now))
        .collect_vec();

    let mut batch = Vec::new();
    for summary in upcoming {
        match build_notification(ctx, &summary, now).await {
            Ok(message) => batch.push(message),
            Err(e) => warn!(match_id = %summary.id, error = %e, "skipping notification"),
        }
    }
    notifier.dispatch(batch);
    Ok(())
}

fn starts_within_window(summary: &MatchSummary, now: DateTime<Utc>) -> bool {
    if summary.status != MatchStatus::Upcoming {
        return false;
    }
    let Some(time) = summary.time else {
        return false;
    };
    let delta = (time - now).num_seconds();
    0 < delta && delta < NOTIFY_WINDOW_SECS
}

async fn build_notification(
    ctx: &ScraperContext,
    summary: &MatchSummary,
    now: DateTime<Utc>,
) -> Result<Notification> {
    let detail = matches::get_match(ctx, &summary.id).await?;

    let mut team_ids = Vec::new();
    for team in &detail.teams {
        if let Some(id) = ctx.cache.hget("team", &simplify_name(&team.name)).await {
            team_ids.push(id);
        }
    }

    let time = summary.time.unwrap_or(now);
    let minutes_to_start = (time - now).num_seconds() / 60;

    Ok(Notification {
        title: format!("{} vs {}", summary.team1.name, summary.team2.name),
        body: format!("Match is starting in {minutes_to_start} minutes"),
        match_id: summary.id.clone(),
        timestamp: summary.time.map(|t| t.to_rfc3339()),
        stream_url: detail.videos.streams.first().map(|s| s.url.clone()),
        condition: topic_condition(&detail.event.id, &summary.id, &team_ids),
    })
}

/// Topic condition covering the event, the match and both teams; downstream
/// dedupe keys off this expression so overlapping subscriptions get a
/// single message.
fn topic_condition(event_id: &str, match_id: &str, team_ids: &[String]) -> String {
    let mut topics = vec![format!("event-{event_id}"), format!("match-{match_id}")];
    topics.extend(team_ids.iter().map(|id| format!("team-{id}")));
    topics
        .iter()
        .map(|topic| format!("'{topic}' in topics"))
        .join(" || ")
}
