//! Watch-list statistics for the dashboard.
//!
//! Aggregates the viewer's list-entry scores (0–100 scale) into the two
//! chart shapes the statistics page renders: monthly averages and a score
//! distribution in buckets of ten.

use std::collections::{BTreeMap, HashSet};

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Datelike};
use serde::{Deserialize, Serialize};

use crate::anilist::model::{AiringSchedule, Media};
use crate::calendar::event::DEFAULT_EPISODE_MINUTES;
use crate::errors::AppError;
use crate::state::AppState;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One scored list entry attributed to the month it was last updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub month: String,
    pub score: f64,
}

/// One chart point: a label (month or score range) and its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringData {
    pub label: String,
    pub value: f64,
}

/// Average score per calendar month, in calendar order, months without
/// entries omitted.
pub fn monthly_average_scores(entries: &[ScoreEntry]) -> Vec<ScoringData> {
    let mut sums: BTreeMap<usize, (f64, u32)> = BTreeMap::new();
    for entry in entries {
        if let Some(index) = MONTHS.iter().position(|m| *m == entry.month) {
            let slot = sums.entry(index).or_insert((0.0, 0));
            slot.0 += entry.score;
            slot.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(index, (sum, count))| ScoringData {
            label: MONTHS[index].to_string(),
            value: (sum / f64::from(count)).round(),
        })
        .collect()
}

/// Score counts in ten-wide buckets (`"70 - 79"`), with a dedicated `"100"`
/// bucket, sorted by lower bound.
pub fn score_range_histogram(entries: &[ScoreEntry]) -> Vec<ScoringData> {
    let mut counts: BTreeMap<i64, u32> = BTreeMap::new();
    for entry in entries {
        let score = entry.score;
        let lower = if score >= 100.0 {
            100
        } else {
            (score / 10.0).floor() as i64 * 10
        };
        *counts.entry(lower).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(lower, count)| ScoringData {
            label: if lower == 100 {
                "100".to_string()
            } else {
                format!("{lower} - {}", lower + 9)
            },
            value: f64::from(count),
        })
        .collect()
}

/// Formats minutes of watch time as `"2d 3h 30m"` / `"1h 45m"` / `"30m"`.
pub fn format_watch_time(minutes: f64) -> String {
    let total_minutes = minutes.max(0.0).floor() as i64;
    let days = total_minutes / (24 * 60);
    let remaining = total_minutes % (24 * 60);
    let hours = remaining / 60;
    let mins = remaining % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 || days > 0 {
        parts.push(format!("{hours}h"));
    }
    parts.push(format!("{mins}m"));
    parts.join(" ")
}

/// The viewer's list entry for a media, flattened for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEntry {
    pub media_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// Extracts the viewer's entry from a media, if one exists.
pub fn watch_entry(media: &Media) -> Option<WatchEntry> {
    media.media_list_entry.as_ref().map(|entry| WatchEntry {
        media_id: media.id,
        status: entry.status.clone(),
        score: entry.score,
        progress: entry.progress,
        repeat: entry.repeat,
        updated_at: entry.updated_at,
    })
}

/// Estimated minutes watched across the window's list entries: progress times
/// episode duration, counted once per distinct media.
pub fn total_watch_minutes(schedules: &[AiringSchedule]) -> f64 {
    let mut seen = HashSet::new();
    let mut total = 0.0;
    for schedule in schedules {
        let Some(media) = schedule.media.as_ref() else {
            continue;
        };
        if !seen.insert(media.id) {
            continue;
        }
        let Some(entry) = media.media_list_entry.as_ref() else {
            continue;
        };
        let progress = f64::from(entry.progress.unwrap_or(0));
        let duration = media
            .duration
            .filter(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_EPISODE_MINUTES) as f64;
        total += progress * duration;
    }
    total
}

/// Builds score entries from an airing window, one per distinct scored media,
/// attributed to the month the entry was last updated.
pub fn score_entries_from_schedules(schedules: &[AiringSchedule]) -> Vec<ScoreEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for schedule in schedules {
        let Some(media) = schedule.media.as_ref() else {
            continue;
        };
        if !seen.insert(media.id) {
            continue;
        }
        let Some(entry) = watch_entry(media) else {
            continue;
        };
        let (Some(score), Some(updated_at)) = (entry.score, entry.updated_at) else {
            continue;
        };
        if score <= 0.0 {
            continue;
        }
        if let Some(month) = month_name(updated_at) {
            entries.push(ScoreEntry {
                month: month.to_string(),
                score,
            });
        }
    }
    entries
}

fn month_name(unix_seconds: i64) -> Option<&'static str> {
    DateTime::from_timestamp(unix_seconds, 0).map(|at| MONTHS[at.month0() as usize])
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP surface
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreStatsQuery {
    pub airing_at_greater: i64,
    pub airing_at_lesser: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreStatsResponse {
    pub monthly: Vec<ScoringData>,
    pub ranges: Vec<ScoringData>,
    pub scored_entries: usize,
    /// Human-readable estimate, e.g. `"2d 3h 30m"`.
    pub watch_time: String,
}

/// GET /api/v1/stats/scores
///
/// Score statistics over the viewer's list entries inside an airing window.
pub async fn handle_score_stats(
    State(state): State<AppState>,
    Query(params): Query<ScoreStatsQuery>,
) -> Result<Json<ScoreStatsResponse>, AppError> {
    if params.airing_at_lesser <= params.airing_at_greater {
        return Err(AppError::Validation(
            "airingAtLesser must be after airingAtGreater".to_string(),
        ));
    }
    let schedules = state
        .schedules
        .schedules_between(params.airing_at_greater, params.airing_at_lesser)
        .await;
    let entries = score_entries_from_schedules(&schedules);
    Ok(Json(ScoreStatsResponse {
        monthly: monthly_average_scores(&entries),
        ranges: score_range_histogram(&entries),
        scored_entries: entries.len(),
        watch_time: format_watch_time(total_watch_minutes(&schedules)),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anilist::model::{MediaListEntry, MediaTitle};

    fn entry(month: &str, score: f64) -> ScoreEntry {
        ScoreEntry {
            month: month.to_string(),
            score,
        }
    }

    #[test]
    fn monthly_averages_round_and_follow_calendar_order() {
        let entries = vec![
            entry("March", 70.0),
            entry("January", 80.0),
            entry("March", 75.0),
            entry("January", 81.0),
        ];
        let monthly = monthly_average_scores(&entries);
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].label, "January");
        assert_eq!(monthly[0].value, 81.0); // (80 + 81) / 2 = 80.5, rounded
        assert_eq!(monthly[1].label, "March");
        assert_eq!(monthly[1].value, 73.0); // 72.5 rounded
    }

    #[test]
    fn unknown_months_are_ignored() {
        let monthly = monthly_average_scores(&[entry("Smarch", 50.0)]);
        assert!(monthly.is_empty());
    }

    #[test]
    fn histogram_buckets_by_ten_with_dedicated_top_bucket() {
        let entries = vec![
            entry("January", 100.0),
            entry("January", 95.0),
            entry("January", 91.0),
            entry("January", 45.0),
            entry("January", 7.0),
        ];
        let ranges = score_range_histogram(&entries);
        let labels: Vec<&str> = ranges.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["0 - 9", "40 - 49", "90 - 99", "100"]);
        assert_eq!(ranges[2].value, 2.0);
        assert_eq!(ranges[3].value, 1.0);
    }

    #[test]
    fn watch_time_formatting() {
        assert_eq!(format_watch_time(30.0), "30m");
        assert_eq!(format_watch_time(105.0), "1h 45m");
        assert_eq!(format_watch_time(2.0 * 24.0 * 60.0 + 210.0), "2d 3h 30m");
        assert_eq!(format_watch_time(24.0 * 60.0), "1d 0h 0m");
        assert_eq!(format_watch_time(0.0), "0m");
        assert_eq!(format_watch_time(59.9), "59m");
    }

    fn scored_media(id: i64, score: Option<f64>, updated_at: Option<i64>) -> Media {
        Media {
            id,
            title: Some(MediaTitle {
                english: Some("Title".into()),
                romaji: None,
                native: None,
                user_preferred: None,
            }),
            duration: Some(24),
            episodes: None,
            format: None,
            status: None,
            season: None,
            season_year: None,
            country_of_origin: None,
            genres: Vec::new(),
            site_url: None,
            average_score: None,
            mean_score: None,
            favourites: None,
            banner_image: None,
            cover_image: None,
            next_airing_episode: None,
            media_list_entry: Some(MediaListEntry {
                status: Some("COMPLETED".into()),
                score,
                repeat: None,
                progress: None,
                updated_at,
                started_at: None,
                completed_at: None,
            }),
        }
    }

    #[test]
    fn schedules_deduplicate_media_and_skip_unscored_entries() {
        // 2026-03-15 12:00:00 UTC.
        let march = 1_773_576_000;
        let schedules = vec![
            AiringSchedule {
                airing_at: 1,
                episode: 1,
                time_until_airing: None,
                media: Some(scored_media(1, Some(85.0), Some(march))),
            },
            // Same media, later episode: counted once.
            AiringSchedule {
                airing_at: 2,
                episode: 2,
                time_until_airing: None,
                media: Some(scored_media(1, Some(85.0), Some(march))),
            },
            // Unscored entry is skipped.
            AiringSchedule {
                airing_at: 3,
                episode: 1,
                time_until_airing: None,
                media: Some(scored_media(2, None, Some(march))),
            },
            AiringSchedule {
                airing_at: 4,
                episode: 1,
                time_until_airing: None,
                media: None,
            },
        ];
        let entries = score_entries_from_schedules(&schedules);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].score, 85.0);
        assert_eq!(entries[0].month, "March");
    }

    #[test]
    fn watch_minutes_multiply_progress_by_duration_once_per_media() {
        let mut a = scored_media(1, Some(80.0), Some(100));
        if let Some(entry) = a.media_list_entry.as_mut() {
            entry.progress = Some(4);
        }
        let mut b = scored_media(2, None, None);
        if let Some(entry) = b.media_list_entry.as_mut() {
            entry.progress = Some(2);
        }
        b.duration = Some(30);

        let schedules = vec![
            AiringSchedule {
                airing_at: 1,
                episode: 1,
                time_until_airing: None,
                media: Some(a.clone()),
            },
            AiringSchedule {
                airing_at: 2,
                episode: 2,
                time_until_airing: None,
                media: Some(a),
            },
            AiringSchedule {
                airing_at: 3,
                episode: 1,
                time_until_airing: None,
                media: Some(b),
            },
        ];
        assert_eq!(total_watch_minutes(&schedules), 4.0 * 24.0 + 2.0 * 30.0);
    }

    #[test]
    fn watch_entry_flattens_the_list_entry() {
        let media = scored_media(7, Some(90.0), Some(100));
        let entry = watch_entry(&media).expect("entry");
        assert_eq!(entry.media_id, 7);
        assert_eq!(entry.score, Some(90.0));
        assert_eq!(entry.status.as_deref(), Some("COMPLETED"));
    }
}
