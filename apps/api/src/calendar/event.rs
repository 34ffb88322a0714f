//! Calendar event cards built from airing schedules.
#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::anilist::model::AiringSchedule;
use crate::layout::{compute_layout, EventLayout, LayoutTuning, MeasuredBox};

/// Fallback when the upstream doesn't know an episode's runtime.
pub const DEFAULT_EPISODE_MINUTES: i64 = 24;

/// The calendar's zoom granularity in minutes, clamped to `5..=120` and
/// adjusted in steps of five (ctrl-scroll on the dashboard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeStep(u32);

impl TimeStep {
    pub const MIN_MINUTES: u32 = 5;
    pub const MAX_MINUTES: u32 = 120;
    pub const INCREMENT: u32 = 5;

    pub fn new(minutes: u32) -> Self {
        Self(minutes.clamp(Self::MIN_MINUTES, Self::MAX_MINUTES))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    /// Finer granularity: smaller steps.
    pub fn zoom_in(self) -> Self {
        Self::new(self.0.saturating_sub(Self::INCREMENT))
    }

    /// Coarser granularity: larger steps.
    pub fn zoom_out(self) -> Self {
        Self::new(self.0 + Self::INCREMENT)
    }
}

impl Default for TimeStep {
    fn default() -> Self {
        Self(20)
    }
}

/// One event card on the airing calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiringEvent {
    /// `"{media_id}-{episode}"`.
    pub id: String,
    pub title: String,
    /// Subtitle line, e.g. `"Episode 5"`.
    pub content: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub episode: i32,
    pub airing_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_until_airing: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_id: Option<i64>,
    /// Dominant cover-art color driving the card theme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
}

impl AiringEvent {
    pub fn from_schedule(schedule: &AiringSchedule) -> Self {
        let media = schedule.media.as_ref();
        let duration_minutes = media
            .and_then(|m| m.duration)
            .filter(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_EPISODE_MINUTES);
        let start = DateTime::from_timestamp(schedule.airing_at, 0).unwrap_or_default();
        let end = start + Duration::minutes(duration_minutes);
        let title = media
            .and_then(|m| m.title.as_ref())
            .and_then(|t| t.english.clone().or_else(|| t.romaji.clone()))
            .unwrap_or_else(|| "Unknown Title".to_string());
        let media_id = media.map(|m| m.id);
        let theme_color = media
            .and_then(|m| m.cover_image.as_ref())
            .and_then(|cover| cover.color.clone());

        Self {
            id: format!("{}-{}", media_id.unwrap_or_default(), schedule.episode),
            content: format!("Episode {}", schedule.episode),
            title,
            start,
            end,
            episode: schedule.episode,
            airing_at: schedule.airing_at,
            time_until_airing: schedule.time_until_airing,
            media_id,
            theme_color,
        }
    }

    /// Duration in whole minutes, never below one.
    pub fn duration_minutes(&self) -> f64 {
        let minutes = ((self.end - self.start).num_milliseconds() as f64 / 60_000.0).round();
        minutes.max(1.0)
    }

    /// How many zoom steps the card spans on the calendar grid.
    pub fn steps_ratio(&self, step: TimeStep) -> f64 {
        self.duration_minutes() / f64::from(step.minutes()).max(1.0)
    }

    /// Stable key pairing this card with its measured size across re-renders.
    pub fn measurement_key(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.media_id.map(|id| id.to_string()).unwrap_or_default(),
            self.start.timestamp_millis(),
            self.end.timestamp_millis(),
            self.title
        )
    }

    /// Layout decision for this card at the given measured size and zoom.
    pub fn layout(&self, bx: MeasuredBox, step: TimeStep, tuning: &LayoutTuning) -> EventLayout {
        compute_layout(
            bx,
            self.duration_minutes(),
            f64::from(step.minutes()),
            self.title.chars().count(),
            tuning,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anilist::model::{CoverImage, Media, MediaTitle};

    fn media(english: Option<&str>, romaji: Option<&str>, duration: Option<i64>) -> Media {
        Media {
            id: 21,
            title: Some(MediaTitle {
                english: english.map(str::to_string),
                romaji: romaji.map(str::to_string),
                native: None,
                user_preferred: None,
            }),
            duration,
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
            cover_image: Some(CoverImage {
                medium: None,
                large: None,
                extra_large: None,
                color: Some("#e4a15d".into()),
            }),
            next_airing_episode: None,
            media_list_entry: None,
        }
    }

    fn schedule(media: Option<Media>) -> AiringSchedule {
        AiringSchedule {
            airing_at: 1_754_550_000,
            episode: 5,
            time_until_airing: Some(3600),
            media,
        }
    }

    #[test]
    fn builds_card_from_a_full_schedule() {
        let event = AiringEvent::from_schedule(&schedule(Some(media(
            Some("One Piece"),
            Some("One Piece"),
            Some(24),
        ))));
        assert_eq!(event.id, "21-5");
        assert_eq!(event.title, "One Piece");
        assert_eq!(event.content, "Episode 5");
        assert_eq!(event.theme_color.as_deref(), Some("#e4a15d"));
        assert_eq!(event.duration_minutes(), 24.0);
        assert_eq!(event.end - event.start, Duration::minutes(24));
    }

    #[test]
    fn title_falls_back_to_romaji_then_placeholder() {
        let romaji = AiringEvent::from_schedule(&schedule(Some(media(
            None,
            Some("Sousou no Frieren"),
            Some(24),
        ))));
        assert_eq!(romaji.title, "Sousou no Frieren");

        let missing = AiringEvent::from_schedule(&schedule(None));
        assert_eq!(missing.title, "Unknown Title");
        assert_eq!(missing.id, "0-5");
        assert!(missing.theme_color.is_none());
    }

    #[test]
    fn unknown_duration_defaults_to_a_standard_episode() {
        let event = AiringEvent::from_schedule(&schedule(Some(media(Some("X"), None, None))));
        assert_eq!(event.duration_minutes(), 24.0);

        let zero = AiringEvent::from_schedule(&schedule(Some(media(Some("X"), None, Some(0)))));
        assert_eq!(zero.duration_minutes(), 24.0);
    }

    #[test]
    fn duration_never_collapses_below_one_minute() {
        let mut event = AiringEvent::from_schedule(&schedule(None));
        event.end = event.start;
        assert_eq!(event.duration_minutes(), 1.0);
    }

    #[test]
    fn steps_ratio_scales_with_zoom() {
        let event = AiringEvent::from_schedule(&schedule(Some(media(Some("X"), None, Some(40)))));
        assert_eq!(event.steps_ratio(TimeStep::new(20)), 2.0);
        assert_eq!(event.steps_ratio(TimeStep::new(40)), 1.0);
    }

    #[test]
    fn measurement_key_is_stable_and_distinct() {
        let a = AiringEvent::from_schedule(&schedule(Some(media(Some("A"), None, Some(24)))));
        let b = AiringEvent::from_schedule(&schedule(Some(media(Some("B"), None, Some(24)))));
        assert_eq!(a.measurement_key(), a.measurement_key());
        assert_ne!(a.measurement_key(), b.measurement_key());
    }

    #[test]
    fn layout_composes_engine_inputs_from_the_card() {
        let event = AiringEvent::from_schedule(&schedule(Some(media(
            Some("One Piece"),
            None,
            Some(24),
        ))));
        let layout = event.layout(
            MeasuredBox::new(300.0, 100.0),
            TimeStep::new(20),
            &LayoutTuning::default(),
        );
        assert!(layout.show_badges);
        assert!(layout.show_period);
        // 24 minutes over a 20-minute step justifies a second title line.
        assert_eq!(layout.title_lines, 2);
    }

    #[test]
    fn time_step_clamps_and_zooms() {
        assert_eq!(TimeStep::default().minutes(), 20);
        assert_eq!(TimeStep::new(200).minutes(), 120);
        assert_eq!(TimeStep::new(1).minutes(), 5);
        assert_eq!(TimeStep::new(5).zoom_in().minutes(), 5);
        assert_eq!(TimeStep::new(120).zoom_out().minutes(), 120);
        assert_eq!(TimeStep::new(20).zoom_out().minutes(), 25);
        assert_eq!(TimeStep::new(20).zoom_in().minutes(), 15);
    }
}
