//! Wire model for the AniList media API.
//!
//! Field names mirror the GraphQL schema (camelCase on the wire). Everything
//! beyond the schedule timestamps is optional: the upstream routinely omits
//! fields, and the dashboard tolerates holes.

use serde::{Deserialize, Serialize};

/// One airing episode occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiringSchedule {
    /// Unix timestamp of the episode's air time.
    pub airing_at: i64,
    pub episode: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_until_airing: Option<i64>,
    #[serde(default)]
    pub media: Option<Media>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: i64,
    #[serde(default)]
    pub title: Option<MediaTitle>,
    /// Episode duration in minutes.
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub episodes: Option<i32>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub season_year: Option<i32>,
    #[serde(default)]
    pub country_of_origin: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default)]
    pub average_score: Option<i32>,
    #[serde(default)]
    pub mean_score: Option<i32>,
    #[serde(default)]
    pub favourites: Option<i32>,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub cover_image: Option<CoverImage>,
    #[serde(default)]
    pub next_airing_episode: Option<NextAiringEpisode>,
    #[serde(default)]
    pub media_list_entry: Option<MediaListEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTitle {
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub romaji: Option<String>,
    #[serde(default)]
    pub native: Option<String>,
    #[serde(default)]
    pub user_preferred: Option<String>,
}

impl MediaTitle {
    /// Display fallback chain used by the search surface.
    pub fn display(&self) -> Option<&str> {
        self.english
            .as_deref()
            .or(self.romaji.as_deref())
            .or(self.native.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub extra_large: Option<String>,
    /// Dominant color of the artwork, used as the card theme color.
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextAiringEpisode {
    pub airing_at: i64,
    pub episode: i32,
}

/// The viewer's list entry for a media, when authenticated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaListEntry {
    #[serde(default)]
    pub status: Option<String>,
    /// Score on the 0–100 scale.
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub repeat: Option<i32>,
    #[serde(default)]
    pub progress: Option<i32>,
    /// Unix timestamp of the entry's last update.
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub started_at: Option<FuzzyDate>,
    #[serde(default)]
    pub completed_at: Option<FuzzyDate>,
}

/// AniList's partial date: any component may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyDate {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub day: Option<u32>,
}
