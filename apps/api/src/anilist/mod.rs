//! AniList API client — the single point of entry for all AniList calls.
//!
//! Not a general GraphQL client: the two query documents this service needs
//! are fixed constants POSTed over HTTP, and the `data`/`errors` envelope is
//! decoded with plain serde types.

pub mod model;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::fetch::paginate::Page;
use model::{AiringSchedule, MediaTitle};

/// Public AniList GraphQL endpoint.
pub const DEFAULT_ANILIST_URL: &str = "https://graphql.anilist.co";
const SEARCH_PER_PAGE: u32 = 10;

const AIRING_SCHEDULES_QUERY: &str = r#"
query getAiringAnimes($page: Int, $airingAtGreater: Int, $airingAtLesser: Int) {
  Page(page: $page, perPage: 100) {
    pageInfo {
      hasNextPage
    }
    airingSchedules(airingAt_greater: $airingAtGreater, airingAt_lesser: $airingAtLesser) {
      airingAt
      episode
      timeUntilAiring
      media {
        id
        countryOfOrigin
        title {
          romaji
          english
          native
          userPreferred
        }
        nextAiringEpisode {
          airingAt
          episode
        }
        siteUrl
        format
        status
        season
        seasonYear
        episodes
        duration
        genres
        bannerImage
        coverImage {
          medium
          large
          extraLarge
          color
        }
        averageScore
        meanScore
        favourites
        mediaListEntry {
          status
          score(format: POINT_100)
          repeat
          progress
          updatedAt
          startedAt {
            year
            month
            day
          }
          completedAt {
            year
            month
            day
          }
        }
      }
    }
  }
}
"#;

const SEARCH_ANIME_QUERY: &str = r#"
query SearchAnime($search: String, $page: Int, $perPage: Int) {
  Page(page: $page, perPage: $perPage) {
    media(search: $search, type: ANIME) {
      id
      title {
        english
        romaji
        native
      }
    }
  }
}
"#;

#[derive(Debug, Error)]
pub enum AniListError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("AniList response carried no data")]
    MissingData,
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct GraphQlResponse<T> {
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AiringData {
    #[serde(rename = "Page", default)]
    page: Option<AiringPage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiringPage {
    #[serde(default)]
    page_info: Option<PageInfo>,
    #[serde(default)]
    airing_schedules: Vec<AiringSchedule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    has_next_page: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(rename = "Page", default)]
    page: Option<SearchPage>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    media: Vec<SearchMedia>,
}

#[derive(Debug, Deserialize)]
struct SearchMedia {
    id: i64,
    #[serde(default)]
    title: Option<MediaTitle>,
}

/// A title-search hit for the dashboard's autocomplete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPrediction {
    pub id: i64,
    pub title: String,
}

/// The AniList client used by all services.
/// Safe to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct AniListClient {
    client: reqwest::Client,
    url: String,
}

impl AniListClient {
    pub fn new(url: impl Into<String>) -> Result<Self, AniListError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// One page of airing schedules inside a unix-timestamp window.
    pub async fn airing_page(
        &self,
        page: u32,
        airing_at_greater: i64,
        airing_at_lesser: i64,
    ) -> Result<Page<AiringSchedule>, AniListError> {
        let data: AiringData = self
            .post(
                AIRING_SCHEDULES_QUERY,
                json!({
                    "page": page,
                    "airingAtGreater": airing_at_greater,
                    "airingAtLesser": airing_at_lesser,
                }),
            )
            .await?;

        // A missing Page is the upstream's way of ending the collection.
        let Some(page_data) = data.page else {
            return Ok(Page {
                items: Vec::new(),
                has_next_page: false,
            });
        };
        let has_next_page = page_data
            .page_info
            .and_then(|info| info.has_next_page)
            .unwrap_or(false);
        debug!(
            page,
            schedules = page_data.airing_schedules.len(),
            has_next_page,
            "fetched airing page"
        );
        Ok(Page {
            items: page_data.airing_schedules,
            has_next_page,
        })
    }

    /// Title search returning up to [`SEARCH_PER_PAGE`] predictions.
    pub async fn search(&self, search: &str) -> Result<Vec<SearchPrediction>, AniListError> {
        let data: SearchData = self
            .post(
                SEARCH_ANIME_QUERY,
                json!({
                    "search": search,
                    "page": 1,
                    "perPage": SEARCH_PER_PAGE,
                }),
            )
            .await?;

        let media = data.page.map(|page| page.media).unwrap_or_default();
        Ok(media.iter().map(prediction).collect())
    }

    async fn post<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, AniListError> {
        let response = self
            .client
            .post(&self.url)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AniListError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: GraphQlResponse<T> = response.json().await?;
        if let Some(first) = envelope.errors.into_iter().next() {
            return Err(AniListError::GraphQl(
                first
                    .message
                    .unwrap_or_else(|| "GraphQL request failed".to_string()),
            ));
        }
        envelope.data.ok_or(AniListError::MissingData)
    }
}

fn prediction(media: &SearchMedia) -> SearchPrediction {
    let title = media
        .title
        .as_ref()
        .and_then(MediaTitle::display)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Anime #{}", media.id));
    SearchPrediction {
        id: media.id,
        title,
    }
}
