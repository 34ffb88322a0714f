use std::sync::Arc;

use crate::anilist::AniListClient;
use crate::calendar::ScheduleService;
use crate::cms::CmsClient;
use crate::config::Config;
use crate::layout::LayoutTuning;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Direct client for one-shot queries (search).
    pub anilist: AniListClient,
    /// Cached, single-flighted airing-schedule fetches.
    pub schedules: Arc<ScheduleService<AniListClient>>,
    pub cms: Arc<CmsClient>,
    /// Thresholds for the event-card layout engine.
    pub layout_tuning: LayoutTuning,
    pub config: Config,
}
