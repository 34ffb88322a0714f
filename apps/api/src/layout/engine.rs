//! Event-card layout decision engine.
#![allow(dead_code)]
//!
//! Given a card's measured pixel box and the event's semantic size (duration
//! relative to the calendar's time step), decides which visual elements fit:
//! how many title lines, whether the period row and badge row are shown, and
//! the typography scale for each.
//!
//! Priority order is **title > period > badges**: the title always keeps at
//! least one line, badges are sacrificed before the period text when the
//! vertical budget runs out.
//!
//! The function is pure and total — no I/O, no clock, never panics. Callers
//! normalize inputs first (an unmeasured dimension is `f64::INFINITY`, not an
//! error). All heuristic thresholds live in [`LayoutTuning`] so the whole
//! engine behaves as a configuration-driven scoring function.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Input / output types
// ────────────────────────────────────────────────────────────────────────────

/// Pixel dimensions of an event card as reported by the measurement source.
///
/// `f64::INFINITY` in either dimension means "not yet measured". The engine
/// treats an unmeasured box permissively rather than as an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasuredBox {
    pub width: f64,
    pub height: f64,
}

impl MeasuredBox {
    /// Sentinel for a card that has not been observed yet.
    pub const UNMEASURED: MeasuredBox = MeasuredBox {
        width: f64::INFINITY,
        height: f64::INFINITY,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

/// Typography class of the period ("20:30 - 20:54") row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodClass {
    Tiny,
    Small,
    Normal,
}

/// Size variant of the badge row (episode number, format, score badges).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeSize {
    Xs,
    Sm,
    Md,
}

/// The layout decision for one event card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLayout {
    pub show_badges: bool,
    pub show_period: bool,
    /// Title line count, always in `1..=4`.
    pub title_lines: u8,
    pub period_class: PeriodClass,
    pub badge_size: BadgeSize,
    /// Title font multiplier, always in `0.7..=2.2`.
    pub font_scale: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Tuning
// ────────────────────────────────────────────────────────────────────────────

/// Every heuristic threshold of the engine, as named fields.
///
/// Defaults reproduce the calibrated production values. The thresholds are a
/// visual policy, not a hard contract; recalibration must keep the ordering
/// "narrower card → fewer extras".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutTuning {
    /// Clamp bounds for how many time-step slots an event spans.
    pub min_steps_ratio: f64,
    pub max_steps_ratio: f64,

    /// Normalization for how much title text must fit per line.
    pub title_chars_per_line: f64,
    pub min_title_density: f64,
    pub max_title_density: f64,

    /// Linear ramps mapping measured pixels to a `0..=1` visual scale.
    pub width_ramp_start_px: f64,
    pub width_ramp_span_px: f64,
    pub height_ramp_start_px: f64,
    pub height_ramp_span_px: f64,
    /// Vertical room dominates the combined scale: title wrapping is vertical.
    pub width_weight: f64,
    pub height_weight: f64,

    /// Visual-scale thresholds for the period typography class.
    pub period_tiny_below: f64,
    pub period_small_below: f64,

    /// Joint width/height/scale thresholds for the badge size.
    pub badge_xs_width_px: f64,
    pub badge_xs_height_px: f64,
    pub badge_xs_scale: f64,
    pub badge_sm_width_px: f64,
    pub badge_sm_height_px: f64,
    pub badge_sm_scale: f64,

    /// Title font multiplier clamp.
    pub min_font_scale: f64,
    pub max_font_scale: f64,

    /// Multiplier turning the steps ratio into a theoretical line count.
    pub base_lines_factor: f64,
    pub max_title_lines: u8,

    /// Width defaults: below `narrow` badges are off, below `tiny` the period
    /// is off too (and below `narrow` with a long title).
    pub narrow_width_px: f64,
    pub tiny_width_px: f64,
    pub long_title_chars: usize,

    /// Vertical pixel budget.
    pub vertical_padding_px: f64,
    pub row_gap_px: f64,
    pub min_available_px: f64,

    /// Per-row pixel costs.
    pub title_line_base_px: f64,
    pub title_line_scale_px: f64,
    pub min_title_line_px: f64,
    pub max_title_line_px: f64,
    pub period_row_tiny_px: f64,
    pub period_row_small_px: f64,
    pub period_row_normal_px: f64,
    pub badge_row_xs_px: f64,
    pub badge_row_sm_px: f64,
    pub badge_row_md_px: f64,

    /// Tie-break pass: cards at or below both tiny-card bounds drop badges
    /// even when they nominally fit; very narrow cards drop them whenever
    /// that recovers a title line.
    pub tiny_card_width_px: f64,
    pub tiny_card_height_px: f64,
    pub very_narrow_width_px: f64,
    /// Roomy override: cards at or above both bounds keep their badges
    /// regardless of the tie-break penalties.
    pub roomy_card_width_px: f64,
    pub roomy_card_height_px: f64,
}

impl Default for LayoutTuning {
    fn default() -> Self {
        Self {
            min_steps_ratio: 0.75,
            max_steps_ratio: 8.0,
            title_chars_per_line: 28.0,
            min_title_density: 0.8,
            max_title_density: 2.8,
            width_ramp_start_px: 84.0,
            width_ramp_span_px: 140.0,
            height_ramp_start_px: 24.0,
            height_ramp_span_px: 76.0,
            width_weight: 0.45,
            height_weight: 0.55,
            period_tiny_below: 0.35,
            period_small_below: 0.72,
            badge_xs_width_px: 160.0,
            badge_xs_height_px: 56.0,
            badge_xs_scale: 0.62,
            badge_sm_width_px: 220.0,
            badge_sm_height_px: 74.0,
            badge_sm_scale: 0.9,
            min_font_scale: 0.7,
            max_font_scale: 2.2,
            base_lines_factor: 1.35,
            max_title_lines: 4,
            narrow_width_px: 120.0,
            tiny_width_px: 92.0,
            long_title_chars: 12,
            vertical_padding_px: 8.0,
            row_gap_px: 2.0,
            min_available_px: 12.0,
            title_line_base_px: 9.4,
            title_line_scale_px: 2.3,
            min_title_line_px: 10.0,
            max_title_line_px: 14.5,
            period_row_tiny_px: 11.0,
            period_row_small_px: 12.5,
            period_row_normal_px: 14.0,
            badge_row_xs_px: 14.0,
            badge_row_sm_px: 16.0,
            badge_row_md_px: 18.0,
            tiny_card_width_px: 140.0,
            tiny_card_height_px: 46.0,
            very_narrow_width_px: 120.0,
            roomy_card_width_px: 220.0,
            roomy_card_height_px: 74.0,
        }
    }
}

impl LayoutTuning {
    fn period_row_px(&self, class: PeriodClass) -> f64 {
        match class {
            PeriodClass::Tiny => self.period_row_tiny_px,
            PeriodClass::Small => self.period_row_small_px,
            PeriodClass::Normal => self.period_row_normal_px,
        }
    }

    fn badge_row_px(&self, size: BadgeSize) -> f64 {
        match size {
            BadgeSize::Xs => self.badge_row_xs_px,
            BadgeSize::Sm => self.badge_row_sm_px,
            BadgeSize::Md => self.badge_row_md_px,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring helpers
// ────────────────────────────────────────────────────────────────────────────

/// How many calendar step slots the event spans, clamped so extreme durations
/// don't produce degenerate scales.
pub fn steps_ratio(duration_minutes: f64, time_step_minutes: f64, tuning: &LayoutTuning) -> f64 {
    (duration_minutes / time_step_minutes.max(1.0))
        .clamp(tuning.min_steps_ratio, tuning.max_steps_ratio)
}

/// Combined `0..=1` size score of a measured box.
///
/// Width and height are ramped independently, then mixed with the height
/// dominating. Unmeasured boxes score a neutral 0.5.
pub fn visual_scale(bx: MeasuredBox, tuning: &LayoutTuning) -> f64 {
    if !bx.is_measured() {
        return 0.5;
    }
    let width_scale =
        ((bx.width - tuning.width_ramp_start_px) / tuning.width_ramp_span_px).clamp(0.0, 1.0);
    let height_scale =
        ((bx.height - tuning.height_ramp_start_px) / tuning.height_ramp_span_px).clamp(0.0, 1.0);
    (width_scale * tuning.width_weight + height_scale * tuning.height_weight).clamp(0.0, 1.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Decision function
// ────────────────────────────────────────────────────────────────────────────

/// Computes the layout for one event card.
///
/// `title_length` is the character count of the title that must be wrapped.
/// Inputs are expected pre-normalized: NaN dimensions become `INFINITY`
/// (unmeasured), NaN durations become 0 — see the HTTP layer.
pub fn compute_layout(
    bx: MeasuredBox,
    duration_minutes: f64,
    time_step_minutes: f64,
    title_length: usize,
    tuning: &LayoutTuning,
) -> EventLayout {
    let ratio = steps_ratio(duration_minutes, time_step_minutes, tuning);
    let title_density = (title_length as f64 / tuning.title_chars_per_line)
        .clamp(tuning.min_title_density, tuning.max_title_density);
    let scale = visual_scale(bx, tuning);

    let period_class = if scale < tuning.period_tiny_below {
        PeriodClass::Tiny
    } else if scale < tuning.period_small_below {
        PeriodClass::Small
    } else {
        PeriodClass::Normal
    };

    let badge_size = if bx.width < tuning.badge_xs_width_px
        || bx.height < tuning.badge_xs_height_px
        || scale < tuning.badge_xs_scale
    {
        BadgeSize::Xs
    } else if bx.width < tuning.badge_sm_width_px
        || bx.height < tuning.badge_sm_height_px
        || scale < tuning.badge_sm_scale
    {
        BadgeSize::Sm
    } else {
        BadgeSize::Md
    };

    let font_scale = (ratio / title_density).clamp(tuning.min_font_scale, tuning.max_font_scale);
    let max_lines = f64::from(tuning.max_title_lines);
    let base_lines = (ratio * tuning.base_lines_factor / title_density).clamp(1.0, max_lines);

    // No measurement yet: show everything at the theoretical line count.
    if !bx.is_measured() {
        return EventLayout {
            show_badges: true,
            show_period: true,
            title_lines: base_lines.round() as u8,
            period_class,
            badge_size,
            font_scale,
        };
    }

    let MeasuredBox { width, height } = bx;

    // Width-only visibility defaults.
    let mut show_badges = width > tuning.narrow_width_px;
    let mut show_period = !(width <= tuning.tiny_width_px
        || (width <= tuning.narrow_width_px && title_length > tuning.long_title_chars));

    // Vertical pixel budget.
    let title_line_px = (tuning.title_line_base_px + font_scale * tuning.title_line_scale_px)
        .clamp(tuning.min_title_line_px, tuning.max_title_line_px);
    let period_row_px = tuning.period_row_px(period_class);
    let badge_row_px = tuning.badge_row_px(badge_size);
    let available = (height - tuning.vertical_padding_px).max(tuning.min_available_px);

    // Hard floors on the real height.
    let min_height_for_period =
        tuning.vertical_padding_px + title_line_px + period_row_px + tuning.row_gap_px;
    let min_height_for_badges =
        tuning.vertical_padding_px + title_line_px + badge_row_px + tuning.row_gap_px;
    if height < min_height_for_period {
        show_period = false;
    }
    if height < min_height_for_badges {
        show_badges = false;
    }

    let fit_lines = |period: bool, badges: bool| -> i32 {
        let extra_rows = i32::from(period) + i32::from(badges);
        let extras_px = if period { period_row_px } else { 0.0 }
            + if badges { badge_row_px } else { 0.0 }
            + f64::from(extra_rows) * tuning.row_gap_px;
        ((available - extras_px) / title_line_px).floor() as i32
    };

    // The title must keep at least one line: badges go first, then the period.
    let mut possible = fit_lines(show_period, show_badges);
    if possible < 1 && show_badges {
        show_badges = false;
        possible = fit_lines(show_period, show_badges);
    }
    if possible < 1 && show_period {
        show_period = false;
        possible = fit_lines(show_period, show_badges);
    }

    // Tie-break pass: badges stay while they visually fit, except on cramped
    // cards where the title trade-off is disproportionate. Roomy cards keep
    // their badges regardless of the penalties.
    if show_badges {
        let lines_with_badges = fit_lines(show_period, true);
        let lines_without_badges = fit_lines(show_period, false);
        let roomy = width >= tuning.roomy_card_width_px && height >= tuning.roomy_card_height_px;
        let no_room_for_any_title = lines_with_badges < 1;
        let tiny_card_penalty = !roomy
            && width <= tuning.tiny_card_width_px
            && height <= tuning.tiny_card_height_px
            && lines_without_badges >= 1;
        let heavy_tradeoff_on_very_narrow = !roomy
            && width <= tuning.very_narrow_width_px
            && lines_with_badges < 1
            && lines_without_badges >= 1;

        if no_room_for_any_title || tiny_card_penalty || heavy_tradeoff_on_very_narrow {
            show_badges = false;
            possible = fit_lines(show_period, show_badges);
        }
    }

    let feasible = i64::from(possible.max(1));
    let title_lines = (base_lines.floor() as i64)
        .min(feasible)
        .clamp(1, i64::from(tuning.max_title_lines)) as u8;

    EventLayout {
        show_badges,
        show_period,
        title_lines,
        period_class,
        badge_size,
        font_scale,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> LayoutTuning {
        LayoutTuning::default()
    }

    // ── calibrated reference card ───────────────────────────────────────────

    #[test]
    fn roomy_card_shows_everything_with_md_badges() {
        let layout = compute_layout(MeasuredBox::new(300.0, 100.0), 20.0, 20.0, 10, &tuning());
        assert!(layout.show_badges);
        assert!(layout.show_period);
        assert_eq!(layout.badge_size, BadgeSize::Md);
        assert_eq!(layout.period_class, PeriodClass::Normal);
        assert_eq!(layout.title_lines, 1);
        assert!((layout.font_scale - 1.25).abs() < 1e-9);
    }

    // ── unmeasured sentinel ─────────────────────────────────────────────────

    #[test]
    fn unmeasured_box_gets_permissive_layout() {
        // ratio 3, density 0.8 → base_lines clamps to 4.
        let layout = compute_layout(MeasuredBox::UNMEASURED, 60.0, 20.0, 10, &tuning());
        assert!(layout.show_badges);
        assert!(layout.show_period);
        assert_eq!(layout.title_lines, 4);
        // Neutral 0.5 visual scale on unmeasured boxes.
        assert_eq!(layout.period_class, PeriodClass::Small);
        assert_eq!(layout.badge_size, BadgeSize::Xs);
    }

    #[test]
    fn partially_measured_box_is_still_unmeasured() {
        let layout = compute_layout(
            MeasuredBox::new(300.0, f64::INFINITY),
            20.0,
            20.0,
            40,
            &tuning(),
        );
        assert!(layout.show_badges);
        assert!(layout.show_period);
    }

    // ── invariants ──────────────────────────────────────────────────────────

    #[test]
    fn title_lines_stay_within_bounds_across_input_grid() {
        let t = tuning();
        for &width in &[1.0, 60.0, 92.0, 120.0, 140.0, 200.0, 400.0, f64::INFINITY] {
            for &height in &[1.0, 20.0, 46.0, 74.0, 150.0, f64::INFINITY] {
                for &duration in &[0.5, 1.0, 20.0, 90.0, 600.0] {
                    for &step in &[5.0, 20.0, 120.0] {
                        for &len in &[0usize, 8, 28, 120] {
                            let layout = compute_layout(
                                MeasuredBox::new(width, height),
                                duration,
                                step,
                                len,
                                &t,
                            );
                            assert!(
                                (1..=4).contains(&layout.title_lines),
                                "title_lines out of range for {width}x{height} d={duration} s={step} len={len}"
                            );
                            assert!((0.7..=2.2).contains(&layout.font_scale));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn title_survives_on_a_sliver_of_a_card() {
        let layout = compute_layout(MeasuredBox::new(200.0, 14.0), 20.0, 20.0, 30, &tuning());
        assert_eq!(layout.title_lines, 1);
        assert!(!layout.show_period);
        assert!(!layout.show_badges);
    }

    #[test]
    fn more_height_never_costs_title_lines_or_extras() {
        let t = tuning();
        let mut last_lines = 0u8;
        let mut period_seen = false;
        let mut badges_seen = false;
        for height in 12..200 {
            let layout = compute_layout(
                MeasuredBox::new(150.0, f64::from(height)),
                40.0,
                20.0,
                20,
                &t,
            );
            assert!(
                layout.title_lines >= last_lines,
                "title_lines dropped at height {height}"
            );
            if period_seen {
                assert!(layout.show_period, "period vanished at height {height}");
            }
            if badges_seen {
                assert!(layout.show_badges, "badges vanished at height {height}");
            }
            last_lines = layout.title_lines;
            period_seen = layout.show_period;
            badges_seen = layout.show_badges;
        }
    }

    // ── visibility defaults and floors ──────────────────────────────────────

    #[test]
    fn narrow_width_disables_badges_by_default() {
        let layout = compute_layout(MeasuredBox::new(110.0, 200.0), 20.0, 20.0, 10, &tuning());
        assert!(!layout.show_badges);
        assert!(layout.show_period);
    }

    #[test]
    fn tiny_width_disables_period_too() {
        let layout = compute_layout(MeasuredBox::new(90.0, 200.0), 20.0, 20.0, 10, &tuning());
        assert!(!layout.show_badges);
        assert!(!layout.show_period);
    }

    #[test]
    fn long_title_on_narrow_card_disables_period() {
        let layout = compute_layout(MeasuredBox::new(110.0, 200.0), 20.0, 20.0, 25, &tuning());
        assert!(!layout.show_period);
    }

    #[test]
    fn height_floor_forces_extras_off_on_a_wide_card() {
        // Wide enough for every extra, but only 30px tall.
        let layout = compute_layout(MeasuredBox::new(300.0, 30.0), 20.0, 20.0, 10, &tuning());
        assert!(!layout.show_period);
        assert!(!layout.show_badges);
        assert_eq!(layout.title_lines, 1);
    }

    // ── period and badge classes ────────────────────────────────────────────

    #[test]
    fn period_class_follows_visual_scale_thresholds() {
        let t = tuning();
        let small = compute_layout(MeasuredBox::new(140.0, 60.0), 20.0, 20.0, 10, &t);
        assert_eq!(small.period_class, PeriodClass::Small);
        let tiny = compute_layout(MeasuredBox::new(100.0, 30.0), 20.0, 20.0, 10, &t);
        assert_eq!(tiny.period_class, PeriodClass::Tiny);
        let normal = compute_layout(MeasuredBox::new(300.0, 100.0), 20.0, 20.0, 10, &t);
        assert_eq!(normal.period_class, PeriodClass::Normal);
    }

    #[test]
    fn badge_size_shrinks_with_any_tight_dimension() {
        let t = tuning();
        // Wide and tall but visually mid-scale → sm.
        let sm = compute_layout(MeasuredBox::new(210.0, 90.0), 20.0, 20.0, 10, &t);
        assert_eq!(sm.badge_size, BadgeSize::Sm);
        // Short height alone forces xs.
        let xs = compute_layout(MeasuredBox::new(400.0, 50.0), 20.0, 20.0, 10, &t);
        assert_eq!(xs.badge_size, BadgeSize::Xs);
    }

    // ── tie-break zone table ────────────────────────────────────────────────

    #[test]
    fn badge_tiebreak_boundary_table() {
        let t = tuning();
        // (width, height, expect_badges) around the cramped-card boundaries
        // (tiny card 140x46, very narrow 120).
        let table: &[(f64, f64, bool)] = &[
            (140.0, 46.0, false),
            (120.0, 46.0, false),
            (141.0, 47.0, false),
            (141.0, 54.0, true),
            (150.0, 60.0, true),
            (300.0, 100.0, true),
        ];
        for &(width, height, expect_badges) in table {
            let layout = compute_layout(MeasuredBox::new(width, height), 20.0, 20.0, 10, &t);
            assert_eq!(
                layout.show_badges, expect_badges,
                "badges mismatch at {width}x{height}"
            );
            assert_eq!(layout.title_lines, 1, "title lost at {width}x{height}");
        }
    }

    #[test]
    fn roomy_override_keeps_badges_through_the_penalty_zone() {
        // Shrink row costs so badges nominally fit on a tiny card, then check
        // the penalty fires — unless the roomy bounds cover the card.
        let mut t = tuning();
        t.title_line_base_px = 6.0;
        t.title_line_scale_px = 0.0;
        t.min_title_line_px = 6.0;
        t.max_title_line_px = 6.0;
        t.period_row_tiny_px = 6.0;
        t.period_row_small_px = 6.0;
        t.period_row_normal_px = 6.0;
        t.badge_row_xs_px = 6.0;
        t.badge_row_sm_px = 6.0;
        t.badge_row_md_px = 6.0;

        let penalized = compute_layout(MeasuredBox::new(130.0, 44.0), 20.0, 20.0, 10, &t);
        assert!(!penalized.show_badges, "tiny-card penalty should drop badges");

        t.roomy_card_width_px = 120.0;
        t.roomy_card_height_px = 40.0;
        let overridden = compute_layout(MeasuredBox::new(130.0, 44.0), 20.0, 20.0, 10, &t);
        assert!(overridden.show_badges, "roomy override should keep badges");
    }

    // ── scoring helpers ─────────────────────────────────────────────────────

    #[test]
    fn steps_ratio_clamps_degenerate_events() {
        let t = tuning();
        assert_eq!(steps_ratio(1.0, 120.0, &t), 0.75);
        assert_eq!(steps_ratio(2400.0, 5.0, &t), 8.0);
        assert_eq!(steps_ratio(40.0, 20.0, &t), 2.0);
        // Zero step is treated as one minute.
        assert_eq!(steps_ratio(4.0, 0.0, &t), 4.0);
    }

    #[test]
    fn visual_scale_ramps_and_weights() {
        let t = tuning();
        assert_eq!(visual_scale(MeasuredBox::new(84.0, 24.0), &t), 0.0);
        assert_eq!(visual_scale(MeasuredBox::new(224.0, 100.0), &t), 1.0);
        assert_eq!(visual_scale(MeasuredBox::UNMEASURED, &t), 0.5);
        // Half-way up the height ramp only: 0.55 * 0.5.
        let half_height = visual_scale(MeasuredBox::new(84.0, 62.0), &t);
        assert!((half_height - 0.275).abs() < 1e-9);
    }
}
