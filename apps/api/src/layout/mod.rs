//! Adaptive layout decisions for calendar event cards.

mod engine;

pub use engine::{
    compute_layout, steps_ratio, visual_scale, BadgeSize, EventLayout, LayoutTuning, MeasuredBox,
    PeriodClass,
};
