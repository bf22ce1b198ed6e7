/// Adjective extraction for duplicate-name disambiguation.
pub(crate) mod adjectives;
/// Index of previously emitted relationship names.
pub mod existing;
/// Foreign-key edge inference and the `build_plan` pipeline.
pub mod inferencer;
/// Relationship records and the plan container.
pub mod plan;
/// Collision and duplicate resolution.
pub(crate) mod resolver;
