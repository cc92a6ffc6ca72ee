// Pipeline processing: normalization, reconciliation, quality checks and weekly rollups

pub mod aggregate;
pub mod normalize;
pub mod quality_gate;
pub mod reconcile;
