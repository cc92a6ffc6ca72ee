// Batch pipeline: ingestion, processing, and storage

pub mod ingestion;
pub mod processing;
pub mod storage;
