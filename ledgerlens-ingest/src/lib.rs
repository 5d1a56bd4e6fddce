//! ledgerlens-ingest: load statement files from disk into candidate documents.

pub mod loader;
pub mod media;

pub use loader::{Collected, collect_candidates, load_candidate, split_dropped_paths};
pub use media::detect as detect_media_type;
