//! Single-entry memoization of prepared sources.
//!
//! Batch jobs walk through timestamps in order and regrid several products
//! against the same source scene. Keeping exactly one prepared source,
//! keyed by its timestamp, avoids rebuilding indexes while never holding
//! more than one scene in memory.

mod source_cache;

pub use source_cache::{SingleEntryCache, SourceCache};
