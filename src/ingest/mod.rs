//! Ingest Pipeline Module
//!
//! The write path: streams one or more catalog documents through an externally
//! supplied transform/sink pair into the searchable index.
//!
//! ## Workflow
//! 1. **Source**: The submitted document(s) are pushed, in order, into an
//!    object-mode channel, followed by exactly one end-of-stream marker.
//! 2. **Transform**: Each document becomes an index-ready record.
//! 3. **Sink**: Records are bulk-written to the backend; the sink is finalized
//!    once after the last record.
//!
//! Completion is signaled exactly once per call, as success or as the first
//! stage error. No retries, no partial-success reporting.

pub mod handlers;
pub mod pipeline;
