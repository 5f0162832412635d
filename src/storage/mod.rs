//! In-Memory Backend Module
//!
//! A reference implementation of the backend boundary: a concurrent in-memory
//! document store that answers [`SearchBackend`](crate::search::backend::SearchBackend)
//! queries and provides the transform/sink pair consumed by the ingest pipeline.
//!
//! ## Core Concepts
//! - **Spaces**: Collections and Items live in separate maps, mirroring the two
//!   document spaces of the search protocol.
//! - **Evaluation**: Filters are evaluated per document (ids, parent collections,
//!   spatial overlap, temporal window, attribute operators), then sorted and paged.
//! - **Honest metadata**: `found` counts every match, `returned` the page slice,
//!   so paging invariants hold end to end.

pub mod memory;
