//! Result Shaping Module
//!
//! Derives the client-facing view of backend documents.
//!
//! ## Responsibilities
//! - **Projection**: Applying include/exclude dot-path rules to a document while
//!   preserving the mandatory floor of fields every catalog entry must carry.
//! - **Linking**: Computing per-document and response-level navigation links,
//!   all relative to a caller-supplied endpoint base.
//! - **Wrapping**: Assembling the FeatureCollection response envelope around a
//!   result page without altering its metadata.

pub mod links;
pub mod projector;
