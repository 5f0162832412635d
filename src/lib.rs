//! Spatiotemporal Catalog Search Engine Library
//!
//! This library crate defines the core modules of the catalog API. It serves as the
//! foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of five loosely coupled subsystems:
//!
//! - **`filter`**: The query normalization layer. Parses loosely typed client filters
//!   (spatial, temporal, attribute, sort, paging) into a validated canonical form.
//! - **`search`**: The hierarchical search orchestrator. Translates one client query
//!   into an ordered pair of backend calls that respect the Collection→Item ownership
//!   relationship, which the backend cannot join natively.
//! - **`response`**: Result shaping. Applies include/exclude field projection to
//!   documents and computes relative navigation links and paging metadata.
//! - **`ingest`**: The write path. Streams one or more documents through an externally
//!   supplied transform/sink pair into the searchable index, with end-to-end failure
//!   propagation.
//! - **`storage`**: A reference in-memory backend implementing the search and bulk-write
//!   boundaries, used by the server binary and the test suite.

pub mod filter;
pub mod ingest;
pub mod response;
pub mod search;
pub mod storage;
