//! Hierarchical Search Module
//!
//! The core component responsible for answering catalog queries against the backend index.
//!
//! ## Overview
//! The backend is a flat document search service with no join operator, yet an Item
//! search must be scoped to Items whose owning Collection also satisfies the
//! collection-level constraints of the same query. This module resolves that with a
//! deterministic two-phase protocol: enumerate the matching Collections first, then
//! search Items restricted to those parents.
//!
//! ## Responsibilities
//! - **Orchestration**: Sequencing the Collection-phase and Item-phase backend calls.
//! - **Composition**: Shaping raw backend results into the final response via the
//!   field projector and link builder.
//! - **Boundary**: Defining the backend search contract ([`backend::SearchBackend`])
//!   consumed by both phases.
//! - **API**: Exposing search over HTTP for the server binary.
//!
//! ## Submodules
//! - **`backend`**: The backend collaborator trait and its query/error types.
//! - **`engine`**: The two-phase orchestration logic.
//! - **`handlers`**: HTTP request handlers for the axum server.
//! - **`types`**: Response envelope types shared across the crate.

pub mod backend;
pub mod engine;
pub mod handlers;
pub mod types;
