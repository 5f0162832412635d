//! Query Normalization Module
//!
//! Turns the loosely typed filter a client submits (JSON body or URL query string)
//! into a validated, strongly typed [`types::NormalizedFilter`].
//!
//! ## Responsibilities
//! - **Parsing**: Accepting both structured values and string-encoded variants
//!   (a `sort` parameter may arrive as a JSON array or as its string encoding).
//! - **Validation**: Rejecting malformed spatial, temporal, and paging parameters
//!   early with a structured [`types::ValidationError`] instead of propagating
//!   ambiguous shapes downstream.
//! - **Pass-through**: Attribute query operators are checked structurally but their
//!   semantics belong to the backend.

pub mod normalize;
pub mod types;

#[cfg(test)]
mod tests;
