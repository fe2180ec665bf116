//! Core library for the chatform backend: domain model, file-backed
//! document store, authentication helpers and the workspace sharing
//! logic. The HTTP layer lives in the `chatform` crate.

pub mod auth;
pub mod design;
pub mod error;
pub mod model;
pub mod store;
pub mod workspace;
