//! HTTP surface of the chatform backend. See `chatform-core` for the
//! domain model and store.

pub mod api;
