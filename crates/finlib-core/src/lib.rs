//! # finlib core
//!
//! I/O-free logic for browsing a remote document collection: document
//! models, the filter state and its shareable link form, the list view
//! state machine with last-request-wins completion, and the
//! [`DocumentSource`](source::DocumentSource) seam the fetcher reads through.
//!
//! This crate has no tokio, HTTP, or filesystem dependencies.

pub mod catalog;
pub mod error;
pub mod filter;
pub mod list_view;
pub mod models;
pub mod query_state;
pub mod source;

pub use error::FetchError;
pub use filter::{FilterKey, FilterState, Page};
pub use list_view::{Completion, FetchState, ListView, RequestTicket};
pub use query_state::QueryStateManager;
