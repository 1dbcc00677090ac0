//! # finlib
//!
//! Client for a financial document library: lists, filters and pages through
//! documents served over HTTP, keeps the view's filter state in a shareable
//! link, and discards responses to superseded requests.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────────┐
//! │ QueryState   │──▶│ ListFetcher  │──▶│ DocumentClient │──▶ HTTP
//! │ (link ⇄ FS)  │   │ dedup+retry  │   │   (reqwest)    │
//! └──────────────┘   └──────┬───────┘   └───────────────┘
//!                           ▼
//!                     ┌──────────┐        ┌──────────┐
//!                     │ ListView │        │  server  │  reference service
//!                     │  state   │        │  (axum)  │  over a JSON catalog
//!                     └──────────┘        └──────────┘
//! ```
//!
//! The I/O-free pieces (models, filter state, list view state machine,
//! catalog) live in the `finlib-core` crate.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`client`] | HTTP client for the document service |
//! | [`fetcher`] | Latest-request-wins list fetching with retry and dedup |
//! | [`server`] | Reference document service |
//! | [`browse`] | CLI commands and rendering |

pub mod browse;
pub mod client;
pub mod config;
pub mod fetcher;
pub mod logging;
pub mod server;
