//! # Pagekit
//!
//! Presentation utilities for the frontend, shared by every page:
//!
//! - **Formatting**: human-readable counts, byte sizes, transfer rates and
//!   durations, plus `{N}` positional templating ([`fmt`]).
//! - **Element building**: declarative element trees from typed option
//!   records, recreatable from their retained configuration ([`element`]).
//! - **Popups**: timed, dismissible notification overlays ([`popup`]).
//! - **Session storage**: cookie accessors and a session-scoped cache with
//!   an injected backend ([`session`]).
//! - **Auth**: cached identity checks against the external SSO service
//!   ([`auth`]).
//! - **Page assembly**: navbar/footer fragment splicing and version
//!   fill-in ([`page`]).
//!
//! A [`state::Session`] wires all of it together once per page load.
//!
//!
//!
//! ## Notes
//!
//! There is no browser here, so the page is modeled as an explicit element
//! tree ([`document::Document`]) and fetched HTML fragments are parsed into
//! it ([`fragment`]). Network calls go through `reqwest`; everything else
//! is synchronous single-owner state.
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```

pub mod auth;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod fmt;
pub mod fragment;
pub mod page;
pub mod popup;
pub mod session;
pub mod state;

pub use error::AppError;
