//! Staged image uploads for the Grino marketing site.
//!
//! The crate has two halves. The client half is the state and control logic
//! behind the site's admin upload panel: an ordered staged-file selection
//! ([`staging`]), preview rendering ([`preview`]), the two local-only form
//! validators ([`forms`]), and the authenticated upload action
//! ([`uploader`]). The server half is the upload relay ([`server`]): a
//! single authenticated route that forwards files to a hosted media store
//! ([`storage`]) and returns the resulting URLs.

pub mod config;
pub mod errors;
pub mod forms;
pub mod preview;
pub mod server;
pub mod staging;
pub mod storage;
pub mod uploader;
pub mod validate;

pub use errors::{AppError, AppResult};
