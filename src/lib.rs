//! Alkaline: convert local files through CloudConvert.
//!
//! The HTTP client lives in the `alkaline-cloudconvert` crate. This crate adds
//! configuration, the user's file selection, background task handles and the
//! wording shown to users.

pub mod config;
pub mod messages;
pub mod selection;
pub mod tasks;
