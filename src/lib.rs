//! `Sanctify` - live presentation for church services.
//!
//! This crate manages the content of a service (songs, scripture, media,
//! presentations and themes, each stored as JSON on disk) and drives the
//! audience-facing live output together with the operator's preview.

// Re-export public modules for use in integration tests and as a library
pub mod bible;
pub mod config;
pub mod constants;
pub mod error;
pub mod library;
pub mod media;
pub mod presentations;
pub mod schedule;
pub mod services;
pub mod settings;
pub mod songs;
pub mod stage;
pub mod store;
pub mod themes;
pub mod types;
