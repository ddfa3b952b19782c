//! News Pipeline Library
//!
//! This library crate defines the core modules shared by the three service
//! binaries (`worker`, `api`, `retention`).
//!
//! ## Architecture Modules
//! The system is composed of loosely coupled subsystems:
//!
//! - **`processing`**: The text-processing pipeline. Pure functions for URL
//!   extraction, Unicode-aware cleaning, keyword ranking, deterministic
//!   document identity and title synthesis.
//! - **`dedupe`**: A bounded, TTL-limited cache of recently indexed document
//!   ids, used by the worker to drop duplicates inside the dedupe window.
//! - **`worker`**: The Kafka consumer loop. Transforms raw messages into
//!   canonical documents, indexes them, and quarantines poison messages on a
//!   dead-letter topic with manual offset commits throughout.
//! - **`index`**: The Elasticsearch client and the query compiler that
//!   translates search parameters into a bool query.
//! - **`api`**: HTTP request handlers for the Axum search server.
//! - **`retention`**: The periodic sweep that deletes documents older than
//!   the configured horizon.
//! - **`config`**: Environment-driven configuration for every binary.

pub mod api;
pub mod config;
pub mod dedupe;
pub mod index;
pub mod logging;
pub mod models;
pub mod processing;
pub mod retention;
pub mod shutdown;
pub mod worker;
