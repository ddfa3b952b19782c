//! Search-Index Module
//!
//! Wraps the Elasticsearch HTTP API behind a narrow client surface: ping,
//! cluster health, idempotent document writes, filtered search and batched
//! age-based deletion.
//!
//! ## Submodules
//! - **`client`**: The reqwest-backed client issuing index requests.
//! - **`query`**: The pure query compiler. Translates [`types::SearchParams`]
//!   into the bool-query body sent to the index; kept free of I/O so tests
//!   can compare serialized bodies byte-for-byte.
//! - **`types`**: Request parameters and the search result shape.

pub mod client;
pub mod query;
pub mod types;
