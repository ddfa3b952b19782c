//! Ingest Worker Module
//!
//! Consumes raw news from the Kafka input topic, transforms each message
//! into a canonical document and indexes it, committing offsets manually so
//! delivery stays at-least-once.
//!
//! ## Message lifecycle
//! 1. **Fetch**: one message at a time, in partition order.
//! 2. **Transform**: decode, normalize, enrich (keywords, URLs, identity).
//! 3. **De-duplicate**: drop ids already seen inside the dedupe window.
//! 4. **Index**: idempotent write keyed by the deterministic id.
//! 5. **Commit**: only after a successful index or a successful DLQ
//!    hand-off; a poison message never blocks the stream while the DLQ is
//!    reachable, and never loses its offset while it is not.
//!
//! ## Submodules
//! - **`pipeline`**: The per-message transformation and the `NewsIndexer`
//!   seam the loop writes through.
//! - **`consumer`**: The fetch/commit loop and the dead-letter hand-off with
//!   bounded backoff.

pub mod consumer;
pub mod pipeline;

#[cfg(test)]
mod tests;
