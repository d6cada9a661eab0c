// src/core/trace.rs

//! Trace id generation for per-connection log correlation.

use uuid::Uuid;

/// The number of hex characters kept from the generated UUID.
const TRACE_ID_LEN: usize = 16;

/// Generates a short, globally unique trace id rendered as lowercase hex.
pub fn generate_trace_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(TRACE_ID_LEN);
    id
}
