//! Export names
//!
//! Every emitted name goes through [`normalize`] so the consumer can split
//! records on whitespace without quoting.

/// Replace spaces and periods with underscores.
///
/// Nothing else changes: case, non-ASCII characters and length are kept.
pub fn normalize(name: &str) -> String {
    name.replace([' ', '.'], "_")
}
