//! Decoder for GnuPG's machine-readable output.
//!
//! GnuPG reports what it did over a status channel of `[GNUPG:]`-prefixed
//! lines, and lists keys as colon-delimited rows. This crate turns both,
//! plus the free-text version banner, into typed [`Record`]s collected in a
//! [`RecordStore`] that callers can query for signature validity,
//! fingerprints, key ids, timestamps, and trust.
//!
//! Decoding is schema-driven: every known message keyword has an entry in
//! the [`schema`] registry, and one generic decode routine handles them all.
//! Malformed input never aborts a decode; anomalies become diagnostic
//! records in the same store, and unrecognized lines pass through untouched
//! for the caller to display.
//!
//! # Example
//!
//! ```
//! use gpg_status::decode_status;
//!
//! let captured = "[GNUPG:] GOODSIG ABCDEF0123456789 Jane Doe <jane@example.com>\n\
//!                 [GNUPG:] TRUST_ULTIMATE 0";
//! let out = decode_status(captured);
//! assert_eq!(out.records.verified(), (true, "TRUST_ULTIMATE"));
//! ```
//!
//! Process invocation, argument building, and configuration are this
//! crate's callers' concern; the decoder consumes text they already
//! captured.

mod error;
pub mod mappings;
mod parse;
mod query;
pub mod schema;
mod types;

pub use error::{Error, Result};
pub use parse::{
    decode_listing, decode_listing_bytes, decode_status, decode_status_bytes,
    decode_status_lines, decode_version_banner, VersionBanner,
};
pub use query::{parse_timestamp, ListedKey, Match, Timestamp};
pub use types::{Decoded, Record, RecordStore};
