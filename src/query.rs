//! Read-only queries and derived projections over a [`RecordStore`].
//!
//! Everything here is a pure function of the store: repeated calls against
//! an unmodified store return identical results.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::mappings;
use crate::types::{Record, RecordStore};

/// Record types that indicate a good or valid signature.
const GOOD_TYPES: &[&str] = &["GOODSIG", "VALIDSIG", "SIG_CREATED"];

/// Trust-level record types, one of which accompanies a good signature.
const TRUST_TYPES: &[&str] = &[
    "TRUST_UNDEFINED",
    "TRUST_NEVER",
    "TRUST_MARGINAL",
    "TRUST_FULLY",
    "TRUST_ULTIMATE",
];

/// One row of a query result: which record type matched, which of its
/// fields, and that field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    pub record_type: &'static str,
    pub field: &'static str,
    pub value: Option<&'a str>,
}

/// A timestamp-carrying field, with its epoch value parsed where possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp<'a> {
    pub record_type: &'static str,
    pub field: &'static str,
    pub raw: &'a str,
    pub parsed: Option<DateTime<Utc>>,
}

/// A key summary assembled from a decoded colon listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedKey {
    pub fingerprint: String,
    pub user_id: String,
    pub validity: &'static str,
    pub algorithm: String,
    pub key_length: Option<u32>,
    pub created: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
}

impl RecordStore {
    /// Describes what was captured: one `(type, field names)` entry per
    /// stored record, optionally restricted to the given type names.
    pub fn fields_by_type(&self, types: Option<&[&str]>) -> Vec<(&'static str, Vec<&'static str>)> {
        self.iter()
            .filter(|r| type_matches(r, types))
            .map(|r| (r.keyword(), r.schema().field_names().collect()))
            .collect()
    }

    /// The core read primitive.
    ///
    /// With both filters omitted, returns every field of every record in
    /// store order. With only `types`, returns the full field sets of
    /// matching records. With `fields`, returns matches across all record
    /// types that declare one of those field names.
    pub fn query(&self, fields: Option<&[&str]>, types: Option<&[&str]>) -> Vec<Match<'_>> {
        let mut results = Vec::new();
        for record in self.iter() {
            if !type_matches(record, types) {
                continue;
            }
            for (name, value) in record.fields() {
                if fields.is_none_or(|wanted| wanted.contains(&name)) {
                    results.push(Match {
                        record_type: record.keyword(),
                        field: name,
                        value,
                    });
                }
            }
        }
        results
    }

    /// Signature verification status: whether any good-signature record is
    /// present, and the trust level that accompanied it ("Unknown" when no
    /// trust record was emitted).
    pub fn verified(&self) -> (bool, &'static str) {
        let valid = self.iter().any(|r| GOOD_TYPES.contains(&r.keyword()));
        let trust = self
            .iter()
            .find(|r| TRUST_TYPES.contains(&r.keyword()))
            .map(|r| r.keyword())
            .unwrap_or("Unknown");
        (valid, trust)
    }

    /// Non-empty fingerprint values, in emission order.
    pub fn fingerprints(&self) -> Vec<Match<'_>> {
        self.non_empty(&["fingerprint", "primary_key_fpr"])
    }

    /// Non-empty key-id values, falling back to fingerprint data when no
    /// explicit key-id record exists.
    pub fn key_ids(&self) -> Vec<Match<'_>> {
        let ids = self.non_empty(&["long_keyid", "long_main_keyid"]);
        if ids.is_empty() {
            return self.fingerprints();
        }
        ids
    }

    /// Key-type (algorithm code) values.
    pub fn key_types(&self) -> Vec<Match<'_>> {
        self.non_empty(&["keytype"])
    }

    /// Signer and user identities, skipping entries whose identity field is
    /// empty.
    pub fn user_names(&self) -> Vec<Match<'_>> {
        self.non_empty(&["username", "user_id"])
    }

    /// Timestamp-carrying fields, with epoch seconds (or gpg's ISO form)
    /// parsed to UTC where possible.
    pub fn timestamps(&self) -> Vec<Timestamp<'_>> {
        self.query(
            Some(&["timestamp", "sig_timestamp", "expire_timestamp"]),
            None,
        )
        .into_iter()
        .filter_map(|m| {
            m.value.map(|raw| Timestamp {
                record_type: m.record_type,
                field: m.field,
                raw,
                parsed: parse_timestamp(raw),
            })
        })
        .collect()
    }

    /// Whether gpg reported a missing public key, and the offending key id.
    ///
    /// NO_PUBKEY is emitted by gpg itself, not by this decoder.
    pub fn no_pubkey(&self) -> (bool, Option<&str>) {
        match self.iter().find(|r| r.keyword() == "NO_PUBKEY") {
            Some(record) => (true, record.get("long_keyid")),
            None => (false, None),
        }
    }

    /// Assembles PUB/FPR/UID runs from a decoded colon listing into key
    /// summaries. Keys without a fingerprint row are skipped.
    pub fn listed_keys(&self) -> Vec<ListedKey> {
        let mut keys = Vec::new();
        let mut current: Option<KeyBuilder> = None;

        for record in self.iter() {
            match record.keyword() {
                "PUB" | "SEC" => {
                    if let Some(builder) = current.take() {
                        keys.extend(builder.build());
                    }
                    current = Some(KeyBuilder::from_key_record(record));
                }
                "FPR" => {
                    if let Some(builder) = current.as_mut() {
                        if builder.fingerprint.is_none() {
                            builder.fingerprint =
                                record.get("fingerprint").map(str::to_string);
                        }
                    }
                }
                "UID" => {
                    if let Some(builder) = current.as_mut() {
                        if builder.user_id.is_none() {
                            builder.user_id = record
                                .get("user_id")
                                .filter(|u| !u.is_empty())
                                .map(str::to_string);
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some(builder) = current {
            keys.extend(builder.build());
        }
        keys
    }

    fn non_empty(&self, fields: &[&str]) -> Vec<Match<'_>> {
        self.query(Some(fields), None)
            .into_iter()
            .filter(|m| m.value.is_some_and(|v| !v.is_empty()))
            .collect()
    }
}

fn type_matches(record: &Record, types: Option<&[&str]>) -> bool {
    types.is_none_or(|wanted| wanted.contains(&record.keyword()))
}

/// Parses a gpg timestamp: seconds since Epoch, or the ISO 8601 form
/// (`yyyymmddThhmmss`) newer versions emit.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() || raw == "0" {
        return None;
    }
    if let Ok(secs) = raw.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0);
    }
    NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%S")
        .ok()
        .map(|dt| dt.and_utc())
}

struct KeyBuilder {
    fingerprint: Option<String>,
    user_id: Option<String>,
    validity: &'static str,
    algorithm: String,
    key_length: Option<u32>,
    created: Option<DateTime<Utc>>,
    expires: Option<DateTime<Utc>>,
}

impl KeyBuilder {
    fn from_key_record(record: &Record) -> Self {
        let validity = record
            .get("validity")
            .and_then(|v| v.chars().next())
            .map(mappings::validity_label)
            .unwrap_or("Unknown");
        Self {
            fingerprint: None,
            user_id: None,
            validity,
            algorithm: record
                .get("pubkey_algo")
                .map(mappings::algorithm_name)
                .unwrap_or_default(),
            key_length: record.get("key_length").and_then(|l| l.parse().ok()),
            created: record.get("creation_date").and_then(parse_timestamp),
            expires: record.get("expiration_date").and_then(parse_timestamp),
        }
    }

    fn build(self) -> Option<ListedKey> {
        Some(ListedKey {
            fingerprint: self.fingerprint?,
            user_id: self.user_id.unwrap_or_default(),
            validity: self.validity,
            algorithm: self.algorithm,
            key_length: self.key_length,
            created: self.created,
            expires: self.expires,
        })
    }
}
