//! Decoders for the three text shapes gpg hands back: status-fd lines,
//! `--with-colons` listing rows, and the free-text version banner.
//!
//! Decoding never fails on malformed protocol data. A line that cannot be
//! decoded cleanly either degrades to a diagnostic record in the same store
//! or passes through unmodified in [`Decoded::plain`]; only an encoding
//! failure on the captured bytes is an `Err`, and that happens before any
//! record is built.

use tracing::debug;

use crate::error::Result;
use crate::schema::{self, Schema, MAX_COLON_COLUMNS, STATUS_SENTINEL, VERSION_BANNER_PREFIX};
use crate::types::{Decoded, Record, RecordStore};

/// Decodes one invocation's status-channel capture.
///
/// Status lines (prefixed with `[GNUPG:] `) become records. A version banner
/// line switches the decoder into banner mode for the remainder of the
/// stream. Everything else is passed through in [`Decoded::plain`] in
/// original order.
pub fn decode_status(input: &str) -> Decoded {
    decode_status_lines(input.lines())
}

/// Like [`decode_status`], for raw captured bytes.
pub fn decode_status_bytes(raw: &[u8]) -> Result<Decoded> {
    let text = String::from_utf8(raw.to_vec())?;
    Ok(decode_status(&text))
}

/// Decodes an iterator of already-split status lines.
pub fn decode_status_lines<'a, I>(lines: I) -> Decoded
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = Decoded::default();
    let mut iter = lines.into_iter();
    while let Some(raw) = iter.next() {
        let line = raw.trim_end_matches('\r');
        if let Some(rest) = line.strip_prefix(STATUS_SENTINEL) {
            decode_status_line(rest.trim_start(), &mut out.records);
        } else if line.starts_with(VERSION_BANNER_PREFIX) {
            // The banner is the tail of the stream: scan it whole.
            let mut banner = VersionBanner::new();
            banner.feed(line);
            for next in iter.by_ref() {
                banner.feed(next.trim_end_matches('\r'));
            }
            if let Some(record) = banner.finish() {
                out.records.push(record);
            }
            break;
        } else {
            out.plain.push(line.to_string());
        }
    }
    out
}

/// Decodes a block of `--with-colons` listing output.
///
/// Rows whose leading column is not a recognized record type are not an
/// error; gpg mixes informational rows into listings, so they pass through
/// as plain output.
pub fn decode_listing(input: &str) -> Decoded {
    let mut out = Decoded::default();
    for raw in input.lines() {
        let line = raw.trim_end_matches('\r');
        match decode_colon_line(line) {
            Some((record, diagnostic)) => {
                out.records.push(record);
                if let Some(diag) = diagnostic {
                    out.records.push(diag);
                }
            }
            None => out.plain.push(line.to_string()),
        }
    }
    out
}

/// Like [`decode_listing`], for raw captured bytes.
pub fn decode_listing_bytes(raw: &[u8]) -> Result<Decoded> {
    let text = String::from_utf8(raw.to_vec())?;
    Ok(decode_listing(&text))
}

fn decode_status_line(rest: &str, store: &mut RecordStore) {
    let mut split = rest.splitn(2, ' ');
    let keyword = split.next().unwrap_or_default();
    let remainder = split.next().unwrap_or("");

    if keyword.is_empty() {
        debug!("status line carried the sentinel but no keyword");
        store.push(Record::new(
            schema::decoder_error_schema(),
            vec![
                Some("status".to_string()),
                Some("sentinel line without a keyword".to_string()),
            ],
        ));
        return;
    }

    let Some(schema) = schema::lookup(keyword) else {
        debug!(keyword, "unknown status keyword");
        store.push(Record::new(
            schema::unknown_keyword_schema(),
            vec![
                Some(keyword.to_string()),
                if remainder.is_empty() {
                    None
                } else {
                    Some(remainder.to_string())
                },
            ],
        ));
        return;
    };

    // Split into at most N tokens so the last declared field keeps any
    // embedded spaces (usernames, free text).
    let count = schema.field_count();
    let tokens: Vec<String> = if remainder.is_empty() {
        Vec::new()
    } else if count == 0 {
        vec![remainder.to_string()]
    } else {
        remainder.splitn(count, ' ').map(str::to_string).collect()
    };

    let (values, diagnostic) = fit_arity(schema, tokens);
    store.push(Record::new(schema, values));
    if let Some(diag) = diagnostic {
        store.push(diag);
    }
}

fn decode_colon_line(line: &str) -> Option<(Record, Option<Record>)> {
    let mut columns = line.split(':').take(MAX_COLON_COLUMNS);
    let keyword = columns.next()?.to_uppercase();
    let schema = schema::lookup_colon(&keyword)?;

    let mut fields: Vec<String> = columns.map(str::to_string).collect();

    // UID and UAT rows routinely omit their last two columns; pad them with
    // empty strings. This is a documented protocol quirk for these two
    // record types only.
    if (keyword == "UID" || keyword == "UAT") && fields.len() == schema.field_count() - 2 {
        fields.push(String::new());
        fields.push(String::new());
    }

    let (values, diagnostic) = fit_arity(schema, fields);
    Some((Record::new(schema, values), diagnostic))
}

/// Fits a token list to a schema's declared arity.
///
/// Short input is padded with nulls; if that leaves a required field unfilled
/// a mismatch diagnostic accompanies the record. Long input is truncated and
/// always diagnosed so the discarded data is not silently lost.
fn fit_arity(schema: &'static Schema, tokens: Vec<String>) -> (Vec<Option<String>>, Option<Record>) {
    let count = schema.field_count();
    let actual = tokens.len();
    let mut values: Vec<Option<String>> = tokens.into_iter().map(Some).collect();

    let diagnostic = if actual > count {
        let discarded: Vec<String> = values
            .drain(count..)
            .map(|v| v.unwrap_or_default())
            .collect();
        let discarded = discarded.join(" ");
        debug!(
            keyword = schema.keyword,
            expected = count,
            actual,
            %discarded,
            "excess fields truncated"
        );
        Some(mismatch_record(schema, actual, discarded))
    } else if actual < count {
        let missing_required: Vec<&str> = schema.fields[actual..]
            .iter()
            .filter(|f| !f.optional)
            .map(|f| f.name)
            .collect();
        values.resize(count, None);
        if missing_required.is_empty() {
            None
        } else {
            debug!(
                keyword = schema.keyword,
                expected = count,
                actual,
                missing = missing_required.join(" "),
                "required fields missing"
            );
            Some(mismatch_record(schema, actual, missing_required.join(" ")))
        }
    } else {
        None
    };

    (values, diagnostic)
}

fn mismatch_record(schema: &'static Schema, actual: usize, detail: String) -> Record {
    Record::new(
        schema::field_mismatch_schema(),
        vec![
            Some(schema.keyword.to_string()),
            Some(schema.field_count().to_string()),
            Some(actual.to_string()),
            Some(detail),
        ],
    )
}

/// Label, target field index in the GPG_VERSION schema, and whether only the
/// line's trailing token is the value (the two "name + version" labels).
const BANNER_LABELS: &[(&str, usize, bool)] = &[
    ("gpg", 0, true),
    ("libgcrypt", 1, true),
    ("Copyright", 2, false),
    ("License", 3, false),
    ("Home:", 4, false),
    ("Pubkey:", 5, false),
    ("Cipher:", 6, false),
    ("Hash:", 7, false),
    ("Compression:", 8, false),
];

/// Stateful scanner for the multi-line version banner.
///
/// A field's value continues onto following lines while the accumulated
/// value ends in a trailing comma; continuation lines are space-joined.
pub struct VersionBanner {
    values: Vec<Option<String>>,
    current: Option<usize>,
    continuation: bool,
}

impl Default for VersionBanner {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionBanner {
    pub fn new() -> Self {
        Self {
            values: vec![None; schema::version_schema().field_count()],
            current: None,
            continuation: false,
        }
    }

    /// Feeds one banner line to the scanner. Blank lines are skipped.
    pub fn feed(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        if self.continuation {
            if let Some(idx) = self.current {
                if let Some(value) = &mut self.values[idx] {
                    value.push(' ');
                    value.push_str(trimmed);
                    if !value.ends_with(',') {
                        self.continuation = false;
                    }
                }
            }
            return;
        }

        let Some(first) = trimmed.split_whitespace().next() else {
            return;
        };
        let Some(&(_, idx, last_token)) = BANNER_LABELS.iter().find(|(label, _, _)| *label == first)
        else {
            return;
        };

        let value = if last_token {
            trimmed.rsplit(' ').next().unwrap_or_default().to_string()
        } else {
            trimmed
                .split_once(' ')
                .map(|(_, rest)| rest.trim().to_string())
                .unwrap_or_default()
        };
        self.continuation = value.ends_with(',');
        self.current = Some(idx);
        self.values[idx] = Some(value);
    }

    /// Assembles the single version record, or `None` when no banner label
    /// was ever observed.
    pub fn finish(self) -> Option<Record> {
        if self.values.iter().all(Option::is_none) {
            return None;
        }
        Some(Record::new(schema::version_schema(), self.values))
    }
}

/// Decodes a block of version-banner lines into one record.
pub fn decode_version_banner<'a, I>(lines: I) -> Option<Record>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut banner = VersionBanner::new();
    for line in lines {
        banner.feed(line);
    }
    banner.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FIELD_MISMATCH, GPG_VERSION, UNKNOWN_KEYWORD};

    #[test]
    fn test_well_formed_status_line() {
        let out = decode_status("[GNUPG:] GOODSIG ABCDEF0123456789 Jane Doe <jane@example.com>");
        assert_eq!(out.records.len(), 1);
        assert!(out.plain.is_empty());

        let record = out.records.iter().next().unwrap();
        assert_eq!(record.keyword(), "GOODSIG");
        assert_eq!(record.get("long_keyid"), Some("ABCDEF0123456789"));
        // The final field keeps its embedded spaces.
        assert_eq!(record.get("username"), Some("Jane Doe <jane@example.com>"));
    }

    #[test]
    fn test_zero_field_keyword() {
        let out = decode_status("[GNUPG:] NEWSIG");
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records.iter().next().unwrap().keyword(), "NEWSIG");
    }

    #[test]
    fn test_unknown_keyword_yields_single_diagnostic() {
        let out = decode_status("[GNUPG:] FROBNICATE a b c");
        assert_eq!(out.records.len(), 1);

        let diag = out.records.iter().next().unwrap();
        assert_eq!(diag.keyword(), UNKNOWN_KEYWORD);
        assert_eq!(diag.get("keyword"), Some("FROBNICATE"));
        assert_eq!(diag.get("rest"), Some("a b c"));
    }

    #[test]
    fn test_missing_optional_trailing_field_pads_silently() {
        // TRUST_ULTIMATE's validation_model is optional.
        let out = decode_status("[GNUPG:] TRUST_ULTIMATE");
        assert_eq!(out.records.len(), 1);

        let record = out.records.iter().next().unwrap();
        assert_eq!(record.keyword(), "TRUST_ULTIMATE");
        assert_eq!(record.get("validation_model"), None);
    }

    #[test]
    fn test_missing_required_field_pads_with_diagnostic() {
        let out = decode_status("[GNUPG:] GOODSIG ABCDEF0123456789");
        assert_eq!(out.records.len(), 2);

        let mut records = out.records.iter();
        let record = records.next().unwrap();
        assert_eq!(record.keyword(), "GOODSIG");
        assert_eq!(record.get("username"), None);

        let diag = records.next().unwrap();
        assert_eq!(diag.keyword(), FIELD_MISMATCH);
        assert_eq!(diag.get("keyword"), Some("GOODSIG"));
        assert_eq!(diag.get("detail"), Some("username"));
    }

    #[test]
    fn test_excess_data_truncated_with_diagnostic() {
        // NEWSIG declares no fields; anything after it is excess.
        let out = decode_status("[GNUPG:] NEWSIG unexpected trailing data");
        assert_eq!(out.records.len(), 2);

        let mut records = out.records.iter();
        assert_eq!(records.next().unwrap().keyword(), "NEWSIG");

        let diag = records.next().unwrap();
        assert_eq!(diag.keyword(), FIELD_MISMATCH);
        assert_eq!(diag.get("expected"), Some("0"));
        assert_eq!(diag.get("actual"), Some("1"));
        assert_eq!(diag.get("detail"), Some("unexpected trailing data"));
    }

    #[test]
    fn test_sentinel_without_keyword() {
        let out = decode_status("[GNUPG:] ");
        assert_eq!(out.records.len(), 1);
        assert_eq!(
            out.records.iter().next().unwrap().keyword(),
            crate::schema::DECODER_ERROR
        );
    }

    #[test]
    fn test_non_status_lines_pass_through_in_order() {
        let input = "gpg: key ABCD: public key imported\n\
                     [GNUPG:] IMPORT_OK 1 ABAF11C65A2970B130ABE3C479BE3E4300411886\n\
                     gpg: Total number processed: 1";
        let out = decode_status(input);
        assert_eq!(out.records.len(), 1);
        assert_eq!(
            out.plain,
            vec![
                "gpg: key ABCD: public key imported".to_string(),
                "gpg: Total number processed: 1".to_string(),
            ]
        );
    }

    #[test]
    fn test_malformed_line_does_not_abort_stream() {
        let input = "[GNUPG:] BOGUS_KEYWORD x\n[GNUPG:] GOOD_PASSPHRASE";
        let out = decode_status(input);
        let keywords: Vec<_> = out.records.iter().map(|r| r.keyword()).collect();
        assert_eq!(keywords, vec![UNKNOWN_KEYWORD, "GOOD_PASSPHRASE"]);
    }

    #[test]
    fn test_decode_status_bytes_invalid_utf8() {
        let result = decode_status_bytes(&[0x5b, 0x47, 0xff, 0xfe]);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_status_bytes_valid() {
        let out = decode_status_bytes(b"[GNUPG:] NODATA 1").unwrap();
        assert_eq!(out.records.iter().next().unwrap().get("what"), Some("1"));
    }

    const SAMPLE_LISTING: &str = "\
tru::1:1409337986:0:3:1:5
pub:u:4096:1:786C63F330D7CB92:1568815794:::-:::scSC::::::23::0:
fpr:::::::::ABAF11C65A2970B130ABE3C479BE3E4300411886:
uid:u::::1568815794::F64689C4BF20D8BB2C66F7AD22DCE8C8C4B42E69::Levente Polyak <anthraxx@archlinux.org>::::::::::0:";

    #[test]
    fn test_colon_listing_basic() {
        let out = decode_listing(SAMPLE_LISTING);
        let keywords: Vec<_> = out.records.iter().map(|r| r.keyword()).collect();
        assert_eq!(keywords, vec!["TRU", "PUB", "FPR", "UID"]);
        assert!(out.plain.is_empty());

        let pub_record = out.records.iter().nth(1).unwrap();
        assert_eq!(pub_record.get("validity"), Some("u"));
        assert_eq!(pub_record.get("key_length"), Some("4096"));
        assert_eq!(pub_record.get("keyid"), Some("786C63F330D7CB92"));

        let fpr = out.records.iter().nth(2).unwrap();
        assert_eq!(
            fpr.get("fingerprint"),
            Some("ABAF11C65A2970B130ABE3C479BE3E4300411886")
        );
    }

    #[test]
    fn test_colon_listing_uid_short_row_padded() {
        // Ten columns after the type: the documented UID quirk. The two
        // padded fields resolve to empty strings, not nulls, and there is
        // no diagnostic.
        let line = "uid:u::::1568815794::HASH::Some User <user@example.org>:";
        let columns = line.split(':').count() - 1;
        assert_eq!(columns, 10);

        let out = decode_listing(line);
        assert_eq!(out.records.len(), 1);

        let record = out.records.iter().next().unwrap();
        assert_eq!(record.keyword(), "UID");
        assert_eq!(record.get("user_id"), Some("Some User <user@example.org>"));
        assert_eq!(record.get("key_capabilities"), Some(""));
        assert_eq!(record.get("issuer_fpr"), Some(""));
    }

    #[test]
    fn test_colon_listing_unknown_type_passes_through() {
        let input = "pkg:not:a:gpg:record\ngpg: checking the trustdb";
        let out = decode_listing(input);
        assert!(out.records.is_empty());
        assert_eq!(out.plain.len(), 2);
        assert_eq!(out.plain[0], "pkg:not:a:gpg:record");
    }

    #[test]
    fn test_colon_listing_lowercase_type_recognized() {
        let out = decode_listing("sub:f:4096:1:B31FB30B04D73EB0:1409337986:1725177586:::::s:");
        assert_eq!(out.records.iter().next().unwrap().keyword(), "SUB");
    }

    #[test]
    fn test_colon_listing_column_cap() {
        // Data past the thirteenth column is dropped from the split.
        let line = format!("pub{}:EXTRA:MORE", ":x".repeat(14));
        let out = decode_listing(&line);
        let record = out.records.iter().next().unwrap();
        assert_eq!(record.keyword(), "PUB");
        assert_eq!(record.get("issuer_fpr"), Some("x"));
    }

    const SAMPLE_BANNER: &str = "\
gpg (GnuPG) 2.1.75
libgcrypt 1.7.5
Copyright (C) 2016 Free Software Foundation, Inc.
License GPLv3+: GNU GPL version 3 or later <http://gnu.org/licenses/gpl.html>

Home: /root/.gnupg
Supported algorithms:
Pubkey: RSA, ELG, DSA, ECDH, ECDSA, EDDSA
Cipher: IDEA, 3DES, CAST5, BLOWFISH, AES, AES192, AES256, TWOFISH,
        CAMELLIA128, CAMELLIA192, CAMELLIA256
Hash: SHA1, RIPEMD160, SHA256, SHA384, SHA512, SHA224
Compression: Uncompressed, ZIP, ZLIB, BZIP2";

    #[test]
    fn test_version_banner_assembles_one_record() {
        let record = decode_version_banner(SAMPLE_BANNER.lines()).unwrap();
        assert_eq!(record.keyword(), GPG_VERSION);
        // The two name+version labels take only the trailing token.
        assert_eq!(record.get("gpg"), Some("2.1.75"));
        assert_eq!(record.get("libgcrypt"), Some("1.7.5"));
        assert_eq!(
            record.get("copyright"),
            Some("(C) 2016 Free Software Foundation, Inc.")
        );
        assert_eq!(record.get("home"), Some("/root/.gnupg"));
    }

    #[test]
    fn test_version_banner_comma_continuation() {
        let record = decode_version_banner(SAMPLE_BANNER.lines()).unwrap();
        assert_eq!(
            record.get("sup_cipher"),
            Some(
                "IDEA, 3DES, CAST5, BLOWFISH, AES, AES192, AES256, TWOFISH, \
                 CAMELLIA128, CAMELLIA192, CAMELLIA256"
            )
        );
        // The line after the continuation ended is decoded normally.
        assert_eq!(
            record.get("sup_hash"),
            Some("SHA1, RIPEMD160, SHA256, SHA384, SHA512, SHA224")
        );
    }

    #[test]
    fn test_version_banner_missing_labels_are_null() {
        let record = decode_version_banner(["gpg (GnuPG) 2.1.75", "libgcrypt 1.7.5"]).unwrap();
        assert_eq!(record.get("gpg"), Some("2.1.75"));
        assert_eq!(record.get("libgcrypt"), Some("1.7.5"));
        assert_eq!(record.get("copyright"), None);
        assert_eq!(record.get("sup_compress"), None);
    }

    #[test]
    fn test_version_banner_no_labels_yields_nothing() {
        assert!(decode_version_banner(["random text", "more text"]).is_none());
    }

    #[test]
    fn test_status_stream_switches_to_banner_mode() {
        let input = "[GNUPG:] GOOD_PASSPHRASE\ngpg (GnuPG) 2.1.75\nlibgcrypt 1.7.5";
        let out = decode_status(input);
        let keywords: Vec<_> = out.records.iter().map(|r| r.keyword()).collect();
        assert_eq!(keywords, vec!["GOOD_PASSPHRASE", GPG_VERSION]);
    }
}
