//! The status-message legend: one schema per GnuPG message keyword.
//!
//! GnuPG's machine-readable interfaces are keyword-driven: status-fd lines
//! start with a keyword after the `[GNUPG:]` sentinel, and `--with-colons`
//! listing rows start with a record-type column. Each keyword maps to an
//! ordered field list here; the decoders in [`crate::parse`] are generic over
//! these schemas, so supporting a new message type only means adding a table
//! entry.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Sentinel token prefixing every status-fd line.
pub const STATUS_SENTINEL: &str = "[GNUPG:]";

/// A version banner starts with this (e.g. `gpg (GnuPG) 2.1.75`).
pub const VERSION_BANNER_PREFIX: &str = "gpg (";

/// Colon-listing rows are split into at most this many columns; anything
/// past the cap stays attached to the source line, not the record.
pub const MAX_COLON_COLUMNS: usize = 13;

/// Keyword of the diagnostic record emitted for an unregistered keyword.
pub const UNKNOWN_KEYWORD: &str = "DECODER_UNKNOWN_KEYWORD";
/// Keyword of the diagnostic record emitted on a field-count mismatch.
pub const FIELD_MISMATCH: &str = "DECODER_FIELD_MISMATCH";
/// Keyword of the diagnostic record emitted for internal decode errors.
pub const DECODER_ERROR: &str = "DECODER_ERROR";
/// Keyword of the assembled version-banner record.
pub const GPG_VERSION: &str = "GPG_VERSION";

/// One named field of a message schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    /// Optional fields may be absent from input; they decode to `None`
    /// without a diagnostic.
    pub optional: bool,
}

const fn req(name: &'static str) -> Field {
    Field {
        name,
        optional: false,
    }
}

const fn opt(name: &'static str) -> Field {
    Field {
        name,
        optional: true,
    }
}

/// The decode target for one message-type keyword.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub keyword: &'static str,
    pub fields: &'static [Field],
    /// Human-readable summary, used only in diagnostics and docs.
    pub description: &'static str,
}

impl Schema {
    const fn new(
        keyword: &'static str,
        fields: &'static [Field],
        description: &'static str,
    ) -> Self {
        Self {
            keyword,
            fields,
            description,
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }
}

/// Status-fd message schemas, field order as GnuPG emits them.
static STATUS_SCHEMAS: &[Schema] = &[
    Schema::new("NEWSIG", &[], "Issued right before a signature verification starts."),
    Schema::new(
        "GOODSIG",
        &[req("long_keyid"), req("username")],
        "The signature with the keyid is good.",
    ),
    Schema::new(
        "EXPSIG",
        &[req("long_keyid"), req("username")],
        "The signature with the keyid is good, but the signature is expired.",
    ),
    Schema::new(
        "EXPKEYSIG",
        &[req("long_keyid"), req("username")],
        "The signature with the keyid is good, but was made by an expired key.",
    ),
    Schema::new(
        "REVKEYSIG",
        &[req("long_keyid"), req("username")],
        "The signature with the keyid is good, but was made by a revoked key.",
    ),
    Schema::new(
        "BADSIG",
        &[req("long_keyid"), req("username")],
        "The signature with the keyid has not been verified okay.",
    ),
    Schema::new(
        "ERRSIG",
        &[
            req("long_keyid"),
            req("pubkey_algo"),
            req("hash_algo"),
            req("sig_class"),
            req("timestamp"),
            req("rc"),
            opt("fingerprint"),
        ],
        "It was not possible to check the signature.",
    ),
    Schema::new(
        "VALIDSIG",
        &[
            req("fingerprint"),
            req("sig_creation_date"),
            req("sig_timestamp"),
            req("expire_timestamp"),
            req("sig_version"),
            req("reserved"),
            req("pubkey_algo"),
            req("hash_algo"),
            req("sig_class"),
            opt("primary_key_fpr"),
        ],
        "The signature with the keyid is good, fingerprint form.",
    ),
    Schema::new(
        "SIG_ID",
        &[req("radix64_string"), req("sig_creation_date"), req("sig_timestamp")],
        "Emitted only for class 0 or 1 signatures which have been verified okay.",
    ),
    Schema::new(
        "ENC_TO",
        &[req("long_keyid"), req("keytype"), req("keylength")],
        "The message is encrypted to this keyid.",
    ),
    Schema::new("NODATA", &[req("what")], "No data has been found."),
    Schema::new(
        "UNEXPECTED",
        &[req("what")],
        "Unexpected data has been encountered, 0 - not further specified.",
    ),
    Schema::new(
        "TRUST_UNDEFINED",
        &[opt("error_token")],
        "The validity of the key used to create the signature is undefined.",
    ),
    Schema::new(
        "TRUST_NEVER",
        &[opt("error_token")],
        "For good signatures, the key used to create the signature is not valid.",
    ),
    Schema::new(
        "TRUST_MARGINAL",
        &[opt("validation_model")],
        "For good signatures, the key used to create the signature is marginally valid.",
    ),
    Schema::new(
        "TRUST_FULLY",
        &[opt("validation_model")],
        "For good signatures, the key used to create the signature is fully valid.",
    ),
    Schema::new(
        "TRUST_ULTIMATE",
        &[opt("validation_model")],
        "For good signatures, the key used to create the signature is ultimately valid.",
    ),
    Schema::new(
        "PKA_TRUST_GOOD",
        &[req("mailbox")],
        "A status code emitted in addition to a TRUST_* status.",
    ),
    Schema::new(
        "PKA_TRUST_BAD",
        &[req("mailbox")],
        "A status code emitted in addition to a TRUST_* status.",
    ),
    Schema::new("SIGEXPIRED", &[], "Deprecated in favor of KEYEXPIRED."),
    Schema::new(
        "KEYEXPIRED",
        &[req("expire_timestamp")],
        "The key has expired; expire_timestamp is seconds since Epoch.",
    ),
    Schema::new("KEYREVOKED", &[], "The used key has been revoked by its owner."),
    Schema::new("BADARMOR", &[], "The ASCII armor is corrupted."),
    Schema::new("RSA_OR_IDEA", &[], "The IDEA algorithm has been used in the data."),
    Schema::new("SHM_INFO", &[], "Legacy shared-memory coordination message."),
    Schema::new("SHM_GET", &[], "Legacy shared-memory coordination message."),
    Schema::new("SHM_GET_BOOL", &[], "Legacy shared-memory coordination message."),
    Schema::new("SHM_GET_HIDDEN", &[], "Legacy shared-memory coordination message."),
    Schema::new("GET_BOOL", &[], "Prompt for a boolean answer."),
    Schema::new("GET_LINE", &[], "Prompt for a line of input."),
    Schema::new("GET_HIDDEN", &[], "Prompt for hidden input."),
    Schema::new("GOT_IT", &[], "Acknowledges a prompt answer."),
    Schema::new(
        "NEED_PASSPHRASE",
        &[
            req("long_main_keyid"),
            req("long_keyid"),
            req("keytype"),
            req("keylength"),
        ],
        "Issued whenever a passphrase is needed.",
    ),
    Schema::new(
        "NEED_PASSPHRASE_SYM",
        &[req("cipher_algo"), req("s2k_mode"), req("s2k_hash")],
        "Issued whenever a passphrase for symmetric encryption is needed.",
    ),
    Schema::new(
        "NEED_PASSPHRASE_PIN",
        &[req("card_type"), req("chvno"), opt("serialno")],
        "Issued whenever a PIN is requested to unlock a card.",
    ),
    Schema::new("MISSING_PASSPHRASE", &[], "No passphrase was supplied."),
    Schema::new(
        "BAD_PASSPHRASE",
        &[req("long_keyid")],
        "The supplied passphrase was wrong or not given.",
    ),
    Schema::new(
        "GOOD_PASSPHRASE",
        &[],
        "The supplied passphrase was good and the secret key material is usable.",
    ),
    Schema::new("DECRYPTION_FAILED", &[], "The symmetric decryption failed."),
    Schema::new("DECRYPTION_OKAY", &[], "The decryption process succeeded."),
    Schema::new("NO_PUBKEY", &[req("long_keyid")], "The public key is not available."),
    Schema::new("NO_SECKEY", &[req("long_keyid")], "The secret key is not available."),
    Schema::new(
        "IMPORT_CHECK",
        &[req("long_keyid"), req("fingerprint"), req("user_id")],
        "Emitted in interactive mode right before the import.okay prompt.",
    ),
    Schema::new(
        "IMPORTED",
        &[req("long_keyid"), req("username")],
        "The keyid and name of the signature just imported.",
    ),
    Schema::new(
        "IMPORT_OK",
        &[req("reason"), req("fingerprint")],
        "The key with the primary key's fingerprint has been imported.",
    ),
    Schema::new(
        "IMPORT_PROBLEM",
        &[req("reason"), opt("fingerprint")],
        "Issued for each import failure.",
    ),
    Schema::new(
        "IMPORT_RES",
        &[
            req("count"),
            req("no_user_id"),
            req("imported"),
            req("imported_rsa"),
            req("unchanged"),
            req("n_uids"),
            req("n_subk"),
            req("n_sigs"),
            req("n_revoc"),
            req("sec_read"),
            req("sec_imported"),
            req("sec_dups"),
            req("skipped_new_keys"),
            req("not_imported"),
        ],
        "Final statistics on the import process.",
    ),
    Schema::new(
        "FILE_START",
        &[req("what"), req("filename")],
        "Start processing a file; what is 1 verify, 2 encrypt, 3 decrypt.",
    ),
    Schema::new(
        "FILE_DONE",
        &[],
        "Marks the end of a file processing started by FILE_START.",
    ),
    Schema::new("BEGIN_DECRYPTION", &[], "Mark the start of the actual decryption process."),
    Schema::new("END_DECRYPTION", &[], "Mark the end of the actual decryption process."),
    Schema::new(
        "BEGIN_ENCRYPTION",
        &[req("mdc_method"), req("sym_algo")],
        "Mark the start of the actual encryption process.",
    ),
    Schema::new("END_ENCRYPTION", &[], "Mark the end of the actual encryption process."),
    Schema::new(
        "BEGIN_SIGNING",
        &[req("hash_algo")],
        "Mark the start of the actual signing process.",
    ),
    Schema::new("DELETE_PROBLEM", &[req("reason_code")], "Deleting a key failed."),
    Schema::new(
        "PROGRESS",
        &[req("what"), req("char"), req("cur"), req("total")],
        "Used by primegen and public key functions to indicate progress.",
    ),
    Schema::new(
        "SIG_CREATED",
        &[
            req("type"),
            req("pubkey_algo"),
            req("hash_algo"),
            req("sig_class"),
            req("timestamp"),
            req("key_fpr"),
        ],
        "A signature has been created using these parameters.",
    ),
    Schema::new(
        "KEY_CREATED",
        &[req("type"), req("fingerprint"), opt("handle")],
        "A key has been created; type B primary and subkey, P primary, S subkey.",
    ),
    Schema::new(
        "KEY_NOT_CREATED",
        &[opt("handle")],
        "The key from the batch run has not been created due to errors.",
    ),
    Schema::new(
        "SESSION_KEY",
        &[req("algo"), req("hexdigits")],
        "The session key used to decrypt the message.",
    ),
    Schema::new(
        "NOTATION_NAME",
        &[req("name")],
        "Name of a notation; the data may be split among several NOTATION_DATA lines.",
    ),
    Schema::new(
        "NOTATION_DATA",
        &[req("string")],
        "Data associated with the preceding NOTATION_NAME.",
    ),
    Schema::new(
        "USERID_HINT",
        &[req("long_main_keyid"), req("string")],
        "Give a hint about the user ID for a certain keyid.",
    ),
    Schema::new("POLICY_URL", &[req("string")], "Policy URL from a signature notation."),
    Schema::new("BEGIN_STREAM", &[], "Issued by pipemode."),
    Schema::new("END_STREAM", &[], "Issued by pipemode."),
    Schema::new(
        "INV_RECP",
        &[req("reason"), req("requested_recipient")],
        "Issued for each unusable recipient.",
    ),
    Schema::new(
        "INV_SGNR",
        &[req("reason"), req("requested_sender")],
        "Issued for each unusable sender.",
    ),
    Schema::new("NO_RECP", &[req("reserved")], "Issued when no recipients are usable."),
    Schema::new("NO_SGNR", &[req("reserved")], "Issued when no senders are usable."),
    Schema::new(
        "ALREADY_SIGNED",
        &[req("long_keyid")],
        "Warning: experimental and might be removed at any time.",
    ),
    Schema::new("TRUNCATED", &[req("maxno")], "The output was truncated to maxno items."),
    Schema::new(
        "ERROR",
        &[req("error_location"), req("error_code"), opt("more")],
        "Generic error status message, may be followed by location-specific data.",
    ),
    Schema::new(
        "SUCCESS",
        &[opt("location")],
        "Positive confirmation that an operation succeeded.",
    ),
    Schema::new(
        "ATTRIBUTE",
        &[
            req("fpr"),
            req("octets"),
            req("type"),
            req("index"),
            req("count"),
            req("timestamp"),
            req("expiredate"),
            req("flags"),
        ],
        "One long line issued for each attribute subpacket during key listing.",
    ),
    Schema::new(
        "CARDCTRL",
        &[req("what"), opt("serialno")],
        "Used to control smartcard operations.",
    ),
    Schema::new(
        "PLAINTEXT",
        &[req("format"), req("timestamp"), opt("filename")],
        "Indicates the format of the plaintext that is about to be written.",
    ),
    Schema::new(
        "PLAINTEXT_LENGTH",
        &[req("length")],
        "Indicates the length of the plaintext that is about to be written.",
    ),
    Schema::new(
        "SIG_SUBPACKET",
        &[req("type"), req("flags"), req("length"), req("data")],
        "Indicates that a signature subpacket was seen.",
    ),
    Schema::new(
        "SC_OP_FAILURE",
        &[opt("code")],
        "An operation on a smartcard definitely failed.",
    ),
    Schema::new("SC_OP_SUCCESS", &[], "A smartcard operation succeeded."),
    Schema::new(
        "BACKUP_KEY_CREATED",
        &[req("fingerprint"), req("fname")],
        "A backup key named fname has been created.",
    ),
    Schema::new(
        "MOUNTPOINT",
        &[req("name")],
        "Percent-plus escaped filename describing the mountpoint for the current operation.",
    ),
    Schema::new(
        "DECRYPTION_INFO",
        &[req("mdc_method"), req("sym_algo")],
        "Symmetric encryption algorithm and MDC method used.",
    ),
];

static VERSION_SCHEMA: Schema = Schema::new(
    GPG_VERSION,
    &[
        req("gpg"),
        req("libgcrypt"),
        opt("copyright"),
        opt("license"),
        opt("home"),
        opt("sup_pubkey"),
        opt("sup_cipher"),
        opt("sup_hash"),
        opt("sup_compress"),
    ],
    "GnuPG version banner information.",
);

/// Generic column names for `--with-colons` rows, columns 2 through 13.
macro_rules! colon_fields {
    () => {
        &[
            opt("validity"),
            opt("key_length"),
            opt("pubkey_algo"),
            opt("keyid"),
            opt("creation_date"),
            opt("expiration_date"),
            opt("certsn_uidhash_trustinfo"),
            opt("ownertrust"),
            opt("user_id"),
            opt("sig_class"),
            opt("key_capabilities"),
            opt("issuer_fpr"),
        ]
    };
}

/// Colon-listing record schemas. Twelve fields each: the thirteen-column cap
/// minus the record-type column.
static COLON_SCHEMAS: &[Schema] = &[
    Schema::new("PUB", colon_fields!(), "Public key."),
    Schema::new("CRT", colon_fields!(), "X.509 certificate."),
    Schema::new("CRS", colon_fields!(), "X.509 certificate and private key available."),
    Schema::new("SUB", colon_fields!(), "Subkey (secondary key)."),
    Schema::new("SEC", colon_fields!(), "Secret key."),
    Schema::new("SSB", colon_fields!(), "Secret subkey (secondary key)."),
    Schema::new("UID", colon_fields!(), "User id."),
    Schema::new("UAT", colon_fields!(), "User attribute (same as user id except for field 10)."),
    Schema::new("SIG", colon_fields!(), "Signature."),
    Schema::new("REV", colon_fields!(), "Revocation signature."),
    Schema::new(
        "FPR",
        &[
            opt("validity"),
            opt("key_length"),
            opt("pubkey_algo"),
            opt("keyid"),
            opt("creation_date"),
            opt("expiration_date"),
            opt("certsn_uidhash_trustinfo"),
            opt("ownertrust"),
            opt("fingerprint"),
            opt("sig_class"),
            opt("key_capabilities"),
            opt("issuer_fpr"),
        ],
        "Fingerprint; the fingerprint is in the user-id column.",
    ),
    Schema::new(
        "PKD",
        &[opt("index"), opt("info_length"), opt("value")],
        "Public key data.",
    ),
    Schema::new("GRP", colon_fields!(), "Keygrip; the grip is in the user-id column."),
    Schema::new("RVK", colon_fields!(), "Revocation key."),
    Schema::new(
        "TFS",
        &[
            opt("version"),
            opt("sign_count"),
            opt("encryption_count"),
            opt("policy"),
            opt("first_sign"),
            opt("last_sign"),
            opt("first_encrypt"),
            opt("last_encrypt"),
        ],
        "TOFU statistics.",
    ),
    Schema::new(
        "TRU",
        &[
            opt("reason"),
            opt("trust_model"),
            opt("creation_date"),
            opt("expiration_date"),
            opt("marginals_needed"),
            opt("completes_needed"),
            opt("cert_chain_depth"),
        ],
        "Trust database information.",
    ),
    Schema::new(
        "SPK",
        &[opt("subpacket_number"), opt("flags"), opt("length"), opt("data")],
        "Signature subpacket.",
    ),
];

// Schemas for records this decoder emits about its own anomalies.

static UNKNOWN_KEYWORD_SCHEMA: Schema = Schema::new(
    UNKNOWN_KEYWORD,
    &[req("keyword"), opt("rest")],
    "A status keyword with no registered schema was encountered.",
);

static FIELD_MISMATCH_SCHEMA: Schema = Schema::new(
    FIELD_MISMATCH,
    &[req("keyword"), req("expected"), req("actual"), opt("detail")],
    "A message's field count did not match its schema; detail carries \
     the discarded excess or the missing required field names.",
);

static DECODER_ERROR_SCHEMA: Schema = Schema::new(
    DECODER_ERROR,
    &[req("location"), req("message")],
    "Internal decode error.",
);

pub(crate) fn version_schema() -> &'static Schema {
    &VERSION_SCHEMA
}

pub(crate) fn unknown_keyword_schema() -> &'static Schema {
    &UNKNOWN_KEYWORD_SCHEMA
}

pub(crate) fn field_mismatch_schema() -> &'static Schema {
    &FIELD_MISMATCH_SCHEMA
}

pub(crate) fn decoder_error_schema() -> &'static Schema {
    &DECODER_ERROR_SCHEMA
}

static INDEX: LazyLock<HashMap<&'static str, &'static Schema>> = LazyLock::new(|| {
    let mut index: HashMap<_, _> = STATUS_SCHEMAS
        .iter()
        .chain(COLON_SCHEMAS.iter())
        .map(|s| (s.keyword, s))
        .collect();
    for schema in [
        &VERSION_SCHEMA,
        &UNKNOWN_KEYWORD_SCHEMA,
        &FIELD_MISMATCH_SCHEMA,
        &DECODER_ERROR_SCHEMA,
    ] {
        index.insert(schema.keyword, schema);
    }
    index
});

static COLON_INDEX: LazyLock<HashMap<&'static str, &'static Schema>> =
    LazyLock::new(|| COLON_SCHEMAS.iter().map(|s| (s.keyword, s)).collect());

/// Resolves any registered keyword (status, colon, version, diagnostic).
pub fn lookup(keyword: &str) -> Option<&'static Schema> {
    INDEX.get(keyword).copied()
}

/// Resolves a colon-listing record type. Unrecognized types are not an
/// error; the caller passes the raw line through as plain output.
pub fn lookup_colon(keyword: &str) -> Option<&'static Schema> {
    COLON_INDEX.get(keyword).copied()
}
