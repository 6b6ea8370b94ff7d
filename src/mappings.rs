//! Lookup tables for the numeric and single-character codes GnuPG uses in
//! its colon listings and status messages.

/// Maps an OpenPGP public-key algorithm code to its name.
///
/// Unknown codes come back as `ALG<code>` so callers never lose the raw value.
pub fn algorithm_name(code: &str) -> String {
    match code {
        "1" | "2" | "3" => "RSA".to_string(),
        "16" => "ElGamal".to_string(),
        "17" => "DSA".to_string(),
        "18" => "ECDH".to_string(),
        "19" => "ECDSA".to_string(),
        "20" => "ElGamal".to_string(),
        "21" => "Diffie-Hellman".to_string(),
        "22" => "EdDSA".to_string(),
        _ => format!("ALG{}", code),
    }
}

/// Maps a validity character from a colon-listing validity column to its
/// meaning. Unrecognized characters map to "Unknown".
pub fn validity_label(c: char) -> &'static str {
    match c {
        'o' | '-' => "Unknown",
        'i' => "Invalid",
        'd' => "Disabled",
        'r' => "Revoked",
        'e' => "Expired",
        'q' => "Undefined",
        'n' => "Valid",
        'm' => "Marginal",
        'f' => "Fully valid",
        'u' => "Ultimately valid",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_name() {
        assert_eq!(algorithm_name("1"), "RSA");
        assert_eq!(algorithm_name("3"), "RSA");
        assert_eq!(algorithm_name("17"), "DSA");
        assert_eq!(algorithm_name("22"), "EdDSA");
        assert_eq!(algorithm_name("99"), "ALG99");
    }

    #[test]
    fn test_validity_label() {
        assert_eq!(validity_label('u'), "Ultimately valid");
        assert_eq!(validity_label('f'), "Fully valid");
        assert_eq!(validity_label('e'), "Expired");
        assert_eq!(validity_label('r'), "Revoked");
        assert_eq!(validity_label('-'), "Unknown");
        assert_eq!(validity_label('x'), "Unknown");
    }
}
