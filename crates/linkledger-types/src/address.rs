//! Subject address normalization utilities.
//!
//! Ledger accounts are 20-byte values, but they're often written in different
//! formats:
//! - Checksummed: "0xAbC4135Cf8f25dA09e49bc8782676A84730c318b"
//! - Lowercase: "0xabc4135cf8f25da09e49bc8782676a84730c318b"
//! - Without prefix: "abc4135cf8f25da09e49bc8782676a84730c318b"
//!
//! The ledger treats all of these as the same account, so every comparison in
//! this workspace goes through [`normalize_subject`] first.

/// Normalize a subject address to lowercase with 0x prefix and full 40 hex characters.
///
/// # Examples
///
/// ```
/// use linkledger_types::address::normalize_subject;
///
/// assert_eq!(
///     normalize_subject("0xABC"),
///     "0x0000000000000000000000000000000000000abc"
/// );
/// assert_eq!(
///     normalize_subject("ABC"),
///     "0x0000000000000000000000000000000000000abc"
/// );
/// ```
pub fn normalize_subject(addr: &str) -> String {
    let lower = addr.trim().to_lowercase();
    let hex_part = lower.strip_prefix("0x").unwrap_or(&lower);
    if hex_part.len() < 40 {
        format!("0x{:0>40}", hex_part)
    } else {
        format!("0x{}", hex_part)
    }
}

/// Check whether a string is a plausible subject address (hex, at most 20 bytes).
pub fn is_valid_subject(addr: &str) -> bool {
    let lower = addr.trim().to_lowercase();
    let hex_part = lower.strip_prefix("0x").unwrap_or(&lower);
    !hex_part.is_empty()
        && hex_part.len() <= 40
        && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_subject() {
        assert_eq!(
            normalize_subject("0xABC"),
            "0x0000000000000000000000000000000000000abc"
        );
        assert_eq!(
            normalize_subject("ABC"),
            "0x0000000000000000000000000000000000000abc"
        );
        assert_eq!(
            normalize_subject("0xAbC4135Cf8f25dA09e49bc8782676A84730c318b"),
            "0xabc4135cf8f25da09e49bc8782676a84730c318b"
        );
    }

    #[test]
    fn test_normalize_subject_is_idempotent() {
        let once = normalize_subject("0XDeadBeef");
        assert_eq!(normalize_subject(&once), once);
    }

    #[test]
    fn test_is_valid_subject() {
        assert!(is_valid_subject("0xabc"));
        assert!(is_valid_subject("0xAbC4135Cf8f25dA09e49bc8782676A84730c318b"));
        assert!(!is_valid_subject(""));
        assert!(!is_valid_subject("0x"));
        assert!(!is_valid_subject("not-an-address"));
        assert!(!is_valid_subject(
            "0xabc4135cf8f25da09e49bc8782676a84730c318b00"
        ));
    }
}
