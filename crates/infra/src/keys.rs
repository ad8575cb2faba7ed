//! Random keys and stable fingerprints stored alongside rows.

use rand::{distr::Alphanumeric, RngExt};
use sha2::{Digest, Sha256};

/// Random alphanumeric string, used for wishlist share keys and product
/// alert confirmation keys.
pub fn random_key(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Fingerprint of the fields that make two addresses "the same" address.
///
/// Fields are trimmed and upper-cased before hashing, so cosmetic edits
/// don't produce a different fingerprint.
pub fn address_hash(fields: &[&str]) -> String {
    let summary = fields
        .iter()
        .map(|f| f.trim().to_uppercase())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(",");

    let digest = Sha256::digest(summary.as_bytes());
    digest
        .iter()
        .take(8)
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// URL slug: lowercase ASCII alphanumerics separated by single dashes.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_keys_are_alphanumeric_and_sized() {
        let key = random_key(6);
        assert_eq!(key.len(), 6);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(random_key(40).len(), 40);
    }

    #[test]
    fn address_hash_ignores_case_padding_and_blank_fields() {
        let a = address_hash(&["Ada", "Lovelace", "1 High St", "", "N1 1AA", "GB"]);
        let b = address_hash(&["  ada ", "LOVELACE", "1 high st", "n1 1aa", "gb"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);

        let other = address_hash(&["Ada", "Lovelace", "2 High St", "N1 1AA", "GB"]);
        assert_ne!(a, other);
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Winter Sale -- 20% off!"), "winter-sale-20-off");
        assert_eq!(slugify("  Gift card "), "gift-card");
        assert_eq!(slugify("***"), "");
    }
}
