//! Fast hashing utilities using xxHash3.
//!
//! Used to skip resending unchanged virtual documents to a script engine.

use xxhash_rust::xxh3::xxh3_64;

/// Compute a 64-bit hash of the given string using xxHash3.
#[inline]
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}

/// Compute hash of a string and return it as a 16 character hex string.
#[inline]
pub fn content_hash(content: &str) -> String {
    format!("{:016x}", hash_str(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_consistency() {
        assert_eq!(hash_str("<Element />"), hash_str("<Element />"));
        assert_ne!(hash_str("state()"), hash_str("props()"));
    }

    #[test]
    fn test_content_hash_format() {
        let hex = content_hash("export default {}");
        assert_eq!(hex.len(), 16);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
