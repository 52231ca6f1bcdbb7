//! Deterministic identity hashing for records and exceptions.
//!
//! Both hashes are plain SHA-1 over a colon-joined natural key, hex-encoded
//! lowercase. The record hash intentionally excludes host names so that a
//! rename of either endpoint does not change the record's identity.

use sha1::{Digest, Sha1};
use std::net::IpAddr;

/// Computes a record id from its four-field natural key: local ip, remote
/// ip, probe mode, and port. Host names are not part of the key.
pub fn record_id(local_ip: &IpAddr, remote_ip: &IpAddr, mode: &str, port: u16) -> String {
    let key = format!("{}:{}:{}:{}", local_ip, remote_ip, mode, port);
    digest_hex(key.as_bytes())
}

/// Computes an exception id from its natural key: account id, host mask,
/// ignore mask.
pub fn exception_id(account_id: u32, host_mask: &str, ignore_mask: &str) -> String {
    let key = format!("{}:{}:{}", account_id, host_mask, ignore_mask);
    digest_hex(key.as_bytes())
}

fn digest_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_is_stable_across_host_names() {
        let a = record_id(
            &"10.0.0.1".parse().unwrap(),
            &"10.0.0.2".parse().unwrap(),
            "tcp",
            443,
        );
        let b = record_id(
            &"10.0.0.1".parse().unwrap(),
            &"10.0.0.2".parse().unwrap(),
            "tcp",
            443,
        );
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn record_id_changes_with_any_key_field() {
        let base = record_id(
            &"10.0.0.1".parse().unwrap(),
            &"10.0.0.2".parse().unwrap(),
            "tcp",
            443,
        );
        let diff_port = record_id(
            &"10.0.0.1".parse().unwrap(),
            &"10.0.0.2".parse().unwrap(),
            "tcp",
            8443,
        );
        let diff_mode = record_id(
            &"10.0.0.1".parse().unwrap(),
            &"10.0.0.2".parse().unwrap(),
            "udp",
            443,
        );
        assert_ne!(base, diff_port);
        assert_ne!(base, diff_mode);
    }

    #[test]
    fn exception_id_matches_known_vector() {
        let id = exception_id(7, ".*", "db\\.internal:5432");
        assert_eq!(id, exception_id(7, ".*", "db\\.internal:5432"));
        assert_ne!(id, exception_id(8, ".*", "db\\.internal:5432"));
    }
}
