//! Commit fingerprint computation

use sha2::{Digest, Sha256};

use crate::domain::prompt::PromptSnapshot;

/// Compute the deterministic fingerprint of a prompt snapshot.
///
/// `generation` is the number of commits recorded before the one being
/// fingerprinted; it salts the digest so identical content committed at
/// different points in history produces distinct hashes. Pure function:
/// the same (snapshot, generation) pair always yields the same hex string.
pub fn compute_commit_hash(snapshot: &PromptSnapshot, generation: u64) -> String {
    // ConfigPayload is a sorted map with string keys, so this serialization
    // is canonical and cannot fail.
    let config_json =
        serde_json::to_vec(&snapshot.config).expect("config payload serializes to JSON");

    let mut hasher = Sha256::new();
    hasher.update(snapshot.value.as_bytes());
    hasher.update([0u8]);
    hasher.update(&config_json);
    hasher.update([0u8]);
    hasher.update(generation.to_be_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prompt::ConfigPayload;

    fn snapshot(value: &str) -> PromptSnapshot {
        let mut config = ConfigPayload::new();
        config.insert("temperature".to_string(), serde_json::json!(0.7));
        config.insert("max_tokens".to_string(), serde_json::json!(1024));
        PromptSnapshot {
            value: value.to_string(),
            config,
        }
    }

    #[test]
    fn test_hash_is_deterministic() {
        let snap = snapshot("You are a helpful assistant.");
        assert_eq!(compute_commit_hash(&snap, 3), compute_commit_hash(&snap, 3));
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = compute_commit_hash(&snapshot("content"), 0);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_changes_with_value() {
        let a = compute_commit_hash(&snapshot("first"), 0);
        let b = compute_commit_hash(&snapshot("second"), 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_changes_with_config() {
        let base = snapshot("content");
        let mut changed = base.clone();
        changed
            .config
            .insert("temperature".to_string(), serde_json::json!(0.9));

        assert_ne!(
            compute_commit_hash(&base, 0),
            compute_commit_hash(&changed, 0)
        );
    }

    #[test]
    fn test_hash_changes_with_generation() {
        let snap = snapshot("content");
        assert_ne!(compute_commit_hash(&snap, 0), compute_commit_hash(&snap, 1));
    }

    #[test]
    fn test_hash_insensitive_to_insertion_order() {
        let mut first = ConfigPayload::new();
        first.insert("a".to_string(), serde_json::json!(1));
        first.insert("b".to_string(), serde_json::json!(2));

        let mut second = ConfigPayload::new();
        second.insert("b".to_string(), serde_json::json!(2));
        second.insert("a".to_string(), serde_json::json!(1));

        let left = PromptSnapshot {
            value: "content".to_string(),
            config: first,
        };
        let right = PromptSnapshot {
            value: "content".to_string(),
            config: second,
        };

        assert_eq!(compute_commit_hash(&left, 0), compute_commit_hash(&right, 0));
    }
}
