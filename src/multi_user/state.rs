//! Correlation-state generation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use uuid::Uuid;

/// How the one-time correlation state for a connection attempt is
/// produced.
///
/// The state binds a begin-connection request to its later callback; how
/// unguessable it must be is a policy choice left to the embedding
/// application.
#[derive(Debug, Clone, Default)]
pub enum StatePolicy {
    /// Random UUID (v4), rendered in hyphenated form.
    #[default]
    Uuid,
    /// The given number of random bytes, rendered as unpadded base64url.
    Random(usize),
}

impl StatePolicy {
    /// Generate a fresh correlation state.
    pub(crate) fn generate(&self) -> String {
        match self {
            StatePolicy::Uuid => Uuid::new_v4().to_string(),
            StatePolicy::Random(len) => {
                let mut bytes = vec![0u8; *len];
                rand::rng().fill(bytes.as_mut_slice());
                URL_SAFE_NO_PAD.encode(&bytes)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_states_are_unique() {
        let policy = StatePolicy::Uuid;
        let first = policy.generate();
        let second = policy.generate();
        assert_ne!(first, second);
        assert_eq!(first.len(), 36);
    }

    #[test]
    fn random_states_have_expected_length() {
        let state = StatePolicy::Random(32).generate();
        // 32 bytes -> 43 base64url characters, no padding.
        assert_eq!(state.len(), 43);
        assert!(!state.contains('='));
    }

    #[test]
    fn random_states_are_unique() {
        let policy = StatePolicy::Random(16);
        assert_ne!(policy.generate(), policy.generate());
    }
}
