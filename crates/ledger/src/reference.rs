//! Reference number (RRN) generation.

use rand::Rng;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of generated reference numbers.
pub const REFERENCE_LEN: usize = 12;

/// Source of candidate reference numbers. The store rejects duplicates and asks again.
pub trait ReferenceGenerator: Send + Sync {
    fn next_reference(&self) -> String;
}

/// Twelve random base-36 characters from the thread-local CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomReference;

impl ReferenceGenerator for RandomReference {
    fn next_reference(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..REFERENCE_LEN)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_references_are_base36_of_fixed_length() {
        let r = RandomReference.next_reference();
        assert_eq!(r.len(), REFERENCE_LEN);
        assert!(r.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn random_references_differ() {
        let a = RandomReference.next_reference();
        let b = RandomReference.next_reference();
        assert_ne!(a, b);
    }
}
