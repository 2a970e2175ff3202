//! Pass token generation.
//!
//! Tokens look like `LAVAZA_VTU21761_K3Q9ZP0A`: namespace prefix, upper-cased
//! identifier, random suffix. Uniqueness is enforced by the store, not here.

use rand::Rng;

const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone)]
pub struct TokenGenerator {
    prefix: String,
    suffix_length: usize,
}

impl TokenGenerator {
    #[must_use]
    pub fn new(prefix: impl Into<String>, suffix_length: usize) -> Self {
        Self {
            prefix: prefix.into(),
            suffix_length,
        }
    }

    #[must_use]
    pub fn generate(&self, identifier: &str) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..self.suffix_length)
            .map(|_| char::from(SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())]))
            .collect();

        format!(
            "{}_{}_{}",
            self.prefix,
            identifier.trim().to_uppercase(),
            suffix
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::collections::HashSet;

    #[test]
    fn token_has_prefix_identifier_and_suffix() {
        let generator = TokenGenerator::new("LAVAZA", 8);
        let token = generator.generate("vtu21761");
        let pattern = Regex::new(r"^LAVAZA_VTU21761_[A-Z0-9]{4,}$").unwrap();
        assert!(pattern.is_match(&token), "{token}");
        assert_eq!(token.len(), "LAVAZA_VTU21761_".len() + 8);
    }

    #[test]
    fn minimum_suffix_still_matches() {
        let generator = TokenGenerator::new("LAVAZA", 4);
        let token = generator.generate(" vtu21761 ");
        let pattern = Regex::new(r"^LAVAZA_VTU21761_[A-Z0-9]{4}$").unwrap();
        assert!(pattern.is_match(&token), "{token}");
    }

    #[test]
    fn repeated_calls_do_not_collide() {
        let generator = TokenGenerator::new("LAVAZA", 8);
        let tokens: HashSet<String> = (0..1000).map(|_| generator.generate("vtu21761")).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
