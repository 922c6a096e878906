use sha2::{Digest, Sha256};
use std::collections::HashMap;

const HASH_ID_LEN: usize = 12;

/// How identifiers are synthesized for options that arrive as bare strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionIdStrategy {
    /// `<questionId>-<position>`. Shifts meaning if an option list is edited
    /// anywhere but at its end.
    #[default]
    Positional,
    /// Digest of the question id and the option text, stable under reordering.
    ContentHash,
}

impl std::str::FromStr for OptionIdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "positional" => Ok(OptionIdStrategy::Positional),
            "content-hash" | "content_hash" | "hash" => Ok(OptionIdStrategy::ContentHash),
            other => Err(format!("unknown option id strategy '{}'", other)),
        }
    }
}

/// Hands out option identifiers for one question.
pub struct OptionIdGenerator {
    strategy: OptionIdStrategy,
    question_id: i64,
    seen: HashMap<String, usize>,
}

impl OptionIdGenerator {
    pub fn new(strategy: OptionIdStrategy, question_id: i64) -> Self {
        Self {
            strategy,
            question_id,
            seen: HashMap::new(),
        }
    }

    pub fn next_id(&mut self, position: usize, text: &str) -> String {
        match self.strategy {
            OptionIdStrategy::Positional => positional_id(self.question_id, position),
            OptionIdStrategy::ContentHash => {
                let base = content_hash_id(self.question_id, text);
                let count = self.seen.entry(base.clone()).or_insert(0);
                *count += 1;
                if *count == 1 {
                    base
                } else {
                    format!("{}-{}", base, count)
                }
            }
        }
    }
}

pub fn positional_id(question_id: i64, position: usize) -> String {
    format!("{}-{}", question_id, position)
}

pub fn content_hash_id(question_id: i64, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(question_id.to_string().as_bytes());
    hasher.update([0u8]);
    hasher.update(text.trim().as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..HASH_ID_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_ids_depend_on_question_and_position() {
        let mut gen = OptionIdGenerator::new(OptionIdStrategy::Positional, 7);
        assert_eq!(gen.next_id(0, "Paris"), "7-0");
        assert_eq!(gen.next_id(1, "Lyon"), "7-1");
    }

    #[test]
    fn content_hash_ignores_position() {
        let mut first = OptionIdGenerator::new(OptionIdStrategy::ContentHash, 3);
        let mut second = OptionIdGenerator::new(OptionIdStrategy::ContentHash, 3);
        assert_eq!(first.next_id(0, "Paris"), second.next_id(5, "Paris"));
        assert_eq!(first.next_id(1, "Lyon").len(), HASH_ID_LEN);
    }

    #[test]
    fn content_hash_disambiguates_duplicate_texts() {
        let mut gen = OptionIdGenerator::new(OptionIdStrategy::ContentHash, 1);
        let a = gen.next_id(0, "same");
        let b = gen.next_id(1, "same");
        assert_ne!(a, b);
        assert_eq!(b, format!("{}-2", a));
    }

    #[test]
    fn strategy_parses_from_config_values() {
        assert_eq!("positional".parse::<OptionIdStrategy>(), Ok(OptionIdStrategy::Positional));
        assert_eq!("content-hash".parse::<OptionIdStrategy>(), Ok(OptionIdStrategy::ContentHash));
        assert!("random".parse::<OptionIdStrategy>().is_err());
    }
}
