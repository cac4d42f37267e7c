//! Word substitution over plain text.
//!
//! Matching is deliberately shallow: a token is eligible whenever some
//! vocabulary entry starts with the token's first letter, and the rest
//! of the token is never inspected. That is the prank.

use fancy_regex::Regex;
use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::vocabulary::VOCABULARY;

/// Share of candidate tokens replaced when no rate is configured.
pub const DEFAULT_RATE: f32 = 0.4;

lazy_static! {
    /// Maximal runs of word characters (letters, digits, underscore).
    static ref WORD_PATTERN: Regex = Regex::new(r"\w+").expect("static pattern");
}

/// A word token with its byte offsets in the source text.
struct Token {
    start: usize,
    len: usize,
    initial: char,
}

/// Word-substitution engine over a fixed vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct Substituter {
    vocabulary: &'static [&'static str],
}

impl Default for Substituter {
    fn default() -> Self {
        Self::new()
    }
}

impl Substituter {
    /// Create an engine over the built-in vocabulary.
    pub fn new() -> Self {
        Self {
            vocabulary: VOCABULARY,
        }
    }

    /// Create an engine over a custom word list. Words must be lowercase.
    #[cfg(test)]
    pub fn with_vocabulary(vocabulary: &'static [&'static str]) -> Self {
        Self { vocabulary }
    }

    /// Transform `text`, replacing a `rate` share of candidate words.
    ///
    /// A rate outside `[0, 1]`, or no rate at all, falls back to
    /// [`DEFAULT_RATE`]. Selection is freshly randomized per call.
    pub fn transform(&self, text: &str, rate: Option<f32>) -> String {
        self.transform_with(text, rate, &mut rand::thread_rng())
    }

    /// Transform with a caller-supplied random source.
    pub fn transform_with<R: Rng + ?Sized>(
        &self,
        text: &str,
        rate: Option<f32>,
        rng: &mut R,
    ) -> String {
        let rate = rate
            .filter(|r| (0.0..=1.0).contains(r))
            .unwrap_or(DEFAULT_RATE);

        let mut candidates: Vec<Token> = tokenize(text)
            .into_iter()
            .filter(|token| !self.matching(token.initial).is_empty())
            .collect();
        candidates.shuffle(rng);

        let picked = (candidates.len() as f32 * rate).floor() as usize;
        let mut spans: Vec<(usize, usize, &str)> = candidates[..picked]
            .iter()
            .map(|token| {
                let pool = self.matching(token.initial);
                (token.start, token.len, pool[rng.gen_range(0..pool.len())])
            })
            .collect();
        // Spans come from disjoint tokens, so ordering by start is enough
        // to splice them back in one pass.
        spans.sort_unstable_by_key(|&(start, _, _)| start);

        let mut output = String::with_capacity(text.len());
        let mut cursor = 0;
        for (start, len, replacement) in spans {
            output.push_str(&text[cursor..start]);
            output.push_str(replacement);
            cursor = start + len;
        }
        output.push_str(&text[cursor..]);
        output
    }

    /// Vocabulary entries starting with `initial`, case-insensitively.
    fn matching(&self, initial: char) -> Vec<&'static str> {
        let initial = initial.to_lowercase().next().unwrap_or(initial);
        self.vocabulary
            .iter()
            .copied()
            .filter(|word| word.chars().next() == Some(initial))
            .collect()
    }
}

/// Split `text` into word tokens with their byte offsets.
fn tokenize(text: &str) -> Vec<Token> {
    WORD_PATTERN
        .find_iter(text)
        .filter_map(Result::ok)
        .filter_map(|m| {
            m.as_str().chars().next().map(|initial| Token {
                start: m.start(),
                len: m.end() - m.start(),
                initial,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn test_zero_rate_is_identity() {
        let engine = Substituter::new();
        let text = "an ant ate an apple, damn it!";
        assert_eq!(engine.transform_with(text, Some(0.0), &mut rng(1)), text);
    }

    #[test]
    fn test_full_rate_replaces_every_candidate() {
        let engine = Substituter::with_vocabulary(&["ass", "ask"]);
        let output = engine.transform_with("an ant ate an apple", Some(1.0), &mut rng(2));
        let words: Vec<&str> = output.split_whitespace().collect();
        assert_eq!(words.len(), 5);
        for word in words {
            assert!(word == "ass" || word == "ask", "unexpected word {word}");
        }
    }

    #[test]
    fn test_replacement_keeps_first_letter_case_insensitively() {
        let engine = Substituter::new();
        for seed in 0..16 {
            let output = engine.transform_with("Horrid Wasps", Some(1.0), &mut rng(seed));
            let words: Vec<&str> = output.split_whitespace().collect();
            assert!(words[0].starts_with('h'), "got {}", words[0]);
            assert!(words[1].starts_with('w'), "got {}", words[1]);
        }
    }

    #[test]
    fn test_non_candidates_and_punctuation_preserved() {
        // No vocabulary entry starts with 'z' or 'q'.
        let engine = Substituter::new();
        let text = "zzz... qwerty?! (42) _under";
        assert_eq!(engine.transform_with(text, Some(1.0), &mut rng(3)), text);
    }

    #[test]
    fn test_mixed_candidates_leave_rest_untouched() {
        let engine = Substituter::with_vocabulary(&["hell"]);
        let output = engine.transform_with("Hello zebra, hi.", Some(1.0), &mut rng(4));
        assert_eq!(output, "hell zebra, hell.");
    }

    #[test]
    fn test_count_is_floored() {
        // Five candidates at rate 0.5 replaces exactly two of them.
        let engine = Substituter::with_vocabulary(&["ask"]);
        let output = engine.transform_with("aa ab ac ad ae", Some(0.5), &mut rng(5));
        let replaced = output
            .split_whitespace()
            .filter(|word| *word == "ask")
            .count();
        assert_eq!(replaced, 2);
    }

    #[test]
    fn test_out_of_range_rate_falls_back_to_default() {
        let engine = Substituter::new();
        let text = "an ant ate an apple and a banana because cats don't";
        for bad in [-0.5_f32, 1.5, 150.0] {
            assert_eq!(
                engine.transform_with(text, Some(bad), &mut rng(6)),
                engine.transform_with(text, Some(DEFAULT_RATE), &mut rng(6)),
            );
        }
        assert_eq!(
            engine.transform_with(text, None, &mut rng(7)),
            engine.transform_with(text, Some(DEFAULT_RATE), &mut rng(7)),
        );
    }

    #[test]
    fn test_multibyte_text_survives_splicing() {
        let engine = Substituter::with_vocabulary(&["ask"]);
        let output = engine.transform_with("añejo — très 😀 apt", Some(1.0), &mut rng(8));
        assert_eq!(output, "ask — très 😀 ask");
    }

    #[test]
    fn test_empty_input() {
        let engine = Substituter::new();
        assert_eq!(engine.transform_with("", Some(1.0), &mut rng(9)), "");
    }
}
