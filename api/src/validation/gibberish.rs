//! Heuristics for non-human-like text
//!
//! Two rules: a 2 or 3 character block repeated three times in a row, and
//! consonant density above 75% of the letters in texts of 8+ characters.

const REPEAT_BLOCK_LENGTHS: [usize; 2] = [2, 3];
const REPEAT_COUNT: usize = 3;
const DENSITY_MIN_LENGTH: usize = 8;
const MAX_CONSONANT_RATIO: f64 = 0.75;

/// Returns true if either heuristic fires
pub fn is_gibberish(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    has_repeated_block(&chars) || is_consonant_heavy(&chars)
}

fn has_repeated_block(chars: &[char]) -> bool {
    REPEAT_BLOCK_LENGTHS.iter().any(|&len| {
        let window = len * REPEAT_COUNT;
        chars.windows(window).any(|run| {
            let block = &run[..len];
            run.chunks(len).all(|chunk| chunk == block)
        })
    })
}

fn is_consonant_heavy(chars: &[char]) -> bool {
    if chars.len() < DENSITY_MIN_LENGTH {
        return false;
    }

    let letters = chars.iter().filter(|c| c.is_ascii_alphabetic()).count();
    if letters == 0 {
        return false;
    }

    let consonants = chars
        .iter()
        .filter(|c| c.is_ascii_alphabetic() && !is_vowel(**c))
        .count();

    consonants as f64 / letters as f64 > MAX_CONSONANT_RATIO
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_blocks() {
        assert!(is_gibberish("ababab"));
        assert!(is_gibberish("xyzxyzxyz"));
        assert!(is_gibberish("my name is hahaha"));
        assert!(!is_gibberish("abab"));
    }

    #[test]
    fn test_consonant_density() {
        assert!(is_gibberish("bcdfghjklmnpq"));
        assert!(is_gibberish("qwrtzxcvb"));
        // Short strings are exempt from the density rule
        assert!(!is_gibberish("rhythm"));
    }

    #[test]
    fn test_consonant_density_boundaries() {
        // Seven letters sit below the length threshold
        assert!(!is_gibberish("bcdfghj"));
        // 6 of 8 is exactly the limit and passes
        assert!(!is_gibberish("bacdefgh"));
        // 7 of 9 is over it
        assert!(is_gibberish("bacdefghj"));
    }

    #[test]
    fn test_human_text_passes() {
        assert!(!is_gibberish("hello world"));
        assert!(!is_gibberish("42 Baker Street, London"));
        assert!(!is_gibberish("Alice"));
    }

    #[test]
    fn test_digits_only_never_trigger_density() {
        assert!(!is_gibberish("12345678"));
        assert!(!is_gibberish("9876543211"));
    }

    #[test]
    fn test_repeated_digits_are_blocks() {
        assert!(is_gibberish("121212"));
    }

    #[test]
    fn test_is_deterministic() {
        for text in ["ababab", "hello world", "bcdfghjklmnpq"] {
            assert_eq!(is_gibberish(text), is_gibberish(text));
        }
    }
}
