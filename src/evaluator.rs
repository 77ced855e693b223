/// Result of checking a POOL guess buffer against the remaining targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Buffer spells the target at this position in the remaining list
    ExactMatch(usize),
    /// Buffer starts at least one remaining target; keep collecting letters
    ValidPrefix,
    /// Buffer can no longer become any remaining target
    Invalid,
}

/// Classify `guess` against `remaining`, case-insensitively.
///
/// An exact match wins over a prefix match. With duplicate targets the first
/// one in `remaining` is reported.
pub fn classify<S: AsRef<str>>(guess: &str, remaining: &[S]) -> Classification {
    let guess = guess.to_lowercase();

    if let Some(pos) = remaining
        .iter()
        .position(|target| target.as_ref().to_lowercase() == guess)
    {
        return Classification::ExactMatch(pos);
    }

    if remaining
        .iter()
        .any(|target| target.as_ref().to_lowercase().starts_with(&guess))
    {
        Classification::ValidPrefix
    } else {
        Classification::Invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_reports_position() {
        let remaining = ["word", "game", "okbi"];
        assert_eq!(classify("game", &remaining), Classification::ExactMatch(1));
    }

    #[test]
    fn exact_match_ignores_case() {
        let remaining = ["Beyza"];
        assert_eq!(classify("beyza", &remaining), Classification::ExactMatch(0));
        assert_eq!(classify("BEYZA", &remaining), Classification::ExactMatch(0));
    }

    #[test]
    fn exact_match_beats_prefix() {
        // "word" is both complete and a prefix of "words"
        let remaining = ["words", "word"];
        assert_eq!(classify("word", &remaining), Classification::ExactMatch(1));
    }

    #[test]
    fn duplicate_targets_pick_first() {
        let remaining = ["game", "game"];
        assert_eq!(classify("game", &remaining), Classification::ExactMatch(0));
    }

    #[test]
    fn prefixes_are_valid() {
        let remaining = ["puzzle", "word"];
        assert_eq!(classify("p", &remaining), Classification::ValidPrefix);
        assert_eq!(classify("puzz", &remaining), Classification::ValidPrefix);
        assert_eq!(classify("WO", &remaining), Classification::ValidPrefix);
    }

    #[test]
    fn non_prefix_is_invalid() {
        let remaining = ["puzzle", "word"];
        assert_eq!(classify("x", &remaining), Classification::Invalid);
        assert_eq!(classify("pw", &remaining), Classification::Invalid);
        assert_eq!(classify("wordy", &remaining), Classification::Invalid);
    }

    #[test]
    fn nothing_remaining_is_invalid() {
        let remaining: [&str; 0] = [];
        assert_eq!(classify("a", &remaining), Classification::Invalid);
    }

    #[test]
    fn spaces_are_significant() {
        let remaining = ["the cat".to_string()];
        assert_eq!(classify("the ", &remaining), Classification::ValidPrefix);
        assert_eq!(classify("thec", &remaining), Classification::Invalid);
    }
}
