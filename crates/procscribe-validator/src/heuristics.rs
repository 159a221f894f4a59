//! Rule-based judgments used when the completion backend can't be relied on.

use std::collections::HashSet;

use procscribe_state::InterviewState;

/// Words ignored when comparing question and answer vocabulary
pub const STOP_WORDS: &[&str] = &[
    "what", "how", "why", "when", "where", "who", "which", "the", "a", "an", "is", "are", "do",
    "does", "can", "could",
];

/// Minimum interactions before the fallback rule can call an interview complete
pub const MIN_INTERACTIONS: usize = 5;
/// Minimum distinct aspects before the fallback rule can call an interview complete
pub const MIN_ASPECTS: usize = 3;

fn tokens(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// Relevant when any non-stop-word of the question also appears in the answer.
pub fn keyword_overlap(question: &str, answer: &str) -> (bool, String) {
    let answer_tokens = tokens(answer);
    let has_overlap = tokens(question)
        .iter()
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .any(|word| answer_tokens.contains(word));

    if has_overlap {
        (
            true,
            "Answer contains relevant keywords from the question.".to_string(),
        )
    } else {
        (
            false,
            "Answer does not address the specific question asked.".to_string(),
        )
    }
}

/// Complete once enough interactions spanning enough aspects have been collected.
pub fn coverage_rule(state: &InterviewState) -> (bool, String) {
    let aspects_covered = state.covered_aspects().len();
    let interactions = state.transcript().len();

    if interactions >= MIN_INTERACTIONS && aspects_covered >= MIN_ASPECTS {
        (
            true,
            format!(
                "Covered {} aspects in {} interactions.",
                aspects_covered, interactions
            ),
        )
    } else {
        (
            false,
            format!(
                "Need more information. Currently {} aspects covered in {} interactions.",
                aspects_covered, interactions
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_ignores_stop_words_and_punctuation() {
        let (relevant, _) = keyword_overlap("What tools do you need?", "Only my hands and tools.");
        assert!(relevant);

        // "what" and "is" are stop words and must not count as overlap
        let (relevant, reason) = keyword_overlap("What is it?", "What it is, is a mystery");
        assert!(relevant, "\"it\" is not a stop word: {reason}");

        let (relevant, _) = keyword_overlap("What is the purpose?", "What is the weather like");
        assert!(!relevant);
    }

    #[test]
    fn test_overlap_is_case_insensitive() {
        let (relevant, _) = keyword_overlap("Which EQUIPMENT is required?", "equipment: a ladder");
        assert!(relevant);
    }

    #[test]
    fn test_coverage_rule_thresholds() {
        let mut state = InterviewState::new();
        state.add_interaction("What is the purpose?", "a");
        state.add_interaction("Which tools?", "b");
        state.add_interaction("What are the steps?", "c");
        state.add_interaction("Anything else?", "d");
        assert!(!coverage_rule(&state).0, "four interactions are not enough");

        state.add_interaction("Anything more?", "e");
        let (complete, reason) = coverage_rule(&state);
        assert!(complete);
        assert_eq!(reason, "Covered 3 aspects in 5 interactions.");
    }

    #[test]
    fn test_coverage_rule_needs_three_aspects() {
        let mut state = InterviewState::new();
        for _ in 0..6 {
            state.add_interaction("Why?", "because");
        }
        state.add_interaction("Which tools?", "hammer");
        assert!(!coverage_rule(&state).0);
    }
}
