//! Crisis language detection
//!
//! A coarse, conservative keyword filter that runs before any model call.
//! It is designed to over-trigger rather than miss: matching is
//! case-insensitive substring search, so a keyword inside a larger word
//! still trips the gate. Pure and deterministic, no I/O.

/// Keyword and phrase list, version 1
///
/// Changing this list changes policy; additions are safe, removals need
/// review.
const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "want to die",
    "self harm",
    "cutting myself",
    "overdose",
    "jumping",
    "hanging",
    "can't go on",
    "no point living",
    "better off dead",
    "harm myself",
    "hurt myself",
    "worthless",
    "hopeless",
    "end it all",
];

/// Fixed response shown when crisis language is detected
///
/// The response never reveals which keyword matched.
pub const CRISIS_MESSAGE: &str = "I notice you might be going through a really difficult time. \
Your safety and wellbeing are important. \
Please reach out to a crisis helpline or emergency services immediately.";

/// Check a message for crisis language
///
/// Returns `true` if any keyword appears anywhere in the text, ignoring
/// case. On a match the caller must skip every downstream component: no
/// persistence, no provider call.
pub fn detect(text: &str) -> bool {
    let lower = text.to_lowercase();
    CRISIS_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_keyword_matches_verbatim() {
        for keyword in CRISIS_KEYWORDS {
            assert!(detect(keyword), "keyword not detected: {}", keyword);
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(detect("I want to END MY LIFE"));
        assert!(detect("SUICIDE"));
        assert!(detect("Hopeless"));
    }

    #[test]
    fn keywords_match_inside_sentences() {
        assert!(detect("sometimes I think about suicide a lot"));
        assert!(detect("honestly I just can't go on like this"));
        assert!(detect("maybe everyone would be better off dead without me"));
    }

    #[test]
    fn substring_semantics_over_trigger_by_design() {
        // "hanging" inside an unrelated phrase still matches; conservative
        // over-triggering is intentional.
        assert!(detect("we were hanging out at the mall"));
        assert!(detect("the painting is overdosed with color"));
    }

    #[test]
    fn neutral_wellbeing_messages_pass() {
        let neutral = [
            "I feel anxious about work",
            "I had a rough day but I'm okay",
            "Can you suggest a breathing exercise?",
            "I argued with my partner and feel sad",
            "How do I build a better sleep routine?",
            "I'm stressed about my exams next week",
        ];
        for message in neutral {
            assert!(!detect(message), "false positive on: {}", message);
        }
    }

    #[test]
    fn empty_message_is_not_crisis() {
        assert!(!detect(""));
        assert!(!detect("   "));
    }
}
