//! Property-based tests for reasoning removal

use ai_core::strip_reasoning;
use proptest::prelude::*;

/// Words without markers, tags or line breaks
fn plain_answer() -> impl Strategy<Value = String> {
    "[a-z]{1,10}( [a-z]{1,10}){0,8}"
}

proptest! {
    #[test]
    fn think_block_is_removed(thought in "[a-z \n]{0,60}", answer in plain_answer()) {
        let raw = format!("<think>{thought}</think>\n{answer}");
        prop_assert_eq!(strip_reasoning(&raw), answer);
    }

    #[test]
    fn final_answer_marker_keeps_only_the_answer(
        preamble in "[a-z ]{0,40}",
        answer in plain_answer(),
    ) {
        let raw = format!("{preamble}\nFinal Answer: {answer}");
        prop_assert_eq!(strip_reasoning(&raw), answer);
    }

    #[test]
    fn cleaning_is_idempotent(text in "[a-z ]{0,30}(\n{1,4}[a-z ]{0,30}){0,4}") {
        let once = strip_reasoning(&text);
        prop_assert_eq!(strip_reasoning(&once), once.clone());
        prop_assert!(!once.contains("\n\n\n"));
    }
}
