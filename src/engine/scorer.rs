//! Heuristic Scorer
//!
//! Local, deterministic grading of prompt text on three axes. Clarity and
//! structure look at the text; specificity looks at how much the user put
//! into the config.
//!
//! | Axis        | Cap | Points                                                  |
//! |-------------|-----|---------------------------------------------------------|
//! | clarity     | 30  | >20 words, >50 words, `?`, "please"/"ensure"            |
//! | specificity | 30  | context >20 chars, examples, constraints, goal          |
//! | structure   | 40  | >3 lines, >5 lines, `1.` or `-`, reasoning technique    |

use crate::constants::scoring::*;
use crate::model::{PromptConfig, PromptScore};

pub fn score(prompt: &str, config: &PromptConfig) -> PromptScore {
    PromptScore::new(
        clarity(prompt),
        specificity(config),
        structure(prompt, config),
    )
}

fn clarity(prompt: &str) -> u32 {
    let words = word_count(prompt);
    let lower = prompt.to_lowercase();

    let mut points = 0;
    if words > WORDS_SHORT {
        points += WORD_POINTS;
    }
    if words > WORDS_LONG {
        points += WORD_POINTS;
    }
    if prompt.contains('?') {
        points += QUESTION_POINTS;
    }
    if DIRECTIVE_WORDS.iter().any(|w| lower.contains(w)) {
        points += POLITE_POINTS;
    }
    points
}

fn specificity(config: &PromptConfig) -> u32 {
    let mut points = 0;
    if config.context.chars().count() > CONTEXT_CHARS {
        points += CONTEXT_POINTS;
    }
    if !config.examples.is_empty() {
        points += EXAMPLES_POINTS;
    }
    if !config.constraints.is_empty() {
        points += CONSTRAINTS_POINTS;
    }
    if !config.goal.is_empty() {
        points += GOAL_POINTS;
    }
    points
}

fn structure(prompt: &str, config: &PromptConfig) -> u32 {
    let lines = prompt.split('\n').filter(|l| !l.trim().is_empty()).count();

    let mut points = 0;
    if lines > LINES_FEW {
        points += LINE_POINTS;
    }
    if lines > LINES_MANY {
        points += LINE_POINTS;
    }
    if LIST_MARKERS.iter().any(|m| prompt.contains(m)) {
        points += LIST_POINTS;
    }
    if REASONING_TECHNIQUE_IDS.contains(&config.technique.id.as_str()) {
        points += REASONING_POINTS;
    }
    points
}

/// Pieces left after splitting on whitespace runs
///
/// Leading or trailing whitespace yields an empty piece that still counts,
/// and the empty string is one piece.
fn word_count(text: &str) -> usize {
    let mut runs = 0;
    let mut in_whitespace = false;
    for ch in text.chars() {
        let ws = ch.is_whitespace();
        if ws && !in_whitespace {
            runs += 1;
        }
        in_whitespace = ws;
    }
    runs + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::model::Example;
    use proptest::prelude::*;

    fn config() -> PromptConfig {
        let catalog = Catalog::builtin().unwrap();
        let mut config = PromptConfig::new(&catalog).unwrap();
        config.technique.id = "zero_shot".to_string();
        config
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_word_count_matches_whitespace_split() {
        assert_eq!(word_count(""), 1);
        assert_eq!(word_count("one"), 1);
        assert_eq!(word_count("one  two\tthree"), 3);
        assert_eq!(word_count(" padded "), 3);
        assert_eq!(word_count("a\n\nb"), 2);
    }

    #[test]
    fn test_word_thresholds_are_strict() {
        let config = config();
        assert_eq!(score(&words(20), &config).clarity(), 0);
        assert_eq!(score(&words(21), &config).clarity(), 10);
        assert_eq!(score(&words(50), &config).clarity(), 10);
        assert_eq!(score(&words(51), &config).clarity(), 20);
    }

    #[test]
    fn test_question_and_directive_points() {
        let config = config();
        assert_eq!(score("Why?", &config).clarity(), 5);
        assert_eq!(score("PLEASE do it", &config).clarity(), 5);
        assert_eq!(score("Ensure this? please", &config).clarity(), 10);
        assert_eq!(score(&format!("{} ? please", words(60)), &config).clarity(), 30);
    }

    #[test]
    fn test_specificity_reads_config() {
        let mut config = config();
        assert_eq!(score("x", &config).specificity(), 0);

        config.context = "exactly twenty chars".to_string();
        assert_eq!(config.context.len(), 20);
        assert_eq!(score("x", &config).specificity(), 0);

        config.context.push('!');
        config.examples.push(Example::new("a", "b"));
        config.constraints = "no jargon".to_string();
        config.goal = "teach".to_string();
        assert_eq!(score("x", &config).specificity(), 30);
    }

    #[test]
    fn test_structure_points() {
        let mut config = config();
        assert_eq!(score("a\nb\nc", &config).structure(), 0);
        assert_eq!(score("a\n\n  \nb\nc\nd", &config).structure(), 10);
        assert_eq!(score("a\nb\nc\nd\ne\nf", &config).structure(), 20);
        assert_eq!(score("1. first", &config).structure(), 10);
        assert_eq!(score("well-known", &config).structure(), 10);

        config.technique.id = "cot".to_string();
        assert_eq!(score("x", &config).structure(), 10);
        config.technique.id = "mega_prompt".to_string();
        assert_eq!(score("a\nb\nc\nd\ne\n- f", &config).structure(), 40);
    }

    #[test]
    fn test_maximum_score() {
        let mut config = config();
        config.technique.id = "cot".to_string();
        config.context = "a context that is long enough".to_string();
        config.examples.push(Example::new("a", "b"));
        config.constraints = "c".to_string();
        config.goal = "g".to_string();

        let prompt = format!("{}\n1. please?\n-\nb\nc\nd\ne", words(60));
        let s = score(&prompt, &config);
        assert_eq!(s.total(), 100);
    }

    proptest! {
        #[test]
        fn prop_score_is_deterministic_and_bounded(prompt in "(?s).{0,400}", context in ".{0,40}") {
            let mut config = config();
            config.context = context;
            let first = score(&prompt, &config);
            let second = score(&prompt, &config);
            prop_assert_eq!(first, second);
            prop_assert!(first.clarity() <= 30);
            prop_assert!(first.specificity() <= 30);
            prop_assert!(first.structure() <= 40);
            prop_assert_eq!(
                first.total(),
                (first.clarity() + first.specificity() + first.structure()).min(100)
            );
        }
    }
}
