//! Lenient extraction of named fields from the tagged text the model
//! returns. Model output is never guaranteed well-formed, so missing or
//! mismatched markers yield empty strings instead of errors.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

/// Fields expected from the intent-assessment call.
pub const ASSESSMENT_TAGS: &[&str] = &["intent", "reasoning", "initial_understanding"];

/// Fields expected from each refinement turn.
pub const REFINEMENT_TAGS: &[&str] = &[
    "thinking",
    "extracted_context",
    "extracted_goal",
    "extracted_format",
    "ai_role",
    "additional_insights",
    "score",
    "reasoning",
    "ready_to_finalize",
    "user_message",
];

/// Fields expected from the final optimization call.
pub const OPTIMIZATION_TAGS: &[&str] = &["thinking", "optimized_prompt", "improvement_summary"];

/// Extract the content of the first `<tag>...</tag>` pair, trimmed.
/// Non-greedy, spans newlines, empty string when the pair is absent.
pub fn extract_tag(text: &str, tag: &str) -> String {
    let pattern = format!("(?s)<{0}>(.*?)</{0}>", regex::escape(tag));
    match Regex::new(&pattern) {
        Ok(re) => re
            .captures(text)
            .map(|caps| caps[1].trim().to_string())
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// Extract every requested tag from a response. Every requested tag is
/// present in the result, mapped to "" when not found in the text.
pub fn parse_tagged(text: &str, tags: &[&str]) -> HashMap<String, String> {
    tags.iter()
        .map(|tag| (tag.to_string(), extract_tag(text, tag)))
        .collect()
}

fn test_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<test number="(\d+)">(.*?)</test>"#).expect("valid test-block pattern")
    })
}

/// Return the inner content of each `<test number="N">...</test>` envelope
/// in order of appearance. The captured number only delimits blocks;
/// ordering follows the text.
pub fn extract_test_blocks(text: &str) -> Vec<String> {
    test_block_regex()
        .captures_iter(text)
        .map(|caps| caps[2].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_a_simple_tag() {
        assert_eq!(extract_tag("<goal>write a poem</goal>", "goal"), "write a poem");
    }

    #[test]
    fn trims_and_spans_newlines() {
        let text = "<user_message>\nHello there.\nWhat domain is this for?\n</user_message>";
        assert_eq!(
            extract_tag(text, "user_message"),
            "Hello there.\nWhat domain is this for?"
        );
    }

    #[test]
    fn missing_tag_yields_empty_string() {
        assert_eq!(extract_tag("no tags here at all", "goal"), "");
    }

    #[test]
    fn first_occurrence_wins() {
        let text = "<score>0.4</score> noise <score>0.9</score>";
        assert_eq!(extract_tag(text, "score"), "0.4");
    }

    #[test]
    fn extraction_is_non_greedy() {
        let text = "<a>first</a> middle <a>second</a>";
        assert_eq!(extract_tag(text, "a"), "first");
    }

    #[test]
    fn closing_marker_before_opening_is_no_match() {
        assert_eq!(extract_tag("</goal> stray <goal>unterminated", "goal"), "");
    }

    #[test]
    fn parse_tagged_covers_every_requested_field() {
        let parsed = parse_tagged("<intent>create_new</intent>", ASSESSMENT_TAGS);
        assert_eq!(parsed.len(), ASSESSMENT_TAGS.len());
        assert_eq!(parsed["intent"], "create_new");
        assert_eq!(parsed["reasoning"], "");
        assert_eq!(parsed["initial_understanding"], "");
    }

    #[test]
    fn parse_tagged_is_deterministic() {
        let text = "<thinking>hm</thinking><score>0.7</score>";
        assert_eq!(
            parse_tagged(text, REFINEMENT_TAGS),
            parse_tagged(text, REFINEMENT_TAGS)
        );
    }

    #[test]
    fn unknown_extra_tags_are_ignored() {
        let text = "<surprise>!</surprise><intent>unclear</intent>";
        let parsed = parse_tagged(text, ASSESSMENT_TAGS);
        assert_eq!(parsed["intent"], "unclear");
        assert!(!parsed.contains_key("surprise"));
    }

    #[test]
    fn test_blocks_come_back_in_source_order() {
        let text = r#"preamble
<test number="2">
<scenario>first in text</scenario>
<input>a</input>
<expected_behavior>does a</expected_behavior>
</test>
interleaved chatter
<test number="1">
<scenario>second in text</scenario>
<input>b</input>
<expected_behavior>does b</expected_behavior>
</test>
trailing"#;

        let blocks = extract_test_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(extract_tag(&blocks[0], "scenario"), "first in text");
        assert_eq!(extract_tag(&blocks[1], "scenario"), "second in text");
    }

    #[test]
    fn no_test_blocks_yields_empty_vec() {
        assert!(extract_test_blocks("nothing structured here").is_empty());
    }
}
