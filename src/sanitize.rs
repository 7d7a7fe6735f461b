use regex::Regex;
use std::sync::OnceLock;

/// Strips a Markdown code fence wrapping from an LLM response.
///
/// Models are told to return a bare JSON object, but many wrap the payload in
/// a fenced block anyway. The strip is best-effort and anchored: a leading
/// fence (optionally tagged `json`) and a trailing fence are removed if
/// present, then surrounding whitespace is trimmed. Input without fences, or
/// with a fence at only one end, comes back otherwise unchanged. The output
/// is a candidate JSON string, not guaranteed to parse.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    static LEADING: OnceLock<Regex> = OnceLock::new();
    static TRAILING: OnceLock<Regex> = OnceLock::new();

    let leading = LEADING
        .get_or_init(|| Regex::new(r"^\s*```(?:json)?\s*").expect("Invalid regex defined in code"));
    let trailing = TRAILING
        .get_or_init(|| Regex::new(r"\s*```\s*$").expect("Invalid regex defined in code"));

    let cleaned = leading.replace(text, "");
    let cleaned = trailing.replace(&cleaned, "");
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tagged_fence() {
        let input = "```json\n{\"title\": \"T\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"title\": \"T\"}");
    }

    #[test]
    fn strips_untagged_fence() {
        let input = "```\n{\"title\": \"T\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"title\": \"T\"}");
    }

    #[test]
    fn unfenced_input_only_trimmed() {
        let input = "  {\"title\": \"T\"}\n";
        assert_eq!(strip_code_fences(input), "{\"title\": \"T\"}");
    }

    #[test]
    fn leading_fence_only() {
        let input = "```json\n{\"title\": \"T\"}";
        assert_eq!(strip_code_fences(input), "{\"title\": \"T\"}");
    }

    #[test]
    fn trailing_fence_only() {
        let input = "{\"title\": \"T\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"title\": \"T\"}");
    }

    #[test]
    fn fence_markers_inside_body_are_kept() {
        let input = "```json\n{\"content\": \"use ``` for code blocks\"}\n```";
        assert_eq!(
            strip_code_fences(input),
            "{\"content\": \"use ``` for code blocks\"}"
        );
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "```json\n{\"a\": 1}\n```",
            "{\"a\": 1}",
            "```\n```",
            "not json at all",
            "",
        ];
        for input in inputs {
            let once = strip_code_fences(input);
            assert_eq!(strip_code_fences(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn bare_fence_pair_becomes_empty() {
        assert_eq!(strip_code_fences("```json\n```"), "");
    }
}
