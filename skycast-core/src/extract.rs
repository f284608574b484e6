//! Isolates the JSON payload from free-form model output.

const FENCE: &str = "```";

/// Returns the JSON candidate inside `raw`.
///
/// The text is trimmed. When it is wrapped in a code fence (an opening
/// delimiter with an optional language tag, then content, then a closing
/// delimiter) the trimmed interior is returned. The outermost fence pair wins,
/// so fences nested in the payload are left alone. Anything else comes back
/// trimmed but otherwise unchanged.
pub fn extract_json_candidate(raw: &str) -> &str {
    let trimmed = raw.trim();

    if trimmed.len() < FENCE.len() * 2
        || !trimmed.starts_with(FENCE)
        || !trimmed.ends_with(FENCE)
    {
        return trimmed;
    }

    let inner = &trimmed[FENCE.len()..trimmed.len() - FENCE.len()];
    let body = inner
        .trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_')
        .trim();

    if body.is_empty() { trimmed } else { body }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfenced_text_is_only_trimmed() {
        assert_eq!(extract_json_candidate("  {\"a\": 1}\n"), "{\"a\": 1}");
        assert_eq!(extract_json_candidate("not json"), "not json");
        assert_eq!(extract_json_candidate(""), "");
    }

    #[test]
    fn fenced_with_language_tag() {
        let raw = "```json\n{\n  \"a\": 1\n}\n```";
        assert_eq!(extract_json_candidate(raw), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn fenced_without_language_tag() {
        let raw = "\n\n```\n  [1, 2, 3]  \n```\n";
        assert_eq!(extract_json_candidate(raw), "[1, 2, 3]");
    }

    #[test]
    fn fenced_on_a_single_line() {
        assert_eq!(extract_json_candidate("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(extract_json_candidate("```json {\"a\":1} ```"), "{\"a\":1}");
    }

    #[test]
    fn arbitrary_language_tags_are_dropped() {
        for tag in ["json", "JSON", "json5", "javascript", "text_plain", ""] {
            let raw = format!("```{tag}\n{{\"ok\":true}}\n```");
            assert_eq!(extract_json_candidate(&raw), "{\"ok\":true}", "tag {tag:?}");
        }
    }

    #[test]
    fn outermost_fence_wins() {
        let raw = "```md\nsee ```inner``` here\n```";
        assert_eq!(extract_json_candidate(raw), "see ```inner``` here");
    }

    #[test]
    fn open_fence_without_close_is_untouched() {
        let raw = "```json\n{\"a\":1}";
        assert_eq!(extract_json_candidate(raw), raw);
    }

    #[test]
    fn empty_fence_returns_trimmed_input() {
        assert_eq!(extract_json_candidate(" ``````  "), "``````");
        assert_eq!(extract_json_candidate("```json\n```"), "```json\n```");
        assert_eq!(extract_json_candidate("````"), "````");
    }

    #[test]
    fn extraction_is_idempotent() {
        for raw in ["```json\n{\"a\":1}\n```", "  {\"b\":2} ", "plain"] {
            let once = extract_json_candidate(raw);
            assert_eq!(extract_json_candidate(once), once);
        }
    }
}
