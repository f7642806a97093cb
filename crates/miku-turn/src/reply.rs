//! Post-processing of raw model replies.

use miku_types::Emotion;
use regex::Regex;
use std::sync::LazyLock;

static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\[.*?\]").unwrap());
static LEADING_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\[([^\]]*)\]").unwrap());
static ELLIPSIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.{3,}|…").unwrap());

/// Returns the text to voice for a raw reply.
///
/// Bracketed annotations are removed, ellipses become commas and the result
/// is trimmed. Applying it twice gives the same result as applying it once.
pub fn speech_text(raw: &str) -> String {
    let stripped = ANNOTATION.replace_all(raw, "");
    let paced = ELLIPSIS.replace_all(&stripped, ",");
    paced.trim().to_string()
}

/// Reads the emotion from the reply's leading tag.
///
/// Only a tag at the very start counts. Unknown or missing tags are `happy`.
pub fn extract_emotion(raw: &str) -> Emotion {
    LEADING_TAG
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|label| Emotion::parse(label.as_str()))
        .unwrap_or_default()
}

/// Counts bracketed annotations other than the leading tag.
pub fn stray_annotations(raw: &str) -> usize {
    let total = ANNOTATION.find_iter(raw).count();
    if LEADING_TAG.is_match(raw) {
        total.saturating_sub(1)
    } else {
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_paces_ellipses() {
        assert_eq!(
            speech_text("[happy] Hello bhaiya... kaise ho?"),
            "Hello bhaiya, kaise ho?"
        );
        assert_eq!(speech_text("Hmm… theek hai"), "Hmm, theek hai");
        assert_eq!(speech_text("Ruko..... [soft]haan"), "Ruko,haan");
        assert_eq!(speech_text("[sad]\n  "), "");
    }

    #[test]
    fn annotations_spanning_lines_are_removed() {
        assert_eq!(speech_text("Haan [giggles\nsoftly] bhaiya"), "Haan  bhaiya");
    }

    #[test]
    fn speech_text_is_idempotent() {
        let samples = [
            "[happy] Hello bhaiya... kaise ho?",
            "..[x].",
            "[[nested]] text]",
            "  plain text  ",
            "Wait.... what…",
            "[excited] Yay! [jumps] Chalo!",
        ];
        for raw in samples {
            let once = speech_text(raw);
            assert_eq!(speech_text(&once), once, "input: {raw:?}");
        }
    }

    #[test]
    fn emotion_comes_from_leading_tag_only() {
        assert_eq!(extract_emotion("[sad] Mera man nahi lag raha"), Emotion::Sad);
        assert_eq!(extract_emotion("  [ Excited ] Yay!"), Emotion::Excited);
        assert_eq!(extract_emotion("Yay! [excited]"), Emotion::Happy);
        assert_eq!(extract_emotion("[angry] Hmph"), Emotion::Happy);
        assert_eq!(extract_emotion("No tag at all"), Emotion::Happy);
        assert_eq!(extract_emotion(""), Emotion::Happy);
    }

    #[test]
    fn counts_only_non_leading_annotations() {
        assert_eq!(stray_annotations("[happy] Hello"), 0);
        assert_eq!(stray_annotations("[happy] Hello [waves] bhaiya [smiles]"), 2);
        assert_eq!(stray_annotations("Hello [waves]"), 1);
        assert_eq!(stray_annotations("Hello"), 0);
    }
}
