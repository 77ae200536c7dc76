//! Question segmentation: split extracted exam text into question strings.
//!
//! Exam papers follow a loose convention: each question starts on its own line
//! with a number (`12.`), a bracketed letter (`(a)`) or a bare letter (`a.`),
//! and alternative questions are introduced by an `(OR)` line. OCR output keeps
//! the line breaks but adds noise: a header block with instructions, stray page
//! numbers, and a trailer after the "Question Paper Ends" notice.
//!
//! ## Rule Order
//!
//! 1. Header trim: drop everything before the first line-start question marker
//! 2. Footer trim: drop everything from the end-of-paper sentinel onwards
//! 3. Split before every line-start marker (including `(OR)`); the marker
//!    stays with the segment it opens
//! 4. Trim each segment and discard fragments of 10 characters or fewer
//!
//! Markers are only recognised right after a newline so that numbers inside a
//! sentence ("worth 5. marks") never cut a question in half. Numbering is not
//! validated: `1.`, `7.`, `3.` are all accepted in any order.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Literal sentinel printed at the end of a question paper.
pub const FOOTER_SENTINEL: &str = "Question Paper Ends";

/// Segments with this many characters or fewer (after trimming) are noise.
pub const MAX_NOISE_CHARS: usize = 10;

// ── Markers ──────────────────────────────────────────────────────────────────

/// Start of a question: `12.`, `(a)` or `a.` at the beginning of a line.
static RE_QUESTION_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*(?:\d+\.|\([a-z]\)|[a-z]\.)").unwrap());

/// Any split point: a question start or an `(OR)` alternative marker.
static RE_SPLIT_POINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*(?:\d+\.|\([a-z]\)|[a-z]\.|\(OR\))").unwrap());

/// Split exam text into an ordered list of trimmed questions.
///
/// Never fails: empty input, markerless text or pure noise all yield a
/// (possibly empty) list. A single question with no embedded line-start
/// marker comes back unchanged, so re-running `segment` on its own output is
/// stable.
///
/// # Example
/// ```rust
/// use exam_qa::segment;
///
/// let text = "Instructions: bring a pencil.\n1. What is 2+2?\n2. Name the capital of France.";
/// assert_eq!(
///     segment(text),
///     vec!["1. What is 2+2?", "2. Name the capital of France."]
/// );
/// ```
pub fn segment(text: &str) -> Vec<String> {
    candidate_spans(text)
        .into_iter()
        .map(|span| text[span].trim())
        .filter(|candidate| !is_noise(candidate))
        .map(str::to_string)
        .collect()
}

/// Byte ranges of every raw segment, before trimming and noise filtering.
///
/// The ranges are contiguous and together cover exactly the body left after
/// header and footer trimming, so no text is lost at split points.
pub fn candidate_spans(text: &str) -> Vec<Range<usize>> {
    let body = body_range(text);
    let window = &text[body.clone()];

    let mut spans = Vec::new();
    let mut start = 0;
    for m in RE_SPLIT_POINT.find_iter(window) {
        if m.start() > start {
            spans.push(body.start + start..body.start + m.start());
        }
        start = m.start();
    }
    if start < window.len() {
        spans.push(body.start + start..body.end);
    }
    spans
}

// ── Rule 1 + 2: Header and footer trim ───────────────────────────────────────

/// Byte range of `text` that survives header and footer trimming.
fn body_range(text: &str) -> Range<usize> {
    let start = RE_QUESTION_START
        .find(text)
        .map(|m| m.start())
        .unwrap_or(0);
    let rest = &text[start..];
    let end = rest
        .find(FOOTER_SENTINEL)
        .map(|offset| start + offset)
        .unwrap_or(text.len());
    start..end
}

// ── Rule 4: Noise filter ─────────────────────────────────────────────────────

fn is_noise(candidate: &str) -> bool {
    candidate.chars().count() <= MAX_NOISE_CHARS
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_nothing() {
        assert!(segment("").is_empty());
        assert!(candidate_spans("").is_empty());
    }

    #[test]
    fn markerless_text_is_one_question() {
        assert_eq!(
            segment("  Explain photosynthesis in detail.  "),
            vec!["Explain photosynthesis in detail."]
        );
    }

    #[test]
    fn markerless_short_text_is_noise() {
        assert!(segment("Page 3").is_empty());
        // exactly ten characters is still noise
        assert!(segment("abcdefghij").is_empty());
        assert_eq!(segment("abcdefghijk"), vec!["abcdefghijk"]);
    }

    #[test]
    fn noise_threshold_counts_chars_not_bytes() {
        // 10 chars, 20 bytes
        assert!(segment("éééééééééé").is_empty());
    }

    #[test]
    fn header_is_trimmed() {
        let text = "Instructions: bring a pencil.\n1. What is 2+2?\n2. Name the capital of France.";
        assert_eq!(
            segment(text),
            vec!["1. What is 2+2?", "2. Name the capital of France."]
        );
    }

    #[test]
    fn footer_is_trimmed() {
        let text = "1. Question one is here.\nQuestion Paper Ends\nAnswer key: ...";
        assert_eq!(segment(text), vec!["1. Question one is here."]);
    }

    #[test]
    fn footer_sentinel_is_case_sensitive() {
        let text = "Header\n1. Question one is here.\nquestion paper ends here too";
        assert_eq!(
            segment(text),
            vec!["1. Question one is here.\nquestion paper ends here too"]
        );
    }

    #[test]
    fn or_marker_opens_a_segment() {
        let text = "Part A\n1. Solve this problem fully.\n(OR) Solve that problem fully.";
        let questions = segment(text);
        assert_eq!(questions.len(), 2);
        assert!(questions[1].starts_with("(OR)"));
    }

    #[test]
    fn or_marker_does_not_trim_header() {
        let text = "Some preamble text here\n(OR) alternative question text";
        assert_eq!(
            segment(text),
            vec!["Some preamble text here", "(OR) alternative question text"]
        );
    }

    #[test]
    fn letter_markers_split() {
        let text = "Header\n1. Answer the following parts:\n(a) Define inertia please.\nb. State Newton's third law.";
        assert_eq!(
            segment(text),
            vec![
                "1. Answer the following parts:",
                "(a) Define inertia please.",
                "b. State Newton's third law.",
            ]
        );
    }

    #[test]
    fn indented_markers_split() {
        let text = "Header\n   1. First question text here\n\t(b) Second question text here";
        assert_eq!(
            segment(text),
            vec!["1. First question text here", "(b) Second question text here"]
        );
    }

    #[test]
    fn uppercase_and_multi_letter_labels_are_not_markers() {
        let text = "Header\n1. Main question text here\nA. not a marker line\n(ab) neither is this";
        assert_eq!(
            segment(text),
            vec!["1. Main question text here\nA. not a marker line\n(ab) neither is this"]
        );
    }

    #[test]
    fn mid_line_numbers_do_not_split() {
        let text = "Header\n1. This question is worth 5. marks and (a) has no split";
        assert_eq!(
            segment(text),
            vec!["1. This question is worth 5. marks and (a) has no split"]
        );
    }

    #[test]
    fn numbering_is_not_validated() {
        let text = "Header\n7. Seventh question first\n3. Third question second";
        assert_eq!(
            segment(text),
            vec!["7. Seventh question first", "3. Third question second"]
        );
    }

    #[test]
    fn short_segments_are_dropped() {
        let text = "Header\n1. Ok\n2. Short";
        assert!(segment(text).is_empty());
    }

    #[test]
    fn spans_partition_the_body() {
        let text = "Header line\n1. First question here\n\n(OR) Alternative here\n2. x\nQuestion Paper Ends\ntrailer";
        let spans = candidate_spans(text);
        let joined: String = spans.iter().map(|s| &text[s.clone()]).collect();
        let body = body_range(text);
        assert_eq!(joined, &text[body]);
        for pair in spans.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn blank_lines_between_questions_do_not_leak() {
        let text = "Header\n1. First question here\n\n\n2. Second question here";
        assert_eq!(
            segment(text),
            vec!["1. First question here", "2. Second question here"]
        );
    }

    #[test]
    fn segmenting_a_question_is_stable() {
        let question = "1. Describe the water cycle.";
        assert_eq!(segment(question), vec![question]);
    }
}
