//! Post-processing: deterministic cleanup of OCR text before segmentation.
//!
//! Vision models transcribe well but wrap the result in artefacts that hurt
//! segmentation: a ```` ```text ```` fence around the whole page, CRLF line
//! endings, zero-width characters in front of question numbers (so `\n1.`
//! no longer matches), and trailing spaces. These rules remove the
//! artefacts without touching content. Blank lines are left alone: the
//! segmenter trims every question, so they never reach the output.
//!
//! ## Rule Order
//!
//! Fences are stripped first so later rules see the real first line; line
//! endings are normalised before any per-line rule runs.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw OCR output.
///
/// 1. Strip outer code fences
/// 2. Normalise line endings (CRLF/CR → LF)
/// 3. Remove invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 4. Trim trailing whitespace per line
/// 5. Trim the whole text
pub fn clean_ocr_text(input: &str) -> String {
    let s = strip_code_fences(input);
    let s = normalise_line_endings(&s);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    s.trim().to_string()
}

// ── Rule 1: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z]*\r?\n(.*)\r?\n```\s*$").unwrap());

fn strip_code_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 4: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Tests ────────────────────────────────────────────────────────────────────
