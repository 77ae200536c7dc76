//! System prompts for OCR and answer generation.
//!
//! Callers can override either prompt through
//! [`crate::config::SolverConfig::ocr_prompt`] and
//! [`crate::config::SolverConfig::answer_prompt`]; the constants here are used
//! only when no override is provided.

/// Default system prompt for transcribing a scanned exam page.
///
/// The segmenter relies on question markers sitting at the start of a line,
/// so the prompt insists on keeping the paper's line structure.
pub const DEFAULT_OCR_PROMPT: &str = r#"You are an OCR engine. Transcribe the exam paper page in the image to plain text.

Follow these rules precisely:

1. TEXT PRESERVATION
   - Transcribe ALL visible text exactly, in reading order
   - Do not translate, summarise, correct or answer anything

2. LINE STRUCTURE
   - Start every question and sub-question on its own line
   - Keep question labels exactly as printed: 1. 2. (a) (b) a. b. (OR)
   - Keep the "Question Paper Ends" notice if it is printed

3. FORMULAS
   - Write mathematical expressions in plain text or LaTeX

4. OUTPUT FORMAT
   - Output ONLY the transcribed text
   - Do NOT wrap the output in code fences
   - Do NOT add commentary"#;

/// Default system prompt for answering one exam question.
pub const DEFAULT_ANSWER_PROMPT: &str = r#"You are a patient subject tutor. You will be given one question from an exam paper.

- Answer the question directly and correctly
- Show the working for numerical or derivation questions
- If the question offers alternatives marked (OR), answer the first alternative
- Keep the answer as long as the marks would justify, no longer"#;

/// Build the user message for an answer request.
pub fn answer_request(question: &str) -> String {
    format!("Question:\n\n\"\"\"{}\"\"\"", question.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ocr_prompt_keeps_markers() {
        assert!(DEFAULT_OCR_PROMPT.contains("(OR)"));
        assert!(DEFAULT_OCR_PROMPT.contains("Question Paper Ends"));
    }

    #[test]
    fn answer_request_quotes_question() {
        let msg = answer_request("  1. What is 2+2?\n");
        assert!(msg.ends_with("\"\"\"1. What is 2+2?\"\"\""));
    }
}
