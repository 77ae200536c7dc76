//! CLI binary for exam-qa.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `SolverConfig` and prints the questions (and answer).

use anyhow::{Context, Result};
use clap::Parser;
use exam_qa::{
    resolve_input, resolve_provider, solve_document, DocumentExtractor, LlmAnswerer, SolveOutput,
    SolverConfig,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # List the questions of a paper
  exam-qa paper.pdf

  # Answer the first question
  exam-qa --solve paper.pdf

  # Photo of a paper, answered by a specific model
  exam-qa --solve --provider anthropic --model claude-sonnet-4-20250514 page.jpg

  # Upload without an extension
  exam-qa --content-type application/pdf ./upload-7f3a

  # From a URL, JSON output
  exam-qa --json https://example.com/finals-2024.pdf > paper.json

  # Custom tutor prompt
  exam-qa --solve --answer-prompt prompts/physics.txt paper.pdf

QUESTION MARKERS:
  A question starts on a new line with one of:
    1.  2.  10.        numbered
    (a) (b)            lettered in parentheses
    a.  b.             lettered with a dot
    (OR)               alternative to the previous question
  Text before the first marker is dropped as header; everything from
  "Question Paper Ends" on is dropped as footer.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium (default: system library)

SETUP:
  1. Install libpdfium, or point PDFIUM_LIB_PATH at a copy.
  2. Set API key:     export OPENAI_API_KEY=sk-...
     (only needed for --solve, scanned PDFs and images)
  3. Run:             exam-qa paper.pdf
"#;

/// Extract the questions from an exam paper and answer them with an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "exam-qa",
    version,
    about = "Extract the questions from an exam paper (PDF or image) and answer them with an LLM",
    long_about = "Extract the individual questions from an exam paper (local file or URL; \
PDF, PNG, JPEG, GIF, WebP, TIFF or BMP) and optionally answer the first one with an LLM. \
Supports OpenAI, Anthropic, Google Gemini, Azure OpenAI, and any OpenAI-compatible endpoint \
(Ollama, vLLM, LiteLLM, etc.).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF/image path or HTTP/HTTPS URL.
    input: String,

    /// Answer the first extracted question.
    #[arg(long, env = "EXAM_QA_SOLVE")]
    solve: bool,

    /// Output structured JSON (SolveOutput) instead of text.
    #[arg(long, env = "EXAM_QA_JSON")]
    json: bool,

    /// Declared MIME type, overriding the extension / server header.
    #[arg(long, env = "EXAM_QA_CONTENT_TYPE")]
    content_type: Option<String>,

    /// LLM model ID (e.g. gpt-4.1-nano, gpt-4.1, claude-sonnet-4-20250514).
    #[arg(long, env = "EXAM_QA_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "EXAM_QA_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// LLM temperature for answers (0.0–2.0).
    #[arg(long, env = "EXAM_QA_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max LLM output tokens for an answer.
    #[arg(long, env = "EXAM_QA_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: usize,

    /// Retries per LLM call on failure.
    #[arg(long, env = "EXAM_QA_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "EXAM_QA_PASSWORD")]
    password: Option<String>,

    /// Rendering DPI for scanned pages (72–400).
    #[arg(long, env = "EXAM_QA_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Number of scanned pages OCR'd concurrently.
    #[arg(short, long, env = "EXAM_QA_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Do not OCR PDF pages that have no text layer.
    #[arg(long, env = "EXAM_QA_NO_OCR_FALLBACK")]
    no_ocr_fallback: bool,

    /// Path to a text file containing a custom answer system prompt.
    #[arg(long, env = "EXAM_QA_ANSWER_PROMPT")]
    answer_prompt: Option<PathBuf>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "EXAM_QA_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Per-call LLM timeout in seconds.
    #[arg(long, env = "EXAM_QA_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Disable the progress spinner.
    #[arg(long, env = "EXAM_QA_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "EXAM_QA_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "EXAM_QA_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO logs would tear through the spinner line, so they are only shown
    // when the spinner is off.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli).await?;

    // ── Fail fast on a missing provider ──────────────────────────────────
    let config = if cli.solve {
        let provider = resolve_provider(&config).context("No LLM provider for --solve")?;
        SolverConfig {
            provider: Some(provider),
            ..config
        }
    } else {
        config
    };

    let spinner = show_progress.then(|| start_spinner(&cli.input));

    let output = async {
        // ── Resolve input ────────────────────────────────────────────────
        let mut document = resolve_input(&cli.input, config.download_timeout_secs)
            .await
            .with_context(|| format!("Failed to read '{}'", cli.input))?;
        if let Some(ref ct) = cli.content_type {
            document = document.with_content_type(ct.as_str());
        }

        // ── Run pipeline ─────────────────────────────────────────────────
        let extractor = DocumentExtractor::new(config.clone());
        let output = if cli.solve {
            if let Some(ref sp) = spinner {
                sp.set_message("Extracting and answering…");
            }
            let answerer = LlmAnswerer::from_config(config.clone())?;
            solve_document(&document, &extractor, Some(&answerer)).await
        } else {
            solve_document(&document, &extractor, None::<&LlmAnswerer>).await
        };
        output.context("Failed to process exam paper")
    }
    .await;

    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }
    let output = output?;

    // ── Print ────────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        print_text(&output).context("Failed to write to stdout")?;
    }

    if !cli.quiet && !cli.json {
        print_summary(&output);
    }

    Ok(())
}

/// Spinner on stderr while the pipeline runs.
fn start_spinner(input: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
    bar.set_style(style);
    bar.set_prefix("exam-qa");
    bar.set_message(format!("Extracting questions from {input}…"));
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn print_text(output: &SolveOutput) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", output.questions_text())?;
    if let Some(ref answer) = output.answer {
        writeln!(handle, "\nAnswer:\n\n{}", answer.text)?;
    }
    Ok(())
}

fn print_summary(output: &SolveOutput) {
    let stats = &output.extraction;
    eprintln!(
        "{}  {} question(s)  {} page(s)  {}ms extraction{}",
        green("✔"),
        bold(&output.questions.len().to_string()),
        stats.page_count,
        stats.duration_ms,
        if stats.ocr_pages.is_empty() {
            String::new()
        } else {
            dim(&format!("  ({} via OCR)", stats.ocr_pages.len()))
        },
    );
    if let Some(ref answer) = output.answer {
        eprintln!(
            "   {} tokens in  /  {} tokens out  /  {}ms answer",
            dim(&answer.input_tokens.to_string()),
            dim(&answer.output_tokens.to_string()),
            answer.duration_ms,
        );
    }
}

/// Map CLI args to `SolverConfig`.
async fn build_config(cli: &Cli) -> Result<SolverConfig> {
    let mut builder = SolverConfig::builder()
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .max_retries(cli.max_retries)
        .dpi(cli.dpi)
        .concurrency(cli.concurrency)
        .ocr_fallback(!cli.no_ocr_fallback)
        .download_timeout_secs(cli.download_timeout)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref path) = cli.answer_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read answer prompt from {:?}", path))?;
        builder = builder.answer_prompt(prompt);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.as_str());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.as_str());
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.as_str());
    }

    builder.build().context("Invalid configuration")
}
