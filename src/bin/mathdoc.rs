//! CLI binary for mathdoc.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `NormalizeConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mathdoc::{
    normalize_batch, normalize_with_stats, write_atomic, BatchProgressCallback, Document,
    FileResult, NormalizeConfig, ParagraphBreak, ProgressCallback, DEFAULT_STEP_MIN_LEN,
};
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the batch plus a log line per
/// file. Files complete out of order, so timings are keyed by file number.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Normalising");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self, file_num: usize) -> f64 {
        self.start_times
            .lock()
            .unwrap()
            .remove(&file_num)
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
    }

    fn on_file_start(&self, file_num: usize, _total: usize, path: &str) {
        self.start_times
            .lock()
            .unwrap()
            .insert(file_num, Instant::now());
        self.bar.set_message(path.to_string());
    }

    fn on_file_complete(&self, file_num: usize, total: usize, segment_count: usize) {
        let elapsed = self.elapsed_secs(file_num);
        self.bar.println(format!(
            "  {} File {:>3}/{:<3}  {:<14}  {}",
            green("✓"),
            file_num,
            total,
            dim(&format!("{segment_count:>5} segments")),
            dim(&format!("{elapsed:.2}s")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, file_num: usize, total: usize, error: &str) {
        let elapsed = self.elapsed_secs(file_num);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(['\u{2026}']).collect()
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} File {:>3}/{:<3}  {}  {}",
            red("✗"),
            file_num,
            total,
            red(&msg),
            dim(&format!("{elapsed:.2}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let failed = total_files.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} files normalised",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files normalised  ({} failed)",
                if failed == total_files {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Normalise one model response, print the document as JSON
  mathdoc answer.txt

  # Read from stdin, print canonical $ / $$ markup
  echo 'Let \(x = 2\).' | mathdoc --format markdown

  # Multiple-choice question, option (C) is correct
  mathdoc --options --correct 2 question.txt -o question.json

  # Worked solutions: recover steps, one file per input in out/
  mathdoc --steps solutions/*.txt -o out/

ENVIRONMENT VARIABLES:
  MATHDOC_STEPS            Same as --steps
  MATHDOC_OPTIONS          Same as --options
  MATHDOC_FORMAT           json, markdown or text
  MATHDOC_CONCURRENCY      Files processed at once
  RUST_LOG                 Overrides --verbose / --quiet log filtering
"#;

/// Normalise LLM math output into segmented, render-ready documents.
#[derive(Parser, Debug)]
#[command(
    name = "mathdoc",
    version,
    about = "Normalise LLM math output into segmented, render-ready documents",
    long_about = "Normalise raw LLM responses containing LaTeX: undo transport escaping, \
rewrite \\(…\\), \\[…\\] and ```latex fences to $…$ / $$…$$, split into paragraphs of \
plain text, inline math and display math, and optionally recover worked-solution steps \
and multiple-choice options.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input text files. Reads stdin when none are given.
    inputs: Vec<PathBuf>,

    /// Write output here. With several inputs this is a directory.
    #[arg(short, long, env = "MATHDOC_OUTPUT")]
    output: Option<PathBuf>,

    /// Output format.
    #[arg(long, env = "MATHDOC_FORMAT", value_enum, default_value = "json")]
    format: FormatArg,

    /// Re-group long numbered explanations into steps.
    #[arg(long, env = "MATHDOC_STEPS")]
    steps: bool,

    /// Extract (1)…(4) / (A)…(D) answer options.
    #[arg(long, env = "MATHDOC_OPTIONS")]
    options: bool,

    /// 0-based index of the correct option (0–3). Implies --options.
    #[arg(long, env = "MATHDOC_CORRECT",
          value_parser = clap::value_parser!(u32).range(0..=3))]
    correct: Option<u32>,

    /// Minimum length (characters) before step detection runs.
    #[arg(long, env = "MATHDOC_STEP_MIN_LEN", default_value_t = DEFAULT_STEP_MIN_LEN)]
    step_min_len: usize,

    /// Treat every line as a paragraph instead of splitting on blank lines.
    #[arg(long, env = "MATHDOC_LINE_PARAGRAPHS")]
    line_paragraphs: bool,

    /// Leave undelimited LaTeX in plain text alone.
    #[arg(long, env = "MATHDOC_NO_RECLASSIFY")]
    no_reclassify: bool,

    /// Number of files processed concurrently.
    #[arg(short, long, env = "MATHDOC_CONCURRENCY", default_value_t = 8)]
    concurrency: usize,

    /// Disable progress bar.
    #[arg(long, env = "MATHDOC_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MATHDOC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MATHDOC_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Json,
    Markdown,
    Text,
}

impl FormatArg {
    fn extension(self) -> &'static str {
        match self {
            FormatArg::Json => "json",
            FormatArg::Markdown => "md",
            FormatArg::Text => "txt",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs for batches.
    let batch = cli.inputs.len() > 1;
    let show_progress = batch && !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    match cli.inputs.as_slice() {
        [] => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read stdin")?;
            run_single(&cli, &config, &raw, "<stdin>").await
        }
        [path] => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            run_single(&cli, &config, &raw, &path.display().to_string()).await
        }
        paths => run_batch(&cli, &config, paths, show_progress).await,
    }
}

/// Map CLI args to `NormalizeConfig`.
fn build_config(cli: &Cli) -> Result<NormalizeConfig> {
    let mut builder = NormalizeConfig::builder()
        .extract_steps(cli.steps)
        .extract_options(cli.options || cli.correct.is_some())
        .step_min_len(cli.step_min_len)
        .reclassify_bare_math(!cli.no_reclassify)
        .paragraph_break(if cli.line_paragraphs {
            ParagraphBreak::Newline
        } else {
            ParagraphBreak::BlankLine
        });

    if let Some(idx) = cli.correct {
        builder = builder.correct_option_index(idx);
    }

    builder.build().context("Invalid configuration")
}

async fn run_single(cli: &Cli, config: &NormalizeConfig, raw: &str, label: &str) -> Result<()> {
    let output = normalize_with_stats(raw, config);
    let rendered = format_document(&output.document, cli.format)?;

    match cli.output {
        Some(ref path) => {
            write_file(path, &rendered).await?;
            if !cli.quiet {
                eprintln!(
                    "{}  {}  {} paragraphs  {} math  {}ms  →  {}",
                    green("✔"),
                    label,
                    output.stats.paragraphs,
                    output.stats.inline_math + output.stats.display_math,
                    output.duration_ms,
                    bold(&path.display().to_string()),
                );
            }
        }
        None => print_stdout(&rendered)?,
    }
    Ok(())
}

async fn run_batch(
    cli: &Cli,
    config: &NormalizeConfig,
    paths: &[PathBuf],
    show_progress: bool,
) -> Result<()> {
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let results = normalize_batch(paths, config, cli.concurrency, progress).await;

    match cli.output {
        Some(ref dir) => {
            for (path, result) in paths.iter().zip(&results) {
                if let Some(ref doc) = result.document {
                    let target = output_path_for(dir, path, cli.format);
                    write_file(&target, &format_document(doc, cli.format)?).await?;
                }
            }
        }
        None if cli.format == FormatArg::Json => {
            let json =
                serde_json::to_string_pretty(&results).context("Failed to serialise results")?;
            print_stdout(&json)?;
        }
        None => {
            for result in &results {
                if let Some(ref doc) = result.document {
                    print_stdout(&format!(
                        "==> {} <==\n{}",
                        result.path,
                        format_document(doc, cli.format)?
                    ))?;
                }
            }
        }
    }

    summarise(cli, &results, show_progress)
}

fn summarise(cli: &Cli, results: &[FileResult], show_progress: bool) -> Result<()> {
    let failed: Vec<&FileResult> = results.iter().filter(|r| !r.is_ok()).collect();
    if !cli.quiet && !show_progress {
        eprintln!(
            "Normalised {}/{} files in {}ms",
            results.len() - failed.len(),
            results.len(),
            results.iter().map(|r| r.duration_ms).sum::<u64>()
        );
        for r in &failed {
            if let Some(ref e) = r.error {
                eprintln!("  {} {}", red("✗"), e);
            }
        }
    }
    if !results.is_empty() && failed.len() == results.len() {
        anyhow::bail!("All {} input files failed", results.len());
    }
    Ok(())
}

fn format_document(doc: &Document, format: FormatArg) -> Result<String> {
    Ok(match format {
        FormatArg::Json => serde_json::to_string_pretty(doc).context("Failed to serialise document")?,
        FormatArg::Markdown => doc.to_markup(),
        FormatArg::Text => doc.plain_text(),
    })
}

/// `out/` + `solutions/q1.txt` → `out/q1.json`.
fn output_path_for(dir: &Path, input: &Path, format: FormatArg) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    dir.join(format!("{stem}.{}", format.extension()))
}

async fn write_file(path: &Path, contents: &str) -> Result<()> {
    write_atomic(path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn print_stdout(s: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(s.as_bytes())
        .context("Failed to write to stdout")?;
    // Ensure a trailing newline on stdout.
    if !s.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}
