//! Generate command - fill a draft from local files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use minuta_core::{
    DocumentAssembler, ExtractionMethod, MinutaConfig, PdfWriter, ResolvedValue, SourceDocument,
};

/// Arguments for the generate command.
#[derive(Args)]
pub struct GenerateArgs {
    /// Input documents: files or glob patterns, in corpus order
    #[arg(short, long, required = true, num_args = 1..)]
    docs: Vec<String>,

    /// Draft template (plain text)
    #[arg(short, long)]
    template: PathBuf,

    /// Output PDF
    #[arg(short, long, default_value = "minuta_final.pdf")]
    output: PathBuf,

    /// Also write the extracted corpus text to this file
    #[arg(long)]
    dump_corpus: Option<PathBuf>,

    /// Print the value resolved for each placeholder
    #[arg(long)]
    show_resolution: bool,

    /// Disable the OCR fallback
    #[arg(long)]
    no_ocr: bool,
}

pub async fn run(args: GenerateArgs, mut config: MinutaConfig) -> anyhow::Result<()> {
    let start = Instant::now();
    if args.no_ocr {
        config.ocr.enabled = false;
    }

    let files = expand_inputs(&args.docs)?;
    if files.is_empty() {
        anyhow::bail!("No input documents found for: {}", args.docs.join(", "));
    }

    let template = fs::read_to_string(&args.template).map_err(|e| {
        anyhow::anyhow!("Failed to read template {}: {}", args.template.display(), e)
    })?;

    let documents = read_documents(&files)?;
    DocumentAssembler::validate(&documents, &template)?;

    let assembler = DocumentAssembler::from_config(&config)?;
    let writer = PdfWriter::new(config.render.clone());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Extracting text from {} document(s)...", documents.len()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let generated = tokio::task::spawn_blocking(move || {
        assembler.generate(&documents, &template, &writer)
    })
    .await??;

    spinner.finish_and_clear();

    fs::write(&args.output, &generated.pdf)?;

    let draft = &generated.draft;
    for section in draft.corpus.sections() {
        let method = match section.content.method {
            ExtractionMethod::Direct => style("text").green(),
            ExtractionMethod::Ocr => style("ocr").yellow(),
            ExtractionMethod::Failed => style("failed").red(),
        };
        println!("  {} [{}]", section.source_name, method);
        if let Some(reason) = &section.content.failure {
            warn!("{}: {}", section.source_name, reason);
        }
    }

    if let Some(path) = &args.dump_corpus {
        fs::write(path, draft.corpus.as_str())?;
        debug!("Wrote corpus to {}", path.display());
    }

    let resolution = &draft.filled.resolution;
    if args.show_resolution {
        println!();
        for variable in resolution.variables() {
            match &variable.value {
                ResolvedValue::Found(value) => {
                    println!("{} {} = {}", style("✓").green(), variable.token, value)
                }
                ResolvedValue::NotFound => {
                    println!("{} {}", style("✗").red(), variable.token)
                }
            }
        }
    }

    for token in &draft.filled.unrecognized_tokens {
        println!("{} {} is not in the catalog", style("⚠").yellow(), token);
    }

    println!();
    println!(
        "{} Wrote {} ({}/{} placeholders found) in {:.2}s",
        style("✓").green(),
        args.output.display(),
        resolution.found_count(),
        resolution.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Expand each input as a glob, keeping argument order. Inputs that match
/// nothing are taken as literal paths when they exist.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let mut matched: Vec<PathBuf> = glob(input)?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        matched.sort();

        if matched.is_empty() && Path::new(input).is_file() {
            matched.push(PathBuf::from(input));
        }
        if matched.is_empty() {
            warn!("No files match {}", input);
        }
        files.extend(matched);
    }
    Ok(files)
}

fn read_documents(files: &[PathBuf]) -> anyhow::Result<Vec<SourceDocument>> {
    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        let data = fs::read(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        documents.push(SourceDocument::new(name, data));
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(documents)
}
