use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use bubblescan::core::model::{ExtractionResult, ExtractionSource};
use bubblescan::pipeline::{run_pipeline, ExportFormat, PipelineConfig};
use bubblescan::raster::PdfReader;
use bubblescan::SheetConfig;

#[derive(Parser, Debug)]
#[command(name = "bubblescan")]
#[command(version, about = "Read filled-in answers from scanned multiple-choice answer sheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract the answers from one answer-sheet PDF
    Extract {
        /// Input PDF file path
        input: PathBuf,

        /// Output directory (default: ./<input_name>_answers)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format(s) to generate
        #[arg(short, long, value_enum, default_values_t = vec![Format::Json])]
        format: Vec<Format>,

        #[command(flatten)]
        sheet: SheetArgs,

        /// Only print errors
        #[arg(short, long)]
        quiet: bool,
    },

    /// Extract answers from several PDFs
    Batch {
        /// Input PDF files
        inputs: Vec<PathBuf>,

        /// Output directory for all results; one subdirectory per input
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format(s) to generate
        #[arg(short, long, value_enum, default_values_t = vec![Format::Json])]
        format: Vec<Format>,

        #[command(flatten)]
        sheet: SheetArgs,
    },

    /// Show page count and render size of a PDF
    Info {
        /// Input PDF file path
        input: PathBuf,
    },
}

/// Sheet template options shared by `extract` and `batch`.
#[derive(Args, Debug, Clone)]
struct SheetArgs {
    /// JSON file with sheet template settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rendering DPI for bubble detection
    #[arg(long)]
    dpi: Option<u32>,

    /// Minimum lightest-to-darkest fill spread for a row to count as marked
    /// (default 40 without a config file)
    #[arg(long)]
    min_contrast: Option<f32>,
}

impl SheetArgs {
    fn resolve(&self) -> Result<SheetConfig> {
        let mut sheet = match &self.config {
            Some(path) => SheetConfig::from_json_file(path)?,
            None => SheetConfig::for_scans(),
        };
        if let Some(dpi) = self.dpi {
            sheet = sheet.with_dpi(dpi);
        }
        if let Some(contrast) = self.min_contrast {
            sheet.min_fill_contrast = contrast;
        }
        sheet.validate()?;
        Ok(sheet)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Format {
    Json,
    Text,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => ExportFormat::Json,
            Format::Text => ExportFormat::Text,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Extract { quiet: true, .. } => "bubblescan=warn",
        _ => "bubblescan=info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Extract {
            input,
            output,
            format,
            sheet,
            quiet,
        } => {
            let output = output.unwrap_or_else(|| PathBuf::from(format!("{}_answers", stem(&input))));
            let config = PipelineConfig::new(input, output, sheet.resolve()?);
            extract_single(&config, &export_formats(&format), quiet).map(|_| ())
        }
        Commands::Batch {
            inputs,
            output,
            format,
            sheet,
        } => extract_batch(
            &inputs,
            output.unwrap_or_else(|| PathBuf::from("batch_answers")),
            &export_formats(&format),
            sheet.resolve()?,
        ),
        Commands::Info { input } => show_info(&input),
    }
}

fn export_formats(formats: &[Format]) -> Vec<ExportFormat> {
    formats.iter().copied().map(ExportFormat::from).collect()
}

fn stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sheet".to_string())
}

fn extract_single(
    config: &PipelineConfig,
    formats: &[ExportFormat],
    quiet: bool,
) -> Result<ExtractionResult> {
    if !quiet {
        println!("[*] Processing: {}", config.input.display());
        println!("[*] Output: {}", config.output.display());
        println!("[*] DPI: {}", config.sheet.dpi);
        println!("\n[+] Reading answer sheet...");
    }

    let result = run_pipeline(config, formats)
        .with_context(|| format!("Failed to process PDF: {}", config.input.display()))?;

    if !quiet {
        println!("\n[✓] Done!");
        print_summary(&result);
    }
    Ok(result)
}

fn print_summary(result: &ExtractionResult) {
    let source = match result.source {
        ExtractionSource::Bubbles => "bubble detection",
        ExtractionSource::Ocr => "OCR fallback",
        ExtractionSource::Nothing => "none",
    };
    println!("    Pages: {}", result.page_count);
    println!("    Answered: {}", result.answers().len());
    println!("    Blank: {}", result.blank_questions().len());
    println!("    Source: {}", source);
    if result.is_empty() {
        println!("    [!] No answers could be read from this document");
    }
}

fn extract_batch(
    inputs: &[PathBuf],
    base_output: PathBuf,
    formats: &[ExportFormat],
    sheet: SheetConfig,
) -> Result<()> {
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }

    println!("[*] Batch of {} answer sheet(s) -> {}\n", inputs.len(), base_output.display());

    let mut failures: Vec<&Path> = Vec::new();
    for (i, input) in inputs.iter().enumerate() {
        let config = PipelineConfig::new(input.clone(), base_output.join(stem(input)), sheet.clone());
        match extract_single(&config, formats, true) {
            Ok(result) => println!(
                "[{}/{}] [✓] {}: {} answered, {} blank ({:?})",
                i + 1,
                inputs.len(),
                input.display(),
                result.answers().len(),
                result.blank_questions().len(),
                result.source
            ),
            Err(e) => {
                eprintln!("[{}/{}] [✗] {}: {:#}", i + 1, inputs.len(), input.display(), e);
                failures.push(input);
            }
        }
    }

    println!(
        "\n[*] Summary: {} succeeded, {} failed",
        inputs.len() - failures.len(),
        failures.len()
    );
    if !failures.is_empty() {
        for path in &failures {
            eprintln!("    {}", path.display());
        }
        anyhow::bail!("{} file(s) failed to process", failures.len());
    }
    Ok(())
}

fn show_info(input: &Path) -> Result<()> {
    let reader = PdfReader::open(input)?;
    let page_count = reader
        .page_count()
        .with_context(|| format!("Failed to read page count: {}", input.display()))?;
    let sheet = SheetConfig::default();

    println!("{}", input.display());
    println!("  pages:        {}", page_count);
    println!("  detection at: {} dpi", sheet.dpi);
    println!("  OCR at:       {} dpi", sheet.ocr_dpi);
    Ok(())
}
