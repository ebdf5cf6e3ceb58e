use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use vellum::{ExportError, ExportOptions, ExportOutcome, Exporter, FileSink, SlideRecord};

#[derive(Parser, Debug)]
#[command(name = "vellum", version, about = "Export an HTML slide deck to PPTX or PDF")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Editable presentation with native text, shapes and charts.
    Pptx(ExportArgs),
    /// One rasterized page per slide.
    Pdf(ExportArgs),
}

#[derive(clap::Args, Debug)]
struct ExportArgs {
    /// Deck JSON: an array of slides or an object with a `slides` array.
    #[arg(long)]
    slides: PathBuf,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Output name without extension. Overrides the options file.
    #[arg(long)]
    file_name: Option<String>,

    /// Export options as JSON.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Directory that relative image and font URLs resolve against.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Extra font directory; may be repeated.
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Skip fonts installed on this machine.
    #[arg(long)]
    no_system_fonts: bool,

    /// Overrides the PDF page format.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum FormatArg {
    A4,
    Letter,
    Legal,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Deck {
    Slides(Vec<SlideRecord>),
    Wrapped { slides: Vec<SlideRecord> },
}

impl Deck {
    fn into_slides(self) -> Vec<SlideRecord> {
        match self {
            Deck::Slides(slides) | Deck::Wrapped { slides } => slides,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let (args, pdf) = match cli.command {
        Command::Pptx(args) => (args, false),
        Command::Pdf(args) => (args, true),
    };

    let outcome = match prepare(&args) {
        Ok((exporter, slides, options)) if pdf => exporter.export_pdf(&slides, &options).await,
        Ok((exporter, slides, options)) => exporter.export_pptx(&slides, &options).await,
        Err(e) => ExportOutcome::failed(e.to_string()),
    };

    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to print the outcome: {e}"),
    }
    if outcome.success { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn prepare(args: &ExportArgs) -> Result<(Exporter, Vec<SlideRecord>, ExportOptions), ExportError> {
    let deck: Deck = serde_json::from_str(&std::fs::read_to_string(&args.slides)?)?;
    let slides = deck.into_slides();

    let mut options = match &args.options {
        Some(path) => ExportOptions::from_json(&std::fs::read_to_string(path)?)?,
        None => ExportOptions::default(),
    };
    if let Some(name) = &args.file_name {
        options.file_name = name.clone();
    }
    if let Some(format) = args.format {
        options.pdf.format = match format {
            FormatArg::A4 => vellum::PageFormat::A4,
            FormatArg::Letter => vellum::PageFormat::Letter,
            FormatArg::Legal => vellum::PageFormat::Legal,
        };
    }

    let mut builder = Exporter::builder()
        .with_system_fonts(!args.no_system_fonts)
        .with_sink(Arc::new(FileSink::new(&args.out)));
    for dir in &args.font_dirs {
        builder = builder.with_font_dir(dir);
    }
    if let Some(assets) = &args.assets {
        builder = builder.with_resource_dir(assets);
    }
    Ok((builder.build()?, slides, options))
}
