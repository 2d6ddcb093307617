//! markmode - Command line entry point
//!
//! Reads a markdown or AsciiDoc file, runs it through the same ingestion
//! path as an editing session, and prints the normalized markdown, an HTML
//! rendering, or the Document Tree as JSON.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::{error, info};

use markmode::config::{load_config, load_config_from, Settings};
use markmode::editor::{DocumentHost, EditModeController};
use markmode::error::{Error, Result};
use markmode::export::{generate_html_document, render_html, HtmlOptions};
use markmode::markdown::serialize_markdown;
use markmode::SourceFormat;

/// Application name constant.
const APP_NAME: &str = "markmode";

/// What to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Normalized markdown
    Markdown,
    /// HTML fragment (a full page when writing to a file)
    Html,
    /// Document Tree as JSON
    Tree,
}

#[derive(Parser)]
#[command(name = "markmode")]
#[command(about = "Parse markdown or AsciiDoc into a document tree and write it back out")]
struct Cli {
    /// Input document
    input: PathBuf,

    /// Source format (defaults to the file extension, then the config)
    #[arg(short, long)]
    format: Option<SourceFormat>,

    /// Output representation
    #[arg(short, long, value_enum, default_value_t = Output::Markdown)]
    to: Output,

    /// Settings file to use instead of the default config location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config(),
    };
    let format = resolve_format(cli, &settings);
    info!("{}: reading {} as {}", APP_NAME, cli.input.display(), format);

    let source = fs::read_to_string(&cli.input).map_err(|e| Error::FileRead {
        path: cli.input.clone(),
        source: e,
    })?;

    let mut session = EditModeController::from_settings(DocumentHost::default(), &settings);
    session.sync_value(&source, Some(format));
    let document = session.document();

    let rendered = match cli.to {
        Output::Markdown => serialize_markdown(document),
        Output::Html => {
            let options = HtmlOptions::from_settings(&settings);
            match &cli.output {
                Some(_) => {
                    let title = cli.input.file_stem().and_then(|s| s.to_str());
                    generate_html_document(&serialize_markdown(document), title, &options)
                }
                None => render_html(document, &options),
            }
        }
        Output::Tree => serde_json::to_string_pretty(document)
            .map_err(|e| Error::Application(format!("Failed to encode tree: {}", e)))?,
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, &rendered).map_err(|e| Error::FileWrite {
                path: path.clone(),
                source: e,
            })?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

/// `--format`, then an AsciiDoc file extension, then the configured format.
fn resolve_format(cli: &Cli, settings: &Settings) -> SourceFormat {
    cli.format.unwrap_or_else(|| match SourceFormat::from_path(&cli.input) {
        SourceFormat::AsciiDoc => SourceFormat::AsciiDoc,
        SourceFormat::Markdown => settings.format,
    })
}
