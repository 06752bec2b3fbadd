//! spectral - syntax highlighter command-line tool

mod cli;

use std::fs;
use std::io::{self, Read, Write};
use std::process;

use clap::Parser;
use tokio::task::LocalSet;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use cli::{CliArgs, OutputFormat};
use spectral::syntax::{escape_html, load_language_dir, unescape_html};
use spectral::terminal::render_ansi;
use spectral::{CodeBlock, Config, Highlighter, Result};

fn main() {
    init_tracing();
    let args = CliArgs::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Log to stderr, filtered by RUST_LOG (default `warn`)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(args: CliArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    LocalSet::new().block_on(&runtime, highlight_inputs(args))
}

fn load_config(args: &CliArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load(),
    };
    if let Some(class) = &args.global_class {
        config.global_class = Some(class.clone());
    }
    Ok(config)
}

async fn highlight_inputs(args: CliArgs) -> Result<()> {
    let config = load_config(&args)?;
    let highlighter = Highlighter::new(config.clone());

    // Configured directories may not exist yet; explicit ones must
    for dir in &config.language_dirs {
        if let Err(e) = load_language_dir(&mut highlighter.registry_mut(), dir) {
            warn!("skipping language directory {}: {}", dir.display(), e);
        }
    }
    for dir in &args.language_dirs {
        let loaded = load_language_dir(&mut highlighter.registry_mut(), dir)?;
        debug!(dir = %dir.display(), loaded, "loaded language files");
    }

    if args.list_languages {
        let registry = highlighter.registry();
        let mut out = io::stdout().lock();
        for name in registry.list_languages() {
            writeln!(out, "{}", name)?;
        }
        return Ok(());
    }

    let mut blocks = read_blocks(&args, &highlighter)?;
    let mut out = io::stdout().lock();

    match args.format {
        OutputFormat::Html => {
            highlighter.highlight_all(&mut blocks).await;
            for block in &blocks {
                out.write_all(block.text.as_bytes())?;
            }
        }
        OutputFormat::Ansi => {
            for block in &blocks {
                match &block.language {
                    Some(language) => {
                        let tree = highlighter.highlight_tree(&block.text, language).await?;
                        render_ansi(&tree, &mut out)?;
                    }
                    None => out.write_all(unescape_html(&block.text).as_bytes())?,
                }
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// One escaped block per input file, or a single block from stdin
fn read_blocks(args: &CliArgs, highlighter: &Highlighter) -> Result<Vec<CodeBlock>> {
    if args.files.is_empty() {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        return Ok(vec![CodeBlock::new(
            args.language.as_deref(),
            &escape_html(&source),
        )]);
    }

    let registry = highlighter.registry();
    let mut blocks = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let source = fs::read_to_string(path)?;
        let language = args
            .language
            .as_deref()
            .or_else(|| registry.detect_language(path));
        if language.is_none() {
            debug!(path = %path.display(), "no language detected");
        }
        blocks.push(CodeBlock::new(language, &escape_html(&source)));
    }
    Ok(blocks)
}
