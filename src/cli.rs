//! Command-line argument parsing

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Highlight source files with regex pattern rules
#[derive(Parser, Debug)]
#[command(name = "spectral", version, about = "Highlight source code as HTML or ANSI text")]
pub struct CliArgs {
    /// Files to highlight (reads stdin when none are given)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Language to use instead of detecting it from the file extension
    #[arg(short = 'l', long, value_name = "LANG")]
    pub language: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,

    /// Class appended to every generated span
    #[arg(long, value_name = "CLASS")]
    pub global_class: Option<String>,

    /// Config file to use instead of ~/.spectral.toml
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory of TOML language files to load (repeatable)
    #[arg(long = "languages", value_name = "DIR")]
    pub language_dirs: Vec<PathBuf>,

    /// Print the registered languages and exit
    #[arg(long)]
    pub list_languages: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `<span class="...">` markup
    Html,
    /// Colored terminal text
    Ansi,
}
