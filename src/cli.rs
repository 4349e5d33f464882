//! CLI argument parsing for alw-gen

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for `--list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns: symbol, alias, pointer type (default)
    Text,
    /// JSON array for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "alw-gen")]
#[command(version)]
#[command(about = "Generate the alw OpenAL loader from the AL/ALC headers", long_about = None)]
pub struct Cli {
    /// Directory all relative paths are resolved against
    #[arg(short = 'C', long = "root", value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// TOML configuration file (defaults to <root>/alw-gen.toml if present)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path of alc.h
    #[arg(long = "alc-header", value_name = "PATH")]
    pub alc_header: Option<PathBuf>,

    /// Path of al.h
    #[arg(long = "al-header", value_name = "PATH")]
    pub al_header: Option<PathBuf>,

    /// Where to write alw.h
    #[arg(long = "header-out", value_name = "PATH")]
    pub header_out: Option<PathBuf>,

    /// Where to write alw.c
    #[arg(long = "source-out", value_name = "PATH")]
    pub source_out: Option<PathBuf>,

    /// Fail if the generated files are missing or out of date; write nothing
    #[arg(long = "check", conflicts_with_all = ["list", "probe"])]
    pub check: bool,

    /// Print the symbol/alias/type table instead of writing files
    #[arg(long = "list", conflicts_with = "probe")]
    pub list: bool,

    /// Output format for --list
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Open the backing library on this machine and report which entry points it exports
    #[arg(long = "probe")]
    pub probe: bool,

    /// Enable debug tracing on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
