use alw_gen::cli::{Cli, OutputFormat};
use alw_gen::config::{GeneratorConfig, DEFAULT_CONFIG_FILE};
use alw_gen::generator::Generator;
use alw_gen::loader::{self, Backend, ProcTable};
use alw_gen::naming::BindingTable;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Config file, then command-line overrides
fn load_config(args: &Cli) -> Result<GeneratorConfig> {
    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None => {
            let default = args.root.join(DEFAULT_CONFIG_FILE);
            default.is_file().then_some(default)
        }
    };

    let mut config = match path {
        Some(path) => {
            tracing::debug!(config = %path.display(), "loading config");
            GeneratorConfig::from_file(&path)?
        }
        None => GeneratorConfig::default(),
    };

    if let Some(path) = &args.alc_header {
        config.alc_header = path.clone();
    }
    if let Some(path) = &args.al_header {
        config.al_header = path.clone();
    }
    if let Some(path) = &args.header_out {
        config.header_out = path.clone();
    }
    if let Some(path) = &args.source_out {
        config.source_out = path.clone();
    }

    config.validate()?;
    Ok(config)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn parent_dir(path: &Path) -> String {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.display().to_string(),
        _ => ".".to_string(),
    }
}

/// Print the binding table for --list
fn print_bindings(bindings: &BindingTable, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(bindings)?);
        }
        OutputFormat::Text => {
            let symbol_width = bindings.iter().map(|b| b.symbol.len()).max().unwrap_or(0);
            let alias_width = bindings.iter().map(|b| b.alias.len()).max().unwrap_or(0);
            for binding in bindings {
                println!(
                    "{:<sw$}  {:<aw$}  {}",
                    binding.symbol,
                    binding.alias,
                    binding.pointer_type,
                    sw = symbol_width,
                    aw = alias_width
                );
            }
        }
    }
    Ok(())
}

/// Open the backing library for this platform and report what resolves
fn probe(config: &GeneratorConfig, bindings: &BindingTable) -> Result<()> {
    let backend = loader::platform_backend(&config.library);
    let table = ProcTable::init(backend, bindings).context("Backing library is not loadable")?;

    println!(
        "{}: {} of {} entry points resolved",
        table.backend().library(),
        table.resolved_count(),
        table.len()
    );
    for symbol in table.missing() {
        println!("  missing: {symbol}");
    }

    table.terminate();
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = load_config(&args)?;
    let generator = Generator::new(&args.root, config);
    let quiet = args.list || args.check || args.probe;

    let symbols = generator.collect_symbols(|_, header| {
        if !quiet {
            println!("Parsing {} header...", file_name(header));
        }
    })?;

    let artifacts = generator.render(&symbols)?;

    if args.list {
        return print_bindings(&artifacts.bindings, args.format);
    }

    if args.probe {
        return probe(generator.config(), &artifacts.bindings);
    }

    if args.check {
        generator.check(&artifacts)?;
        println!(
            "{} and {} are up to date ({} entry points)",
            file_name(&generator.config().header_out),
            file_name(&generator.config().source_out),
            artifacts.bindings.len()
        );
        return Ok(());
    }

    let header_out = &generator.config().header_out;
    println!(
        "Generating {} in {}...",
        file_name(header_out),
        parent_dir(header_out)
    );
    generator.write_header(&artifacts)?;

    let source_out = &generator.config().source_out;
    println!(
        "Generating {} in {}...",
        file_name(source_out),
        parent_dir(source_out)
    );
    generator.write_source(&artifacts)?;

    Ok(())
}
