//! Generation pipeline: headers -> symbols -> bindings -> alw.h / alw.c
//!
//! All configured paths are resolved against a root directory so the tool
//! behaves the same whether it runs from the project root or via `-C`.

use crate::config::GeneratorConfig;
use crate::error::{GenError, Result};
use crate::extract::{self, ApiFamily, SymbolSet};
use crate::naming::BindingTable;
use crate::render;
use std::fs;
use std::path::{Path, PathBuf};

/// Rendered loader sources, not yet written anywhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub bindings: BindingTable,
    pub header: String,
    pub source: String,
}

/// Drives one generation run
#[derive(Debug, Clone)]
pub struct Generator {
    root: PathBuf,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(root: impl Into<PathBuf>, config: GeneratorConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Resolve a configured path against the root directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    pub fn header_out(&self) -> PathBuf {
        self.resolve(&self.config.header_out)
    }

    pub fn source_out(&self) -> PathBuf {
        self.resolve(&self.config.source_out)
    }

    /// Extract the symbols declared in one family's header
    pub fn parse(&self, family: ApiFamily) -> Result<Vec<String>> {
        extract::parse_header(&self.resolve(self.config.header_for(family)), family)
    }

    /// Parse both headers and pool their symbols
    ///
    /// `on_parse` is called with each family and its resolved header path
    /// just before that header is read.
    pub fn collect_symbols<F>(&self, mut on_parse: F) -> Result<SymbolSet>
    where
        F: FnMut(ApiFamily, &Path),
    {
        let mut symbols = SymbolSet::new();
        for family in ApiFamily::ALL {
            on_parse(family, &self.resolve(self.config.header_for(family)));
            symbols.extend(self.parse(family)?);
        }
        Ok(symbols)
    }

    /// Derive bindings and render both files in memory
    pub fn render(&self, symbols: &SymbolSet) -> Result<Artifacts> {
        let bindings = BindingTable::from_symbols(symbols)?;
        let header = render::render_header(&bindings);
        let source = render::render_source(&bindings, &self.config.library);
        tracing::debug!(
            symbols = bindings.len(),
            header_bytes = header.len(),
            source_bytes = source.len(),
            "rendered loader"
        );
        Ok(Artifacts {
            bindings,
            header,
            source,
        })
    }

    /// Parse and render in one step
    pub fn generate(&self) -> Result<Artifacts> {
        let symbols = self.collect_symbols(|_, _| {})?;
        self.render(&symbols)
    }

    pub fn write_header(&self, artifacts: &Artifacts) -> Result<()> {
        write_output(&self.header_out(), &artifacts.header)
    }

    pub fn write_source(&self, artifacts: &Artifacts) -> Result<()> {
        write_output(&self.source_out(), &artifacts.source)
    }

    /// Compare rendered output with what is on disk
    ///
    /// Missing files count as stale. Nothing is written.
    pub fn check(&self, artifacts: &Artifacts) -> Result<()> {
        let mut stale = Vec::new();
        for (path, expected) in [
            (self.header_out(), &artifacts.header),
            (self.source_out(), &artifacts.source),
        ] {
            match fs::read(&path) {
                Ok(actual) if actual == expected.as_bytes() => {
                    tracing::debug!(path = %path.display(), "up to date");
                }
                Ok(_) => stale.push(path),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => stale.push(path),
                Err(source) => return Err(GenError::OutputRead { path, source }),
            }
        }

        if stale.is_empty() {
            Ok(())
        } else {
            Err(GenError::Stale(stale))
        }
    }
}

/// Write `contents` as UTF-8 bytes, creating parent directories as needed
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| GenError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, contents.as_bytes()).map_err(|source| GenError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote output");
    Ok(())
}
