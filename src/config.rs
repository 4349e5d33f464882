//! Generator configuration
//!
//! Every field has a default matching the standard alw layout, so a run
//! from the project root needs no configuration at all. An optional
//! `alw-gen.toml` can override paths and backing library names:
//!
//! ```toml
//! alc_header = "third_party/openal/include/AL/alc.h"
//! al_header = "third_party/openal/include/AL/al.h"
//!
//! [library]
//! unix = "libopenal.so"
//! ```

use crate::error::{GenError, Result};
use crate::extract::ApiFamily;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file picked up from the root directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "alw-gen.toml";

/// Names of the backing library on each platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibraryConfig {
    /// DLL passed to `LoadLibraryA`
    pub windows: String,
    /// Framework bundle path passed to `CFBundleCreate`
    pub apple_framework: String,
    /// Shared object passed to `dlopen`
    pub unix: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            windows: "openal32.dll".to_string(),
            apple_framework: "/System/Library/Frameworks/OpenAL.framework".to_string(),
            unix: "libopenal.so.1".to_string(),
        }
    }
}

impl LibraryConfig {
    fn entries(&self) -> [(&'static str, &str); 3] {
        [
            ("library.windows", self.windows.as_str()),
            ("library.apple_framework", self.apple_framework.as_str()),
            ("library.unix", self.unix.as_str()),
        ]
    }
}

/// Input and output locations plus backing library names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub alc_header: PathBuf,
    pub al_header: PathBuf,
    pub header_out: PathBuf,
    pub source_out: PathBuf,
    pub library: LibraryConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            alc_header: PathBuf::from("include/AL/alc.h"),
            al_header: PathBuf::from("include/AL/al.h"),
            header_out: PathBuf::from("include/AL/alw.h"),
            source_out: PathBuf::from("src/alw.c"),
            library: LibraryConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| GenError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GeneratorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Header path for an API family
    pub fn header_for(&self, family: ApiFamily) -> &Path {
        match family {
            ApiFamily::Alc => &self.alc_header,
            ApiFamily::Al => &self.al_header,
        }
    }

    /// Validate configuration
    ///
    /// Library names end up inside C string literals, so quotes,
    /// backslashes and line breaks are rejected.
    pub fn validate(&self) -> Result<()> {
        let paths = [
            ("alc_header", &self.alc_header),
            ("al_header", &self.al_header),
            ("header_out", &self.header_out),
            ("source_out", &self.source_out),
        ];
        for (name, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(GenError::InvalidConfig(format!("{name} must not be empty")));
            }
        }

        if self.header_out == self.source_out {
            return Err(GenError::InvalidConfig(format!(
                "header_out and source_out both point to {}",
                self.header_out.display()
            )));
        }

        for (name, value) in self.library.entries() {
            if value.is_empty() {
                return Err(GenError::InvalidConfig(format!("{name} must not be empty")));
            }
            if let Some(bad) = value
                .chars()
                .find(|c| matches!(c, '"' | '\\' | '\n' | '\r' | '\0'))
            {
                return Err(GenError::InvalidConfig(format!(
                    "{name} contains {bad:?}, which cannot appear in a C string literal"
                )));
            }
        }

        Ok(())
    }
}
