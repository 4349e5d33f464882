//! Entry point extraction from the AL and ALC headers
//!
//! Each API family declares its functions with its own pair of macros:
//! - ALC: `ALC_API ALCdevice* ALC_APIENTRY alcOpenDevice(...)`
//! - AL:  `AL_API void AL_APIENTRY alEnable(...)`
//!
//! A header is scanned one line at a time and the function name is taken
//! from the first capture group of the family's pattern. Lines that do not
//! match are skipped.

use crate::error::{GenError, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// The two API families the loader covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFamily {
    /// Context and device management (`alc.h`, `alc*` symbols)
    Alc,
    /// Core audio (`al.h`, `al*` symbols)
    Al,
}

impl ApiFamily {
    /// Families in the order their headers are parsed
    pub const ALL: [ApiFamily; 2] = [ApiFamily::Alc, ApiFamily::Al];

    /// Declaration pattern; group 1 captures the function name.
    ///
    /// Anchored at the start of the line: `AL_API` must not match the
    /// `ALC_API` declarations.
    pub fn pattern(self) -> &'static str {
        match self {
            ApiFamily::Alc => r"^ALC_API.*ALC_APIENTRY\s+(\w+)",
            ApiFamily::Al => r"^AL_API.*AL_APIENTRY\s+(\w+)",
        }
    }

    /// Compile [`ApiFamily::pattern`]
    pub fn matcher(self) -> Result<Regex> {
        Ok(Regex::new(self.pattern())?)
    }

    /// Namespace token every symbol of this family starts with
    pub fn namespace(self) -> &'static str {
        match self {
            ApiFamily::Alc => "alc",
            ApiFamily::Al => "al",
        }
    }
}

/// Collect group-1 captures of `pattern`, one attempt per line, in source order
///
/// `\n`, `\r\n` and a bare `\r` all end a line.
pub fn extract_symbols(source: &str, pattern: &Regex) -> Vec<String> {
    source
        .split(['\r', '\n'])
        .filter(|line| !line.is_empty())
        .filter_map(|line| pattern.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Read a header from disk and extract the symbols of `family`
pub fn parse_header(path: &Path, family: ApiFamily) -> Result<Vec<String>> {
    let source = fs::read_to_string(path).map_err(|source| GenError::HeaderRead {
        path: path.to_path_buf(),
        source,
    })?;

    let symbols = extract_symbols(&source, &family.matcher()?);
    tracing::debug!(
        header = %path.display(),
        ?family,
        count = symbols.len(),
        "extracted symbols"
    );
    Ok(symbols)
}

/// Sorted, de-duplicated union of the symbols of every parsed header
///
/// Ordering is plain byte order (`"alA" < "alZ" < "alcB"`), which keeps
/// generated output stable from run to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSet {
    symbols: Vec<String>,
}

impl SymbolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add symbols; duplicates collapse
    pub fn extend<I, S>(&mut self, symbols: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set: BTreeSet<String> = std::mem::take(&mut self.symbols).into_iter().collect();
        set.extend(symbols.into_iter().map(Into::into));
        self.symbols = set.into_iter().collect();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.symbols
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols
            .binary_search_by(|s| s.as_str().cmp(symbol))
            .is_ok()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SymbolSet::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ALC_SNIPPET: &str = r#"
#ifndef AL_ALC_H
#define AL_ALC_H

#ifndef ALC_API
 #define ALC_API extern
#endif

ALC_API ALCcontext* ALC_APIENTRY alcCreateContext(ALCdevice *device, const ALCint* attrlist);
ALC_API ALCboolean  ALC_APIENTRY alcMakeContextCurrent(ALCcontext *context);
/* ALC_API void ALC_APIENTRY alcCommented(void); */
ALC_API ALCdevice* ALC_APIENTRY alcOpenDevice(const ALCchar *devicename);
typedef ALCdevice* (ALC_APIENTRY *LPALCOPENDEVICE)(const ALCchar *devicename);
"#;

    const AL_SNIPPET: &str = "AL_API void AL_APIENTRY alEnable(ALenum capability);\r\n\
AL_API ALenum AL_APIENTRY alGetError(void);\r\n\
typedef void (AL_APIENTRY *LPALENABLE)(ALenum capability);\r\n\
ALC_API ALCenum ALC_APIENTRY alcGetError(ALCdevice *device);\r\n";

    #[test]
    fn test_alc_pattern_extracts_in_source_order() {
        let pattern = ApiFamily::Alc.matcher().unwrap();
        let symbols = extract_symbols(ALC_SNIPPET, &pattern);
        assert_eq!(
            symbols,
            vec!["alcCreateContext", "alcMakeContextCurrent", "alcOpenDevice"]
        );
    }

    #[test]
    fn test_al_pattern_ignores_typedefs_and_alc_lines() {
        let pattern = ApiFamily::Al.matcher().unwrap();
        let symbols = extract_symbols(AL_SNIPPET, &pattern);
        assert_eq!(symbols, vec!["alEnable", "alGetError"]);
    }

    #[test]
    fn test_carriage_return_line_endings() {
        let source = "AL_API void AL_APIENTRY alEnable(ALenum);\r\
AL_API void AL_APIENTRY alDisable(ALenum);\r\
AL_API ALenum AL_APIENTRY alGetError(void);\r";
        let pattern = ApiFamily::Al.matcher().unwrap();
        assert_eq!(
            extract_symbols(source, &pattern),
            vec!["alEnable", "alDisable", "alGetError"]
        );
    }

    #[test]
    fn test_mixed_line_endings() {
        let source = "AL_API void AL_APIENTRY alEnable(ALenum);\r\n\
AL_API void AL_APIENTRY alDisable(ALenum);\r\
AL_API ALenum AL_APIENTRY alGetError(void);\n\
AL_API void AL_APIENTRY alListenerf(ALenum, ALfloat);";
        let pattern = ApiFamily::Al.matcher().unwrap();
        assert_eq!(
            extract_symbols(source, &pattern),
            vec!["alEnable", "alDisable", "alGetError", "alListenerf"]
        );
    }

    #[test]
    fn test_indented_declaration_is_not_matched() {
        let pattern = ApiFamily::Al.matcher().unwrap();
        let symbols = extract_symbols("  AL_API void AL_APIENTRY alEnable(ALenum);", &pattern);
        assert!(symbols.is_empty());
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let pattern = ApiFamily::Alc.matcher().unwrap();
        assert!(extract_symbols("", &pattern).is_empty());
        assert!(extract_symbols("int main(void);\n", &pattern).is_empty());
    }

    #[test]
    fn test_parse_header_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(ALC_SNIPPET.as_bytes()).unwrap();
        file.flush().unwrap();

        let symbols = parse_header(file.path(), ApiFamily::Alc).unwrap();
        assert_eq!(symbols.len(), 3);
    }

    #[test]
    fn test_parse_header_missing_file() {
        let result = parse_header(Path::new("/nonexistent/include/AL/al.h"), ApiFamily::Al);
        let err = result.unwrap_err();
        assert!(matches!(err, GenError::HeaderRead { .. }));
        assert!(err.to_string().contains("Failed to read header"));
    }

    #[test]
    fn test_symbol_set_orders_by_bytes() {
        let set: SymbolSet = ["alZ", "alA", "alcB"].into_iter().collect();
        assert_eq!(set.as_slice(), ["alA", "alZ", "alcB"]);
    }

    #[test]
    fn test_symbol_set_collapses_duplicates() {
        let mut set = SymbolSet::new();
        set.extend(["alGetError", "alcOpenDevice"]);
        set.extend(["alGetError", "alEnable"]);
        assert_eq!(set.len(), 3);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec!["alEnable", "alGetError", "alcOpenDevice"]
        );
    }

    #[test]
    fn test_symbol_set_contains() {
        let set: SymbolSet = ["alEnable", "alcOpenDevice"].into_iter().collect();
        assert!(set.contains("alEnable"));
        assert!(!set.contains("alDisable"));
    }

    #[test]
    fn test_empty_symbol_set() {
        let set = SymbolSet::new();
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
    }
}
