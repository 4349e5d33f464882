//! Symbol naming for the generated loader
//!
//! Every OpenAL entry point gets three derived names:
//! - an alias for its function pointer slot (`alGetError` -> `alwGetError`,
//!   `alcOpenDevice` -> `alcwOpenDevice`)
//! - a pointer type (`LPALGETERROR`, the typedef `al.h` already provides)
//! - a `#define` redirecting the original name to the alias

use crate::error::{GenError, Result};
use crate::extract::{ApiFamily, SymbolSet};
use serde::Serialize;
use std::collections::HashMap;

/// Alias prefix for `alc*` symbols
pub const ALC_ALIAS_PREFIX: &str = "alcw";

/// Alias prefix for `al*` symbols
pub const AL_ALIAS_PREFIX: &str = "alw";

/// Prefix of the function pointer typedefs
pub const POINTER_TYPE_PREFIX: &str = "LP";

/// Derived names for one entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    /// Name as declared in the header
    pub symbol: String,
    /// Name of the pointer slot in the generated code
    pub alias: String,
    /// Declared type of the pointer slot
    pub pointer_type: String,
}

impl Binding {
    pub fn derive(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            alias: alias_for(symbol),
            pointer_type: pointer_type_for(symbol),
        }
    }

    /// `(from, to)` pair of the `#define` emitted for this symbol
    pub fn macro_redirect(&self) -> (&str, &str) {
        (&self.symbol, &self.alias)
    }

    /// Family the symbol belongs to, judged by its prefix
    pub fn family(&self) -> ApiFamily {
        family_of(&self.symbol)
    }
}

fn family_of(symbol: &str) -> ApiFamily {
    if symbol.starts_with(ApiFamily::Alc.namespace()) {
        ApiFamily::Alc
    } else {
        ApiFamily::Al
    }
}

/// Drop the first `n` characters (not bytes)
fn skip_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[idx..],
        None => "",
    }
}

/// Alias of the pointer slot backing `symbol`
pub fn alias_for(symbol: &str) -> String {
    match family_of(symbol) {
        ApiFamily::Alc => {
            let rest = skip_chars(symbol, ApiFamily::Alc.namespace().len());
            format!("{ALC_ALIAS_PREFIX}{rest}")
        }
        ApiFamily::Al => {
            let rest = skip_chars(symbol, ApiFamily::Al.namespace().len());
            format!("{AL_ALIAS_PREFIX}{rest}")
        }
    }
}

/// Function pointer type of `symbol`
pub fn pointer_type_for(symbol: &str) -> String {
    format!("{POINTER_TYPE_PREFIX}{}", symbol.to_uppercase())
}

/// Bindings for a whole [`SymbolSet`], in symbol order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl BindingTable {
    /// Derive a binding per symbol
    ///
    /// Fails if two symbols would share an alias; the generated header
    /// would otherwise declare the same slot twice.
    pub fn from_symbols(symbols: &SymbolSet) -> Result<Self> {
        let bindings: Vec<Binding> = symbols.iter().map(Binding::derive).collect();

        let mut seen: HashMap<&str, &str> = HashMap::with_capacity(bindings.len());
        for binding in &bindings {
            if let Some(first) = seen.insert(&binding.alias, &binding.symbol) {
                return Err(GenError::AliasCollision {
                    alias: binding.alias.clone(),
                    first: first.to_string(),
                    second: binding.symbol.clone(),
                });
            }
        }

        Ok(Self { bindings })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        self.bindings.iter()
    }

    /// Look up a binding by its original symbol name
    pub fn get(&self, symbol: &str) -> Option<&Binding> {
        self.bindings
            .binary_search_by(|b| b.symbol.as_str().cmp(symbol))
            .ok()
            .map(|idx| &self.bindings[idx])
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<'a> IntoIterator for &'a BindingTable {
    type Item = &'a Binding;
    type IntoIter = std::slice::Iter<'a, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}
