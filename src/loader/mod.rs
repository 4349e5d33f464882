//! Runtime side of the alw loader
//!
//! The generated `alw.c` keeps one global pointer per entry point and fills
//! them all in `alwInit`. This module provides the same contract from Rust:
//! a [`ProcTable`] is opened once over a platform [`Backend`], resolves every
//! symbol of a [`BindingTable`] up front, and is read-only afterwards.
//!
//! Resolution policy:
//! - failing to open the backing library fails [`ProcTable::init`], and no
//!   symbol is looked up
//! - a symbol missing from an opened library leaves its slot empty; this is
//!   not an error, extension entry points are often absent
//! - calling through an empty slot is the caller's problem; [`ProcTable::slot`]
//!   hands back `None` so it can be checked first

use crate::config::LibraryConfig;
use crate::error::LoaderError;
use crate::naming::{Binding, BindingTable};
use std::ffi::c_void;
use std::ptr::NonNull;

#[cfg(target_vendor = "apple")]
pub mod bundle;
#[cfg(unix)]
pub mod dl;
#[cfg(windows)]
pub mod win32;

/// Open/resolve/close over one backing library
///
/// One implementation exists per platform family; [`PlatformBackend`] picks
/// the one matching the build target.
pub trait Backend {
    /// Name or path of the backing library, for diagnostics
    fn library(&self) -> &str;

    /// Open the backing library
    fn open(&mut self) -> Result<(), LoaderError>;

    /// Address of `name`, or `None` when it is not exported or the library
    /// is not open
    fn resolve(&self, name: &str) -> Option<NonNull<c_void>>;

    /// Release the backing library
    ///
    /// Must be a no-op when nothing is open, so it can run both from
    /// [`ProcTable`] and from the backend's own `Drop`.
    fn close(&mut self);
}

#[cfg(windows)]
pub type PlatformBackend = win32::Win32Backend;

#[cfg(target_vendor = "apple")]
pub type PlatformBackend = bundle::BundleBackend;

#[cfg(all(unix, not(target_vendor = "apple")))]
pub type PlatformBackend = dl::DlBackend;

/// Backend for the build target, configured with its library name
#[cfg(windows)]
pub fn platform_backend(library: &LibraryConfig) -> PlatformBackend {
    win32::Win32Backend::new(library.windows.clone())
}

/// Backend for the build target, configured with its library name
#[cfg(target_vendor = "apple")]
pub fn platform_backend(library: &LibraryConfig) -> PlatformBackend {
    bundle::BundleBackend::new(library.apple_framework.clone())
}

/// Backend for the build target, configured with its library name
#[cfg(all(unix, not(target_vendor = "apple")))]
pub fn platform_backend(library: &LibraryConfig) -> PlatformBackend {
    dl::DlBackend::new(library.unix.clone())
}

/// One resolved (or unresolved) entry point
#[derive(Debug, Clone)]
pub struct Slot {
    binding: Binding,
    address: Option<NonNull<c_void>>,
}

impl Slot {
    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn address(&self) -> Option<NonNull<c_void>> {
        self.address
    }

    pub fn is_resolved(&self) -> bool {
        self.address.is_some()
    }
}

/// Resolved function pointers for every binding, plus the open library
///
/// Dropping the table (or calling [`ProcTable::terminate`]) closes the
/// backend exactly once.
#[derive(Debug)]
pub struct ProcTable<B: Backend> {
    backend: B,
    slots: Vec<Slot>,
}

// SAFETY: the slots hold code addresses inside the loaded library, which stay
// valid and immutable until the backend is closed in Drop. After init the
// table is only read through &self.
unsafe impl<B: Backend + Send> Send for ProcTable<B> {}
unsafe impl<B: Backend + Sync> Sync for ProcTable<B> {}

impl<B: Backend> ProcTable<B> {
    /// Open `backend` and resolve every binding
    pub fn init(mut backend: B, bindings: &BindingTable) -> Result<Self, LoaderError> {
        backend.open()?;
        tracing::debug!(library = backend.library(), "opened backing library");

        let slots: Vec<Slot> = bindings
            .iter()
            .map(|binding| {
                let address = backend.resolve(&binding.symbol);
                tracing::trace!(
                    symbol = %binding.symbol,
                    alias = %binding.alias,
                    resolved = address.is_some(),
                    "resolve"
                );
                Slot {
                    binding: binding.clone(),
                    address,
                }
            })
            .collect();

        let table = Self { backend, slots };
        let missing = table.missing().count();
        if missing > 0 {
            tracing::warn!(
                library = table.backend.library(),
                missing,
                total = table.len(),
                "some entry points are not exported by the backing library"
            );
        }
        Ok(table)
    }

    /// Resolve `name` directly through the backend, bypassing the slots
    pub fn get_proc_address(&self, name: &str) -> Option<NonNull<c_void>> {
        self.backend.resolve(name)
    }

    /// Address stored for an original symbol name
    pub fn slot(&self, symbol: &str) -> Option<NonNull<c_void>> {
        self.slots
            .binary_search_by(|s| s.binding.symbol.as_str().cmp(symbol))
            .ok()
            .and_then(|idx| self.slots[idx].address)
    }

    /// Address stored under a generated alias (`alwGetError`)
    pub fn by_alias(&self, alias: &str) -> Option<NonNull<c_void>> {
        self.slots
            .iter()
            .find(|s| s.binding.alias == alias)
            .and_then(|s| s.address)
    }

    /// Typed function pointer for `symbol`
    ///
    /// # Safety
    ///
    /// `F` must be a function pointer type matching the real signature of
    /// `symbol`, and the result must not be called after the table is
    /// dropped.
    ///
    /// # Panics
    ///
    /// Panics if `F` is not the size of a data pointer.
    pub unsafe fn function<F: Copy>(&self, symbol: &str) -> Option<F> {
        assert_eq!(
            std::mem::size_of::<F>(),
            std::mem::size_of::<*mut c_void>(),
            "F must be pointer sized"
        );
        self.slot(symbol)
            .map(|ptr| unsafe { std::mem::transmute_copy::<*mut c_void, F>(&ptr.as_ptr()) })
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Symbols the library did not export
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter(|s| !s.is_resolved())
            .map(|s| s.binding.symbol.as_str())
    }

    pub fn resolved_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_resolved()).count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Close the backing library
    pub fn terminate(self) {
        drop(self);
    }
}

impl<B: Backend> Drop for ProcTable<B> {
    fn drop(&mut self) {
        tracing::debug!(library = self.backend.library(), "closing backing library");
        self.backend.close();
    }
}
