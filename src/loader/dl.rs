//! `dlopen` backend for Linux and the BSDs

use super::Backend;
use crate::error::LoaderError;
use std::ffi::{c_void, CStr, CString};
use std::ptr::{self, NonNull};

/// Shared object opened with `RTLD_LAZY | RTLD_GLOBAL`
#[derive(Debug)]
pub struct DlBackend {
    library: String,
    handle: *mut c_void,
}

// SAFETY: a dlopen handle is process-wide and the dl* functions are
// thread-safe; the handle is only replaced through &mut self.
unsafe impl Send for DlBackend {}
unsafe impl Sync for DlBackend {}

impl DlBackend {
    pub fn new(library: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            handle: ptr::null_mut(),
        }
    }

    pub fn is_open(&self) -> bool {
        !self.handle.is_null()
    }
}

/// Last error reported by the dynamic linker
fn last_dl_error() -> String {
    // SAFETY: dlerror returns null or a NUL-terminated string owned by libc
    let msg = unsafe { libc::dlerror() };
    if msg.is_null() {
        "unknown dlopen error".to_string()
    } else {
        unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
    }
}

impl Backend for DlBackend {
    fn library(&self) -> &str {
        &self.library
    }

    fn open(&mut self) -> Result<(), LoaderError> {
        let name = CString::new(self.library.as_str()).map_err(|_| LoaderError::Open {
            library: self.library.clone(),
            reason: "library name contains a NUL byte".to_string(),
        })?;

        let handle = unsafe { libc::dlopen(name.as_ptr(), libc::RTLD_LAZY | libc::RTLD_GLOBAL) };
        if handle.is_null() {
            return Err(LoaderError::Open {
                library: self.library.clone(),
                reason: last_dl_error(),
            });
        }

        self.handle = handle;
        Ok(())
    }

    fn resolve(&self, name: &str) -> Option<NonNull<c_void>> {
        if self.handle.is_null() {
            return None;
        }
        let name = CString::new(name).ok()?;
        NonNull::new(unsafe { libc::dlsym(self.handle, name.as_ptr()) })
    }

    fn close(&mut self) {
        if !self.handle.is_null() {
            unsafe { libc::dlclose(self.handle) };
            self.handle = ptr::null_mut();
        }
    }
}

impl Drop for DlBackend {
    fn drop(&mut self) {
        self.close();
    }
}
