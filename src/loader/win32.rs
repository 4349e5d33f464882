//! `LoadLibraryA` backend for Windows

use super::Backend;
use crate::error::LoaderError;
use std::ffi::{c_char, c_void, CString};
use std::ptr::{self, NonNull};

#[link(name = "kernel32")]
extern "system" {
    fn LoadLibraryA(name: *const c_char) -> *mut c_void;
    fn GetProcAddress(module: *mut c_void, name: *const c_char) -> *mut c_void;
    fn FreeLibrary(module: *mut c_void) -> i32;
    fn GetLastError() -> u32;
}

/// DLL loaded by file name through the standard search order
#[derive(Debug)]
pub struct Win32Backend {
    library: String,
    module: *mut c_void,
}

// SAFETY: HMODULE handles are process-wide and the loader APIs are
// thread-safe; the handle is only replaced through &mut self.
unsafe impl Send for Win32Backend {}
unsafe impl Sync for Win32Backend {}

impl Win32Backend {
    pub fn new(library: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            module: ptr::null_mut(),
        }
    }
}

impl Backend for Win32Backend {
    fn library(&self) -> &str {
        &self.library
    }

    fn open(&mut self) -> Result<(), LoaderError> {
        let name = CString::new(self.library.as_str()).map_err(|_| LoaderError::Open {
            library: self.library.clone(),
            reason: "library name contains a NUL byte".to_string(),
        })?;

        let module = unsafe { LoadLibraryA(name.as_ptr()) };
        if module.is_null() {
            let code = unsafe { GetLastError() };
            return Err(LoaderError::Open {
                library: self.library.clone(),
                reason: format!("LoadLibraryA failed with error {code}"),
            });
        }

        self.module = module;
        Ok(())
    }

    fn resolve(&self, name: &str) -> Option<NonNull<c_void>> {
        if self.module.is_null() {
            return None;
        }
        let name = CString::new(name).ok()?;
        NonNull::new(unsafe { GetProcAddress(self.module, name.as_ptr()) })
    }

    fn close(&mut self) {
        if !self.module.is_null() {
            unsafe { FreeLibrary(self.module) };
            self.module = ptr::null_mut();
        }
    }
}

impl Drop for Win32Backend {
    fn drop(&mut self) {
        self.close();
    }
}
