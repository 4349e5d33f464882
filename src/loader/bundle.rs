//! CoreFoundation bundle backend for macOS and iOS
//!
//! The framework is opened as a `CFBundle` from its file system path and
//! entry points are looked up with `CFBundleGetFunctionPointerForName`.

use super::Backend;
use crate::error::LoaderError;
use std::ffi::{c_char, c_void, CString};
use std::ptr::{self, NonNull};

type CFTypeRef = *const c_void;
type CFAllocatorRef = *const c_void;
type CFStringRef = *const c_void;
type CFURLRef = *const c_void;
type CFBundleRef = *mut c_void;
type CFIndex = isize;
type CFStringEncoding = u32;
type Boolean = u8;

const K_CF_URL_POSIX_PATH_STYLE: CFIndex = 0;
const K_CF_STRING_ENCODING_UTF8: CFStringEncoding = 0x0800_0100;
const K_CF_STRING_ENCODING_ASCII: CFStringEncoding = 0x0600;

#[link(name = "CoreFoundation", kind = "framework")]
extern "C" {
    static kCFAllocatorDefault: CFAllocatorRef;

    fn CFStringCreateWithCString(
        alloc: CFAllocatorRef,
        c_str: *const c_char,
        encoding: CFStringEncoding,
    ) -> CFStringRef;
    fn CFURLCreateWithFileSystemPath(
        allocator: CFAllocatorRef,
        file_path: CFStringRef,
        path_style: CFIndex,
        is_directory: Boolean,
    ) -> CFURLRef;
    fn CFBundleCreate(allocator: CFAllocatorRef, bundle_url: CFURLRef) -> CFBundleRef;
    fn CFBundleGetFunctionPointerForName(
        bundle: CFBundleRef,
        function_name: CFStringRef,
    ) -> *mut c_void;
    fn CFRelease(cf: CFTypeRef);
}

/// Framework bundle opened from a fixed path
#[derive(Debug)]
pub struct BundleBackend {
    path: String,
    url: CFURLRef,
    bundle: CFBundleRef,
}

// SAFETY: CFBundle and CFURL are immutable once created and CoreFoundation
// reference counting is thread-safe; both are only replaced through &mut self.
unsafe impl Send for BundleBackend {}
unsafe impl Sync for BundleBackend {}

impl BundleBackend {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: ptr::null(),
            bundle: ptr::null_mut(),
        }
    }
}

/// Create a CFString; the caller releases it
fn cf_string(s: &str, encoding: CFStringEncoding) -> Option<CFStringRef> {
    let c = CString::new(s).ok()?;
    let string = unsafe { CFStringCreateWithCString(kCFAllocatorDefault, c.as_ptr(), encoding) };
    (!string.is_null()).then_some(string)
}

impl Backend for BundleBackend {
    fn library(&self) -> &str {
        &self.path
    }

    fn open(&mut self) -> Result<(), LoaderError> {
        let open_error = |reason: &str| LoaderError::Open {
            library: self.path.clone(),
            reason: reason.to_string(),
        };

        let path = cf_string(&self.path, K_CF_STRING_ENCODING_UTF8)
            .ok_or_else(|| open_error("invalid framework path"))?;
        let url = unsafe {
            CFURLCreateWithFileSystemPath(kCFAllocatorDefault, path, K_CF_URL_POSIX_PATH_STYLE, 1)
        };
        unsafe { CFRelease(path) };
        if url.is_null() {
            return Err(open_error("CFURLCreateWithFileSystemPath failed"));
        }

        let bundle = unsafe { CFBundleCreate(kCFAllocatorDefault, url) };
        if bundle.is_null() {
            unsafe { CFRelease(url) };
            return Err(open_error("CFBundleCreate failed"));
        }

        self.url = url;
        self.bundle = bundle;
        Ok(())
    }

    fn resolve(&self, name: &str) -> Option<NonNull<c_void>> {
        if self.bundle.is_null() {
            return None;
        }
        let name = cf_string(name, K_CF_STRING_ENCODING_ASCII)?;
        let address = unsafe { CFBundleGetFunctionPointerForName(self.bundle, name) };
        unsafe { CFRelease(name) };
        NonNull::new(address)
    }

    fn close(&mut self) {
        if !self.bundle.is_null() {
            unsafe { CFRelease(self.bundle as CFTypeRef) };
            self.bundle = ptr::null_mut();
        }
        if !self.url.is_null() {
            unsafe { CFRelease(self.url) };
            self.url = ptr::null();
        }
    }
}

impl Drop for BundleBackend {
    fn drop(&mut self) {
        self.close();
    }
}
