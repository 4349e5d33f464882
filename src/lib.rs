//! alw-gen - OpenAL loader generator
//!
//! Scans `alc.h` and `al.h` for entry points and generates `alw.h` and
//! `alw.c`, a small shim that opens the OpenAL library at runtime and
//! resolves every function pointer in `alwInit()`. The [`loader`] module
//! implements the same runtime contract in Rust.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod generator;
pub mod loader;
pub mod naming;
pub mod render;
