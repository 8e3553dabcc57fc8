#![allow(dead_code)]
//! Shared test utilities for quill integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top
//! of each harness file. Every helper builds against a temp-directory
//! registry so harnesses never touch the real working directory and never
//! share state with the process-wide facade.

pub mod assertions;
pub mod builders;

pub use builders::*;
