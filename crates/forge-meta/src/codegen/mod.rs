//! Code generation for component declarations
//!
//! This module provides the per-component declaration fragment generator.
//! Fragments are merged into module declaration files by
//! [`crate::closure`].

pub mod fragment;

pub use fragment::{fragment_file_name, FragmentGenerator, FragmentNames};
