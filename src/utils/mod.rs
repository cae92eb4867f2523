// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Terminal output helpers for the pipes CLI

pub mod colors;

pub use colors::*;
