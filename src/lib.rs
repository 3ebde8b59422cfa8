// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Switch desktop color themes across many applications at once.
//!
//! A single theme identifier, e.g., "gruvbox", selects one attribute bundle
//! from a fixed [registry](registry::Registry). A set of
//! [target adapters](adapter::Adapter) then rewrites the config file of each
//! application so that only the selected theme is active, and finally a
//! handful of refresh actions nudge running programs into reloading.
//!
//! Target files are edited in place, line by line. Lines that no adapter
//! cares about survive byte-for-byte, including their line endings.
//!
//! # Concurrency
//!
//! No file locks are taken. Running two switches at the same time against the
//! same config files is unsafe.

pub mod adapter;
pub mod config;
pub mod edit;
pub mod path;
pub mod refresh;
pub mod registry;
pub mod switcher;
pub mod template;
