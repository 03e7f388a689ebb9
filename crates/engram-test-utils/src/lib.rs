// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test fixtures shared across Engram crates.

pub mod mock_provider;

pub use mock_provider::{FailingProvider, MockProvider};
