// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Shared pieces of the command-line tools

pub mod logging;
pub mod reporter;

pub use logging::init_tracing;
pub use reporter::Reporter;
