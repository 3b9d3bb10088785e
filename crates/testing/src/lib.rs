// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Test fixtures: native modules, an `extern "C"` library, a mock widget
//! toolkit and its client wrapper.

pub mod client;
pub mod counter;
pub mod echo;
pub mod model;
pub mod recorder;
pub mod session;
pub mod widget;

pub use session::{init_tracing, session, toolkit};
