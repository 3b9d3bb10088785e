// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Tracing subscriber setup

pub mod builder;
pub mod factory;

pub use builder::{Format, TracingBuilder};
pub use factory::{TracingConfigurator, TracingFactory};
