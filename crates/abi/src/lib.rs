// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! C ABI definitions for Tether native libraries
//!
//! A native library exports `tether_library_init` (and optionally
//! `tether_library_shutdown`). The host calls it with a [`context::ContextFFI`]
//! whose callback tables give the library access to the value channel, the
//! registry, the resource tables and the callback relay.

// #![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod callbacks;
pub mod constants;
pub mod context;
pub mod data;
pub mod library;
