// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Tether client SDK
//!
//! Building blocks for client wrappers of native classes: per-class token
//! sets, owning handles, signal connection and struct marshaling.

pub mod class;
pub mod handle;
pub mod marshal;

pub use class::{Class, Disposable, EmitsSignal, HasHandle, TokenSet};
pub use handle::Handle;
pub use marshal::{ChannelStruct, ChannelVariant, pop_variant, push_variant};
pub use tether_core;
pub use tether_type;
