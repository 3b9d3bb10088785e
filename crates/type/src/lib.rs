// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Types shared by both sides of a Tether bridge.
//!
//! Everything that crosses the boundary is described here: the [`Value`]
//! shapes carried by the value channel, the [`ForeignRef`] used for objects,
//! functions and buffers, the opaque registry tokens and the error types.

pub mod error;
pub mod reference;
pub mod token;
pub mod value;

pub use error::{Error, Exception, Result};
pub use reference::{ForeignRef, RefId, Side};
pub use token::{ExceptionToken, InterfaceMethodToken, InterfaceToken, MethodToken, ModuleToken};
pub use value::{
	Array, ArrayElement, BufferDescriptor, BufferRef, FromValue, FuncRef, NativePtr, ScalarKind, Value, ValueKind,
};
