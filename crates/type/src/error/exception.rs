// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use crate::{ExceptionToken, Value};

/// An exception raised by a native method or a callback.
///
/// A raised exception unwinds to the nearest capturing invoke. `kind` is set
/// when the raising module declared a named exception for it; `fields` carry
/// the values the wrapper reconstructs the client-side exception from.
#[derive(Debug, Clone, PartialEq)]
pub struct Exception {
	pub kind: Option<ExceptionToken>,
	pub message: String,
	pub fields: Vec<Value>,
}

impl Exception {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			kind: None,
			message: message.into(),
			fields: Vec::new(),
		}
	}

	pub fn of_kind(kind: ExceptionToken, message: impl Into<String>) -> Self {
		Self {
			kind: Some(kind),
			message: message.into(),
			fields: Vec::new(),
		}
	}

	pub fn with_field(mut self, value: impl Into<Value>) -> Self {
		self.fields.push(value.into());
		self
	}

	pub fn is_kind(&self, kind: ExceptionToken) -> bool {
		self.kind == Some(kind)
	}
}

impl Display for Exception {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.kind {
			Some(kind) => write!(f, "{}: {}", kind, self.message),
			None => f.write_str(&self.message),
		}
	}
}

impl std::error::Error for Exception {}

impl From<&str> for Exception {
	fn from(message: &str) -> Self {
		Exception::new(message)
	}
}

impl From<String> for Exception {
	fn from(message: String) -> Self {
		Exception::new(message)
	}
}
