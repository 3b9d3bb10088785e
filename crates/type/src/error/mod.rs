// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

mod exception;

pub use exception::Exception;

use crate::{ForeignRef, InterfaceMethodToken, InterfaceToken, MethodToken, ModuleToken, ValueKind};

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the bridge itself.
///
/// Most variants describe a violated calling convention between a wrapper and
/// a native method. Those are programming errors and are routed through the
/// bridge's violation policy instead of being returned to the caller; see
/// [`Error::is_protocol_violation`]. The rest are recoverable setup failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("value channel underflow: expected {expected}, channel is empty")]
	ChannelUnderflow {
		expected: ValueKind,
	},

	#[error("value channel shape mismatch: expected {expected}, found {found}")]
	ShapeMismatch {
		expected: ValueKind,
		found: ValueKind,
	},

	#[error("value channel overflow: more than {limit} pending values")]
	ChannelOverflow {
		limit: usize,
	},

	#[error("struct columns differ in length: expected {expected}, found {found}")]
	ColumnLengthMismatch {
		expected: usize,
		found: usize,
	},

	#[error("unknown variant tag {tag} for {variant}")]
	UnknownVariantTag {
		variant: &'static str,
		tag: i32,
	},

	#[error("unknown module '{module}'")]
	UnknownModule {
		module: String,
	},

	#[error("unknown method '{method}' in module '{module}'")]
	UnknownMethod {
		module: String,
		method: String,
	},

	#[error("unknown interface '{interface}' in module '{module}'")]
	UnknownInterface {
		module: String,
		interface: String,
	},

	#[error("unknown method '{method}' on interface {interface}")]
	UnknownInterfaceMethod {
		interface: InterfaceToken,
		method: String,
	},

	#[error("unknown exception '{exception}' in module '{module}'")]
	UnknownException {
		module: String,
		exception: String,
	},

	#[error("'{name}' is already registered")]
	DuplicateRegistration {
		name: String,
	},

	#[error("{what} is not a valid token")]
	InvalidToken {
		what: String,
	},

	#[error("{reference} is not live")]
	DeadReference {
		reference: ForeignRef,
	},

	#[error("{reference} was already released")]
	DoubleRelease {
		reference: ForeignRef,
	},

	#[error("callback target {reference} is not live")]
	DanglingCallback {
		reference: ForeignRef,
	},

	#[error("{reference} has kind {found}, expected {expected}")]
	ResourceKindMismatch {
		reference: ForeignRef,
		expected: &'static str,
		found: &'static str,
	},

	#[error("{method} belongs to another interface than {target}")]
	InterfaceMismatch {
		method: InterfaceMethodToken,
		target: ForeignRef,
	},

	#[error("native method {method} raised an exception that nobody captures: {message}")]
	UncaughtException {
		method: MethodToken,
		message: String,
	},

	#[error("native call {what} failed with status {code}")]
	NativeFailure {
		what: String,
		code: i32,
	},

	#[error("{module} is not a registered module")]
	ModuleNotRegistered {
		module: ModuleToken,
	},

	#[error("bridge is not initialized")]
	NotInitialized,

	#[error("bridge is already initialized")]
	AlreadyInitialized,

	#[error("bridge is shut down")]
	ShutDown,

	#[error("native library initialization failed: {0}")]
	LibraryInit(String),

	#[error("string is not valid UTF-8")]
	InvalidUtf8,

	#[error("null pointer passed for {0}")]
	NullPointer(&'static str),

	#[error("buffer of {count} elements of {element_size} bytes is too large")]
	BufferTooLarge {
		element_size: u32,
		count: usize,
	},

	#[error("invalid configuration: {0}")]
	Config(String),

	#[error("resources still live at shutdown: {client} client, {server} server")]
	ResourceLeak {
		client: usize,
		server: usize,
	},
}

impl Error {
	/// Whether this error means the two sides disagree on the calling
	/// convention. Such errors are never recoverable.
	pub fn is_protocol_violation(&self) -> bool {
		matches!(
			self,
			Error::ChannelUnderflow { .. }
				| Error::ShapeMismatch { .. }
				| Error::ChannelOverflow { .. }
				| Error::ColumnLengthMismatch { .. }
				| Error::UnknownVariantTag { .. }
				| Error::UnknownModule { .. }
				| Error::UnknownMethod { .. }
				| Error::UnknownInterface { .. }
				| Error::UnknownInterfaceMethod { .. }
				| Error::UnknownException { .. }
				| Error::ModuleNotRegistered { .. }
				| Error::InvalidToken { .. }
				| Error::DeadReference { .. }
				| Error::DanglingCallback { .. }
				| Error::ResourceKindMismatch { .. }
				| Error::InterfaceMismatch { .. }
				| Error::UncaughtException { .. }
				| Error::NativeFailure { .. }
		)
	}
}

impl From<std::str::Utf8Error> for Error {
	fn from(_: std::str::Utf8Error) -> Self {
		Error::InvalidUtf8
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::Config(err.to_string())
	}
}
