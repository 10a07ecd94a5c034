//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

// clippy
#![warn(clippy::all)]
#![warn(clippy::cast_lossless)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::let_and_return)]

use std::borrow::Cow;

pub mod nn;

pub use nn::scope::ScopeCounter;
pub use nn::{InitArgs, Unit};

pub type Result<T> = std::result::Result<T, UnitError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitErrorCode {
	/// `initialize()` was called before `set_input()`.
	MissingInput,

	/// The unit needs `input_dim` in its `InitArgs` and none was given.
	MissingInputDim,

	/// The unit is a declared placeholder with no behavior.
	NotImplemented,
}

#[derive(Debug)]
pub struct UnitError {
	pub code: UnitErrorCode,

	/// Kind name of the unit that raised the error, e.g. `"Dense"`.
	pub unit: &'static str,

	pub message: Option<Cow<'static, str>>,
}

impl UnitError {
	pub fn missing_input(unit: &'static str) -> Self {
		Self {
			code: UnitErrorCode::MissingInput,
			unit,
			message: None,
		}
	}

	pub fn missing_input_dim(unit: &'static str) -> Self {
		Self {
			code: UnitErrorCode::MissingInputDim,
			unit,
			message: Some(Cow::Borrowed("`input_dim` is required in InitArgs")),
		}
	}

	pub fn not_implemented(unit: &'static str) -> Self {
		Self {
			code: UnitErrorCode::NotImplemented,
			unit,
			message: None,
		}
	}
}

impl std::error::Error for UnitError {}

impl std::fmt::Display for UnitError {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let Self { code, unit, message } = self;
		write!(f, "(UnitError: code={code:?}, unit={unit}")?;
		if let Some(message) = message {
			write!(f, ", message={message}")?;
		}
		write!(f, ")")
	}
}
