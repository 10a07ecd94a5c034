//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use std::collections::HashMap;
use std::ops::{Add, Sub};

use tch::nn::Path;
use tch::{Kind, Tensor};

use crate::Result;

pub mod init;
pub mod layers;
pub mod scope;
pub mod transfer;


pub use layers::{
	AvgPooling, BatchNormalization, Convolution2D, Dense, Dropout, Flatten, Identity, MaxPooling,
	ReduceMean, Relu, ResidualBlock, Sigmoid, Softmax,
};
pub use scope::ScopeCounter;

/// Units default to 64-bit floats.
pub const DEFAULT_DTYPE: Kind = Kind::Double;

/// Elementwise nonlinearity applied to a unit's raw output.
pub type TransferFn = fn(&Tensor) -> Tensor;

//--------------------------------------------------------------------------------------------------

/// Keyword arguments for [`Unit::initialize`].
///
/// Units only read the fields they document; everything else is ignored.
#[derive(Debug, Clone, Default)]
pub struct InitArgs {
	/// Shape of the upstream tensor. Dense reads dim 1 as its fan-in,
	/// Convolution2D reads dim 3 as its input channel count.
	pub input_dim: Option<Vec<i64>>,

	/// Train-vs-inference statistics mode for BatchNormalization.
	pub on_train: Option<bool>,
}

impl InitArgs {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_input_dim(mut self, input_dim: impl Into<Vec<i64>>) -> Self {
		self.input_dim = Some(input_dim.into());
		self
	}

	pub fn with_on_train(mut self, on_train: bool) -> Self {
		self.on_train = Some(on_train);
		self
	}
}

/// Padding mode for convolution and pooling windows.
///
/// `Same` keeps the spatial size for unit strides and odd windows; the
/// backend only pads symmetrically, so even windows lose one row/column
/// relative to a true "same size" pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Padding {
	#[default]
	Same,
	Valid,
}

impl Padding {
	pub(crate) fn for_window(self, window: [i64; 2]) -> [i64; 2] {
		match self {
			Self::Same => [window[0] / 2, window[1] / 2],
			Self::Valid => [0, 0],
		}
	}
}

//--------------------------------------------------------------------------------------------------

/// State shared by every unit variant.
#[derive(Debug, Default)]
pub struct UnitBase {
	pub name: Option<String>,

	/// Upstream tensor. Wired by the caller before `initialize()`.
	pub input: Option<Tensor>,

	/// Set by `initialize()`; `None` until it returns successfully.
	pub output: Option<Tensor>,

	/// Learned tensors under fixed keys (`"w"`, `"b"`, or for batch-norm
	/// `"gamma"`, `"beta"`, `"moving_mean"`, `"moving_variance"`).
	pub parameters: HashMap<&'static str, Tensor>,
}

impl UnitBase {
	pub(crate) fn require_input(&self, unit: &'static str) -> Result<&Tensor> {
		self.input.as_ref().ok_or_else(|| crate::UnitError::missing_input(unit))
	}
}

/// One layer/operation node in the network graph.
///
/// A unit is constructed with static configuration, wired by assigning the
/// upstream tensor with [`set_input`](Unit::set_input), and materialized
/// exactly once with [`initialize`](Unit::initialize). There is no internal
/// scheduler; the caller drives composition in whatever order it wants.
pub trait Unit {
	fn base(&self) -> &UnitBase;
	fn base_mut(&mut self) -> &mut UnitBase;

	/// Builds this unit's fragment of the computation, creating any learned
	/// tensors under a fresh `<Kind>_<n>` scope of `root` and setting
	/// `output` as a function of `input` and the stored configuration.
	fn initialize(&mut self, counter: &mut ScopeCounter, root: &Path, args: &InitArgs)
	-> Result<()>;

	fn set_input(&mut self, input: &Tensor) {
		self.base_mut().input = Some(input.shallow_clone());
	}

	fn input(&self) -> Option<&Tensor> {
		self.base().input.as_ref()
	}

	fn output(&self) -> Option<&Tensor> {
		self.base().output.as_ref()
	}

	fn name(&self) -> Option<&str> {
		self.base().name.as_deref()
	}

	fn parameters(&self) -> &HashMap<&'static str, Tensor> {
		&self.base().parameters
	}

	fn parameter(&self, key: &str) -> Option<&Tensor> {
		self.base().parameters.get(key)
	}
}

//--------------------------------------------------------------------------------------------------

#[allow(clippy::panic)]
fn combined_output(
	lhs: &dyn Unit,
	rhs: &dyn Unit,
	sym: &str,
	op: fn(&Tensor, &Tensor) -> Tensor,
) -> Tensor {
	let (Some(a), Some(b)) = (lhs.output(), rhs.output()) else {
		panic!("unit `{sym}` requires both operands to be initialized");
	};
	op(a, b)
}

/// Skip-connection shorthand: the sum of two initialized units' outputs,
/// wrapped in an [`Identity`] ready to be initialized downstream.
impl<'a, 'b> Add<&'b dyn Unit> for &'a dyn Unit {
	type Output = Identity;

	fn add(self, rhs: &'b dyn Unit) -> Identity {
		Identity::from_tensor(combined_output(self, rhs, "+", |a, b| a + b))
	}
}

impl<'a, 'b> Sub<&'b dyn Unit> for &'a dyn Unit {
	type Output = Identity;

	fn sub(self, rhs: &'b dyn Unit) -> Identity {
		Identity::from_tensor(combined_output(self, rhs, "-", |a, b| a - b))
	}
}
