//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use tch::Kind;
use tch::nn::Path;

use crate::Result;
use crate::nn::scope::ScopeCounter;
use crate::nn::{DEFAULT_DTYPE, InitArgs, TransferFn, Unit, UnitBase, init};

const KIND: &str = "Dense";

/// Learned affine transform with an optional transfer function.
///
///     input: [batch, fan_in]
///     output: [batch, hidden_dim]
///
/// The fan-in is taken from `InitArgs::input_dim` (dimension 1) at
/// initialization time, so the same configured unit can be dropped behind
/// any upstream shape.
pub struct Dense {
	base: UnitBase,
	hidden_dim: i64,
	input_dim: Option<i64>,
	transfer_fun: Option<TransferFn>,
	dtype: Kind,
	trainable: bool,
}

impl Dense {
	pub fn new(hidden_dim: i64) -> Self {
		Self {
			base: UnitBase::default(),
			hidden_dim,
			input_dim: None,
			transfer_fun: None,
			dtype: DEFAULT_DTYPE,
			trainable: true,
		}
	}

	pub fn with_transfer(mut self, transfer_fun: TransferFn) -> Self {
		self.transfer_fun = Some(transfer_fun);
		self
	}

	pub fn with_dtype(mut self, dtype: Kind) -> Self {
		self.dtype = dtype;
		self
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.base.name = Some(name.into());
		self
	}

	pub fn trainable(mut self, trainable: bool) -> Self {
		self.trainable = trainable;
		self
	}

	pub fn hidden_dim(&self) -> i64 {
		self.hidden_dim
	}

	/// Fan-in resolved at initialization; `None` before that.
	pub fn input_dim(&self) -> Option<i64> {
		self.input_dim
	}
}

impl Unit for Dense {
	fn base(&self) -> &UnitBase {
		&self.base
	}

	fn base_mut(&mut self) -> &mut UnitBase {
		&mut self.base
	}

	fn initialize(
		&mut self,
		counter: &mut ScopeCounter,
		root: &Path,
		args: &InitArgs,
	) -> Result<()> {
		let dims = args.input_dim.as_ref().ok_or_else(|| crate::UnitError::missing_input_dim(KIND))?;
		let fan_in = dims[1];
		self.input_dim = Some(fan_in);

		let input = self.base.require_input(KIND)?;
		let scope = counter.next_scope(KIND);
		let vs = root.sub(&scope);

		let w = init::trunc_normal_var(&vs, "weight", &[fan_in, self.hidden_dim], self.dtype, 0.1, self.trainable);
		let b = init::trunc_normal_var(&vs, "bias", &[1, self.hidden_dim], self.dtype, 0.1, self.trainable);

		let mut out = input.matmul(&w) + &b;
		if let Some(transfer_fun) = self.transfer_fun {
			out = transfer_fun(&out);
		}
		log::debug!("{scope}: output shape {:?}", out.size());

		self.base.parameters.insert("w", w);
		self.base.parameters.insert("b", b);
		self.base.output = Some(out);
		Ok(())
	}
}
