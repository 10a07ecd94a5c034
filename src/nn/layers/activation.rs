//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

//! Parameter-free units: Identity, Softmax, Relu, Sigmoid.

use tch::Tensor;
use tch::nn::Path;

use crate::Result;
use crate::nn::scope::ScopeCounter;
use crate::nn::{InitArgs, Unit, UnitBase};

/// Pass-through unit. Also produced by the `+`/`-` operators on units,
/// where it wraps the combined output of the two operands.
#[derive(Default)]
pub struct Identity {
	base: UnitBase,
}

impl Identity {
	pub fn new() -> Self {
		Self::default()
	}

	/// An Identity whose input is already wired to `tensor`.
	pub fn from_tensor(tensor: Tensor) -> Self {
		Self {
			base: UnitBase { input: Some(tensor), ..UnitBase::default() },
		}
	}
}

impl Unit for Identity {
	fn base(&self) -> &UnitBase {
		&self.base
	}

	fn base_mut(&mut self) -> &mut UnitBase {
		&mut self.base
	}

	fn initialize(
		&mut self,
		counter: &mut ScopeCounter,
		_root: &Path,
		_args: &InitArgs,
	) -> Result<()> {
		let input = self.base.require_input("Identity")?;
		let out = input.shallow_clone();
		counter.next_scope("Identity");
		self.base.output = Some(out);
		Ok(())
	}
}

/// Row-wise softmax over axis 1, written out as `exp(x) / sum(exp(x))`.
#[derive(Default)]
pub struct Softmax {
	base: UnitBase,
}

impl Softmax {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Unit for Softmax {
	fn base(&self) -> &UnitBase {
		&self.base
	}

	fn base_mut(&mut self) -> &mut UnitBase {
		&mut self.base
	}

	fn initialize(
		&mut self,
		counter: &mut ScopeCounter,
		_root: &Path,
		_args: &InitArgs,
	) -> Result<()> {
		let input = self.base.require_input("SoftMax")?;
		let exp = input.exp();
		let sum_exp = exp.sum_dim_intlist(&[1i64][..], true, None::<tch::Kind>);
		let out = &exp / &sum_exp;
		counter.next_scope("SoftMax");
		self.base.output = Some(out);
		Ok(())
	}
}

/// Elementwise rectified-linear unit.
#[derive(Default)]
pub struct Relu {
	base: UnitBase,
}

impl Relu {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Unit for Relu {
	fn base(&self) -> &UnitBase {
		&self.base
	}

	fn base_mut(&mut self) -> &mut UnitBase {
		&mut self.base
	}

	fn initialize(
		&mut self,
		counter: &mut ScopeCounter,
		_root: &Path,
		_args: &InitArgs,
	) -> Result<()> {
		let input = self.base.require_input("Relu")?;
		let out = input.relu();
		counter.next_scope("Relu");
		self.base.output = Some(out);
		Ok(())
	}
}

/// Elementwise logistic sigmoid.
#[derive(Default)]
pub struct Sigmoid {
	base: UnitBase,
}

impl Sigmoid {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Unit for Sigmoid {
	fn base(&self) -> &UnitBase {
		&self.base
	}

	fn base_mut(&mut self) -> &mut UnitBase {
		&mut self.base
	}

	fn initialize(
		&mut self,
		counter: &mut ScopeCounter,
		_root: &Path,
		_args: &InitArgs,
	) -> Result<()> {
		let input = self.base.require_input("Sigmoid")?;
		let out = input.sigmoid();
		counter.next_scope("Sigmoid");
		self.base.output = Some(out);
		Ok(())
	}
}
