// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.

use tch::nn::Path;

use crate::Result;
use crate::nn::scope::ScopeCounter;
use crate::nn::{InitArgs, Unit, UnitBase};

/// Elementwise dropout with a configured keep-probability. Applied
/// unconditionally; surviving elements are rescaled by `1 / keep_prob`.
pub struct Dropout {
	base: UnitBase,
	keep_prob: f64,
}

impl Dropout {
	pub fn new(keep_prob: f64) -> Self {
		Self { base: UnitBase::default(), keep_prob }
	}

	pub fn keep_prob(&self) -> f64 {
		self.keep_prob
	}
}

impl Unit for Dropout {
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
		let input = self.base.require_input("Dropout")?;
		let out = input.dropout(1.0 - self.keep_prob, true);
		counter.next_scope("Dropout");
		self.base.output = Some(out);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tch::{Device, Kind, Tensor};

	#[test]
	fn test_keep_prob_one_is_identity() {
		let vs = tch::nn::VarStore::new(Device::Cpu);
		let mut counter = ScopeCounter::new();
		let input = Tensor::randn([4, 4], (Kind::Double, Device::Cpu));

		let mut dropout = Dropout::new(1.0);
		dropout.set_input(&input);
		dropout.initialize(&mut counter, &vs.root(), &InitArgs::new()).unwrap();
		assert!(dropout.output().unwrap().allclose(&input, 1e-12, 1e-12, false));
	}

	#[test]
	fn test_survivors_are_rescaled() {
		let vs = tch::nn::VarStore::new(Device::Cpu);
		let mut counter = ScopeCounter::new();
		let input = Tensor::ones([64, 64], (Kind::Double, Device::Cpu));

		let mut dropout = Dropout::new(0.5);
		dropout.set_input(&input);
		dropout.initialize(&mut counter, &vs.root(), &InitArgs::new()).unwrap();

		// every surviving element of an all-ones input becomes 1 / keep_prob
		let out = dropout.output().unwrap();
		let max = out.max().double_value(&[]);
		assert!((max - 2.0).abs() < 1e-12);
	}
}
