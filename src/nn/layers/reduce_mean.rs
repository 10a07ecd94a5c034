// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.

use tch::nn::Path;

use crate::Result;
use crate::nn::scope::ScopeCounter;
use crate::nn::{InitArgs, Unit, UnitBase};

/// Subtracts the per-row mean (axis 1) from the input. A centering op, not
/// a reduction: the output has the same shape as the input.
#[derive(Default)]
pub struct ReduceMean {
	base: UnitBase,
}

impl ReduceMean {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Unit for ReduceMean {
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
		let input = self.base.require_input("ReduceMean")?;
		let mean = input.mean_dim(&[1i64][..], true, None::<tch::Kind>);
		let out = input - mean;
		counter.next_scope("ReduceMean");
		self.base.output = Some(out);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_approx_eq::assert_approx_eq;
	use tch::{Device, Kind, Tensor};

	#[test]
	fn test_rows_are_centered_and_shape_is_kept() {
		let vs = tch::nn::VarStore::new(Device::Cpu);
		let mut counter = ScopeCounter::new();
		let input = Tensor::randn([4, 6], (Kind::Double, Device::Cpu)) * 5.0 + 2.0;

		let mut center = ReduceMean::new();
		center.set_input(&input);
		center.initialize(&mut counter, &vs.root(), &InitArgs::new()).unwrap();

		let out = center.output().unwrap();
		assert_eq!(out.size(), input.size());
		let row_means = out.mean_dim(&[1i64][..], false, Kind::Double);
		for i in 0..4 {
			assert_approx_eq!(row_means.double_value(&[i]), 0.0, 1e-12);
		}
	}
}
