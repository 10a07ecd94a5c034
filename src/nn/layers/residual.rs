// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.

use tch::nn::Path;

use crate::Result;
use crate::nn::scope::ScopeCounter;
use crate::nn::{InitArgs, Unit, UnitBase};

/// Declared placeholder with no behavior. Skip connections are available
/// today through the `+` operator on initialized units.
#[derive(Default)]
pub struct ResidualBlock {
	base: UnitBase,
}

impl ResidualBlock {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Unit for ResidualBlock {
	fn base(&self) -> &UnitBase {
		&self.base
	}

	fn base_mut(&mut self) -> &mut UnitBase {
		&mut self.base
	}

	fn initialize(
		&mut self,
		_counter: &mut ScopeCounter,
		_root: &Path,
		_args: &InitArgs,
	) -> Result<()> {
		Err(crate::UnitError::not_implemented("ResidualBlock"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tch::Device;

	#[test]
	fn test_initialize_reports_not_implemented() {
		let vs = tch::nn::VarStore::new(Device::Cpu);
		let mut counter = ScopeCounter::new();

		let mut block = ResidualBlock::new();
		let err = block.initialize(&mut counter, &vs.root(), &InitArgs::new()).unwrap_err();
		assert_eq!(err.code, crate::UnitErrorCode::NotImplemented);
		assert!(block.output().is_none());
	}
}
