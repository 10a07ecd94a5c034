// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.

use tch::nn::Path;

use crate::Result;
use crate::nn::scope::ScopeCounter;
use crate::nn::{InitArgs, Unit, UnitBase};

/// Reshapes to 2-d: the batch dimension is kept, everything behind it is
/// flattened into one.
#[derive(Default)]
pub struct Flatten {
	base: UnitBase,
}

impl Flatten {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Unit for Flatten {
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
		let input = self.base.require_input("Flatten")?;
		let flat: i64 = input.size().iter().skip(1).product();
		let out = input.reshape([-1, flat]);
		counter.next_scope("Flatten");
		self.base.output = Some(out);
		Ok(())
	}
}
