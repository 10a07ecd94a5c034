//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use tch::Kind;
use tch::nn::Path;

use crate::Result;
use crate::nn::layers::{nchw_to_nhwc, nhwc_to_nchw};
use crate::nn::scope::ScopeCounter;
use crate::nn::{DEFAULT_DTYPE, InitArgs, TransferFn, Unit, UnitBase, init};

const KIND: &str = "BatchNormalization";

/// Learned scale/shift plus running statistics over the trailing
/// feature/channel dimension.
///
/// `InitArgs::on_train` selects batch statistics (true) or the running
/// statistics (false, the default). All four tensors are registered in
/// `parameters` from the handles returned at creation; nothing is recovered
/// from the variable store after the fact.
pub struct BatchNormalization {
	base: UnitBase,
	epsilon: f64,
	moving_decay: f64,
	transfer_fun: Option<TransferFn>,
	dtype: Kind,
}

impl BatchNormalization {
	pub fn new() -> Self {
		Self {
			base: UnitBase::default(),
			epsilon: 0.01,
			moving_decay: 0.99,
			transfer_fun: None,
			dtype: DEFAULT_DTYPE,
		}
	}

	pub fn with_epsilon(mut self, epsilon: f64) -> Self {
		self.epsilon = epsilon;
		self
	}

	pub fn with_moving_decay(mut self, moving_decay: f64) -> Self {
		self.moving_decay = moving_decay;
		self
	}

	pub fn with_transfer(mut self, transfer_fun: TransferFn) -> Self {
		self.transfer_fun = Some(transfer_fun);
		self
	}

	pub fn with_dtype(mut self, dtype: Kind) -> Self {
		self.dtype = dtype;
		self
	}
}

impl Default for BatchNormalization {
	fn default() -> Self {
		Self::new()
	}
}

impl Unit for BatchNormalization {
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
		let on_train = args.on_train.unwrap_or(false);
		let input = self.base.require_input(KIND)?;
		let sizes = input.size();
		let features = sizes[sizes.len() - 1];

		let scope = counter.next_scope(KIND);
		let vs = root.sub(&scope);
		let gamma = init::const_var(&vs, "gamma", &[features], self.dtype, 1.0, true);
		let beta = init::const_var(&vs, "beta", &[features], self.dtype, 0.0, true);
		let moving_mean = init::const_var(&vs, "moving_mean", &[features], self.dtype, 0.0, false);
		let moving_variance =
			init::const_var(&vs, "moving_variance", &[features], self.dtype, 1.0, false);

		let momentum = 1.0 - self.moving_decay;
		let mut out = if sizes.len() == 4 {
			let x = nhwc_to_nchw(input);
			let y = x.batch_norm(
				Some(&gamma),
				Some(&beta),
				Some(&moving_mean),
				Some(&moving_variance),
				on_train,
				momentum,
				self.epsilon,
				false,
			);
			nchw_to_nhwc(&y)
		} else {
			input.batch_norm(
				Some(&gamma),
				Some(&beta),
				Some(&moving_mean),
				Some(&moving_variance),
				on_train,
				momentum,
				self.epsilon,
				false,
			)
		};
		if let Some(transfer_fun) = self.transfer_fun {
			out = transfer_fun(&out);
		}

		self.base.parameters.insert("gamma", gamma);
		self.base.parameters.insert("beta", beta);
		self.base.parameters.insert("moving_mean", moving_mean);
		self.base.parameters.insert("moving_variance", moving_variance);
		self.base.output = Some(out);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_approx_eq::assert_approx_eq;
	use tch::{Device, Tensor};

	#[test]
	fn test_all_four_parameters_are_captured() {
		let vs = tch::nn::VarStore::new(Device::Cpu);
		let mut counter = ScopeCounter::new();
		let input = Tensor::randn([4, 5], (Kind::Double, Device::Cpu));

		let mut bn = BatchNormalization::new();
		bn.set_input(&input);
		bn.initialize(&mut counter, &vs.root(), &InitArgs::new()).unwrap();

		for key in ["gamma", "beta", "moving_mean", "moving_variance"] {
			assert_eq!(bn.parameter(key).unwrap().size(), vec![5], "bad shape for {key}");
		}
		assert!(vs.variables().contains_key("BatchNormalization_1.gamma"));
	}

	#[test]
	fn test_inference_mode_uses_fresh_running_stats() {
		let vs = tch::nn::VarStore::new(Device::Cpu);
		let mut counter = ScopeCounter::new();
		let input = Tensor::randn([3, 4], (Kind::Double, Device::Cpu));

		let mut bn = BatchNormalization::new();
		bn.set_input(&input);
		bn.initialize(&mut counter, &vs.root(), &InitArgs::new().with_on_train(false))
			.unwrap();

		// mean 0, variance 1, gamma 1, beta 0 => out = input / sqrt(1 + eps)
		let expected = &input / (1.0f64 + 0.01).sqrt();
		assert!(bn.output().unwrap().allclose(&expected, 1e-10, 1e-10, false));
	}

	#[test]
	fn test_train_mode_centers_each_feature() {
		let vs = tch::nn::VarStore::new(Device::Cpu);
		let mut counter = ScopeCounter::new();
		let input = Tensor::randn([16, 3], (Kind::Double, Device::Cpu)) * 4.0 + 7.0;

		let mut bn = BatchNormalization::new();
		bn.set_input(&input);
		bn.initialize(&mut counter, &vs.root(), &InitArgs::new().with_on_train(true))
			.unwrap();

		let col_means = bn.output().unwrap().mean_dim(&[0i64][..], false, Kind::Double);
		for j in 0..3 {
			assert_approx_eq!(col_means.double_value(&[j]), 0.0, 1e-8);
		}
	}

	#[test]
	fn test_channels_last_4d_shape_preserved() {
		let vs = tch::nn::VarStore::new(Device::Cpu);
		let mut counter = ScopeCounter::new();
		let input = Tensor::randn([2, 5, 5, 6], (Kind::Double, Device::Cpu));

		let mut bn = BatchNormalization::new();
		bn.set_input(&input);
		bn.initialize(&mut counter, &vs.root(), &InitArgs::new().with_on_train(true))
			.unwrap();

		assert_eq!(bn.output().unwrap().size(), vec![2, 5, 5, 6]);
		assert_eq!(bn.parameter("gamma").unwrap().size(), vec![6]);
	}
}
