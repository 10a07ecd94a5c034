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
use crate::nn::{DEFAULT_DTYPE, InitArgs, Padding, TransferFn, Unit, UnitBase, init};

const KIND: &str = "Convolution";

/// Learned 2-d filter bank over channels-last input.
///
///     input: [batch, height, width, in_channels]
///     output: [batch, height', width', out_channels]
///
/// The unit is configured with a `(height, width, out_channels)` filter
/// shape; the input channel count is spliced in from `InitArgs::input_dim`
/// (dimension 3) at initialization, giving the realized filter shape
/// `(height, width, in_channels, out_channels)`.
pub struct Convolution2D {
	base: UnitBase,
	shape: [i64; 3],
	strides: [i64; 2],
	padding: Padding,
	transfer_fun: Option<TransferFn>,
	dtype: Kind,
}

impl Convolution2D {
	pub fn new(shape: [i64; 3]) -> Self {
		Self {
			base: UnitBase::default(),
			shape,
			strides: [1, 1],
			padding: Padding::Same,
			transfer_fun: None,
			dtype: DEFAULT_DTYPE,
		}
	}

	pub fn with_strides(mut self, strides: [i64; 2]) -> Self {
		self.strides = strides;
		self
	}

	pub fn with_padding(mut self, padding: Padding) -> Self {
		self.padding = padding;
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

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.base.name = Some(name.into());
		self
	}
}

impl Unit for Convolution2D {
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
		let in_channels = dims[3];
		let [kh, kw, out_channels] = self.shape;

		let input = self.base.require_input(KIND)?;
		let scope = counter.next_scope(KIND);
		let vs = root.sub(&scope);

		// The filter keeps the channels-last layout; it is permuted to the
		// backend's (out, in, h, w) at call time.
		let w = init::trunc_normal_var(
			&vs,
			"weight",
			&[kh, kw, in_channels, out_channels],
			self.dtype,
			0.1,
			true,
		);
		let b = init::trunc_normal_var(&vs, "bias", &[out_channels], self.dtype, 0.1, true);

		let x = nhwc_to_nchw(input);
		let kernel = w.permute([3, 2, 0, 1]);
		let pad = self.padding.for_window([kh, kw]);
		let y = x.conv2d(&kernel, Some(&b), self.strides, pad, [1, 1], 1);
		let mut out = nchw_to_nhwc(&y);
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

#[cfg(test)]
mod tests {
	use super::*;
	use tch::{Device, Tensor};

	#[test]
	fn test_realized_filter_shape_includes_input_channels() {
		let vs = tch::nn::VarStore::new(Device::Cpu);
		let mut counter = ScopeCounter::new();
		let input = Tensor::randn([2, 7, 9, 2], (Kind::Double, Device::Cpu));

		let mut conv = Convolution2D::new([3, 3, 8]);
		conv.set_input(&input);
		conv.initialize(&mut counter, &vs.root(), &InitArgs::new().with_input_dim(input.size()))
			.unwrap();

		assert_eq!(conv.parameter("w").unwrap().size(), vec![3, 3, 2, 8]);
		assert_eq!(conv.parameter("b").unwrap().size(), vec![8]);
	}

	#[test]
	fn test_same_padding_keeps_spatial_size() {
		let vs = tch::nn::VarStore::new(Device::Cpu);
		let mut counter = ScopeCounter::new();
		let input = Tensor::randn([2, 7, 9, 2], (Kind::Double, Device::Cpu));

		let mut conv = Convolution2D::new([3, 3, 8]);
		conv.set_input(&input);
		conv.initialize(&mut counter, &vs.root(), &InitArgs::new().with_input_dim(input.size()))
			.unwrap();

		assert_eq!(conv.output().unwrap().size(), vec![2, 7, 9, 8]);
	}

	#[test]
	fn test_valid_padding_shrinks_spatial_size() {
		let vs = tch::nn::VarStore::new(Device::Cpu);
		let mut counter = ScopeCounter::new();
		let input = Tensor::randn([2, 7, 9, 2], (Kind::Double, Device::Cpu));

		let mut conv = Convolution2D::new([3, 3, 4]).with_padding(Padding::Valid);
		conv.set_input(&input);
		conv.initialize(&mut counter, &vs.root(), &InitArgs::new().with_input_dim(input.size()))
			.unwrap();

		assert_eq!(conv.output().unwrap().size(), vec![2, 5, 7, 4]);
	}
}
