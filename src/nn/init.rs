// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.

use tch::nn::Path;
use tch::{Kind, Tensor};

/// Resampling rounds before out-of-range values get clamped instead.
const RESAMPLE_ROUNDS: usize = 8;

/// Truncated-normal sample: values beyond two standard deviations are
/// resampled, then scaled to the requested mean/stddev.
pub fn trunc_normal(shape: &[i64], kind: Kind, device: tch::Device, mean: f64, stddev: f64) -> Tensor {
	let mut z = Tensor::randn(shape, (kind, device));
	for _ in 0..RESAMPLE_ROUNDS {
		let out_of_range = z.abs().gt(2.0);
		if out_of_range.sum(Kind::Int64).int64_value(&[]) == 0 {
			return z * stddev + mean;
		}
		let fresh = Tensor::randn(shape, (kind, device));
		z = fresh.where_self(&out_of_range, &z);
	}
	log::warn!("trunc_normal(): clamping leftovers to (-2.0, 2.0) after {RESAMPLE_ROUNDS} rounds");
	z.clamp(-2.0, 2.0) * stddev + mean
}

/// Registers a truncated-normal variable (mean 0) under `path` and returns
/// the handle. Units capture this handle in `parameters` at creation time
/// instead of digging it back out of the variable store.
///
/// `Path::add` keeps the tensor's own kind; the store's `var_*` helpers
/// would force f32.
pub fn trunc_normal_var(
	path: &Path,
	name: &str,
	shape: &[i64],
	kind: Kind,
	stddev: f64,
	trainable: bool,
) -> Tensor {
	let init = trunc_normal(shape, kind, path.device(), 0.0, stddev);
	path.add(name, init, trainable)
}

/// Registers a constant-filled variable under `path`.
pub fn const_var(
	path: &Path,
	name: &str,
	shape: &[i64],
	kind: Kind,
	value: f64,
	trainable: bool,
) -> Tensor {
	let init = Tensor::full(shape, value, (kind, path.device()));
	path.add(name, init, trainable)
}
