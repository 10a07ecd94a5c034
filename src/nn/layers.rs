//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use tch::Tensor;

pub mod activation;
pub mod batch_norm;
pub mod conv;
pub mod dense;
pub mod dropout;
pub mod flatten;
pub mod pool;
pub mod reduce_mean;
pub mod residual;

pub use activation::{Identity, Relu, Sigmoid, Softmax};
pub use batch_norm::BatchNormalization;
pub use conv::Convolution2D;
pub use dense::Dense;
pub use dropout::Dropout;
pub use flatten::Flatten;
pub use pool::{AvgPooling, MaxPooling};
pub use reduce_mean::ReduceMean;
pub use residual::ResidualBlock;

// Units keep the channels-last layout; the backend's conv/pool/batch-norm
// kernels want channels-first, so 4-d calls permute around them.

pub(crate) fn nhwc_to_nchw(t: &Tensor) -> Tensor {
	t.permute([0, 3, 1, 2])
}

pub(crate) fn nchw_to_nhwc(t: &Tensor) -> Tensor {
	t.permute([0, 2, 3, 1])
}
