// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.

//! Transfer functions that can be attached to units with `with_transfer()`.

use tch::Tensor;

pub fn relu(t: &Tensor) -> Tensor {
	t.relu()
}

pub fn sigmoid(t: &Tensor) -> Tensor {
	t.sigmoid()
}

pub fn tanh(t: &Tensor) -> Tensor {
	t.tanh()
}
