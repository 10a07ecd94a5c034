//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

//! Demo driver: composes a small channels-last network by hand, wiring each
//! unit's output into the next unit's input before calling `initialize`.

use tch::nn::VarStore;
use tch::{Device, Kind, Tensor};

use unitnet::nn::{
	AvgPooling, BatchNormalization, Convolution2D, Dense, Dropout, Flatten, InitArgs,
	ScopeCounter, Softmax, transfer,
};
use unitnet::{Result, Unit};

fn main() -> Result<()> {
	stderrlog::new().verbosity(3).init().ok();

	let vs = VarStore::new(Device::Cpu);
	let root = vs.root();
	let mut counter = ScopeCounter::new();

	// batch of fake 28x28 grayscale images, channels last
	let images = Tensor::randn([8, 28, 28, 1], (Kind::Double, Device::Cpu));

	let mut conv = Convolution2D::new([5, 5, 6]).with_transfer(transfer::relu);
	conv.set_input(&images);
	conv.initialize(&mut counter, &root, &InitArgs::new().with_input_dim(images.size()))?;
	let conv_out = conv.output().unwrap();
	log::info!("conv: {:?}", conv_out.size());

	let mut pool = AvgPooling::new([2, 2]).with_strides([2, 2]);
	pool.set_input(conv_out);
	pool.initialize(&mut counter, &root, &InitArgs::new())?;
	let pool_out = pool.output().unwrap();
	log::info!("pool: {:?}", pool_out.size());

	let mut flatten = Flatten::new();
	flatten.set_input(pool_out);
	flatten.initialize(&mut counter, &root, &InitArgs::new())?;
	let flat_out = flatten.output().unwrap();
	log::info!("flatten: {:?}", flat_out.size());

	let mut hidden = Dense::new(32).with_transfer(transfer::relu);
	hidden.set_input(flat_out);
	hidden.initialize(&mut counter, &root, &InitArgs::new().with_input_dim(flat_out.size()))?;
	let hidden_out = hidden.output().unwrap();
	log::info!("hidden: {:?}", hidden_out.size());

	let mut norm = BatchNormalization::new();
	norm.set_input(hidden_out);
	norm.initialize(&mut counter, &root, &InitArgs::new().with_on_train(true))?;
	log::info!("batch norm: {:?}", norm.output().unwrap().size());

	// skip connection around the normalization
	let mut skip = (&norm as &dyn Unit) + (&hidden as &dyn Unit);
	skip.initialize(&mut counter, &root, &InitArgs::new())?;
	let skip_out = skip.output().unwrap();
	log::info!("skip: {:?}", skip_out.size());

	let mut dropout = Dropout::new(0.9);
	dropout.set_input(skip_out);
	dropout.initialize(&mut counter, &root, &InitArgs::new())?;
	let dropout_out = dropout.output().unwrap();

	let mut logits = Dense::new(10);
	logits.set_input(dropout_out);
	logits.initialize(&mut counter, &root, &InitArgs::new().with_input_dim(dropout_out.size()))?;
	let logits_out = logits.output().unwrap();

	let mut softmax = Softmax::new();
	softmax.set_input(logits_out);
	softmax.initialize(&mut counter, &root, &InitArgs::new())?;
	let probs = softmax.output().unwrap();
	log::info!("softmax: {:?}", probs.size());

	let mut names: Vec<String> = vs.variables().keys().cloned().collect();
	names.sort();
	log::info!("variables: {names:?}");
	Ok(())
}
