// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for the hot kernels: fully_connected and softmax.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use graph_engine::kernels::kernel_for;
use graph_engine::TensorData;
use model_format::OpCode;
use tensor_core::Shape;

fn bench_fully_connected(c: &mut Criterion) {
    let kernel = kernel_for(OpCode::FullyConnected).unwrap();
    let (batch, in_dim, out_dim) = (8, 256, 256);

    let x = TensorData::F32(vec![0.5; batch * in_dim]);
    let w = TensorData::F32(vec![0.01; out_dim * in_dim]);
    let b = TensorData::F32(vec![0.1; out_dim]);
    let mut y = TensorData::F32(vec![0.0; batch * out_dim]);
    let out_shape = Shape::matrix(batch, out_dim);

    c.bench_function("fully_connected_8x256x256", |bench| {
        bench.iter(|| {
            kernel
                .run(black_box(&[&x, &w, &b]), &mut y, &out_shape)
                .unwrap();
        })
    });
}

fn bench_softmax(c: &mut Criterion) {
    let kernel = kernel_for(OpCode::Softmax).unwrap();
    let (rows, cols) = (64, 1000);

    let logits: Vec<f32> = (0..rows * cols).map(|i| (i % 97) as f32 * 0.1).collect();
    let x = TensorData::F32(logits);
    let mut y = TensorData::F32(vec![0.0; rows * cols]);
    let out_shape = Shape::matrix(rows, cols);

    c.bench_function("softmax_64x1000", |bench| {
        bench.iter(|| {
            kernel.run(black_box(&[&x]), &mut y, &out_shape).unwrap();
        })
    });
}

criterion_group!(benches, bench_fully_connected, bench_softmax);
criterion_main!(benches);
