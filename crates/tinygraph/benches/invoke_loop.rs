// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks the full binding path: marshal in, invoke, marshal out.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use model_format::{GraphBuilder, OpCode};
use tinygraph::{DType, Interpreter, Model, Value};

/// The 2-2-1 XOR MLP used across the test suite.
fn xor_model() -> Model {
    let mut b = GraphBuilder::new("xor");
    let x = b.input("x", DType::F32, &[2]);
    let w1 = b.constant_f32("w1", &[2, 2], &[1.0, 1.0, 1.0, 1.0]).unwrap();
    let b1 = b.constant_f32("b1", &[2], &[0.0, -1.0]).unwrap();
    let h_pre = b.tensor("h_pre", DType::F32, &[2]);
    let h = b.tensor("h", DType::F32, &[2]);
    let w2 = b.constant_f32("w2", &[1, 2], &[1.0, -2.0]).unwrap();
    let b2 = b.constant_f32("b2", &[1], &[0.0]).unwrap();
    let y = b.tensor("y", DType::F32, &[1]);
    b.op(OpCode::FullyConnected, &[x, w1, b1], h_pre);
    b.op(OpCode::Relu, &[h_pre], h);
    b.op(OpCode::FullyConnected, &[h, w2, b2], y);
    b.output(y);
    Model::from_bytes(b.finish().unwrap()).unwrap()
}

fn bench_invoke_only(c: &mut Criterion) {
    let model = xor_model();
    let mut interp = Interpreter::new(&model).unwrap();
    interp.allocate_tensors().unwrap();
    interp
        .input_tensor_mut(0)
        .unwrap()
        .set_data(&[Value::Float(1.0), Value::Float(0.0)])
        .unwrap();

    c.bench_function("xor_invoke", |bench| {
        bench.iter(|| interp.invoke().unwrap())
    });
}

fn bench_marshal_invoke_read(c: &mut Criterion) {
    let model = xor_model();
    let mut interp = Interpreter::new(&model).unwrap();
    interp.allocate_tensors().unwrap();
    let input = [Value::Float(0.0), Value::Float(1.0)];

    c.bench_function("xor_marshal_invoke_read", |bench| {
        bench.iter(|| {
            interp
                .input_tensor_mut(0)
                .unwrap()
                .set_data(black_box(&input))
                .unwrap();
            interp.invoke().unwrap();
            black_box(interp.output_tensor(0).unwrap().data())
        })
    });
}

criterion_group!(benches, bench_invoke_only, bench_marshal_invoke_read);
criterion_main!(benches);
