// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tinygraph demo` command: write built-in sample models.
//!
//! Two samples ship with the CLI:
//! - `xor`: the classic 2-2-1 relu MLP computing XOR with exact
//!   integer-valued weights, float32 end to end.
//! - `logic-gates`: AND, OR, and XOR from one shared hidden layer, with
//!   uint8 input and output tensors cast through float32 internally.

use anyhow::Context;
use model_format::{FormatError, GraphBuilder, OpCode};
use std::path::PathBuf;
use tinygraph::DType;

pub fn execute(sample: &str, output: PathBuf) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              tinygraph · Sample Models               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let (bytes, values_hint) = match sample {
        "xor" => (build_xor()?, "1,0"),
        "logic-gates" => (build_logic_gates()?, "1,1"),
        other => anyhow::bail!("unknown sample '{other}' (expected \"xor\" or \"logic-gates\")"),
    };

    std::fs::write(&output, &bytes)
        .with_context(|| format!("cannot write '{}'", output.display()))?;

    let graph = model_format::read_graph(&bytes)?;
    println!("  Wrote {} ({} B)", output.display(), bytes.len());
    println!("  {}", graph.summary());
    println!();
    println!("  Try:");
    println!(
        "   tinygraph run -m {} --values \"{values_hint}\" --round",
        output.display(),
    );
    println!("   tinygraph inspect -m {}", output.display());
    println!();

    Ok(())
}

/// XOR as a 2-2-1 MLP with exact weights.
///
/// The hidden layer computes `h = relu([a+b, a+b-1])` and the output
/// layer `y = h[0] - 2*h[1]`, which lands on exactly 0.0 or 1.0 for
/// binary inputs.
fn build_xor() -> Result<Vec<u8>, FormatError> {
    let mut b = GraphBuilder::new("xor 2-2-1 mlp");
    let x = b.input("x", DType::F32, &[2]);
    let w1 = b.constant_f32("w1", &[2, 2], &[1.0, 1.0, 1.0, 1.0])?;
    let b1 = b.constant_f32("b1", &[2], &[0.0, -1.0])?;
    let h_pre = b.tensor("h_pre", DType::F32, &[2]);
    let h = b.tensor("h", DType::F32, &[2]);
    let w2 = b.constant_f32("w2", &[1, 2], &[1.0, -2.0])?;
    let b2 = b.constant_f32("b2", &[1], &[0.0])?;
    let y = b.tensor("y", DType::F32, &[1]);
    b.op(OpCode::FullyConnected, &[x, w1, b1], h_pre);
    b.op(OpCode::Relu, &[h_pre], h);
    b.op(OpCode::FullyConnected, &[h, w2, b2], y);
    b.output(y);
    b.finish()
}

/// AND, OR, and XOR from one shared hidden layer, uint8 in and out.
///
/// With `s = a+b` and `c = relu(s-1)`: and = c, or = s-c, xor = s-2c.
/// Every gate output is exactly 0.0 or 1.0, so the trailing cast back
/// to uint8 is lossless.
fn build_logic_gates() -> Result<Vec<u8>, FormatError> {
    let mut b = GraphBuilder::new("logic gates (and, or, xor) with uint8 io");
    let x_raw = b.input("x", DType::U8, &[2]);
    let x = b.tensor("x_f32", DType::F32, &[2]);
    let w1 = b.constant_f32("w1", &[2, 2], &[1.0, 1.0, 1.0, 1.0])?;
    let b1 = b.constant_f32("b1", &[2], &[0.0, -1.0])?;
    let h_pre = b.tensor("h_pre", DType::F32, &[2]);
    let h = b.tensor("h", DType::F32, &[2]);
    let w2 = b.constant_f32("w2", &[3, 2], &[0.0, 1.0, 1.0, -1.0, 1.0, -2.0])?;
    let b2 = b.constant_f32("b2", &[3], &[0.0, 0.0, 0.0])?;
    let gates_f = b.tensor("gates_f32", DType::F32, &[3]);
    let gates = b.tensor("gates", DType::U8, &[3]);
    b.op(OpCode::Cast, &[x_raw], x);
    b.op(OpCode::FullyConnected, &[x, w1, b1], h_pre);
    b.op(OpCode::Relu, &[h_pre], h);
    b.op(OpCode::FullyConnected, &[h, w2, b2], gates_f);
    b.op(OpCode::Cast, &[gates_f], gates);
    b.output(gates);
    b.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinygraph::{Interpreter, Model, Value};

    #[test]
    fn test_xor_sample_truth_table() {
        let model = Model::from_bytes(build_xor().unwrap()).unwrap();
        let mut interp = Interpreter::new(&model).unwrap();
        interp.allocate_tensors().unwrap();

        for (a, b, want) in [
            (0.0, 0.0, 0.0),
            (1.0, 0.0, 1.0),
            (0.0, 1.0, 1.0),
            (1.0, 1.0, 0.0),
        ] {
            interp
                .input_tensor_mut(0)
                .unwrap()
                .set_data(&[Value::Float(a), Value::Float(b)])
                .unwrap();
            interp.invoke().unwrap();
            assert_eq!(
                interp.output_tensor(0).unwrap().data(),
                vec![Value::Float(want)],
                "xor({a}, {b})"
            );
        }
    }

    #[test]
    fn test_logic_gates_sample_uint8_io() {
        let model = Model::from_bytes(build_logic_gates().unwrap()).unwrap();
        let mut interp = Interpreter::new(&model).unwrap();
        interp.allocate_tensors().unwrap();

        for (a, b, and, or, xor) in [
            (0, 0, 0, 0, 0),
            (1, 0, 0, 1, 1),
            (0, 1, 0, 1, 1),
            (1, 1, 1, 1, 0),
        ] {
            interp
                .input_tensor_mut(0)
                .unwrap()
                .set_data(&[Value::Int(a), Value::Int(b)])
                .unwrap();
            interp.invoke().unwrap();
            assert_eq!(
                interp.output_tensor(0).unwrap().data(),
                vec![Value::Int(and), Value::Int(or), Value::Int(xor)],
                "gates({a}, {b})"
            );
        }
    }

    #[test]
    fn test_sample_files_reparse() {
        for bytes in [build_xor().unwrap(), build_logic_gates().unwrap()] {
            let graph = model_format::read_graph(&bytes).unwrap();
            assert_eq!(graph.inputs.len(), 1);
            assert_eq!(graph.outputs.len(), 1);
        }
    }
}
