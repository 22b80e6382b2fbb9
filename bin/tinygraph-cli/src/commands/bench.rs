// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tinygraph bench` command: time the invoke loop.
//!
//! Measures wall-clock latency of `Interpreter::invoke` over a fixed
//! iteration count after one untimed warm-up. Inputs keep their zero
//! fill, so the numbers cover kernel execution alone; the criterion
//! benches cover the marshal-and-invoke path.

use anyhow::Context;
use std::path::PathBuf;
use std::time::Instant;
use tinygraph::{Interpreter, InterpreterOptions, MemoryLimit, Model};

pub fn execute(
    model: PathBuf,
    iterations: usize,
    memory_limit: Option<String>,
) -> anyhow::Result<()> {
    anyhow::ensure!(iterations >= 1, "iteration count must be at least 1");

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║             tinygraph · Invoke Benchmark             ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let loaded = Model::from_file(&model)
        .with_context(|| format!("cannot load '{}'", model.display()))?;
    let limit = memory_limit
        .as_deref()
        .map(|s| MemoryLimit::parse(s).context("invalid memory limit"))
        .transpose()?;

    let mut interp = Interpreter::with_options(
        &loaded,
        InterpreterOptions {
            memory_limit: limit,
        },
    )?;
    interp.allocate_tensors()?;

    println!("  Model:      {}", model.display());
    let desc = loaded.description();
    if !desc.is_empty() {
        println!("  Graph:      \"{desc}\"");
    }
    println!("  Iterations: {iterations} (one untimed warm-up)");
    println!();

    tracing::debug!("warming up");
    interp.invoke()?;

    let mut samples_ms = Vec::with_capacity(iterations);
    for _ in 0..iterations {
        let started = Instant::now();
        interp.invoke()?;
        samples_ms.push(started.elapsed().as_secs_f64() * 1000.0);
    }

    let total_ms: f64 = samples_ms.iter().sum();
    let min = samples_ms.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples_ms.iter().copied().fold(0.0, f64::max);
    let mean = total_ms / iterations as f64;

    println!(
        "  {:<10} {:>12} {:>12} {:>12}",
        "", "min", "mean", "max",
    );
    println!("  {}", "-".repeat(50));
    println!(
        "  {:<10} {:>9.4} ms {:>9.4} ms {:>9.4} ms",
        "latency", min, mean, max,
    );
    println!();
    if total_ms > 0.0 {
        println!(
            "  Throughput: {:.0} invokes/s",
            iterations as f64 / (total_ms / 1000.0),
        );
    } else {
        println!("  Throughput: too fast for the clock; raise --iterations");
    }
    println!();

    Ok(())
}
