// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tinygraph inspect` command: print a model's structure.
//!
//! Reads the TGRF container through the engine rather than the binding,
//! so the op list, constant payload sizes, and intermediate tensors are
//! all visible, not just the input/output surface.

use anyhow::Context;
use graph_engine::CompiledModel;
use model_format::{Checked, GraphDef, TensorDef};
use std::path::PathBuf;

pub fn execute(model: PathBuf, json: bool) -> anyhow::Result<()> {
    let compiled = CompiledModel::from_file(&model)
        .with_context(|| format!("cannot load '{}'", model.display()))?;
    let graph = compiled.graph();

    if json {
        let doc = graph_json(&model, &compiled);
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║             tinygraph · Model Inspector              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── Summary ────────────────────────────────────────────────
    let num_const = graph.tensors.iter().filter(|t| t.is_constant()).count();
    let buffer_bytes: Option<usize> = graph
        .tensors
        .iter()
        .try_fold(0usize, |acc, t| tensor_bytes(t).and_then(|b| acc.checked_add(b)));

    println!("  File:        {}", model.display());
    let desc = compiled.description();
    println!(
        "  Description: {}",
        if desc.is_empty() { "<none>" } else { desc },
    );
    println!("  Tensors:     {} ({num_const} constant)", graph.num_tensors());
    println!("  Ops:         {}", graph.num_ops());
    println!("  Constants:   {} B", graph.total_const_bytes());
    match buffer_bytes {
        Some(b) => println!("  Buffers:     {b} B when allocated"),
        None => println!("  Buffers:     unresolved (dynamic shapes)"),
    }
    println!();

    // ── Inputs / Outputs ───────────────────────────────────────
    println!("  Inputs:");
    print_io_table(&compiled.input_infos());
    println!("  Outputs:");
    print_io_table(&compiled.output_infos());

    // ── Ops ────────────────────────────────────────────────────
    println!("  Ops:");
    println!("   {:<4} {:<16} {:<30} {}", "Idx", "Op", "Inputs", "Output");
    println!("   {}", "-".repeat(60));
    for (i, op) in graph.ops.iter().enumerate() {
        let operands = op
            .inputs
            .iter()
            .map(|&t| tensor_label(graph, t))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "   {:<4} {:<16} {:<30} {}",
            i,
            op.opcode.as_str(),
            truncate(&operands, 30),
            tensor_label(graph, op.output),
        );
    }
    println!();

    // ── Tensors ────────────────────────────────────────────────
    println!("  Tensors:");
    println!(
        "   {:<4} {:<20} {:<9} {:<12} {:>8}  {}",
        "Idx", "Name", "Type", "Shape", "Bytes", "Kind",
    );
    println!("   {}", "-".repeat(62));
    for (i, t) in graph.tensors.iter().enumerate() {
        let bytes = match tensor_bytes(t) {
            Some(b) => b.to_string(),
            None => "?".to_string(),
        };
        println!(
            "   {:<4} {:<20} {:<9} {:<12} {:>8}  {}",
            i,
            truncate(&t.name, 20),
            t.dtype,
            format!("{}", t.shape),
            bytes,
            tensor_kind(graph, i, t),
        );
    }
    println!();

    // Ready-to-paste run line for small models.
    let total_values: usize = compiled
        .input_infos()
        .iter()
        .map(|info| info.element_count())
        .sum();
    if (1..=16).contains(&total_values) {
        println!(
            "  Run with: tinygraph run -m {} --values \"{}\"",
            model.display(),
            vec!["0"; total_values].join(","),
        );
        println!();
    }

    Ok(())
}

fn print_io_table(infos: &[tinygraph::TensorInfo]) {
    println!(
        "   {:<4} {:<20} {:<9} {:<12} {:>6} {:>8}",
        "Idx", "Name", "Type", "Shape", "Elems", "Bytes",
    );
    println!("   {}", "-".repeat(64));
    for (i, info) in infos.iter().enumerate() {
        println!(
            "   {:<4} {:<20} {:<9} {:<12} {:>6} {:>8}",
            i,
            truncate(&info.name, 20),
            info.dtype,
            format!("{}", info.shape),
            info.element_count(),
            info.byte_len(),
        );
    }
    println!();
}

fn graph_json(path: &std::path::Path, compiled: &CompiledModel) -> serde_json::Value {
    let graph = compiled.graph();
    serde_json::json!({
        "file": path.display().to_string(),
        "description": compiled.description(),
        "const_bytes": graph.total_const_bytes(),
        "inputs": graph.inputs,
        "outputs": graph.outputs,
        "tensors": graph.tensors.iter().enumerate().map(|(i, t)| serde_json::json!({
            "index": i,
            "name": t.name,
            "dtype": t.dtype.as_str(),
            "shape": t.shape.dims(),
            "bytes": tensor_bytes(t),
            "kind": tensor_kind(graph, i, t),
        })).collect::<Vec<_>>(),
        "ops": graph.ops.iter().enumerate().map(|(i, op)| serde_json::json!({
            "index": i,
            "op": op.opcode.as_str(),
            "inputs": op.inputs,
            "output": op.output,
        })).collect::<Vec<_>>(),
    })
}

/// Buffer size for one tensor, or `None` while a dimension is dynamic.
fn tensor_bytes(t: &TensorDef) -> Option<usize> {
    if t.shape.has_dynamic_dim() {
        None
    } else {
        t.shape.checked_size_bytes(t.dtype)
    }
}

fn tensor_kind(graph: &GraphDef<Checked>, index: usize, t: &TensorDef) -> &'static str {
    if t.is_constant() {
        "const"
    } else if graph.inputs.contains(&index) {
        "input"
    } else if graph.outputs.contains(&index) {
        "output"
    } else {
        "temp"
    }
}

fn tensor_label(graph: &GraphDef<Checked>, index: usize) -> String {
    match graph.tensor(index) {
        Some(t) if !t.name.is_empty() => t.name.clone(),
        _ => format!("#{index}"),
    }
}

/// Truncates a string with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
