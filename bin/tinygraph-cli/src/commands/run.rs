// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tinygraph run` command: write inputs, invoke, print outputs.
//!
//! Input values come from one of two places:
//! - `--values "1,0"`: a flat comma-separated list, spread across the
//!   model's input tensors in declaration order.
//! - `--plan run.toml`: a TOML run plan with per-tensor value lists, for
//!   models with several inputs or mixed dtypes.
//!
//! Outputs are printed raw; `--round` rounds floats for display only and
//! never changes what the interpreter computed.

use anyhow::Context;
use std::path::{Path, PathBuf};
use tinygraph::{Interpreter, InterpreterOptions, MemoryLimit, Model, Side, Value};

pub fn execute(
    model: Option<PathBuf>,
    values: Option<String>,
    plan: Option<PathBuf>,
    repeat: usize,
    memory_limit: Option<String>,
    json: bool,
    round: bool,
) -> anyhow::Result<()> {
    let settings = match plan {
        Some(path) => RunSettings::from_plan(&path)?,
        None => RunSettings::from_flags(model, values, repeat, memory_limit, round)?,
    };
    anyhow::ensure!(settings.repeat >= 1, "repeat count must be at least 1");

    if !json {
        println!("╔══════════════════════════════════════════════════════╗");
        println!("║               tinygraph · Model Runner               ║");
        println!("╚══════════════════════════════════════════════════════╝");
        println!();
    }

    let loaded = Model::from_file(&settings.model)
        .with_context(|| format!("cannot load '{}'", settings.model.display()))?;

    let options = InterpreterOptions {
        memory_limit: settings.memory_limit,
    };
    let mut interp = Interpreter::with_options(&loaded, options)?;
    interp.allocate_tensors()?;

    write_inputs(&mut interp, &settings.inputs)?;

    for _ in 0..settings.repeat {
        interp.invoke()?;
    }
    let stats = interp.stats();
    let total_ms = stats.total_invoke.as_secs_f64() * 1000.0;
    let mean_ms = total_ms / stats.invocations.max(1) as f64;

    if json {
        let doc = result_json(&settings, &loaded, &interp, total_ms, mean_ms)?;
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    // ── Report ─────────────────────────────────────────────────
    println!("  Model:  {}", settings.model.display());
    let desc = loaded.description();
    if !desc.is_empty() {
        println!("  Graph:  \"{desc}\"");
    }
    println!("  Repeat: {}", settings.repeat);
    if let Some(limit) = settings.memory_limit {
        println!("  Limit:  {limit}");
    }
    println!();

    println!("  Inputs:");
    print_rows(&interp, Side::Input, false)?;
    println!("  Outputs:");
    print_rows(&interp, Side::Output, settings.round)?;
    println!();
    println!(
        "  Invoked {} time(s): {:.3} ms total, {:.3} ms mean.",
        stats.invocations, total_ms, mean_ms,
    );
    println!();

    Ok(())
}

// ── Run settings ───────────────────────────────────────────────────

struct RunSettings {
    model: PathBuf,
    inputs: InputValues,
    repeat: usize,
    memory_limit: Option<MemoryLimit>,
    round: bool,
}

enum InputValues {
    /// No values given; inputs keep their zero fill.
    Zeros,
    /// One flat list, split across inputs by element count.
    Flat(Vec<Value>),
    /// Per-tensor lists from a run plan, matched by name or position.
    PerTensor(Vec<PlanInput>),
}

impl RunSettings {
    fn from_flags(
        model: Option<PathBuf>,
        values: Option<String>,
        repeat: usize,
        memory_limit: Option<String>,
        round: bool,
    ) -> anyhow::Result<Self> {
        let model = model.context("--model is required without --plan")?;
        let inputs = match values.as_deref() {
            Some(list) => InputValues::Flat(parse_values(list)?),
            None => InputValues::Zeros,
        };
        Ok(Self {
            model,
            inputs,
            repeat,
            memory_limit: parse_limit(memory_limit.as_deref())?,
            round,
        })
    }

    fn from_plan(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read run plan '{}'", path.display()))?;
        let plan: RunPlan = toml::from_str(&text)
            .with_context(|| format!("invalid run plan '{}'", path.display()))?;

        // A relative model path counts from the plan file, not the cwd.
        let model = match path.parent() {
            Some(dir) if plan.model.is_relative() && !dir.as_os_str().is_empty() => {
                dir.join(&plan.model)
            }
            _ => plan.model.clone(),
        };

        Ok(Self {
            model,
            inputs: InputValues::PerTensor(plan.inputs),
            repeat: plan.repeat,
            memory_limit: parse_limit(plan.memory_limit.as_deref())?,
            round: plan.round,
        })
    }
}

/// On-disk shape of a `--plan` file.
///
/// ```toml
/// model = "gates.tgrf"
/// repeat = 3
/// memory-limit = "1M"
/// round = true
///
/// [[inputs]]
/// name = "x"
/// values = [1, 0]
/// ```
#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RunPlan {
    model: PathBuf,
    #[serde(default)]
    inputs: Vec<PlanInput>,
    #[serde(default = "default_repeat")]
    repeat: usize,
    memory_limit: Option<String>,
    #[serde(default)]
    round: bool,
}

fn default_repeat() -> usize {
    1
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanInput {
    /// Target input tensor. Unnamed entries bind by position.
    name: Option<String>,
    values: Vec<PlanValue>,
}

/// TOML scalar from a plan's `values` array.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(untagged)]
enum PlanValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl From<&PlanValue> for Value {
    fn from(v: &PlanValue) -> Self {
        match *v {
            PlanValue::Bool(b) => Value::Bool(b),
            PlanValue::Int(i) => Value::Int(i),
            PlanValue::Float(f) => Value::Float(f),
        }
    }
}

fn parse_limit(limit: Option<&str>) -> anyhow::Result<Option<MemoryLimit>> {
    limit
        .map(|s| MemoryLimit::parse(s).context("invalid memory limit"))
        .transpose()
}

/// Parses a comma-separated value list: integers, floats, or booleans.
fn parse_values(list: &str) -> anyhow::Result<Vec<Value>> {
    list.split(',')
        .map(|tok| {
            let tok = tok.trim();
            if tok.eq_ignore_ascii_case("true") {
                return Ok(Value::Bool(true));
            }
            if tok.eq_ignore_ascii_case("false") {
                return Ok(Value::Bool(false));
            }
            if let Ok(i) = tok.parse::<i64>() {
                return Ok(Value::Int(i));
            }
            tok.parse::<f64>()
                .map(Value::Float)
                .map_err(|_| anyhow::anyhow!("'{tok}' is not a number or boolean"))
        })
        .collect()
}

// ── Input writing ──────────────────────────────────────────────────

fn write_inputs(interp: &mut Interpreter, inputs: &InputValues) -> anyhow::Result<()> {
    match inputs {
        InputValues::Zeros => {
            tracing::info!("no input values given; inputs stay zero-filled");
            Ok(())
        }
        InputValues::Flat(values) => write_flat(interp, values),
        InputValues::PerTensor(entries) => write_per_tensor(interp, entries),
    }
}

fn write_flat(interp: &mut Interpreter, values: &[Value]) -> anyhow::Result<()> {
    let counts: Vec<usize> = (0..interp.input_tensor_count())
        .map(|i| interp.input_tensor(i).map(|t| t.element_count()))
        .collect::<Result<_, _>>()?;
    let total: usize = counts.iter().sum();
    anyhow::ensure!(
        values.len() == total,
        "model takes {total} input value(s) across {} tensor(s), got {}",
        counts.len(),
        values.len(),
    );

    let mut offset = 0;
    for (i, &n) in counts.iter().enumerate() {
        interp
            .input_tensor_mut(i)?
            .set_data(&values[offset..offset + n])
            .with_context(|| format!("input {i}"))?;
        offset += n;
    }
    Ok(())
}

fn write_per_tensor(interp: &mut Interpreter, entries: &[PlanInput]) -> anyhow::Result<()> {
    for (position, entry) in entries.iter().enumerate() {
        let index = match &entry.name {
            Some(name) => find_input(interp, name)?,
            None => position,
        };
        let values: Vec<Value> = entry.values.iter().map(Value::from).collect();
        interp
            .input_tensor_mut(index)?
            .set_data(&values)
            .with_context(|| match &entry.name {
                Some(name) => format!("input '{name}'"),
                None => format!("input {index}"),
            })?;
    }
    Ok(())
}

fn find_input(interp: &Interpreter, name: &str) -> anyhow::Result<usize> {
    (0..interp.input_tensor_count())
        .find(|&i| {
            interp
                .input_tensor(i)
                .map(|t| t.name() == name)
                .unwrap_or(false)
        })
        .with_context(|| format!("model has no input tensor named '{name}'"))
}

// ── Output rendering ───────────────────────────────────────────────

fn print_rows(interp: &Interpreter, side: Side, round: bool) -> Result<(), tinygraph::Error> {
    let count = match side {
        Side::Input => interp.input_tensor_count(),
        Side::Output => interp.output_tensor_count(),
    };
    for i in 0..count {
        let t = match side {
            Side::Input => interp.input_tensor(i)?,
            Side::Output => interp.output_tensor(i)?,
        };
        println!(
            "   {:<4} {:<16} {:<9} {:<10} {}",
            i,
            truncate(t.name(), 16),
            t.dtype(),
            format!("{}", t.shape()),
            render_values(&t.data(), round),
        );
    }
    Ok(())
}

fn result_json(
    settings: &RunSettings,
    model: &Model,
    interp: &Interpreter,
    total_ms: f64,
    mean_ms: f64,
) -> Result<serde_json::Value, tinygraph::Error> {
    let mut outputs = Vec::new();
    for i in 0..interp.output_tensor_count() {
        let t = interp.output_tensor(i)?;
        outputs.push(serde_json::json!({
            "name": t.name(),
            "dtype": t.dtype().as_str(),
            "shape": t.shape().dims(),
            "values": t.data().iter().map(|v| value_json(v, settings.round)).collect::<Vec<_>>(),
        }));
    }
    Ok(serde_json::json!({
        "model": settings.model.display().to_string(),
        "description": model.description(),
        "repeat": settings.repeat,
        "total_ms": total_ms,
        "mean_ms": mean_ms,
        "outputs": outputs,
    }))
}

fn render_values(values: &[Value], round: bool) -> String {
    let parts: Vec<String> = values.iter().map(|v| render_value(v, round)).collect();
    format!("[{}]", parts.join(", "))
}

fn render_value(v: &Value, round: bool) -> String {
    match *v {
        Value::Float(f) if round && f.is_finite() => format!("{}", f.round() as i64),
        _ => v.to_string(),
    }
}

fn value_json(v: &Value, round: bool) -> serde_json::Value {
    match *v {
        Value::Int(i) => serde_json::json!(i),
        Value::Bool(b) => serde_json::json!(b),
        Value::Float(f) if round && f.is_finite() => serde_json::json!(f.round() as i64),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            // NaN and infinities have no JSON number form.
            .unwrap_or_else(|| serde_json::Value::String(format!("{f}"))),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_values_mixed() {
        let values = parse_values(" 1, 0.5, true, -3 ").unwrap();
        assert_eq!(
            values,
            vec![
                Value::Int(1),
                Value::Float(0.5),
                Value::Bool(true),
                Value::Int(-3)
            ]
        );
    }

    #[test]
    fn test_parse_values_rejects_garbage() {
        assert!(parse_values("1,banana").is_err());
        assert!(parse_values("").is_err());
    }

    #[test]
    fn test_plan_toml_shape() {
        let plan: RunPlan = toml::from_str(
            r#"
            model = "gates.tgrf"
            repeat = 3
            memory-limit = "1M"
            round = true

            [[inputs]]
            name = "x"
            values = [1, 0]

            [[inputs]]
            values = [0.5, false]
            "#,
        )
        .unwrap();
        assert_eq!(plan.model, PathBuf::from("gates.tgrf"));
        assert_eq!(plan.repeat, 3);
        assert!(plan.round);
        assert_eq!(plan.memory_limit.as_deref(), Some("1M"));
        assert_eq!(plan.inputs.len(), 2);
        assert_eq!(plan.inputs[0].name.as_deref(), Some("x"));
        assert_eq!(Value::from(&plan.inputs[0].values[0]), Value::Int(1));
        assert_eq!(Value::from(&plan.inputs[1].values[0]), Value::Float(0.5));
        assert_eq!(Value::from(&plan.inputs[1].values[1]), Value::Bool(false));
    }

    #[test]
    fn test_plan_defaults() {
        let plan: RunPlan = toml::from_str(r#"model = "m.tgrf""#).unwrap();
        assert_eq!(plan.repeat, 1);
        assert!(plan.inputs.is_empty());
        assert!(plan.memory_limit.is_none());
        assert!(!plan.round);
    }

    #[test]
    fn test_plan_rejects_unknown_keys() {
        assert!(toml::from_str::<RunPlan>(r#"model = "m.tgrf""#).is_ok());
        assert!(toml::from_str::<RunPlan>("model = \"m.tgrf\"\nrepeats = 2").is_err());
    }

    #[test]
    fn test_render_round_is_display_only() {
        let values = vec![Value::Float(0.9999), Value::Float(-0.25), Value::Int(3)];
        assert_eq!(render_values(&values, false), "[0.9999, -0.25, 3]");
        assert_eq!(render_values(&values, true), "[1, 0, 3]");
    }
}
