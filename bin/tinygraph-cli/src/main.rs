// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tinygraph
//!
//! Command-line front end for the tinygraph inference binding.
//!
//! ## Usage
//! ```bash
//! # Write a sample model, then run it
//! tinygraph demo xor -o xor.tgrf
//! tinygraph run -m xor.tgrf --values "1,0" --round
//!
//! # Inspect the graph
//! tinygraph inspect -m xor.tgrf
//!
//! # Time the invoke loop
//! tinygraph bench -m xor.tgrf --iterations 1000
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tinygraph",
    about = "Load, inspect, and run TGRF graph models",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a model: write inputs, invoke, print outputs.
    Run {
        /// Path to the model file.
        #[arg(short, long, required_unless_present = "plan")]
        model: Option<std::path::PathBuf>,

        /// Comma-separated input values (e.g. "1,0"), spread across the
        /// model's input tensors in declaration order.
        #[arg(long)]
        values: Option<String>,

        /// Path to a TOML run plan (model, per-tensor inputs, repeat).
        #[arg(
            long,
            conflicts_with_all = ["model", "values", "repeat", "memory_limit", "round"]
        )]
        plan: Option<std::path::PathBuf>,

        /// Invoke this many times before reading outputs.
        #[arg(long, default_value_t = 1)]
        repeat: usize,

        /// Cap on interpreter buffer memory (e.g. "64K", "4M").
        #[arg(long)]
        memory_limit: Option<String>,

        /// Emit one JSON document instead of tables.
        #[arg(long)]
        json: bool,

        /// Round float outputs to the nearest integer for display.
        #[arg(long)]
        round: bool,
    },

    /// Print a model's description, tensors, and ops.
    Inspect {
        /// Path to the model file.
        #[arg(short, long)]
        model: std::path::PathBuf,

        /// Emit one JSON document instead of tables.
        #[arg(long)]
        json: bool,
    },

    /// Time the invoke loop of a model.
    Bench {
        /// Path to the model file.
        #[arg(short, long)]
        model: std::path::PathBuf,

        /// Number of timed invocations (after one untimed warm-up).
        #[arg(short, long, default_value_t = 100)]
        iterations: usize,

        /// Cap on interpreter buffer memory (e.g. "64K", "4M").
        #[arg(long)]
        memory_limit: Option<String>,
    },

    /// Write a built-in sample model to disk.
    Demo {
        /// Which sample: "xor" or "logic-gates".
        sample: String,

        /// Destination path for the encoded model.
        #[arg(short, long, default_value = "model.tgrf")]
        output: std::path::PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            model,
            values,
            plan,
            repeat,
            memory_limit,
            json,
            round,
        } => commands::run::execute(model, values, plan, repeat, memory_limit, json, round),
        Commands::Inspect { model, json } => commands::inspect::execute(model, json),
        Commands::Bench {
            model,
            iterations,
            memory_limit,
        } => commands::bench::execute(model, iterations, memory_limit),
        Commands::Demo { sample, output } => commands::demo::execute(&sample, output),
    }
}
