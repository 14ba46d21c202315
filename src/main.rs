// Copyright (c) 2024 Mudit Bhargava
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

// main.rs
//
// This file contains the main entry point for the Tomasulo simulator.
// It provides a command-line interface that parses an assembly program,
// runs the cycle engine, and prints the per-instruction stage table, the
// final architectural state, and run statistics.

use clap::Parser;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use tomasulo_rust::engine::branch_predictor::BranchPredictorKind;
use tomasulo_rust::engine::simulator::{InstrRecord, SimStats, Simulator, TrapEvent};
use tomasulo_rust::utils::parser::parse_program;
use tomasulo_rust::TomasuloConfig;

#[derive(Parser)]
#[command(name = "tomasulo_rust")]
#[command(about = "A cycle-accurate Tomasulo out-of-order execution simulator")]
#[command(version)]
struct Cli {
    /// Input assembly file
    input: PathBuf,

    /// Reorder buffer size
    #[arg(long, default_value = "16")]
    rob_size: usize,

    /// Memory size in words
    #[arg(long, default_value = "1024")]
    memory_size: usize,

    /// Branch predictor (not-taken, one-bit, two-bit)
    #[arg(long, default_value = "not-taken")]
    predictor: String,

    /// Maximum cycles to simulate
    #[arg(long, default_value = "100000")]
    max_cycles: usize,

    /// Instructions committed per cycle
    #[arg(long, default_value = "1")]
    commit_width: usize,

    /// CDB broadcasts per cycle
    #[arg(long, default_value = "1")]
    cdb_width: usize,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Emit the run report as JSON
    #[arg(long)]
    json: bool,
}

/// Machine-readable run report for --json
#[derive(Serialize)]
struct RunReport<'a> {
    cycles: usize,
    finished: bool,
    trap: Option<TrapEvent>,
    instructions: &'a [InstrRecord],
    registers: Vec<(u8, i32)>,
    memory: Vec<(usize, i32)>,
    stats: SimStats,
}

fn stage_cell(value: Option<usize>) -> String {
    value.map_or_else(|| "-".to_string(), |c| c.to_string())
}

fn print_stage_table(records: &[InstrRecord]) {
    println!(
        "{}",
        format!(
            "{:<4} {:<24} {:>6} {:>11} {:>6} {:>7}  {}",
            "ID", "INSTRUCTION", "ISSUE", "EXECUTE", "WB", "COMMIT", "FLAGS"
        )
        .bold()
    );
    for record in records {
        let exec = match (record.stage.exec_start, record.stage.exec_end) {
            (Some(start), Some(end)) => format!("{}-{}", start, end),
            (Some(start), None) => format!("{}-", start),
            _ => "-".to_string(),
        };
        let mut flags = Vec::new();
        if record.speculative {
            flags.push("spec".to_string());
        }
        if record.squashed {
            flags.push("squashed".red().to_string());
        }
        if let Some(trap) = record.trap {
            flags.push(format!("trap: {}", trap).yellow().to_string());
        }
        println!(
            "{:<4} {:<24} {:>6} {:>11} {:>6} {:>7}  {}",
            record.id,
            record.instr.raw,
            stage_cell(record.stage.issue),
            exec,
            stage_cell(record.stage.writeback),
            stage_cell(record.stage.commit),
            flags.join(" ")
        );
    }
}

fn print_final_state(simulator: &Simulator) {
    println!("\n{}", "Final register values:".bold());
    let nonzero = simulator.registers().nonzero();
    if nonzero.is_empty() {
        println!("  (all registers zero)");
    }
    for (reg, value) in nonzero {
        println!("  R{:<2} = {}", reg, value);
    }

    let nonzero_mem = simulator.memory().nonzero();
    if !nonzero_mem.is_empty() {
        println!("\n{}", "Memory contents (nonzero words):".bold());
        for (addr, value) in nonzero_mem {
            println!("  [{}] = {}", addr, value);
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.log_level.as_str()),
    )
    .init();

    let source = match std::fs::read_to_string(&cli.input) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{} {}: {}", "error:".red().bold(), cli.input.display(), e);
            return ExitCode::FAILURE;
        },
    };

    let (program, parse_errors) = parse_program(&source);
    for error in &parse_errors {
        eprintln!("{} {}", "warning:".yellow().bold(), error);
    }
    if program.is_empty() {
        eprintln!("{} no valid instructions in {}", "error:".red().bold(), cli.input.display());
        return ExitCode::FAILURE;
    }

    let predictor = match cli.predictor.as_str() {
        "one-bit" => BranchPredictorKind::OneBit,
        "two-bit" => BranchPredictorKind::TwoBit,
        _ => BranchPredictorKind::StaticNotTaken,
    };

    let config = TomasuloConfig::new()
        .with_rob_size(cli.rob_size)
        .with_memory_size(cli.memory_size)
        .with_predictor(predictor)
        .with_commit_width(cli.commit_width)
        .with_cdb_width(cli.cdb_width)
        .with_max_cycles(cli.max_cycles);

    let mut simulator = Simulator::new(program, config);
    if let Err(e) = simulator.run() {
        eprintln!("{} {}", "error:".red().bold(), e);
        return ExitCode::FAILURE;
    }

    if cli.json {
        let report = RunReport {
            cycles: simulator.cycle_count(),
            finished: simulator.is_finished(),
            trap: simulator.trap(),
            instructions: simulator.records(),
            registers: simulator.registers().nonzero(),
            memory: simulator.memory().nonzero(),
            stats: simulator.stats(),
        };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{} failed to serialize report: {}", "error:".red().bold(), e);
                return ExitCode::FAILURE;
            },
        }
        return ExitCode::SUCCESS;
    }

    println!(
        "Simulation {} after {} cycles.\n",
        if simulator.is_finished() {
            "completed".green().to_string()
        } else {
            "stopped at cycle limit".yellow().to_string()
        },
        simulator.cycle_count()
    );

    print_stage_table(simulator.records());

    if let Some(event) = simulator.trap() {
        println!(
            "\n{} instruction {} trapped: {}",
            "TRAP:".red().bold(),
            event.instr_id,
            event.trap
        );
    }

    print_final_state(&simulator);

    println!("\n{}", simulator.stats());

    ExitCode::SUCCESS
}
