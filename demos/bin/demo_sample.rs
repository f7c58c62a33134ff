//! Dynamic Circuit Sampling Demo
//!
//! Runs one of the demo circuits shot by shot and prints the distribution
//! of measurement records and emitted outputs.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use qflow_demos::circuits::DemoCircuit;
use qflow_demos::{
    bit_string, create_progress_bar, init_logging, print_block, print_header, print_result,
    print_section, print_success, print_warning,
};
use qflow_exec::{DynamicSampler, SamplerConfig};
use qflow_ir::DEFAULT_MAX_ITERATIONS;

#[derive(Parser, Debug)]
#[command(name = "demo-sample")]
#[command(about = "Sample a dynamic circuit shot by shot")]
struct Args {
    /// Circuit to run
    #[arg(short, long, value_enum, default_value = "repeat-until-success")]
    circuit: DemoCircuit,

    /// Number of shots (overrides the configuration)
    #[arg(short, long)]
    shots: Option<u64>,

    /// Base seed (overrides the configuration)
    #[arg(long)]
    seed: Option<u64>,

    /// Loop iteration budget
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: u32,

    /// YAML sampler configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the circuit tree
    #[arg(long)]
    show_circuit: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    print_header("Dynamic Circuit Sampling Demo");

    let mut config =
        SamplerConfig::load(args.config.as_deref()).context("failed to load sampler config")?;
    if let Some(shots) = args.shots {
        config.shots = shots;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;

    let circuit = args
        .circuit
        .build(args.max_iterations)
        .context("failed to build circuit")?;

    print_section("Setup");
    print_result("Circuit", format!("{:?}", args.circuit));
    print_result("Behaviour", args.circuit.description());
    print_result("Qubits", circuit.qubits().len());
    print_result("Nodes", circuit.len());
    print_result("Static", circuit.is_static());
    print_result("Shots", config.shots);
    print_result(
        "Seed",
        config
            .seed
            .map_or_else(|| "entropy".to_string(), |s| s.to_string()),
    );
    if args.show_circuit {
        print_section("Circuit");
        print_block(&circuit.to_string());
    }

    print_section("Sampling");
    let sampler = DynamicSampler::from_config(circuit, &config);
    let pb = create_progress_bar(config.shots, "shots");
    let mut records: BTreeMap<String, u64> = BTreeMap::new();
    let mut outputs: BTreeMap<String, u64> = BTreeMap::new();
    let mut record_lengths = 0usize;
    for shot in 0..config.shots {
        let state = sampler
            .run_shot(shot)
            .with_context(|| format!("shot {shot} failed"))?;
        record_lengths += state.record().len();
        *records.entry(bit_string(state.record())).or_default() += 1;
        if !state.outputs().is_empty() {
            *outputs.entry(bit_string(state.outputs())).or_default() += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    print_section("Measurement records");
    for (record, count) in records.iter().rev().take(10) {
        print_result(record, count);
    }
    if records.len() > 10 {
        print_warning(&format!("{} more distinct records", records.len() - 10));
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = record_lengths as f64 / config.shots as f64;
    print_result("Mean record length", format!("{mean:.2}"));

    if !outputs.is_empty() {
        print_section("Emitted outputs");
        for (bits, count) in &outputs {
            print_result(bits, count);
        }
    }

    println!();
    print_success("Sampling demo complete!");
    Ok(())
}
