//! Dataflow Export Demo
//!
//! Lowers a demo circuit into the structured dataflow module and checks the
//! wire codec round trip.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use qflow_demos::circuits::DemoCircuit;
use qflow_demos::{
    init_logging, print_block, print_header, print_result, print_section, print_success,
    print_warning,
};
use qflow_ir::DEFAULT_MAX_ITERATIONS;

#[derive(Parser, Debug)]
#[command(name = "demo-export")]
#[command(about = "Lower a dynamic circuit to a dataflow module")]
struct Args {
    /// Circuit to lower
    #[arg(short, long, value_enum, default_value = "feed-forward")]
    circuit: DemoCircuit,

    /// Name of the exported function
    #[arg(long, default_value = "main")]
    name: String,

    /// Write the module as JSON to this file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    print_header("Dataflow Export Demo");

    let circuit = args
        .circuit
        .build(DEFAULT_MAX_ITERATIONS)
        .context("failed to build circuit")?;

    print_section("Circuit");
    print_result("Behaviour", args.circuit.description());
    print_block(&circuit.to_string());

    print_section("Dataflow module");
    let module = qflow_export::to_dataflow(&circuit, &args.name)?;
    print_result("Values", module.num_values());
    if let Some(entry) = module.entry() {
        print_result("Operations", entry.body.num_operations());
    }
    print_block(&module.to_string());

    if let Some(path) = &args.json {
        module
            .write_json(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        print_result("JSON written to", path.display());
    }

    print_section("Wire codec");
    match qflow_codec::encode(&circuit) {
        Ok(bytes) => {
            let decoded = qflow_codec::decode(&bytes)?;
            print_result("Encoded bytes", bytes.len());
            print_result("Round trip equal", decoded == circuit);
        }
        Err(e) => print_warning(&format!("Not representable on the wire: {e}")),
    }

    println!();
    print_success("Export demo complete!");
    Ok(())
}
