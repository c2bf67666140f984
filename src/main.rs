// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use bbox_phy::{Error, PlacementSpec, PortList, Result, Technology};
use clap::Parser;
use log::info;

/// Generate pin, strap and blockage geometry for a black-boxed macro.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Technology description (tech.json).
    #[arg(long)]
    tech: PathBuf,

    /// Port list of the macro, as JSON.
    #[arg(long)]
    ports: PathBuf,

    /// Placement specification in TOML or JSON. May be given more than
    /// once; later files override earlier ones.
    #[arg(long = "spec")]
    specs: Vec<PathBuf>,

    /// Scale every coordinate of the produced view by this factor.
    #[arg(long)]
    scale: Option<f64>,

    /// Where to write the view. Defaults to standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn run(args: &Args) -> Result<()> {
    let tech = Technology::load(&args.tech)?;
    let ports = PortList::load(&args.ports)?;
    let spec = args
        .specs
        .iter()
        .try_fold(PlacementSpec::builder(), |builder, path| builder.file(path))?
        .build()?;

    let mut view = bbox_phy::generate(&tech, &ports, &spec)?;
    if let Some(factor) = args.scale {
        view = view.scaled(factor)?;
    }

    let json = view.to_json()?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).map_err(|e| Error::io(path, e))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
