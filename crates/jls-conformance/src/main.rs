//! jls-image-tester: check every reference image below a directory

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use jls_conformance::{Codec, ConsoleReporter, Harness, HarnessConfig, IdentityCodec};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Engine {
    /// Stored samples, checks the harness itself
    Identity,
    /// The CharLS library
    #[cfg(feature = "charls")]
    Charls,
}

impl Default for Engine {
    fn default() -> Self {
        #[cfg(feature = "charls")]
        return Engine::Charls;
        #[cfg(not(feature = "charls"))]
        return Engine::Identity;
    }
}

impl Engine {
    fn codec(self) -> Box<dyn Codec> {
        match self {
            Engine::Identity => Box::new(IdentityCodec),
            #[cfg(feature = "charls")]
            Engine::Charls => Box::new(jls_conformance::CharlsCodec),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "jls-image-tester")]
#[command(about = "Encode, decode and compare every PGM/PPM reference below a directory")]
struct Args {
    /// Directory to scan recursively
    directory: PathBuf,

    /// Codec engine under test
    #[arg(long, value_enum, default_value_t = Engine::default())]
    engine: Engine,

    /// JSON harness configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Near-lossless bound handed to the encoder (overrides the config file)
    #[arg(long)]
    near_lossless: Option<i32>,

    /// Do not write encoded .jls streams next to the references
    #[arg(long)]
    no_write: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            println!("usage: jls-image-tester <directory-to-test>");
            return ExitCode::FAILURE;
        }
        Err(e) => e.exit(),
    };

    let codec = args.engine.codec();
    let outcome = run(&args, codec.as_ref());
    if let Err(e) = &outcome {
        println!("Unexpected failure: {e:#}");
    }
    ExitCode::from(exit_status(&outcome))
}

/// Process status of a run: zero only when every reference passed
fn exit_status(outcome: &Result<bool>) -> u8 {
    match outcome {
        Ok(true) => 0,
        Ok(false) | Err(_) => 1,
    }
}

fn run(args: &Args, codec: &dyn Codec) -> Result<bool> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::from_path(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(near_lossless) = args.near_lossless {
        config = config.with_near_lossless(near_lossless);
    }
    if args.no_write {
        config = config.with_write_encoded(false);
    }

    log::info!("testing engine {} with {:?}", codec.name(), config);

    let mut reporter = ConsoleReporter;
    let mut harness = Harness::new(codec, &config, &mut reporter);
    let summary = harness
        .run_directory(&args.directory)
        .with_context(|| format!("checking {}", args.directory.display()))?;

    Ok(summary.passed())
}
