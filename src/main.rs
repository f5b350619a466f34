//! Acorn - CLI

use std::path::PathBuf;

use acorn::util::config::{load_project_config, CompilerConfig};
use acorn::util::logger::{self, LogLevel};
use acorn::{compile, NAME, VERSION};
use anyhow::{bail, Context, Result};
use clap::Parser;

/// Translate Oak programs to C and build them
#[derive(Parser, Debug)]
#[command(name = "acorn")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    /// Oak source files
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Output executable
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Only write the generated C
    #[arg(long)]
    emit_c: bool,

    /// Skip the file naming and comment density checks
    #[arg(long)]
    no_constraints: bool,

    /// Write a dump when a file fails to translate
    #[arg(long)]
    dump: bool,

    /// C compiler to use
    #[arg(long, value_name = "CC")]
    cc: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

impl Args {
    /// Layer the command line over the project configuration
    fn apply(
        &self,
        mut config: CompilerConfig,
    ) -> CompilerConfig {
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(cc) = &self.cc {
            config.c_compiler = cc.clone();
        }
        config.emit_only |= self.emit_c;
        config.dump_on_error |= self.dump;
        if self.no_constraints {
            config.style_checks = false;
        }
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_with_level(LogLevel::from_flags(args.verbose, args.debug));

    if args.files.is_empty() {
        bail!("no input files");
    }

    let project = load_project_config(&std::env::current_dir()?).context("Failed to load acorn.toml")?;
    let config = args.apply(project);

    let output = compile(&config, &args.files)?;
    if args.verbose {
        eprintln!("{} {}: wrote {}", NAME, VERSION, output.c_path.display());
        if let Some(binary) = &output.binary {
            eprintln!("built {}", binary.display());
        }
        eprintln!("{} warnings", output.warnings);
    }
    Ok(())
}
