// Development automation for famicore
//
// Run as `cargo run -p xtask -- <command>`; the `ci` command chains the
// checks the way the pipeline runs them.

use std::process::Command;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for famicore")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build, test)
    Ci,
    /// Quick checks before commit (fmt, clippy)
    Check,
    /// Format code
    Fmt {
        /// Verify formatting without changing files
        #[arg(long)]
        check: bool,
    },
    /// Run the test suite
    Test,
    /// Run the criterion benchmarks
    Bench,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci => {
            run("rustfmt", &["fmt", "--all", "--", "--check"])?;
            run("clippy", &["clippy", "--all-targets", "--", "-D", "warnings"])?;
            run("build", &["build", "--all-targets"])?;
            run("test", &["test"])?;
            println!("{}", "all CI checks passed".green().bold());
        }
        Commands::Check => {
            run("rustfmt", &["fmt", "--all", "--", "--check"])?;
            run("clippy", &["clippy", "--all-targets", "--", "-D", "warnings"])?;
        }
        Commands::Fmt { check } => {
            if check {
                run("rustfmt", &["fmt", "--all", "--", "--check"])?;
            } else {
                run("rustfmt", &["fmt", "--all"])?;
            }
        }
        Commands::Test => run("test", &["test"])?,
        Commands::Bench => run("bench", &["bench"])?,
    }

    Ok(())
}

/// Run one cargo invocation, timing it and failing loudly
fn run(label: &str, args: &[&str]) -> Result<()> {
    println!("{} {}", "running".cyan().bold(), label);
    let started = Instant::now();

    let status = Command::new("cargo").args(args).status()?;
    let elapsed = started.elapsed();

    if !status.success() {
        bail!("{} failed after {:.1?}", label, elapsed);
    }
    println!("{} {} in {:.1?}", "done".green(), label, elapsed);
    Ok(())
}
