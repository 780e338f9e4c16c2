// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//!
//! Build driver for the ESP8266 flash map builder.
//!
use anyhow::{Context, Result};
use clap::Parser;
use duct::cmd;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "efmb",
    version = "0.1.0",
    about = "xtask build tool for the ESP8266 flash map builder"
)]
struct Xtask {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
enum Command {
    /// Builds the flash map builder.
    Build {
        #[clap(flatten)]
        profile: BuildProfile,
        #[clap(flatten)]
        locked: Locked,
        #[clap(flatten)]
        verbose: Verbose,
    },
    /// Runs `cargo clean`
    Clean,
    /// Runs `cargo clippy` linter
    Clippy {
        #[clap(flatten)]
        locked: Locked,
    },
    /// Generates linker scripts, FlashMap.h and boards.txt
    Gen {
        #[clap(long, default_value = "etc/esp8266.flash.json5")]
        config: PathBuf,
        #[clap(long, default_value = "out")]
        out: PathBuf,
        #[clap(flatten)]
        profile: BuildProfile,
        #[clap(flatten)]
        locked: Locked,
        #[clap(flatten)]
        verbose: Verbose,
    },
    /// Writes the JSON schema of the configuration to out/efmb.schema.json
    Schema,
    /// Runs unit tests
    Test {
        #[clap(flatten)]
        profile: BuildProfile,
        #[clap(flatten)]
        locked: Locked,
        #[clap(flatten)]
        verbose: Verbose,
    },
}

/// BuildProfile defines whether we build in release or
/// debug mode.
#[derive(Default, Parser)]
struct BuildProfile {
    /// Build debug version (default)
    #[clap(long, conflicts_with_all = &["release"])]
    debug: bool,

    /// Build optimized version
    #[clap(long, conflicts_with_all = &["debug"])]
    release: bool,
}

#[derive(Parser, Default)]
struct Locked {
    /// Builds locked to Cargo.lock
    #[clap(long)]
    locked: bool,
}

#[derive(Parser, Default)]
struct Verbose {
    /// Compiles with the `--verbose` option
    #[clap(long)]
    verbose: bool,
}

/// Build arguments
#[derive(Debug, Default)]
struct Build {
    release: bool,
    locked: bool,
    verbose: bool,
}

impl Build {
    fn new(profile: BuildProfile, locked: Locked, verbose: Verbose) -> Build {
        Build {
            release: profile.release,
            locked: locked.locked,
            verbose: verbose.verbose,
        }
    }
    fn cmd_str(&self, verb: &str) -> String {
        format!(
            "{verb} {locked} {verbose} {profile}",
            locked = if self.locked { "--locked" } else { "" },
            verbose = if self.verbose { "--verbose" } else { "" },
            profile = if self.release { "--release" } else { "" },
        )
    }
}

fn main() -> Result<()> {
    let xtask = Xtask::parse();
    match xtask.cmd {
        Command::Build { profile, locked, verbose } => {
            build(Build::new(profile, locked, verbose))
        }
        Command::Clippy { locked } => clippy(Build::new(
            BuildProfile::default(),
            locked,
            Verbose::default(),
        )),
        Command::Clean => clean(),
        Command::Gen { config, out, profile, locked, verbose } => {
            run_gen(&config, &out, Build::new(profile, locked, verbose))
        }
        Command::Schema => schema(),
        Command::Test { profile, locked, verbose } => {
            tests(Build::new(profile, locked, verbose))
        }
    }
}

fn build(args: Build) -> Result<()> {
    cmd(cargo(), args.cmd_str("build").split_whitespace())
        .run()
        .context("build failed")?;
    Ok(())
}

fn run_gen(config: &Path, out: &Path, args: Build) -> Result<()> {
    let run = args.cmd_str("run");
    let config = config.to_string_lossy();
    let out = out.to_string_lossy();
    let mut args = run.split_whitespace().collect::<Vec<_>>();
    args.extend(["--", "generate", "-v"]);
    args.extend(["-c", &config]);
    args.extend(["-o", &out]);
    cmd(cargo(), args).run().context("generate failed")?;
    Ok(())
}

/// Generates a JSON schema for our config.
fn schema() -> Result<()> {
    std::fs::create_dir_all("out").context("could not create out/")?;
    let out = std::fs::File::create("out/efmb.schema.json")
        .context("could not create schema file")?;
    cmd(cargo(), ["run", "--manifest-path", "efmb-schema/Cargo.toml", "--"])
        .stdout_file(out)
        .run()
        .context("schema generation failed")?;
    Ok(())
}

/// Runs unit tests, then generates every artifact once.
fn tests(args: Build) -> Result<()> {
    cmd(cargo(), args.cmd_str("test --workspace").split_whitespace())
        .run()
        .context("tests failed")?;
    run_gen(
        Path::new("etc/esp8266.flash.json5"),
        Path::new("target/test-out"),
        Build::default(),
    )
}

/// Runs the Clippy linter.
fn clippy(args: Build) -> Result<()> {
    cmd(cargo(), args.cmd_str("clippy --workspace").split_whitespace())
        .run()
        .context("clippy failed")?;
    Ok(())
}

/// Runs clean on the project.
fn clean() -> Result<()> {
    cmd!(cargo(), "clean").run().context("clean failed")?;
    Ok(())
}

/// Returns the value of the given environment variable,
/// or the default if unspecified.
fn env_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or(default.into())
}

/// Returns the name of the cargo binary.
fn cargo() -> String {
    env_or("CARGO", "cargo")
}
