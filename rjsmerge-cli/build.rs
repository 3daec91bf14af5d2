//! Build script for rjsmerge-cli.
//!
//! Generates the man page at build time using clap_mangen and places it in
//! OUT_DIR for inclusion in release builds.
//!
//! The command structure is rebuilt here rather than imported, since build
//! scripts cannot depend on the crate being built.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// Keep this synchronized with src/cli.rs.
fn build_cli() -> Command {
    Command::new("rjsmerge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Merge module-loader build configuration fragments")
        .long_about(
            "Merge the partial module-loader configurations shipped by frontend packages \
             into the single build file the optimizer consumes",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .subcommands(vec![
            Command::new("merge")
                .about("Merge fragment files into one build file")
                .long_about("Merge fragments by precedence and write the ({...}) build file"),
            Command::new("conflicts")
                .about("Show the overrides and warnings a merge produces")
                .long_about("Merge fragments and print the diagnostic log as a table, JSON, CSV or TSV"),
            Command::new("validate")
                .about("Check that fragment files are well formed")
                .long_about("Parse and validate each fragment file without writing a document"),
            Command::new("modules")
                .about("Generate a modules fragment from a bundle layout and request log")
                .long_about("Turn a bundle layout and captured module requests into the optimizer modules list"),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() -> io::Result<()> {
    let out_dir = PathBuf::from(
        std::env::var_os("OUT_DIR").ok_or_else(|| io::Error::other("OUT_DIR is not set"))?,
    );
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let mut buffer = Vec::new();
    Man::new(build_cli()).render(&mut buffer)?;
    fs::write(man_dir.join("rjsmerge.1"), buffer)?;

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
    Ok(())
}
