// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The host shell: a command-line front end over [`lumen_vm`], grounded on
//! `nova_cli`'s `Cli`/`Command` derive shape but trimmed to the two
//! subcommands this core actually needs. `cliclack`/`console`/`ctrlc` are
//! intentionally not carried over — those support full-ECMAScript colored,
//! multi-line REPL editing, disproportionate for a line-at-a-time shell
//! around a didactic interpreter.

use std::fs;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "lumen")]
#[command(about = "An embeddable tree-walking interpreter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Runs a script file.
    Run {
        /// Path to the `.lum` source file.
        path: String,
    },
    /// Starts an interactive read-eval-print loop.
    Repl,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Run { path } => run_file(&path),
        Command::Repl => repl(),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run_file(path: &str) -> Result<(), String> {
    let source = fs::read_to_string(path).map_err(|e| format!("cannot read '{path}': {e}"))?;
    log::debug!("running {path} ({} bytes)", source.len());
    lumen_vm::run(path, &source, lumen_stdlib::register).map_err(|e| e.to_string())
}

/// One line at a time: each line is interpreted as a standalone program
/// against a fresh [`Interpreter`], since the core has no notion of
/// incremental top-level state across separate `run` invocations.
fn repl() -> Result<(), String> {
    println!("lumen repl — one statement per line, Ctrl-D to exit");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush().map_err(|e| e.to_string())?;
        let mut line = String::new();
        let bytes_read = stdin.lock().read_line(&mut line).map_err(|e| e.to_string())?;
        if bytes_read == 0 {
            println!();
            return Ok(());
        }
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if let Err(err) = lumen_vm::run("<repl>", line, lumen_stdlib::register) {
            eprintln!("{err}");
        }
    }
}

