// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

use cashlog::{cli, commands, db};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CASHLOG_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(matches: &clap::ArgMatches) -> Result<()> {
    let db_override = matches.get_one::<PathBuf>("db").map(PathBuf::as_path);
    let conn = db::open_or_init(db_override)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path(db_override)?.display());
        }
        Some(("transaction", sub)) => commands::transactions::handle(&conn, sub)?,
        Some(("todo", sub)) => commands::todos::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let matches = cli::build_cli().get_matches();

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "command failed");
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
