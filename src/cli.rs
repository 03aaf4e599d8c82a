// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, builder::PossibleValuesParser, crate_version, value_parser};
use std::path::PathBuf;

use crate::utils::{parse_amount, parse_datetime, parse_id, parse_month, parse_year};

const DATE_HELP: &str = "format: YYYY-MM-DD HH:MM:SS";

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print rows as a pretty JSON array"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    ]
}

fn month_arg() -> Arg {
    Arg::new("month")
        .short('m')
        .long("month")
        .value_parser(parse_month)
        .help("Month, 1-12")
}

fn year_arg() -> Arg {
    Arg::new("year")
        .short('y')
        .long("year")
        .value_parser(parse_year)
        .help("Year, defaults to the current year")
}

fn id_arg() -> Arg {
    Arg::new("id")
        .short('i')
        .long("id")
        .required(true)
        .value_parser(parse_id)
        .help("Todo id")
}

fn status_values() -> PossibleValuesParser {
    PossibleValuesParser::new(["todo", "doing", "done"])
}

fn transaction_cmd() -> Command {
    Command::new("transaction")
        .about("Record and query income and expenses")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("add")
                .about("Record a transaction")
                .arg(
                    Arg::new("amount")
                        .short('a')
                        .long("amount")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(parse_amount)
                        .help("Positive for income, negative for expense"),
                )
                .arg(
                    Arg::new("category")
                        .short('c')
                        .long("category")
                        .required(true),
                )
                .arg(
                    Arg::new("tags")
                        .short('t')
                        .long("tags")
                        .help("Comma separated tags"),
                )
                .arg(Arg::new("remark").short('r').long("remark"))
                .arg(
                    Arg::new("time")
                        .short('T')
                        .long("time")
                        .value_parser(parse_datetime)
                        .help(format!("Transaction time, defaults to now ({})", DATE_HELP)),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List transactions, newest first")
                .arg(month_arg())
                .arg(year_arg())
                .arg(Arg::new("category").short('c').long("category"))
                .arg(
                    Arg::new("tags")
                        .short('t')
                        .long("tags")
                        .help("Match transactions whose tags contain this text"),
                )
                .arg(
                    Arg::new("type")
                        .short('k')
                        .long("type")
                        .value_parser(PossibleValuesParser::new(["income", "expense"])),
                )
                .args(json_args()),
        )
        .subcommand(
            Command::new("summary")
                .about("Monthly income/expense report")
                .arg(month_arg().help("Month, 1-12, defaults to the current month"))
                .arg(year_arg())
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .default_value("text")
                        .value_parser(PossibleValuesParser::new(["text", "markdown", "json"])),
                ),
        )
}

fn todo_cmd() -> Command {
    Command::new("todo")
        .about("Track tasks")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("add")
                .about("Add a todo")
                .arg(
                    Arg::new("content")
                        .short('c')
                        .long("content")
                        .required(true),
                )
                .arg(
                    Arg::new("category")
                        .short('g')
                        .long("category")
                        .default_value("default"),
                )
                .arg(Arg::new("tags").short('t').long("tags"))
                .arg(
                    Arg::new("deadline")
                        .short('d')
                        .long("deadline")
                        .value_parser(parse_datetime)
                        .help(DATE_HELP),
                ),
        )
        .subcommand(
            Command::new("update")
                .about("Change the status of a todo")
                .arg(id_arg())
                .arg(
                    Arg::new("status")
                        .short('s')
                        .long("status")
                        .required(true)
                        .value_parser(status_values()),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List todos, newest first")
                .arg(
                    Arg::new("status")
                        .short('s')
                        .long("status")
                        .value_parser(status_values()),
                )
                .arg(Arg::new("category").short('g').long("category"))
                .arg(
                    Arg::new("deadline-before")
                        .short('b')
                        .long("deadline-before")
                        .value_parser(parse_datetime)
                        .help(format!("Only todos due on or before this time ({})", DATE_HELP)),
                )
                .args(json_args()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a todo")
                .arg(id_arg()),
        )
}

pub fn build_cli() -> Command {
    Command::new("cashlog")
        .version(crate_version!())
        .about("Lightweight local ledger and todo tracker")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("CASHLOG_DB")
                .value_parser(value_parser!(PathBuf))
                .help("Database file, defaults to ~/.cashlog/cashlog.db"),
        )
        .subcommand(Command::new("init").about("Create the database if missing"))
        .subcommand(transaction_cmd())
        .subcommand(todo_cmd())
}
