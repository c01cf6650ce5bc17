// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn kind_arg(required: bool) -> Arg {
    Arg::new("kind")
        .long("kind")
        .value_parser(["income", "expense"])
        .ignore_case(true)
        .required(required)
}

pub fn build_cli() -> Command {
    Command::new("ledge")
        .about("Track income and expenses and see monthly summaries")
        .version(clap::crate_version!())
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .help("Directory holding ledge.sqlite and flags.json"),
        )
        .arg(
            Arg::new("with-samples")
                .long("with-samples")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Seed sample transactions on first run"),
        )
        .subcommand(Command::new("init").about("Seed default categories if not done yet"))
        .subcommand(
            Command::new("reset")
                .about("Delete every transaction and category; the next run reseeds")
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .help("Confirm the reset"),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").required(true))
                        .arg(kind_arg(true)),
                )
                .subcommand(json_args(Command::new("list").arg(kind_arg(false)))),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and list transactions")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(kind_arg(true))
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .help("YYYY-MM-DD, defaults to today"),
                        )
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(kind_arg(false))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Monthly summaries")
                .subcommand(json_args(
                    Command::new("months").about("Income, expense and net for every month"),
                ))
                .subcommand(json_args(
                    Command::new("month")
                        .about("Summary, entries and category totals for one month")
                        .arg(Arg::new("month").required(true).help("YYYY-MM")),
                ))
                .subcommand(json_args(
                    Command::new("cached").about("Rows of the materialized summary table"),
                )),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .value_parser(["csv", "json"])
                            .default_value("csv"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(Command::new("doctor").about("Check stored data for inconsistencies"))
}
