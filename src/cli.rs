// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    )
}

fn trip_arg() -> Arg {
    Arg::new("trip")
        .long("trip")
        .required(true)
        .help("Trip id")
}

pub fn build_cli() -> Command {
    Command::new("tripclip")
        .version(crate_version!())
        .about("Trip planning records and budget reconciliation")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("SQLite database path (overrides TRIPCLIP_DB)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("trip")
                .about("Manage trips")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("start").long("start").help("YYYY-MM-DD"))
                        .arg(Arg::new("end").long("end").help("YYYY-MM-DD"))
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .default_value("USD"),
                        ),
                )
                .subcommand(json_flags(Command::new("list"))),
        )
        .subcommand(
            Command::new("import")
                .about("Import records")
                .subcommand(
                    Command::new("trip")
                        .about("Load a trip snapshot (JSON) into the database")
                        .arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export records")
                .subcommand(
                    Command::new("budget")
                        .about("Write the itemized budget summary to a file")
                        .arg(trip_arg())
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv|json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Trip budget")
                .subcommand(json_flags(
                    Command::new("summary")
                        .about("Reconciled estimated and actual spend")
                        .arg(trip_arg())
                        .arg(
                            Arg::new("snapshot")
                                .long("snapshot")
                                .help("Read records from a JSON snapshot instead of the database"),
                        ),
                ))
                .subcommand(
                    Command::new("add")
                        .about("Add a manual budget line")
                        .arg(trip_arg())
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("description").long("description").required(true))
                        .arg(Arg::new("estimated").long("estimated"))
                        .arg(Arg::new("actual").long("actual"))
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD")),
                )
                .subcommand(
                    Command::new("allocate")
                        .about("Set the spending ceiling for a category")
                        .arg(trip_arg())
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("categories")
                        .about("Allocation vs estimated spend per category")
                        .arg(trip_arg()),
                )),
        )
        .subcommand(
            Command::new("doctor")
                .about("Report data that the budget would silently ignore")
                .arg(trip_arg()),
        )
}
