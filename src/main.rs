// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use tripclip::{cli, commands, db, utils};

fn main() -> Result<()> {
    utils::init_tracing();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    if let Some(sub) = commands::budget::snapshot_request(&matches) {
        return commands::budget::snapshot_summary(sub);
    }

    let path = db::resolve_db_path(matches.get_one::<String>("db").map(String::as_str))?;
    let mut conn = db::open_or_init(&path)?;
    let store = db::SqliteStore::new(&path);

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", path.display());
        }
        Some(("trip", sub)) => commands::trips::handle(&conn, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, &store, sub)?,
        Some(("budget", sub)) => commands::budget::handle(&conn, &store, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&conn, &store, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
