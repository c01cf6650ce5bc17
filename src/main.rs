// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};

use ledge::config::Config;
use ledge::flags::FileFlagStore;
use ledge::lifecycle::{Lifecycle, LifecycleState, SeedPlan};
use ledge::repository::SqliteRepository;
use ledge::{cli, commands, db, utils};

fn main() -> Result<()> {
    utils::init_tracing();
    let matches = cli::build_cli().get_matches();
    let config = Config::from_matches(&matches)?;

    let conn = db::open_or_init(&config.db_path())?;
    let flags = FileFlagStore::new(config.flags_path());
    let state = LifecycleState::read(&flags).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read init flag, treating store as uninitialized");
        LifecycleState::Uninitialized
    });
    let plan = if config.seed_samples {
        SeedPlan::default().with_samples()
    } else {
        SeedPlan::default()
    };
    let mut lifecycle = Lifecycle::new(SqliteRepository::new(conn), flags, plan, state);

    // reset must not be followed by a reseed in the same run
    if let Some(("reset", sub)) = matches.subcommand() {
        if !sub.get_flag("yes") {
            bail!("Refusing to reset without --yes");
        }
        lifecycle.reset()?;
        println!("Database has been reset; it will be reseeded on next run.");
        return Ok(());
    }

    lifecycle.seed();

    match matches.subcommand() {
        Some(("init", _)) => {
            let state = match lifecycle.state() {
                LifecycleState::Seeded => "seeded",
                LifecycleState::Uninitialized => "not seeded (see log)",
            };
            println!("Database at {} is {}", config.db_path().display(), state);
        }
        Some(("category", sub)) => commands::categories::handle(lifecycle.repo_mut(), sub)?,
        Some(("tx", sub)) => commands::transactions::handle(lifecycle.repo_mut(), sub)?,
        Some(("report", sub)) => commands::reports::handle(lifecycle.repo(), sub)?,
        Some(("export", sub)) => commands::exporter::handle(lifecycle.repo(), sub)?,
        Some(("doctor", _)) => commands::doctor::handle(lifecycle.repo())?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
