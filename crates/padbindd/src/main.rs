mod cli;
mod logging;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use crossbeam_channel::unbounded;
use padbind_engine::{print_error, print_info, Action};
use padbind_profile::{load_profile, BuildOptions};

use crate::cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if logging::setup(cli.verbose, cli.no_color).is_err() {
        return ExitCode::FAILURE;
    }

    match cli.command {
        Command::Run { profile, workspace } => run(padbindd::RunOptions { workspace, profile }),
        Command::Check { profile } => check(&profile),
    }
}

fn run(options: padbindd::RunOptions) -> ExitCode {
    // Handle Ctrl+C to exit cleanly
    let (stop_tx, stop_rx) = unbounded::<()>();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    }) {
        print_error!("failed to set Ctrl+C handler: {e}");
        return ExitCode::FAILURE;
    }

    match padbindd::run(options, &stop_rx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn check(path: &Path) -> ExitCode {
    match load_profile(path, &BuildOptions::default()) {
        Ok(profile) => {
            print_info!(
                "{} is valid: {} bindings, {} menus{}",
                path.display(),
                profile.roots().filter(|(_, node)| !node.is_noop()).count(),
                profile.menus().count(),
                if profile.requires_gyro() { ", uses gyro" } else { "" }
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_error!("{}: {e}", path.display());
            ExitCode::FAILURE
        }
    }
}
