use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum Command {
    /// Run the daemon in the foreground.
    Run {
        /// The profile to start with
        #[clap(short, long)]
        profile: Option<PathBuf>,
        /// The directory holding config.yaml, profiles and the session socket
        #[clap(short, long)]
        workspace: Option<PathBuf>,
    },
    /// Build a profile and report whether it is valid.
    Check {
        /// The profile to check
        profile: PathBuf,
    },
}

/// Game controller input mapper with runtime interception for helper tools.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Turn debugging information on
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// The command to run
    #[clap(subcommand)]
    pub command: Command,
}
