//! The padbind daemon: reads controllers, dispatches their input through the
//! active profile and serves control sessions on a Unix socket.

pub mod daemon;
pub mod protocol;
pub mod runner;
pub mod server;
pub mod state;

#[cfg(test)]
mod testing;

pub use daemon::{run, DaemonError, RunOptions};
