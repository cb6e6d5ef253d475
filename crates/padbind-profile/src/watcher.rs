use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use notify::{Config, Error as NotifyError, RecursiveMode, Watcher};
use notify_debouncer_mini::{
    new_debouncer_opt, DebounceEventResult, DebouncedEventKind, Debouncer,
};
use padbind_engine::Profile;
use thiserror::Error;

use crate::{load_profile, BuildOptions, ProfileError};

const DEBOUNCE_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("notify error: {0}")]
    Notify(#[from] NotifyError),
    #[error("parse error: {0}")]
    Parse(#[from] ProfileError),
}

/// Rebuilds the watched profile whenever its file changes.
pub struct ProfileWatcher<W: Watcher> {
    #[allow(dead_code)]
    watcher: Debouncer<W>,
}

pub enum ProfileEvent {
    Changed(Profile),
    Removed,
    Error(WatcherError),
}

type ProfileEventSender = mpsc::Sender<ProfileEvent>;
pub type ProfileEventReceiver = mpsc::Receiver<ProfileEvent>;

fn send_profile_event(path: &Path, options: &BuildOptions, tx: &ProfileEventSender) {
    let event = match load_profile(path, options) {
        Ok(profile) => ProfileEvent::Changed(profile),
        Err(e) => ProfileEvent::Error(WatcherError::Parse(e)),
    };
    let _ = tx.send(event);
}

impl<W: Watcher> ProfileWatcher<W> {
    pub fn new_with_sender(
        path: &Path,
        options: BuildOptions,
        tx: ProfileEventSender,
    ) -> Result<Self, WatcherError> {
        let path_c = path.to_owned();

        let debouncer_config = notify_debouncer_mini::Config::default()
            .with_timeout(DEBOUNCE_TIMEOUT)
            .with_notify_config(Config::default());
        let mut debouncer = new_debouncer_opt::<_, W>(
            debouncer_config,
            move |events: DebounceEventResult| match events {
                Ok(events) => {
                    let touched = events.iter().any(|event| {
                        matches!(
                            event.kind,
                            DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous
                        )
                    });
                    if !touched {
                        return;
                    }
                    if path_c.exists() {
                        send_profile_event(&path_c, &options, &tx);
                    } else {
                        let _ = tx.send(ProfileEvent::Removed);
                    }
                }
                Err(error) => {
                    let _ = tx.send(ProfileEvent::Error(WatcherError::Notify(error)));
                }
            },
        )?;

        debouncer
            .watcher()
            .watch(path, RecursiveMode::NonRecursive)?;

        Ok(Self { watcher: debouncer })
    }

    pub fn new(
        path: &Path,
        options: BuildOptions,
    ) -> Result<(Self, ProfileEventReceiver), WatcherError> {
        let (tx, rx) = mpsc::channel();

        Ok((Self::new_with_sender(path, options, tx)?, rx))
    }

    /// Like [`ProfileWatcher::new`], with the current content queued first.
    pub fn new_with_starting_event(
        path: &Path,
        options: BuildOptions,
    ) -> Result<(Self, ProfileEventReceiver), WatcherError> {
        let (tx, rx) = mpsc::channel();

        send_profile_event(path, &options, &tx);
        Ok((Self::new_with_sender(path, options, tx)?, rx))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use padbind_engine::Source;

    use super::*;

    #[test]
    fn starting_event_carries_built_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.yaml");
        fs::write(&path, "version: 1\nbindings:\n  A: { button: space }\n").unwrap();

        let (_watcher, rx) = ProfileWatcher::<notify::PollWatcher>::new_with_starting_event(
            &path,
            BuildOptions::default(),
        )
        .unwrap();

        match rx.recv_timeout(Duration::from_secs(1)).unwrap() {
            ProfileEvent::Changed(profile) => {
                assert_eq!(profile.path(), path);
                assert!(!profile.resolve(Source::A).is_noop());
            }
            _ => panic!("expected a built profile"),
        }
    }

    #[test]
    fn starting_event_reports_build_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.yaml");
        fs::write(&path, "version: 9\n").unwrap();

        let (_watcher, rx) = ProfileWatcher::<notify::PollWatcher>::new_with_starting_event(
            &path,
            BuildOptions::default(),
        )
        .unwrap();

        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            ProfileEvent::Error(WatcherError::Parse(ProfileError::UnsupportedVersion(9)))
        ));
    }
}
