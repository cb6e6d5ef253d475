use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use crossbeam_channel::Sender;
use padbind_engine::{print_debug, print_info, print_warning, Runtime, SessionHandle, SessionId};
use padbind_profile::{DaemonConfig, WorkspaceError};
use parking_lot::{Mutex, RwLock};

use crate::protocol::{self, Role};

/// State shared by the poll loop, the action runner and every session.
pub struct DaemonState {
    runtime: Arc<Runtime>,
    config_path: Option<PathBuf>,
    config: RwLock<DaemonConfig>,
    /// Why the controller backend is not usable, if it is not.
    error: RwLock<Option<String>>,
    osd: Mutex<Option<SessionHandle>>,
    autoswitch: Mutex<Option<SessionHandle>>,
}

impl DaemonState {
    pub fn new(runtime: Arc<Runtime>, config: DaemonConfig, config_path: Option<PathBuf>) -> Self {
        runtime.set_sniffing(config.enable_sniffing);
        Self {
            runtime,
            config_path,
            config: RwLock::new(config),
            error: RwLock::new(None),
            osd: Mutex::new(None),
            autoswitch: Mutex::new(None),
        }
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    /// Greet a new session on `tx` and register it. Status changes cannot
    /// slip between the greeting and the registration.
    pub fn connect(&self, tx: Sender<String>) -> SessionHandle {
        let error = self.error.read();
        let profile = self.runtime.profile();
        for line in protocol::greeting(profile.path(), error.as_deref()) {
            let _ = tx.send(line);
        }
        self.runtime.connect(tx)
    }

    pub fn shell(&self) -> String {
        self.config.read().shell.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.error.read().clone()
    }

    /// Record the backend status and tell every session when it changes.
    pub fn set_error(&self, error: Option<String>) {
        let mut current = self.error.write();
        if *current == error {
            return;
        }
        *current = error;
        self.runtime
            .broadcast(&protocol::status_line(current.as_deref()));
    }

    /// Re-read `config.yaml`, then tell every session.
    pub fn reconfigure(&self) -> Result<(), WorkspaceError> {
        if let Some(path) = &self.config_path {
            let config = DaemonConfig::load(path)?;
            self.runtime.set_sniffing(config.enable_sniffing);
            *self.config.write() = config;
            print_info!("Configuration reloaded");
        }
        self.runtime.broadcast(protocol::RECONFIGURED);
        Ok(())
    }

    pub fn register(&self, role: Role, handle: SessionHandle) {
        let slot = match role {
            Role::Osd => &self.osd,
            Role::Autoswitch => &self.autoswitch,
        };
        print_info!("Session {} registered as {role:?} helper", handle.id());
        *slot.lock() = Some(handle);
    }

    pub fn has_osd(&self) -> bool {
        self.osd.lock().is_some()
    }

    /// Drop helper registrations held by `session`.
    pub fn forget(&self, session: SessionId) {
        for (role, slot) in [(Role::Osd, &self.osd), (Role::Autoswitch, &self.autoswitch)] {
            let mut slot = slot.lock();
            if slot.as_ref().is_some_and(|handle| handle.id() == session) {
                print_info!("{role:?} helper lost");
                *slot = None;
            }
        }
    }

    /// Forward a request to the OSD helper. Returns `false` when there is
    /// none or it went away.
    pub fn show_osd<S: AsRef<str>>(&self, args: &[S]) -> bool {
        let mut osd = self.osd.lock();
        let Some(handle) = osd.as_ref() else {
            print_warning!("{}", protocol::NO_OSD_DAEMON);
            return false;
        };
        let line = protocol::osd_line(args);
        print_debug!("-> osd: {line}");
        if !handle.send(line) {
            print_warning!("Failed to display OSD: helper disconnected");
            *osd = None;
            return false;
        }
        true
    }
}
