use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use ahash::AHashMap;
use colored::Colorize;
use crossbeam_channel::{unbounded, Sender};
use padbind_engine::{DeviceControl, HapticEffect};

use crate::command::Command;
use crate::events::{ControllerEvent, EventReceiver};
use crate::mapping::rumble_for;
use crate::types::{ControllerId, ControllerInfo};
use crate::{Error, Result};

/// Delay between attempts to restart a failed backend.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Shared state used by the manager, the runtime loop and controller handles.
pub(crate) struct Inner {
    pub subscribers: Mutex<Vec<Sender<ControllerEvent>>>,
    pub controllers_info: RwLock<AHashMap<ControllerId, ControllerInfo>>,
    pub cmd_tx: Sender<Command>,
    pub gyro_enabled: AtomicBool,
}

impl Inner {
    fn new(cmd_tx: Sender<Command>) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            controllers_info: RwLock::new(AHashMap::new()),
            cmd_tx,
            gyro_enabled: AtomicBool::new(false),
        }
    }

    pub fn send(&self, command: Command) -> Result<()> {
        self.cmd_tx
            .send(command)
            .map_err(|e| Error::Backend(format!("{e}")))
    }

    /// Sends `event` to every live subscriber, dropping closed ones.
    pub fn broadcast(&self, event: ControllerEvent) {
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    fn subscribe(&self) -> EventReceiver {
        let (tx, rx) = unbounded();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }
}

/// Manager responsible for discovering controllers and emitting events.
pub struct ControllerManager {
    pub(crate) inner: Arc<Inner>,
}

impl ControllerManager {
    /// Creates a new manager, subscribes the caller and starts the background
    /// runtime thread. Blocks briefly until the backend either enumerated
    /// devices or failed (up to 1s).
    #[cfg(feature = "sdl2-backend")]
    pub fn new() -> Result<(Self, EventReceiver)> {
        let (cmd_tx, cmd_rx) = unbounded::<Command>();
        let inner = Arc::new(Inner::new(cmd_tx));
        let events = inner.subscribe();

        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        crate::runtime::start_runtime_thread(Arc::clone(&inner), cmd_rx, ready_tx)?;

        // Best-effort wait for the initial enumeration. Time out if backend fails.
        let _ = ready_rx.recv_timeout(Duration::from_secs(1));

        Ok((Self { inner }, events))
    }

    #[cfg(not(feature = "sdl2-backend"))]
    pub fn new() -> Result<(Self, EventReceiver)> {
        Err(Error::Unsupported)
    }

    /// A manager whose commands are returned instead of executed.
    #[cfg(test)]
    pub(crate) fn detached() -> (Self, crossbeam_channel::Receiver<Command>) {
        let (cmd_tx, cmd_rx) = unbounded::<Command>();
        (
            Self {
                inner: Arc::new(Inner::new(cmd_tx)),
            },
            cmd_rx,
        )
    }

    /// Subscribes to controller events. Dropped subscribers are cleaned automatically.
    pub fn subscribe(&self) -> EventReceiver {
        self.inner.subscribe()
    }

    /// Returns a snapshot of currently known controllers.
    pub fn controllers(&self) -> Vec<ControllerInfo> {
        if let Ok(map) = self.inner.controllers_info.read() {
            return map.values().cloned().collect();
        }
        Vec::new()
    }

    /// Plays a haptic pulse on every connected controller.
    pub fn haptic(&self, effect: &HapticEffect) -> Result<()> {
        let (low, high, ms) = rumble_for(effect);
        self.inner.send(Command::Rumble {
            low,
            high,
            ms,
        })
    }

    /// Turns gyro reports on or off for current and future controllers.
    pub fn set_gyro(&self, enabled: bool) -> Result<()> {
        self.inner.gyro_enabled.store(enabled, Ordering::Release);
        self.inner.send(Command::SyncGyro)
    }

    pub fn gyro_enabled(&self) -> bool {
        self.inner.gyro_enabled.load(Ordering::Acquire)
    }

    /// Stops the runtime thread. Further commands fail.
    pub fn shutdown(&self) {
        let _ = self.inner.cmd_tx.send(Command::Shutdown);
    }
}

impl DeviceControl for ControllerManager {
    fn set_gyro_enabled(&self, enabled: bool) {
        if let Err(e) = self.set_gyro(enabled) {
            padbind_engine::print_warning!("Cannot switch gyro: {e}");
        }
    }
}

impl Drop for ControllerManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use padbind_engine::HapticPosition;

    use super::*;

    #[test]
    fn gyro_switch_syncs_runtime() {
        let (manager, commands) = ControllerManager::detached();
        manager.set_gyro_enabled(true);

        assert!(manager.gyro_enabled());
        assert_eq!(commands.try_recv(), Ok(Command::SyncGyro));
    }

    #[test]
    fn haptic_rumbles_every_controller() {
        let (manager, commands) = ControllerManager::detached();
        let effect = HapticEffect {
            position: HapticPosition::Left,
            ..HapticEffect::default()
        };
        manager.haptic(&effect).unwrap();

        match commands.try_recv().unwrap() {
            Command::Rumble { low, high, .. } => {
                assert!(low > 0);
                assert_eq!(high, 0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn starts_without_controllers() {
        let (manager, _commands) = ControllerManager::detached();
        assert!(manager.controllers().is_empty());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let (manager, _commands) = ControllerManager::detached();
        let kept = manager.subscribe();
        drop(manager.subscribe());

        manager.inner.broadcast(ControllerEvent::BackendReady);
        assert!(matches!(kept.try_recv(), Ok(ControllerEvent::BackendReady)));
        assert_eq!(manager.inner.subscribers.lock().unwrap().len(), 1);
    }
}
