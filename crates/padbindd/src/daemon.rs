use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::Colorize;
use crossbeam_channel::{select, tick, Receiver};
use padbind_engine::{
    print_debug, print_error, print_info, print_warning, DeviceControl, Dispatcher, Profile,
    Runtime,
};
use padbind_gamepad::{ControllerEvent, ControllerManager};
use padbind_profile::{
    load_profile, BuildOptions, ProfileEvent, ProfileEventReceiver, Workspace, WorkspaceError,
    YamlLoader,
};
use thiserror::Error;

use crate::runner::ActionRunner;
use crate::server::{ServerError, SessionServer};
use crate::state::DaemonState;

/// Poll period for timers and deferred tasks.
const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Error type for daemon startup.
#[derive(Error, Debug)]
pub enum DaemonError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    #[error("failed to start controller manager: {0}")]
    Controller(#[from] padbind_gamepad::Error),
    #[error(transparent)]
    Server(#[from] ServerError),
}

#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    /// Workspace directory; `$PADBIND_HOME` or `~/.config/padbind` if unset.
    pub workspace: Option<PathBuf>,
    /// Profile to start with; the workspace `profile.yaml` if unset.
    pub profile: Option<PathBuf>,
}

/// Run the daemon until `stop_rx` fires.
pub fn run(options: RunOptions, stop_rx: &Receiver<()>) -> Result<(), DaemonError> {
    let workspace = Workspace::new(options.workspace.as_deref())?;
    let config = workspace.config()?;
    let build_options = config.build_options();
    let profile_path = options.profile.unwrap_or_else(|| workspace.profile_path());

    let profile = match load_profile(&profile_path, &build_options) {
        Ok(profile) => profile,
        Err(e) => {
            print_warning!("Failed to load profile {}: {e}", profile_path.display());
            print_warning!("Starting with no mappings");
            Profile::empty(&profile_path)
        }
    };

    let (manager, controller_rx) = ControllerManager::new()?;
    let manager = Arc::new(manager);
    let device: Arc<dyn DeviceControl> = Arc::clone(&manager) as Arc<dyn DeviceControl>;
    let runtime = Arc::new(Runtime::new(
        profile,
        device,
        Box::new(YamlLoader::new(build_options)),
    ));
    let state = Arc::new(DaemonState::new(
        Arc::clone(&runtime),
        config,
        Some(workspace.config_path()),
    ));
    let server = SessionServer::start(&workspace.socket_path(), Arc::clone(&state))?;

    let mut event_loop = EventLoop {
        dispatcher: Dispatcher::new(Arc::clone(&runtime)),
        runner: ActionRunner::new(
            Arc::clone(&state),
            Arc::clone(&manager),
            workspace.path(),
            &workspace.menus_path(),
        ),
        state: Arc::clone(&state),
        manager: Arc::clone(&manager),
    };
    let mut watched = profile_path;
    let mut watch = watch_profile(&workspace, &watched, build_options);
    let ticker = tick(TICK_INTERVAL);

    print_info!("padbindd started. Profile: {}", watched.display());
    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(controller_rx) -> msg => match msg {
                Ok(event) => event_loop.on_controller(event),
                Err(e) => {
                    print_error!("Controller event channel closed: {e}");
                    break;
                }
            },
            recv(ticker) -> _ => {
                event_loop.on_tick(Instant::now());

                if let Some((_, events)) = &watch {
                    while let Ok(event) = events.try_recv() {
                        event_loop.on_profile(event);
                    }
                }
                // Follow profiles activated by sessions or `profile` actions.
                let active = runtime.profile();
                if active.path() != watched {
                    watched = active.path().to_owned();
                    watch = watch_profile(&workspace, &watched, build_options);
                }
            }
        }
    }

    event_loop.release();
    runtime.shutdown();
    manager.shutdown();
    drop(server);
    print_info!("padbindd stopped");
    Ok(())
}

fn watch_profile(
    workspace: &Workspace,
    path: &Path,
    options: BuildOptions,
) -> Option<(impl Sized, ProfileEventReceiver)> {
    match workspace.start_profile_watcher(path, options) {
        Ok(watch) => {
            print_debug!("Watching {}", path.display());
            Some(watch)
        }
        Err(e) => {
            print_warning!("Cannot watch {}: {e}", path.display());
            None
        }
    }
}

struct EventLoop {
    dispatcher: Dispatcher,
    runner: ActionRunner,
    state: Arc<DaemonState>,
    manager: Arc<ControllerManager>,
}

impl EventLoop {
    fn on_controller(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::BackendReady => self.state.set_error(None),
            ControllerEvent::BackendFailed(reason) => {
                self.release();
                self.state.set_error(Some(reason));
            }
            ControllerEvent::Connected(info) => {
                print_info!(
                    "Controller connected: {} ({:04x}:{:04x})",
                    info.name,
                    info.vendor_id,
                    info.product_id
                );
                self.state.set_error(None);
            }
            ControllerEvent::Disconnected(id) => {
                print_info!("Controller {id} disconnected");
                self.release();
                if self.manager.controllers().is_empty() {
                    print_debug!("No controller connected");
                }
            }
            ControllerEvent::Input { event, .. } => {
                let runner = &mut self.runner;
                self.dispatcher
                    .handle(event, Instant::now(), &mut |output| runner.run(output));
            }
        }
    }

    fn on_tick(&mut self, now: Instant) {
        let runner = &mut self.runner;
        self.dispatcher.tick(now, &mut |output| runner.run(output));
    }

    fn on_profile(&mut self, event: ProfileEvent) {
        match event {
            ProfileEvent::Changed(profile) => self.state.runtime().swap_profile(profile),
            ProfileEvent::Removed => {
                print_warning!("Profile file removed, keeping the loaded profile");
            }
            ProfileEvent::Error(e) => { print_error!("Failed to reload profile: {e}"); }
        }
    }

    /// Release every key, mouse button and axis held for the controller.
    fn release(&mut self) {
        let runner = &mut self.runner;
        self.dispatcher
            .release_virtual_buttons(&mut |output| runner.run(output));
        self.runner.reset_axes();
    }
}
