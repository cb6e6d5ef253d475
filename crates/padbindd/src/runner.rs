use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

use colored::Colorize;
use padbind_control::Performer;
#[cfg(all(feature = "virtual-pad", target_os = "linux"))]
use padbind_control::VirtualPad;
use padbind_engine::{
    is_file_menu, print_debug, print_error, print_info, print_warning, MenuRequest, Output,
};
use padbind_gamepad::ControllerManager;

use crate::protocol::{self, MenuSource};
use crate::state::DaemonState;

/// Executes engine outputs on the host.
pub struct ActionRunner {
    keypress: Option<Performer>,
    #[cfg(all(feature = "virtual-pad", target_os = "linux"))]
    pad: Option<VirtualPad>,
    manager: Arc<ControllerManager>,
    state: Arc<DaemonState>,
    profiles_dir: PathBuf,
    menus_dir: PathBuf,
}

impl ActionRunner {
    /// `profiles_dir` resolves relative profile names used by `profile`
    /// actions, `menus_dir` the menu files opened by `menu` actions.
    pub fn new(
        state: Arc<DaemonState>,
        manager: Arc<ControllerManager>,
        profiles_dir: &Path,
        menus_dir: &Path,
    ) -> Self {
        let keypress = match Performer::new() {
            Ok(performer) => Some(performer),
            Err(e) => {
                print_error!("Keyboard and mouse output disabled: {e}");
                None
            }
        };
        #[cfg(all(feature = "virtual-pad", target_os = "linux"))]
        let pad = match VirtualPad::new() {
            Ok(pad) => Some(pad),
            Err(e) => {
                print_error!("Virtual gamepad disabled: {e}");
                None
            }
        };

        Self {
            keypress,
            #[cfg(all(feature = "virtual-pad", target_os = "linux"))]
            pad,
            manager,
            state,
            profiles_dir: profiles_dir.to_owned(),
            menus_dir: menus_dir.to_owned(),
        }
    }

    pub fn run(&mut self, output: Output) {
        match output {
            Output::KeyPress(combo) => self.with_keypress(|k| k.press(&combo)),
            Output::KeyRelease(combo) => self.with_keypress(|k| k.release(&combo)),
            Output::MousePress(button) => self.with_keypress(|k| k.mouse_press(button)),
            Output::MouseRelease(button) => self.with_keypress(|k| k.mouse_release(button)),
            Output::MouseMove { dx, dy } => self.with_keypress(|k| k.mouse_move(dx, dy)),
            Output::Scroll { h, v } => self.with_keypress(|k| {
                if h != 0 {
                    k.scroll_x(h)?;
                }
                if v != 0 {
                    k.scroll_y(v)?;
                }
                Ok(())
            }),
            Output::Axis { axis, value } => self.set_axis(axis, value),
            Output::Haptic(effect) => {
                if let Err(e) = self.manager.haptic(&effect) {
                    print_debug!("Haptic feedback failed: {e}");
                }
            }
            Output::Shell(command) => self.run_shell(&command),
            Output::Menu(request) => self.show_menu(&request),
            Output::Osd { text, timeout } => {
                self.state
                    .show_osd(&protocol::osd_message(&text, Some(timeout)));
            }
            Output::Keyboard => {
                self.state.show_osd(&["keyboard"]);
            }
            Output::ChangeProfile(path) => self.change_profile(&path),
            Output::TurnOff => {
                print_warning!("Controller power-off is not supported by the controller backend");
            }
        }
    }

    fn with_keypress<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Performer) -> enigo::InputResult<()>,
    {
        let Some(keypress) = self.keypress.as_mut() else {
            return;
        };
        if let Err(e) = f(keypress) {
            print_warning!("Input synthesis failed: {e}");
        }
    }

    #[cfg(all(feature = "virtual-pad", target_os = "linux"))]
    fn set_axis(&mut self, axis: padbind_control::Axis, value: i32) {
        let Some(pad) = self.pad.as_mut() else {
            return;
        };
        if let Err(e) = pad.set_axis(axis, value) {
            print_warning!("Virtual gamepad write failed: {e}");
        }
    }

    #[cfg(not(all(feature = "virtual-pad", target_os = "linux")))]
    fn set_axis(&mut self, axis: padbind_control::Axis, value: i32) {
        print_debug!("axis {axis:?} = {value} dropped: built without virtual-pad");
    }

    /// Return every virtual gamepad axis to rest.
    #[cfg(all(feature = "virtual-pad", target_os = "linux"))]
    pub fn reset_axes(&mut self) {
        if let Some(pad) = self.pad.as_mut() {
            if let Err(e) = pad.reset() {
                print_warning!("Virtual gamepad reset failed: {e}");
            }
        }
    }

    #[cfg(not(all(feature = "virtual-pad", target_os = "linux")))]
    pub fn reset_axes(&mut self) {}

    fn show_menu(&self, request: &MenuRequest) {
        if !is_file_menu(&request.menu) {
            let profile = self.state.runtime().profile();
            self.state
                .show_osd(&protocol::osd_menu(request, MenuSource::Profile(profile.path())));
            return;
        }
        let Some(path) = find_menu_file(&self.menus_dir, &request.menu) else {
            print_error!("Cannot show menu: menu {} not found", request.menu);
            return;
        };
        self.state
            .show_osd(&protocol::osd_menu(request, MenuSource::File(&path)));
    }

    /// Run `command` through the configured shell without waiting for it.
    fn run_shell(&self, command: &str) {
        let shell = self.state.shell();
        print_debug!("Executing `{command}` with {shell}");
        let spawned = Command::new(&shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                print_error!("Failed to run `{command}`: {e}");
                return;
            }
        };
        // Reap the child so it does not linger as a zombie.
        let reaper = thread::Builder::new()
            .name("padbindd-shell".into())
            .spawn(move || match child.wait() {
                Ok(status) if !status.success() => {
                    print_debug!("Shell command exited with {status}");
                }
                Ok(_) => {}
                Err(e) => { print_warning!("Failed to wait for shell command: {e}"); }
            });
        if let Err(e) = reaper {
            print_warning!("Cannot watch shell command: {e}");
        }
    }

    /// Load a profile off the poll thread. A failed load keeps the active
    /// profile.
    fn change_profile(&self, path: &Path) {
        let path = resolve_profile(&self.profiles_dir, path);
        let runtime = Arc::clone(self.state.runtime());
        let spawned = thread::Builder::new()
            .name("padbindd-profile-loader".into())
            .spawn(move || match runtime.load_profile(&path) {
                Ok(()) => { print_info!("Loaded profile {}", path.display()); }
                Err(e) => { print_error!("{e}"); }
            });
        if let Err(e) = spawned {
            print_error!("Cannot start profile loader: {e}");
        }
    }
}

/// Relative names are looked up in `dir`; a missing extension means `.yaml`.
pub(crate) fn resolve_profile(dir: &Path, name: &Path) -> PathBuf {
    let mut path = if name.is_absolute() {
        name.to_owned()
    } else {
        dir.join(name)
    };
    if path.extension().is_none() {
        path.set_extension("yaml");
    }
    path
}

/// Menu file `name` in `dir`, if it exists.
pub(crate) fn find_menu_file(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = dir.join(name);
    path.is_file().then_some(path)
}
