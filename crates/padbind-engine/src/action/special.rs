use std::path::PathBuf;
use std::time::Duration;

use parking_lot::Mutex;

use super::{Action, ActionRef, Context};
use crate::output::{MenuKind, MenuRequest, Output};
use crate::types::{Button, Source, STICK_PAD_MAX};

pub const DEFAULT_OSD_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MENU_POSITION: (i32, i32) = (10, -10);
const DEFAULT_CONFIRM: &str = "A";
const DEFAULT_CANCEL: &str = "B";
/// Stick distance from center that opens a menu bound to the stick.
const MIN_STICK_DISTANCE: f64 = STICK_PAD_MAX as f64 / 3.0;

/// Runs a shell command on press.
#[derive(Debug)]
pub struct ShellAction {
    command: String,
}

impl ShellAction {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Action for ShellAction {
    fn button_press(&self, ctx: &mut Context<'_>) {
        ctx.emit(Output::Shell(self.command.clone()));
    }
}

#[derive(Debug, Default)]
struct MenuState {
    stick_distance: f64,
    pad_open: bool,
}

/// Opens a menu through the OSD helper.
#[derive(Debug)]
pub struct MenuAction {
    menu: String,
    kind: MenuKind,
    control_with: Source,
    confirm_with: String,
    cancel_with: String,
    position: (i32, i32),
    show_with_release: bool,
    state: Mutex<MenuState>,
}

impl MenuAction {
    pub fn new(menu: impl Into<String>) -> Self {
        Self {
            menu: menu.into(),
            kind: MenuKind::List,
            control_with: Source::Stick,
            confirm_with: DEFAULT_CONFIRM.to_string(),
            cancel_with: DEFAULT_CANCEL.to_string(),
            position: DEFAULT_MENU_POSITION,
            show_with_release: false,
            state: Mutex::new(MenuState::default()),
        }
    }

    pub fn kind(mut self, kind: MenuKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn control_with(mut self, source: Source) -> Self {
        self.control_with = source;
        self
    }

    pub fn confirm_with(mut self, button: impl Into<String>) -> Self {
        self.confirm_with = button.into();
        self
    }

    pub fn cancel_with(mut self, button: impl Into<String>) -> Self {
        self.cancel_with = button.into();
        self
    }

    pub fn position(mut self, x: i32, y: i32) -> Self {
        self.position = (x, y);
        self
    }

    pub fn show_with_release(mut self, value: bool) -> Self {
        self.show_with_release = value;
        self
    }

    pub fn menu(&self) -> &str {
        &self.menu
    }

    fn request(&self) -> MenuRequest {
        MenuRequest {
            menu: self.menu.clone(),
            kind: self.kind,
            control_with: self.control_with,
            confirm_with: self.confirm_with.clone(),
            cancel_with: self.cancel_with.clone(),
            position: self.position,
            use_cursor: false,
        }
    }
}

impl Action for MenuAction {
    fn button_press(&self, ctx: &mut Context<'_>) {
        if !self.show_with_release {
            ctx.emit(Output::Menu(self.request()));
        }
    }

    fn button_release(&self, ctx: &mut Context<'_>) {
        if self.show_with_release {
            ctx.emit(Output::Menu(self.request()));
        }
    }

    fn whole(&self, ctx: &mut Context<'_>, x: i32, y: i32, source: Source) {
        let mut state = self.state.lock();
        match (source.click_button(), source.touch_button()) {
            (Some(click), Some(touch)) => {
                if (x, y) == (0, 0) {
                    state.pad_open = false;
                    return;
                }
                if state.pad_open || ctx.was_pressed(touch) {
                    return;
                }
                state.pad_open = true;
                ctx.emit(Output::Menu(MenuRequest {
                    control_with: source,
                    confirm_with: click.name().to_string(),
                    cancel_with: touch.name().to_string(),
                    use_cursor: true,
                    ..self.request()
                }));
            }
            _ if source == Source::Stick => {
                let distance = f64::from(x).hypot(f64::from(y));
                if state.stick_distance < MIN_STICK_DISTANCE && distance > MIN_STICK_DISTANCE {
                    ctx.emit(Output::Menu(MenuRequest {
                        control_with: Source::Stick,
                        confirm_with: Button::StickPress.name().to_string(),
                        cancel_with: Source::Stick.name().to_string(),
                        use_cursor: true,
                        ..self.request()
                    }));
                }
                state.stick_distance = distance;
            }
            _ => {}
        }
    }
}

/// Shows a message, optionally forwarding everything to a wrapped action.
#[derive(Debug)]
pub struct OsdAction {
    text: String,
    timeout: Duration,
    child: Option<ActionRef>,
}

impl OsdAction {
    pub fn new(text: impl Into<String>, timeout: Duration, child: Option<ActionRef>) -> Self {
        Self {
            text: text.into(),
            timeout,
            child,
        }
    }
}

impl Action for OsdAction {
    fn trigger(&self, ctx: &mut Context<'_>, position: u8, old_position: u8) {
        if let Some(child) = &self.child {
            child.trigger(ctx, position, old_position);
        }
    }

    fn button_press(&self, ctx: &mut Context<'_>) {
        ctx.emit(Output::Osd {
            text: self.text.clone(),
            timeout: self.timeout,
        });
        if let Some(child) = &self.child {
            child.button_press(ctx);
        }
    }

    fn button_release(&self, ctx: &mut Context<'_>) {
        if let Some(child) = &self.child {
            child.button_release(ctx);
        }
    }

    fn whole(&self, ctx: &mut Context<'_>, x: i32, y: i32, source: Source) {
        if let Some(child) = &self.child {
            child.whole(ctx, x, y, source);
        }
    }

    fn gyro(&self, ctx: &mut Context<'_>, pitch: f64, yaw: f64, roll: f64) {
        if let Some(child) = &self.child {
            child.gyro(ctx, pitch, yaw, roll);
        }
    }

    fn tick(&self, ctx: &mut Context<'_>) {
        if let Some(child) = &self.child {
            child.tick(ctx);
        }
    }
}

/// Shows the on-screen keyboard on release.
#[derive(Debug, Default)]
pub struct KeyboardAction;

impl Action for KeyboardAction {
    fn button_release(&self, ctx: &mut Context<'_>) {
        ctx.emit(Output::Keyboard);
    }
}

/// Switches to another profile on release.
#[derive(Debug)]
pub struct ChangeProfileAction {
    path: PathBuf,
}

impl ChangeProfileAction {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Action for ChangeProfileAction {
    fn button_release(&self, ctx: &mut Context<'_>) {
        ctx.emit(Output::ChangeProfile(self.path.clone()));
    }
}

/// Powers the controller off on release.
#[derive(Debug, Default)]
pub struct TurnOffAction;

impl Action for TurnOffAction {
    fn button_release(&self, ctx: &mut Context<'_>) {
        ctx.emit(Output::TurnOff);
    }
}
