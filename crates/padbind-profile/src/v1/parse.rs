use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use ahash::AHashSet;
use padbind_control::{Axis, KeyCombo, MouseButton};
use padbind_engine::action::{
    AxesAction, AxisAction, ButtonAction, ChangeProfileAction, GyroAxesAction, KeyboardAction,
    MenuAction, MouseAction, MouseMode, NoAction, OsdAction, ShellAction, Target, TurnOffAction,
};
use padbind_engine::modifier::{
    BallModifier, ClickModifier, DeadzoneModifier, DoubleclickModifier, FeedbackModifier,
    HoldModifier, ModeModifier, RotateModifier, SensitivityModifier, DEFAULT_FRICTION,
    DEFAULT_TIMEOUT,
};
use padbind_engine::{
    is_file_menu, ActionRef, Button, HapticEffect, HapticPosition, Menu, MenuItem, MenuKind,
    Profile, Source,
};
use smallvec::SmallVec;

use super::profile::{
    ActionV1, BallV1, FeedbackV1, MenuItemV1, MenuV1, ModeV1, OsdV1, ProfileV1,
};
use super::Error;
use crate::BuildOptions;

impl ProfileV1 {
    /// Build the engine trees for every binding. Nothing is returned unless
    /// every binding and menu builds.
    pub fn build(&self, path: &Path, options: &BuildOptions) -> Result<Profile, Error> {
        let builder = TreeBuilder {
            menus: self.menus.keys().map(String::as_str).collect(),
            options,
        };

        let mut profile = Profile::builder(path);

        for (name, desc) in &self.bindings {
            let source = parse_source(name)?;
            let node = builder
                .node(desc)
                .map_err(|e| Error::Binding(source.name().to_string(), Box::new(e)))?;
            profile = profile.bind(source, node);
        }

        if let Some(gyro) = &self.gyro {
            let node = builder
                .node(gyro)
                .map_err(|e| Error::Binding("gyro".to_string(), Box::new(e)))?;
            profile = profile.gyro(node);
        }

        for (id, items) in &self.menus {
            if is_file_menu(id) {
                return Err(Error::DottedMenuId(id.clone()));
            }
            let menu = builder
                .menu(id, items)
                .map_err(|e| Error::Binding(format!("menu {id}"), Box::new(e)))?;
            profile = profile.menu(menu);
        }

        Ok(profile.build())
    }
}

/// Build a stand-alone menu file. `id` is the name selections use for it.
pub fn build_menu_file(id: &str, items: &[MenuItemV1], options: &BuildOptions) -> Result<Menu, Error> {
    let builder = TreeBuilder {
        menus: AHashSet::new(),
        options,
    };
    builder.menu(id, items)
}

struct TreeBuilder<'a> {
    menus: AHashSet<&'a str>,
    options: &'a BuildOptions,
}

impl TreeBuilder<'_> {
    fn menu(&self, id: &str, items: &[MenuItemV1]) -> Result<Menu, Error> {
        let mut seen = AHashSet::new();
        let mut built = Vec::with_capacity(items.len());
        for item in items {
            if !seen.insert(item.id.as_str()) {
                return Err(Error::DuplicateMenuItem(item.id.clone()));
            }
            built.push(MenuItem {
                id: item.id.clone(),
                label: item.label.clone().unwrap_or_else(|| item.id.clone()),
                action: self.node(&item.action)?,
            });
        }
        Ok(Menu {
            id: id.to_string(),
            items: built,
        })
    }

    fn node(&self, desc: &ActionV1) -> Result<ActionRef, Error> {
        self.wrapped(desc).map_err(|e| match &desc.name {
            Some(name) => Error::Named {
                name: name.clone(),
                source: Box::new(e),
            },
            None => e,
        })
    }

    fn wrapped(&self, desc: &ActionV1) -> Result<ActionRef, Error> {
        let mut node: ActionRef = match self.leaf(desc)? {
            Some(leaf) => leaf,
            None => Arc::new(NoAction),
        };

        if let Some(osd) = &desc.osd {
            let (text, timeout) = match osd {
                OsdV1::Text(text) => (text.clone(), self.options.osd_timeout),
                OsdV1::Full(options) => (
                    options.text.clone(),
                    match options.timeout {
                        Some(seconds) => seconds_value("osd.timeout", seconds)?,
                        None => self.options.osd_timeout,
                    },
                ),
            };
            let child = (!node.is_noop()).then_some(node);
            node = Arc::new(OsdAction::new(text, timeout, child));
        }

        if let Some(modes) = &desc.modes {
            node = self.modes(modes, node)?;
        }

        let timeout = match desc.time {
            Some(_) if desc.doubleclick.is_none() && desc.hold.is_none() => {
                return Err(Error::InvalidValue {
                    key: "time",
                    reason: "requires doubleclick or hold".to_string(),
                })
            }
            Some(seconds) => seconds_value("time", seconds)?,
            None => DEFAULT_TIMEOUT,
        };
        if let Some(double) = &desc.doubleclick {
            node = Arc::new(DoubleclickModifier::new(node, self.node(double)?, timeout));
        }
        if let Some(hold) = &desc.hold {
            node = Arc::new(HoldModifier::new(node, self.node(hold)?, timeout));
        }

        if let Some(feedback) = &desc.feedback {
            node = Arc::new(FeedbackModifier::new(node, parse_feedback(feedback)?));
        }
        if let Some(factors) = &desc.sensitivity {
            if factors.is_empty() || factors.len() > 3 {
                return Err(Error::InvalidValue {
                    key: "sensitivity",
                    reason: format!("expected 1 to 3 factors, got {}", factors.len()),
                });
            }
            node = Arc::new(SensitivityModifier::new(node, factors));
        }
        if let Some(angle) = desc.rotate {
            if !angle.is_finite() {
                return Err(Error::InvalidValue {
                    key: "rotate",
                    reason: format!("{angle} is not an angle"),
                });
            }
            node = Arc::new(RotateModifier::new(node, angle));
        }
        match desc.ball {
            Some(BallV1::Enabled(true)) => {
                node = Arc::new(BallModifier::new(node, DEFAULT_FRICTION));
            }
            Some(BallV1::Friction(friction)) => {
                if !(friction.is_finite() && friction > 0.0) {
                    return Err(Error::InvalidValue {
                        key: "ball",
                        reason: format!("friction must be positive, got {friction}"),
                    });
                }
                node = Arc::new(BallModifier::new(node, friction));
            }
            Some(BallV1::Enabled(false)) | None => {}
        }
        if let Some(values) = &desc.deadzone {
            let (lower, upper) = match values.as_slice() {
                [lower] => (*lower, None),
                [lower, upper] if lower < upper => (*lower, Some(*upper)),
                _ => {
                    return Err(Error::InvalidValue {
                        key: "deadzone",
                        reason: format!("expected [lower] or [lower, upper], got {values:?}"),
                    })
                }
            };
            node = Arc::new(DeadzoneModifier::new(node, lower, upper));
        }
        if desc.click == Some(true) {
            node = Arc::new(ClickModifier::new(node));
        }

        Ok(node)
    }

    /// The single action key of a node, if any.
    fn leaf(&self, desc: &ActionV1) -> Result<Option<ActionRef>, Error> {
        let keys = action_keys(desc);
        if keys.len() > 1 {
            return Err(Error::MultipleActions(keys.join(", ")));
        }
        if desc.threshold.is_some() && desc.button.is_none() {
            return Err(Error::InvalidValue {
                key: "threshold",
                reason: "requires button".to_string(),
            });
        }
        if desc.position.is_some() && desc.menu.is_none() {
            return Err(Error::InvalidValue {
                key: "position",
                reason: "requires menu".to_string(),
            });
        }

        let Some(&key) = keys.first() else {
            return Ok(None);
        };

        let node: ActionRef = match key {
            "button" => {
                let target = parse_target(desc.button.as_deref().unwrap_or_default())?;
                match desc.threshold {
                    Some(threshold) => Arc::new(ButtonAction::with_threshold(target, threshold)),
                    None => Arc::new(ButtonAction::new(target)),
                }
            }
            "axis" => {
                let axis = parse_axis(desc.axis.as_deref().unwrap_or_default())?;
                Arc::new(AxisAction::new(axis))
            }
            "axes" => match desc.axes.as_deref().unwrap_or_default() {
                [x, y] => Arc::new(AxesAction::new(parse_axis(x)?, parse_axis(y)?)),
                other => {
                    return Err(Error::InvalidValue {
                        key: "axes",
                        reason: format!("expected two axes, got {}", other.len()),
                    })
                }
            },
            "mouse" => {
                let raw = desc.mouse.as_deref().unwrap_or_default();
                let mode = match raw.trim().to_ascii_lowercase().as_str() {
                    "pointer" | "mouse" => MouseMode::Pointer,
                    "wheel" | "scroll" => MouseMode::Wheel,
                    _ => return Err(Error::InvalidMouseMode(raw.to_string())),
                };
                Arc::new(MouseAction::new(mode))
            }
            "gyro" => {
                let raw = desc.gyro.as_deref().unwrap_or_default();
                if raw.is_empty() || raw.len() > 3 {
                    return Err(Error::InvalidValue {
                        key: "gyro",
                        reason: format!("expected 1 to 3 axes, got {}", raw.len()),
                    });
                }
                let mut axes: SmallVec<[Option<Axis>; 3]> = raw
                    .iter()
                    .map(|axis| axis.as_deref().map(parse_axis).transpose())
                    .collect::<Result<_, _>>()?;
                axes.resize(3, None);
                Arc::new(GyroAxesAction::new(axes[0], axes[1], axes[2]))
            }
            "shell" => Arc::new(ShellAction::new(desc.shell.clone().unwrap_or_default())),
            "menu" => self.menu_action(desc)?,
            "keyboard" => Arc::new(KeyboardAction),
            "profile" => Arc::new(ChangeProfileAction::new(
                desc.profile.clone().unwrap_or_default(),
            )),
            "turnoff" => Arc::new(TurnOffAction),
            _ => Arc::new(NoAction),
        };

        Ok(Some(node))
    }

    fn menu_action(&self, desc: &ActionV1) -> Result<ActionRef, Error> {
        let mut action = match &desc.menu {
            Some(MenuV1::Id(id)) => self.menu_ref(id)?,
            Some(MenuV1::Full(options)) => {
                let mut action = self.menu_ref(&options.id)?;
                if let Some(kind) = &options.kind {
                    action = action.kind(
                        MenuKind::parse(kind).ok_or_else(|| Error::InvalidMenuKind(kind.clone()))?,
                    );
                }
                if let Some(source) = &options.control_with {
                    action = action.control_with(parse_source(source)?);
                }
                if let Some(button) = &options.confirm_with {
                    action = action.confirm_with(parse_button(button)?.name());
                }
                if let Some(button) = &options.cancel_with {
                    action = action.cancel_with(parse_button(button)?.name());
                }
                if let Some(value) = options.show_with_release {
                    action = action.show_with_release(value);
                }
                action
            }
            None => return Ok(Arc::new(NoAction)),
        };

        if let Some(position) = &desc.position {
            let [x, y] = position.as_slice() else {
                return Err(Error::InvalidValue {
                    key: "position",
                    reason: format!("expected [x, y], got {position:?}"),
                });
            };
            action = action.position(*x, *y);
        }

        Ok(Arc::new(action))
    }

    fn menu_ref(&self, id: &str) -> Result<MenuAction, Error> {
        if self.menus.contains(id) || is_file_menu(id) {
            Ok(MenuAction::new(id))
        } else {
            Err(Error::UnknownMenu(id.to_string()))
        }
    }

    fn modes(&self, modes: &[ModeV1], default: ActionRef) -> Result<ActionRef, Error> {
        let mut children = Vec::with_capacity(modes.len());
        for mode in modes {
            let button = parse_button(&mode.button)?;
            children.push((button, self.node(&mode.action)?));
        }
        let default = (!default.is_noop()).then_some(default);
        Ok(Arc::new(ModeModifier::new(children, default)))
    }
}

/// Names of the action keys set on a node, in declaration order.
fn action_keys(desc: &ActionV1) -> SmallVec<[&'static str; 2]> {
    let flags = [
        ("button", desc.button.is_some()),
        ("axis", desc.axis.is_some()),
        ("axes", desc.axes.is_some()),
        ("mouse", desc.mouse.is_some()),
        ("gyro", desc.gyro.is_some()),
        ("shell", desc.shell.is_some()),
        ("menu", desc.menu.is_some()),
        ("keyboard", desc.keyboard == Some(true)),
        ("profile", desc.profile.is_some()),
        ("turnoff", desc.turnoff == Some(true)),
        ("none", desc.none == Some(true)),
    ];
    flags
        .into_iter()
        .filter_map(|(key, set)| set.then_some(key))
        .collect()
}

fn parse_source(raw: &str) -> Result<Source, Error> {
    raw.trim()
        .to_ascii_uppercase()
        .parse::<Source>()
        .map_err(|_| Error::InvalidSource(raw.to_string()))
}

fn parse_button(raw: &str) -> Result<Button, Error> {
    raw.parse::<Button>()
        .map_err(|_| Error::InvalidButton(raw.to_string()))
}

fn parse_axis(raw: &str) -> Result<Axis, Error> {
    raw.parse::<Axis>()
        .map_err(|_| Error::InvalidAxis(raw.to_string()))
}

/// `BTN_*` and `mouseN` name pointer buttons, anything else is a key combo.
fn parse_target(raw: &str) -> Result<Target, Error> {
    let lower = raw.trim().to_ascii_lowercase();
    if lower.starts_with("btn_") || lower.starts_with("mouse") {
        return lower
            .parse::<MouseButton>()
            .map(Target::Mouse)
            .map_err(|_| Error::InvalidButton(raw.to_string()));
    }
    raw.parse::<KeyCombo>().map(Target::Keys).map_err(Error::KeyParse)
}

fn parse_feedback(raw: &FeedbackV1) -> Result<HapticEffect, Error> {
    let defaults = HapticEffect::default();
    let position = match &raw.position {
        Some(name) => HapticPosition::parse(name)
            .ok_or_else(|| Error::InvalidHapticPosition(name.clone()))?,
        None => defaults.position,
    };
    Ok(HapticEffect {
        position,
        amplitude: raw.amplitude.unwrap_or(defaults.amplitude),
        frequency: raw.frequency.unwrap_or(defaults.frequency),
        period: raw.period.unwrap_or(defaults.period),
        count: raw.count.unwrap_or(defaults.count),
    })
}

fn seconds_value(key: &'static str, seconds: f64) -> Result<Duration, Error> {
    Duration::try_from_secs_f64(seconds).map_err(|e| Error::InvalidValue {
        key,
        reason: e.to_string(),
    })
}
