use ahash::AHashMap;
use serde::Deserialize;

/// Root of a version 1 profile file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileV1 {
    pub version: u8,
    /// Bindings keyed by source name (`A`, `LEFT`, `STICK`, `LT`, ...).
    #[serde(default)]
    pub bindings: AHashMap<String, ActionV1>,
    #[serde(default)]
    pub gyro: Option<ActionV1>,
    #[serde(default)]
    pub menus: AHashMap<String, Vec<MenuItemV1>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuItemV1 {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub action: ActionV1,
}

/// One node description. At most one action key may be set; modifier keys
/// wrap whatever the action keys produce.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionV1 {
    // Actions
    pub button: Option<String>,
    pub threshold: Option<u8>,
    pub axis: Option<String>,
    pub axes: Option<Vec<String>>,
    pub mouse: Option<String>,
    pub gyro: Option<Vec<Option<String>>>,
    pub shell: Option<String>,
    pub menu: Option<MenuV1>,
    pub osd: Option<OsdV1>,
    pub keyboard: Option<bool>,
    pub profile: Option<String>,
    pub turnoff: Option<bool>,
    pub none: Option<bool>,

    // Modifiers
    pub name: Option<String>,
    pub click: Option<bool>,
    pub ball: Option<BallV1>,
    pub deadzone: Option<Vec<i32>>,
    pub sensitivity: Option<Vec<f64>>,
    pub feedback: Option<FeedbackV1>,
    pub rotate: Option<f64>,
    pub modes: Option<Vec<ModeV1>>,
    pub doubleclick: Option<Box<ActionV1>>,
    pub hold: Option<Box<ActionV1>>,
    /// Doubleclick and hold timeout in seconds.
    pub time: Option<f64>,
    pub position: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MenuV1 {
    Id(String),
    Full(MenuOptionsV1),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuOptionsV1 {
    /// Profile menu id, or a file in the workspace `menus` directory when it
    /// contains a `.`.
    pub id: String,
    /// `list` (default), `grid` or `radial`.
    pub kind: Option<String>,
    pub control_with: Option<String>,
    pub confirm_with: Option<String>,
    pub cancel_with: Option<String>,
    pub show_with_release: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OsdV1 {
    Text(String),
    Full(OsdOptionsV1),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OsdOptionsV1 {
    pub text: String,
    /// Seconds the message stays visible.
    pub timeout: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum BallV1 {
    Enabled(bool),
    Friction(f64),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedbackV1 {
    pub position: Option<String>,
    pub amplitude: Option<u16>,
    pub frequency: Option<u16>,
    pub period: Option<u16>,
    pub count: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeV1 {
    pub button: String,
    pub action: ActionV1,
}
