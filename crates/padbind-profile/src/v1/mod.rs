mod parse;
mod profile;

use thiserror::Error;

pub use parse::build_menu_file;

pub use profile::{
    ActionV1, BallV1, FeedbackV1, MenuItemV1, MenuOptionsV1, MenuV1, ModeV1, OsdOptionsV1,
    OsdV1, ProfileV1,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid source: {0}")]
    InvalidSource(String),
    #[error("invalid button: {0}")]
    InvalidButton(String),
    #[error("invalid axis: {0}")]
    InvalidAxis(String),
    #[error("key parse error: {0}")]
    KeyParse(String),
    #[error("invalid mouse mode: {0}")]
    InvalidMouseMode(String),
    #[error("invalid haptic position: {0}")]
    InvalidHapticPosition(String),
    #[error("more than one action in one node: {0}")]
    MultipleActions(String),
    #[error("{key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
    #[error("unknown menu: {0}")]
    UnknownMenu(String),
    #[error("invalid menu kind: {0}")]
    InvalidMenuKind(String),
    #[error("menu id must not contain '.': {0}")]
    DottedMenuId(String),
    #[error("duplicate menu item: {0}")]
    DuplicateMenuItem(String),
    #[error("{name}: {source}")]
    Named {
        name: String,
        #[source]
        source: Box<Error>,
    },
    #[error("{0}: {1}")]
    Binding(String, Box<Error>),
}
