/// Unique identifier of a connected controller (SDL instance id).
pub type ControllerId = u32;

/// Controller meta information that remains stable across events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerInfo {
    pub id: ControllerId,
    pub name: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub supports_rumble: bool,
    pub supports_gyro: bool,
}
