/// Internal commands sent to the runtime thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    /// Rumble every controller. Zero strengths stop it.
    Rumble { low: u16, high: u16, ms: u32 },
    /// Re-read the gyro flag and apply it to every controller.
    SyncGyro,
    Shutdown,
}
