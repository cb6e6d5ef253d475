use crossbeam_channel::Receiver;
use padbind_engine::PadEvent;

use crate::types::{ControllerId, ControllerInfo};

/// Events emitted by the manager about the backend, controller lifecycle
/// and input.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// The backend started; controllers will follow as `Connected`.
    BackendReady,
    /// The backend failed to start or stopped; a retry is scheduled.
    BackendFailed(String),
    /// A controller has been connected and enumerated.
    Connected(ControllerInfo),
    /// A previously connected controller has been disconnected.
    Disconnected(ControllerId),
    /// Input from a controller, already in engine terms.
    Input { id: ControllerId, event: PadEvent },
}

/// Receiving end for controller events subscription.
pub type EventReceiver = Receiver<ControllerEvent>;
