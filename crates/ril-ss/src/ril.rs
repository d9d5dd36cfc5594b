//! Collaborator interfaces consumed by the layer.
//!
//! The surrounding RIL provides radio-state bookkeeping, the IPC transport and
//! request completion. The layer only sees them through these traits, so tests
//! can substitute a recording implementation.

use ril_ss_protocol::IpcType;

use crate::error::SsResult;

/// Request code for sending a USSD string.
pub const REQUEST_SEND_USSD: u32 = 29;
/// Request code for cancelling the USSD dialogue.
pub const REQUEST_CANCEL_USSD: u32 = 30;
/// Unsolicited event code for an inbound USSD notification.
pub const UNSOL_ON_USSD: u32 = 1006;

/// Opaque token identifying a caller request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(pub u32);

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Final status of a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// The request succeeded.
    Success,
    /// The request failed.
    GenericFailure,
}

impl RequestStatus {
    /// Short lowercase name, used for metric labels.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Success => "success",
            RequestStatus::GenericFailure => "failure",
        }
    }
}

/// What a request entry point did with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Sent to the modem; the completion arrives later.
    Handled,
    /// Completed synchronously.
    Completed,
    /// Not handled by this layer; nothing was completed.
    Unhandled,
}

/// Radio power and SIM state, in increasing order of readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RadioState {
    Unavailable,
    Off,
    On,
    NvNotReady,
    NvReady,
    SimNotReady,
    SimLockedOrAbsent,
    SimReady,
}

/// Two-field payload of an "on USSD" event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UssdNotification {
    /// State code, `"0"` through `"5"`. Empty for an unrecognized state byte.
    pub state: String,
    /// Decoded text. Empty when the frame carried no payload.
    pub text: String,
}

/// Events emitted without a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsolicitedEvent {
    /// A USSD notification from the network.
    OnUssd(UssdNotification),
}

impl UnsolicitedEvent {
    /// Event code.
    pub fn code(&self) -> u32 {
        match self {
            UnsolicitedEvent::OnUssd(_) => UNSOL_ON_USSD,
        }
    }
}

/// Radio-state check.
pub trait RadioStatus {
    /// The current radio state.
    fn radio_state(&self) -> RadioState;

    /// Whether the radio has reached at least `state`.
    fn is_at_least(&self, state: RadioState) -> bool {
        self.radio_state() >= state
    }
}

/// Outbound IPC FMT transport.
pub trait IpcTransport {
    /// Send `data` as `command` of type `kind` under sequence number `seq`.
    fn send(&mut self, seq: u8, command: u16, kind: IpcType, data: &[u8]) -> SsResult<()>;
}

/// Request bookkeeping and upward delivery.
pub trait RequestSink {
    /// Sequence number the transport uses for `token`.
    fn request_seq(&mut self, token: RequestToken) -> u8;

    /// Request that owns sequence number `seq`, if any.
    fn request_token(&self, seq: u8) -> Option<RequestToken>;

    /// Complete a request.
    fn complete(&mut self, token: RequestToken, status: RequestStatus, payload: &[u8]);

    /// Emit an unsolicited event.
    fn unsolicited(&mut self, event: UnsolicitedEvent);
}

/// Everything a layer entry point needs from its surroundings.
pub trait RilContext: RadioStatus + IpcTransport + RequestSink {}

impl<T: RadioStatus + IpcTransport + RequestSink> RilContext for T {}
