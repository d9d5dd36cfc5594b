//! Common USSD types shared by frames and the transaction layer.

use crate::constants::*;

/// USSD dialogue state as reported by the modem.
///
/// The same codes are written into outbound frames as the requested
/// follow-up state. Bytes outside the known range are kept as
/// [`UssdState::Unknown`] so nothing the modem reports is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UssdState {
    /// No action required. Initial state.
    #[default]
    Idle,
    /// The network waits for the user's reply.
    ActionRequired,
    /// The network ended the dialogue.
    TerminatedByNetwork,
    /// Another client responded.
    OtherClientResponded,
    /// The request is not supported.
    NotSupported,
    /// The network timed out.
    TimedOut,
    /// Unrecognized state byte.
    Unknown(u8),
}

impl UssdState {
    /// Numeric code reported upward in notifications (`"0"`..`"5"`).
    ///
    /// Returns `None` for [`UssdState::Unknown`].
    pub fn code(&self) -> Option<u8> {
        match self {
            UssdState::Unknown(_) => None,
            known => Some(u8::from(*known)),
        }
    }

    /// Whether the network is waiting on a reply to an open dialogue.
    pub fn is_dialogue_open(&self) -> bool {
        matches!(self, UssdState::ActionRequired)
    }
}

impl std::fmt::Display for UssdState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UssdState::Idle => write!(f, "idle"),
            UssdState::ActionRequired => write!(f, "action required"),
            UssdState::TerminatedByNetwork => write!(f, "terminated by network"),
            UssdState::OtherClientResponded => write!(f, "other client responded"),
            UssdState::NotSupported => write!(f, "not supported"),
            UssdState::TimedOut => write!(f, "timed out"),
            UssdState::Unknown(code) => write!(f, "unknown (0x{:02X})", code),
        }
    }
}

impl From<u8> for UssdState {
    fn from(code: u8) -> Self {
        match code {
            USSD_STATE_IDLE => UssdState::Idle,
            USSD_STATE_ACTION_REQUIRED => UssdState::ActionRequired,
            USSD_STATE_TERMINATED_BY_NETWORK => UssdState::TerminatedByNetwork,
            USSD_STATE_OTHER_CLIENT => UssdState::OtherClientResponded,
            USSD_STATE_NOT_SUPPORTED => UssdState::NotSupported,
            USSD_STATE_TIMED_OUT => UssdState::TimedOut,
            _ => UssdState::Unknown(code),
        }
    }
}

impl From<UssdState> for u8 {
    fn from(state: UssdState) -> Self {
        match state {
            UssdState::Idle => USSD_STATE_IDLE,
            UssdState::ActionRequired => USSD_STATE_ACTION_REQUIRED,
            UssdState::TerminatedByNetwork => USSD_STATE_TERMINATED_BY_NETWORK,
            UssdState::OtherClientResponded => USSD_STATE_OTHER_CLIENT,
            UssdState::NotSupported => USSD_STATE_NOT_SUPPORTED,
            UssdState::TimedOut => USSD_STATE_TIMED_OUT,
            UssdState::Unknown(code) => code,
        }
    }
}

/// How an outbound USSD string is put on the wire.
///
/// Both dialects are sent with DCS `0x0F`; the dialect is decided once from
/// the session state and carried with the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UssdDialect {
    /// A fresh request, GSM 7-bit packed.
    Gsm7Packed,
    /// A reply inside an open dialogue, bytes copied as-is.
    Passthrough,
}

impl UssdDialect {
    /// Pick the dialect for the next outbound string given the current session state.
    pub fn for_session(state: UssdState) -> Self {
        match state {
            UssdState::Idle
            | UssdState::TerminatedByNetwork
            | UssdState::OtherClientResponded
            | UssdState::NotSupported
            | UssdState::TimedOut => UssdDialect::Gsm7Packed,
            UssdState::ActionRequired | UssdState::Unknown(_) => UssdDialect::Passthrough,
        }
    }

    /// State written into the frame header for this dialect.
    pub fn frame_state(&self) -> UssdState {
        match self {
            UssdDialect::Gsm7Packed => UssdState::Idle,
            UssdDialect::Passthrough => UssdState::ActionRequired,
        }
    }

    /// Short lowercase name, used for logs and metric labels.
    pub const fn as_str(&self) -> &'static str {
        match self {
            UssdDialect::Gsm7Packed => "gsm7",
            UssdDialect::Passthrough => "passthrough",
        }
    }
}

impl std::fmt::Display for UssdDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text coding scheme derived from a DCS byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodingScheme {
    /// GSM 7-bit packed default alphabet.
    Gsm7,
    /// 16-bit big-endian code units.
    Ucs2,
    /// 8-bit data, reserved or compressed alphabets.
    Unknown,
}

impl CodingScheme {
    /// Classify a DCS byte using the SMS data coding groups of 3GPP TS 23.038.
    pub fn from_dcs(dcs: u8) -> Self {
        match dcs >> 4 {
            0x0..=0x7 => {
                if dcs & 0x20 != 0 {
                    return CodingScheme::Unknown;
                }
                match (dcs >> 2) & 0x03 {
                    0x00 => CodingScheme::Gsm7,
                    0x02 => CodingScheme::Ucs2,
                    _ => CodingScheme::Unknown,
                }
            }
            0xC | 0xD => CodingScheme::Gsm7,
            0xE => CodingScheme::Ucs2,
            0xF => {
                if dcs & 0x04 == 0 {
                    CodingScheme::Gsm7
                } else {
                    CodingScheme::Unknown
                }
            }
            _ => CodingScheme::Unknown,
        }
    }

    /// Short lowercase name, used for logs and metric labels.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CodingScheme::Gsm7 => "gsm7",
            CodingScheme::Ucs2 => "ucs2",
            CodingScheme::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for CodingScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether decoded text is faithful to the payload or a best-effort rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeOutcome {
    /// Every byte was decoded under the announced scheme.
    Exact,
    /// The scheme was unknown or some bytes could not be decoded.
    Fallback,
}

/// Text decoded from a USSD payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    /// The decoded text.
    pub text: String,
    /// How faithful the decoding was.
    pub outcome: DecodeOutcome,
}

/// Request types for host → modem messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpcType {
    /// Execute a command.
    Exec,
    /// Query a value.
    Get,
    /// Set a value.
    Set,
    /// Confirm an indication.
    Cfrm,
    /// Raise an event.
    Event,
}

impl From<IpcType> for u8 {
    fn from(kind: IpcType) -> Self {
        match kind {
            IpcType::Exec => IPC_TYPE_EXEC,
            IpcType::Get => IPC_TYPE_GET,
            IpcType::Set => IPC_TYPE_SET,
            IpcType::Cfrm => IPC_TYPE_CFRM,
            IpcType::Event => IPC_TYPE_EVENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes_roundtrip() {
        for code in 0u8..=5 {
            let state = UssdState::from(code);
            assert_eq!(state.code(), Some(code));
            assert_eq!(u8::from(state), code);
        }
        assert_eq!(UssdState::from(0x42), UssdState::Unknown(0x42));
        assert_eq!(UssdState::Unknown(0x42).code(), None);
        assert_eq!(u8::from(UssdState::Unknown(0x42)), 0x42);
    }

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(UssdState::default(), UssdState::Idle);
    }

    #[test]
    fn test_dialect_selection() {
        assert_eq!(UssdDialect::for_session(UssdState::Idle), UssdDialect::Gsm7Packed);
        assert_eq!(
            UssdDialect::for_session(UssdState::TerminatedByNetwork),
            UssdDialect::Gsm7Packed
        );
        assert_eq!(
            UssdDialect::for_session(UssdState::OtherClientResponded),
            UssdDialect::Gsm7Packed
        );
        assert_eq!(UssdDialect::for_session(UssdState::NotSupported), UssdDialect::Gsm7Packed);
        assert_eq!(UssdDialect::for_session(UssdState::TimedOut), UssdDialect::Gsm7Packed);
        assert_eq!(
            UssdDialect::for_session(UssdState::ActionRequired),
            UssdDialect::Passthrough
        );
        assert_eq!(
            UssdDialect::for_session(UssdState::Unknown(9)),
            UssdDialect::Passthrough
        );
    }

    #[test]
    fn test_dialect_frame_state() {
        assert_eq!(UssdDialect::Gsm7Packed.frame_state(), UssdState::Idle);
        assert_eq!(UssdDialect::Passthrough.frame_state(), UssdState::ActionRequired);
    }

    #[test]
    fn test_coding_scheme_general_group() {
        assert_eq!(CodingScheme::from_dcs(0x00), CodingScheme::Gsm7);
        assert_eq!(CodingScheme::from_dcs(0x08), CodingScheme::Ucs2);
        assert_eq!(CodingScheme::from_dcs(0x04), CodingScheme::Unknown);
        assert_eq!(CodingScheme::from_dcs(0x0F), CodingScheme::Unknown);
        assert_eq!(CodingScheme::from_dcs(0x48), CodingScheme::Ucs2);
        // Compressed
        assert_eq!(CodingScheme::from_dcs(0x20), CodingScheme::Unknown);
    }

    #[test]
    fn test_coding_scheme_other_groups() {
        assert_eq!(CodingScheme::from_dcs(0xC0), CodingScheme::Gsm7);
        assert_eq!(CodingScheme::from_dcs(0xD3), CodingScheme::Gsm7);
        assert_eq!(CodingScheme::from_dcs(0xE0), CodingScheme::Ucs2);
        assert_eq!(CodingScheme::from_dcs(0xF0), CodingScheme::Gsm7);
        assert_eq!(CodingScheme::from_dcs(0xF4), CodingScheme::Unknown);
        assert_eq!(CodingScheme::from_dcs(0x80), CodingScheme::Unknown);
        assert_eq!(CodingScheme::from_dcs(0xB1), CodingScheme::Unknown);
    }
}
