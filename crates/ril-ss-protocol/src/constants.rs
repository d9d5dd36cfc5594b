//! Protocol constants
//!
//! Command codes, message types, and sizes used on the IPC FMT channel for
//! supplementary services.

// ============================================================================
// Command Codes
// ============================================================================

/// Supplementary services command group.
pub const IPC_GROUP_SS: u8 = 0x0C;
/// Generic phone command group.
pub const IPC_GROUP_GEN: u8 = 0x80;

/// USSD send, cancel, and notification command.
pub const IPC_SS_USSD: u16 = 0x0C08;
/// Generic phone response acknowledging an earlier command.
pub const IPC_GEN_PHONE_RES: u16 = 0x8001;

// ============================================================================
// Message Types
// ============================================================================

/// Execute (host → modem).
pub const IPC_TYPE_EXEC: u8 = 0x01;
/// Get (host → modem).
pub const IPC_TYPE_GET: u8 = 0x02;
/// Set (host → modem).
pub const IPC_TYPE_SET: u8 = 0x03;
/// Confirm (host → modem).
pub const IPC_TYPE_CFRM: u8 = 0x04;
/// Event (host → modem).
pub const IPC_TYPE_EVENT: u8 = 0x05;

/// Indication (modem → host).
pub const IPC_TYPE_INDI: u8 = 0x01;
/// Response (modem → host).
pub const IPC_TYPE_RESP: u8 = 0x02;
/// Notification (modem → host).
pub const IPC_TYPE_NOTI: u8 = 0x03;

// ============================================================================
// USSD Frame Layout
// ============================================================================

/// Size of the USSD header (state, dcs, length).
pub const USSD_HEADER_SIZE: usize = 3;
/// Fixed size of an outbound send frame.
pub const USSD_FRAME_SIZE: usize = 0xC0;
/// Largest encoded payload a send frame can carry.
pub const USSD_MAX_PAYLOAD: usize = USSD_FRAME_SIZE - USSD_HEADER_SIZE;

/// Data coding scheme written into every outbound frame.
pub const USSD_TX_DCS: u8 = 0x0F;

// ============================================================================
// USSD States (wire codes)
// ============================================================================

/// No action required; also the initial session state.
pub const USSD_STATE_IDLE: u8 = 0;
/// The network awaits a reply from the user.
pub const USSD_STATE_ACTION_REQUIRED: u8 = 1;
/// The network ended the dialogue.
pub const USSD_STATE_TERMINATED_BY_NETWORK: u8 = 2;
/// Another client answered the network.
pub const USSD_STATE_OTHER_CLIENT: u8 = 3;
/// The operation is not supported by the network.
pub const USSD_STATE_NOT_SUPPORTED: u8 = 4;
/// The network timed out waiting for a reply.
pub const USSD_STATE_TIMED_OUT: u8 = 5;

// ============================================================================
// Generic Response
// ============================================================================

/// Size of the generic response payload (group, index, type, code).
pub const GEN_PHONE_RES_SIZE: usize = 5;
/// Status code reported for a successfully executed command.
pub const GEN_PHONE_RES_CODE_SUCCESS: u16 = 0x8000;

// ============================================================================
// GSM 7-bit Alphabet
// ============================================================================

/// Escape to the GSM 7-bit extension table.
pub const GSM7_ESCAPE: u8 = 0x1B;
/// Carriage return septet used to fill unused trailing bits.
pub const GSM7_CR: u8 = 0x0D;
