//! USSD frame building and parsing.
//!
//! ```text
//! offset 0   state    requested (outbound) or reported (inbound) dialogue state
//! offset 1   dcs      data coding scheme
//! offset 2   length   payload byte count
//! offset 3.. payload
//! ```
//!
//! Outbound send frames are padded with zeros to [`USSD_FRAME_SIZE`] bytes.

use bytes::{BufMut, Bytes, BytesMut};

use crate::charset::{decode_text, pack_gsm7};
use crate::constants::*;
use crate::error::ProtocolError;
use crate::types::*;

/// The 3-byte header shared by every USSD frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UssdHeader {
    /// Dialogue state.
    pub state: UssdState,
    /// Data coding scheme.
    pub dcs: u8,
    /// Payload length in bytes.
    pub length: u8,
}

impl UssdHeader {
    /// Header of a cancel frame.
    pub fn cancel() -> Self {
        UssdHeader {
            state: UssdState::TerminatedByNetwork,
            dcs: 0,
            length: 0,
        }
    }

    /// Decode a header from the start of a frame.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < USSD_HEADER_SIZE {
            return Err(ProtocolError::FrameTooShort {
                expected: USSD_HEADER_SIZE,
                actual: data.len(),
            });
        }
        Ok(UssdHeader {
            state: UssdState::from(data[0]),
            dcs: data[1],
            length: data[2],
        })
    }

    /// Append the header to a buffer.
    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.put_u8(self.state.into());
        buf.put_u8(self.dcs);
        buf.put_u8(self.length);
    }
}

/// A fixed-size "send USSD" frame, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UssdRequestFrame {
    dialect: UssdDialect,
    header: UssdHeader,
    data: Bytes,
}

impl UssdRequestFrame {
    /// Encode `text` in the given dialect and lay it out in a send frame.
    ///
    /// `text` is read up to its first NUL. Fails with
    /// [`ProtocolError::PayloadTooLong`] when the encoded payload exceeds
    /// [`USSD_MAX_PAYLOAD`]; no frame is produced in that case.
    pub fn build(dialect: UssdDialect, text: &[u8]) -> Result<Self, ProtocolError> {
        let end = text.iter().position(|&b| b == 0).unwrap_or(text.len());
        let text = &text[..end];

        let payload = match dialect {
            UssdDialect::Gsm7Packed => pack_gsm7(&String::from_utf8_lossy(text)),
            UssdDialect::Passthrough => text.to_vec(),
        };

        if payload.len() > USSD_MAX_PAYLOAD {
            return Err(ProtocolError::PayloadTooLong {
                max: USSD_MAX_PAYLOAD,
                actual: payload.len(),
            });
        }

        let header = UssdHeader {
            state: dialect.frame_state(),
            dcs: USSD_TX_DCS,
            length: payload.len() as u8,
        };

        let mut buf = BytesMut::with_capacity(USSD_FRAME_SIZE);
        header.encode_into(&mut buf);
        buf.put_slice(&payload);
        buf.put_bytes(0, USSD_FRAME_SIZE - buf.len());

        log::trace!(
            "Built USSD frame: dialect={}, state={}, payload_len={}",
            dialect,
            header.state,
            payload.len()
        );

        Ok(UssdRequestFrame {
            dialect,
            header,
            data: buf.freeze(),
        })
    }

    /// The dialect the payload was encoded in.
    pub fn dialect(&self) -> UssdDialect {
        self.dialect
    }

    /// The frame header.
    pub fn header(&self) -> &UssdHeader {
        &self.header
    }

    /// Encoded payload length.
    pub fn payload_len(&self) -> usize {
        self.header.length as usize
    }

    /// The full frame bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Encode a cancel frame: the bare header with state `TerminatedByNetwork`.
pub fn encode_cancel_frame() -> Bytes {
    let mut buf = BytesMut::with_capacity(USSD_HEADER_SIZE);
    UssdHeader::cancel().encode_into(&mut buf);
    buf.freeze()
}

/// A USSD notification pushed by the modem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UssdNotificationFrame {
    /// The frame header.
    pub header: UssdHeader,
    /// Payload bytes, bounded by the declared length.
    pub payload: Bytes,
    /// Whether fewer payload bytes arrived than the header declared.
    pub truncated: bool,
}

impl UssdNotificationFrame {
    /// Parse a notification frame.
    ///
    /// Only a frame shorter than the header is an error. A payload shorter than
    /// the declared length is kept and marked as truncated.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        let header = UssdHeader::decode(data)?;
        let available = &data[USSD_HEADER_SIZE..];
        let declared = header.length as usize;

        let (payload, truncated) = if declared <= available.len() {
            (&available[..declared], false)
        } else {
            (available, true)
        };

        Ok(UssdNotificationFrame {
            header,
            payload: Bytes::copy_from_slice(payload),
            truncated,
        })
    }

    /// Coding scheme announced by the DCS byte.
    pub fn coding_scheme(&self) -> CodingScheme {
        CodingScheme::from_dcs(self.header.dcs)
    }

    /// Decode the payload text. An empty payload yields empty text.
    pub fn decode_text(&self) -> DecodedText {
        if self.header.length == 0 || self.payload.is_empty() {
            return DecodedText {
                text: String::new(),
                outcome: if self.truncated {
                    DecodeOutcome::Fallback
                } else {
                    DecodeOutcome::Exact
                },
            };
        }

        let mut decoded = decode_text(self.coding_scheme(), &self.payload);
        if self.truncated {
            decoded.outcome = DecodeOutcome::Fallback;
        }
        decoded
    }
}

/// Generic phone response acknowledging a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericResponse {
    /// Command group of the acknowledged command.
    pub group: u8,
    /// Command index of the acknowledged command.
    pub index: u8,
    /// Message type of the acknowledged command.
    pub kind: u8,
    /// Status code.
    pub code: u16,
}

impl GenericResponse {
    /// Decode a generic response payload.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < GEN_PHONE_RES_SIZE {
            return Err(ProtocolError::FrameTooShort {
                expected: GEN_PHONE_RES_SIZE,
                actual: data.len(),
            });
        }
        Ok(GenericResponse {
            group: data[0],
            index: data[1],
            kind: data[2],
            code: u16::from_le_bytes([data[3], data[4]]),
        })
    }

    /// Encode the response payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(GEN_PHONE_RES_SIZE);
        buf.push(self.group);
        buf.push(self.index);
        buf.push(self.kind);
        buf.put_u16_le(self.code);
        buf
    }

    /// The acknowledged command code.
    pub fn command(&self) -> u16 {
        u16::from_be_bytes([self.group, self.index])
    }

    /// Whether the modem reports success.
    pub fn is_success(&self) -> bool {
        self.code == GEN_PHONE_RES_CODE_SUCCESS
    }
}

/// An IPC FMT message as handed over by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpcMessage {
    /// Sequence number assigned by the sender.
    pub mseq: u8,
    /// Sequence number of the request this message answers.
    pub aseq: u8,
    /// Command code.
    pub command: u16,
    /// Message type.
    pub kind: u8,
    /// Message payload.
    pub data: Bytes,
}

impl IpcMessage {
    /// Create a message.
    pub fn new(aseq: u8, command: u16, kind: u8, data: impl Into<Bytes>) -> Self {
        IpcMessage {
            mseq: 0,
            aseq,
            command,
            kind,
            data: data.into(),
        }
    }

    /// Build a generic response for `command` with the given status code.
    pub fn generic_response(aseq: u8, command: u16, code: u16) -> Self {
        let [group, index] = command.to_be_bytes();
        let response = GenericResponse {
            group,
            index,
            kind: IPC_TYPE_EXEC,
            code,
        };
        IpcMessage::new(aseq, IPC_GEN_PHONE_RES, IPC_TYPE_RESP, response.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_request_frame() {
        let frame = UssdRequestFrame::build(UssdDialect::Gsm7Packed, b"BAL").expect("frame");
        let bytes = frame.as_bytes();

        assert_eq!(bytes.len(), USSD_FRAME_SIZE);
        assert_eq!(bytes[0], USSD_STATE_IDLE);
        assert_eq!(bytes[1], USSD_TX_DCS);
        assert_eq!(bytes[2], 3);
        assert_eq!(&bytes[3..6], &pack_gsm7("BAL")[..]);
        assert!(bytes[6..].iter().all(|&b| b == 0));
        assert_eq!(frame.payload_len(), 3);
    }

    #[test]
    fn test_continuation_request_frame() {
        let frame = UssdRequestFrame::build(UssdDialect::Passthrough, b"1").expect("frame");
        let bytes = frame.as_bytes();

        assert_eq!(bytes.len(), USSD_FRAME_SIZE);
        assert_eq!(bytes[0], USSD_STATE_ACTION_REQUIRED);
        assert_eq!(bytes[1], USSD_TX_DCS);
        assert_eq!(bytes[2], 1);
        assert_eq!(bytes[3], b'1');
        assert_eq!(frame.dialect(), UssdDialect::Passthrough);
    }

    #[test]
    fn test_request_frame_stops_at_nul() {
        let frame = UssdRequestFrame::build(UssdDialect::Passthrough, b"12\0junk").expect("frame");
        assert_eq!(frame.payload_len(), 2);
    }

    #[test]
    fn test_request_frame_capacity() {
        let fits = vec![b'9'; USSD_MAX_PAYLOAD];
        let frame = UssdRequestFrame::build(UssdDialect::Passthrough, &fits).expect("frame");
        assert_eq!(frame.payload_len(), USSD_MAX_PAYLOAD);
        assert_eq!(frame.as_bytes().len(), USSD_FRAME_SIZE);

        let too_long = vec![b'9'; USSD_MAX_PAYLOAD + 1];
        let err = UssdRequestFrame::build(UssdDialect::Passthrough, &too_long).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::PayloadTooLong {
                max: USSD_MAX_PAYLOAD,
                actual: USSD_MAX_PAYLOAD + 1
            }
        );

        // 300 septets pack into 263 bytes
        let err = UssdRequestFrame::build(UssdDialect::Gsm7Packed, &[b'A'; 300]).unwrap_err();
        assert!(matches!(err, ProtocolError::PayloadTooLong { actual: 263, .. }));
    }

    #[test]
    fn test_cancel_frame() {
        let frame = encode_cancel_frame();
        assert_eq!(&frame[..], &[USSD_STATE_TERMINATED_BY_NETWORK, 0, 0]);
    }

    #[test]
    fn test_parse_notification() {
        let frame = UssdNotificationFrame::parse(&[1, 0x0F, 3, b'Y', b'E', b'S']).expect("parse");
        assert_eq!(frame.header.state, UssdState::ActionRequired);
        assert_eq!(frame.coding_scheme(), CodingScheme::Unknown);

        let text = frame.decode_text();
        assert_eq!(text.text, "YES");
        assert_eq!(text.outcome, DecodeOutcome::Fallback);
    }

    #[test]
    fn test_parse_notification_ignores_padding() {
        let mut data = vec![2, 0x08, 4, 0x00, 0x4F, 0x00, 0x4B];
        data.resize(USSD_FRAME_SIZE, 0);
        let frame = UssdNotificationFrame::parse(&data).expect("parse");
        assert_eq!(frame.payload.len(), 4);
        assert!(!frame.truncated);

        let text = frame.decode_text();
        assert_eq!(text.text, "OK");
        assert_eq!(text.outcome, DecodeOutcome::Exact);
    }

    #[test]
    fn test_parse_truncated_notification() {
        let frame = UssdNotificationFrame::parse(&[0, 0x00, 10, 0xC8, 0x34]).expect("parse");
        assert!(frame.truncated);
        assert_eq!(frame.payload.len(), 2);
        assert_eq!(frame.decode_text().outcome, DecodeOutcome::Fallback);
    }

    #[test]
    fn test_parse_empty_notification() {
        let frame = UssdNotificationFrame::parse(&[5, 0x0F, 0]).expect("parse");
        assert_eq!(frame.header.state, UssdState::TimedOut);
        let text = frame.decode_text();
        assert_eq!(text.text, "");
        assert_eq!(text.outcome, DecodeOutcome::Exact);
    }

    #[test]
    fn test_parse_short_notification() {
        let err = UssdNotificationFrame::parse(&[1, 0x0F]).unwrap_err();
        assert_eq!(err, ProtocolError::FrameTooShort { expected: 3, actual: 2 });
    }

    #[test]
    fn test_generic_response() {
        let msg = IpcMessage::generic_response(7, IPC_SS_USSD, GEN_PHONE_RES_CODE_SUCCESS);
        assert_eq!(msg.command, IPC_GEN_PHONE_RES);
        assert_eq!(msg.aseq, 7);

        let res = GenericResponse::decode(&msg.data).expect("decode");
        assert_eq!(res.group, IPC_GROUP_SS);
        assert_eq!(res.command(), IPC_SS_USSD);
        assert!(res.is_success());

        let failed = GenericResponse { code: 0x8011, ..res };
        assert!(!failed.is_success());

        assert!(GenericResponse::decode(&[0x0C, 0x08]).is_err());
    }
}
