//! Recording collaborators for driving a `UssdLayer` in tests.

#![allow(dead_code)]

use std::collections::HashMap;

use ril_ss::{
    IpcTransport, RadioState, RadioStatus, RequestSink, RequestStatus, RequestToken, SsError,
    SsResult, UnsolicitedEvent, UssdNotification,
};
use ril_ss_protocol::{IpcMessage, IpcType, IPC_SS_USSD, IPC_TYPE_NOTI};

/// A frame handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentFrame {
    pub seq: u8,
    pub command: u16,
    pub kind: IpcType,
    pub data: Vec<u8>,
}

/// Records everything the layer does to its surroundings.
#[derive(Debug)]
pub struct MockRil {
    pub radio: RadioState,
    pub fail_send: bool,
    pub sent: Vec<SentFrame>,
    pub completions: Vec<(RequestToken, RequestStatus)>,
    pub events: Vec<UnsolicitedEvent>,
    owners: HashMap<u8, RequestToken>,
}

impl Default for MockRil {
    fn default() -> Self {
        MockRil::new(RadioState::SimReady)
    }
}

impl MockRil {
    pub fn new(radio: RadioState) -> Self {
        MockRil {
            radio,
            fail_send: false,
            sent: Vec::new(),
            completions: Vec::new(),
            events: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Sequence number the mock assigns to a token.
    pub fn seq_of(token: RequestToken) -> u8 {
        (token.0 % 256) as u8
    }

    /// Notifications emitted so far, in order.
    pub fn notifications(&self) -> Vec<UssdNotification> {
        self.events
            .iter()
            .map(|event| match event {
                UnsolicitedEvent::OnUssd(notification) => notification.clone(),
            })
            .collect()
    }

    pub fn last_completion(&self) -> Option<(RequestToken, RequestStatus)> {
        self.completions.last().copied()
    }
}

impl RadioStatus for MockRil {
    fn radio_state(&self) -> RadioState {
        self.radio
    }
}

impl IpcTransport for MockRil {
    fn send(&mut self, seq: u8, command: u16, kind: IpcType, data: &[u8]) -> SsResult<()> {
        if self.fail_send {
            return Err(SsError::transport("link down"));
        }
        self.sent.push(SentFrame {
            seq,
            command,
            kind,
            data: data.to_vec(),
        });
        Ok(())
    }
}

impl RequestSink for MockRil {
    fn request_seq(&mut self, token: RequestToken) -> u8 {
        let seq = Self::seq_of(token);
        self.owners.insert(seq, token);
        seq
    }

    fn request_token(&self, seq: u8) -> Option<RequestToken> {
        self.owners.get(&seq).copied()
    }

    fn complete(&mut self, token: RequestToken, status: RequestStatus, _payload: &[u8]) {
        self.completions.push((token, status));
    }

    fn unsolicited(&mut self, event: UnsolicitedEvent) {
        self.events.push(event);
    }
}

/// A USSD notification message with the given header fields and payload.
pub fn notification(state: u8, dcs: u8, payload: &[u8]) -> IpcMessage {
    let mut data = vec![state, dcs, payload.len() as u8];
    data.extend_from_slice(payload);
    IpcMessage::new(0, IPC_SS_USSD, IPC_TYPE_NOTI, data)
}

/// A USSD notification message with raw frame bytes.
pub fn raw_notification(aseq: u8, data: &[u8]) -> IpcMessage {
    IpcMessage::new(aseq, IPC_SS_USSD, IPC_TYPE_NOTI, data.to_vec())
}

/// A generic acknowledgment of a USSD command.
pub fn ack(seq: u8, code: u16) -> IpcMessage {
    IpcMessage::generic_response(seq, IPC_SS_USSD, code)
}
