// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The downward interfaces this crate requires from its transport: sending bytes
//! over an already-open RFCOMM channel and opening/closing the synchronous audio
//! link. Physical transport, L2CAP, and SDP service discovery are external
//! collaborators; only the interface they present to the HFP core is modeled here.

use crate::connection::{PeerAddress, RfcommChannelId, ScoHandle};
use crate::protocol::CodecId;

/// Events the RFCOMM transport delivers upward, independent of any particular
/// connection's AT traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RfcommEvent {
    ChannelOpened { channel: RfcommChannelId, peer: PeerAddress },
    IncomingData { channel: RfcommChannelId, bytes: Vec<u8> },
    ChannelClosed { channel: RfcommChannelId },
}

/// The byte-oriented half of the transport. A real implementation wraps an RFCOMM
/// channel; tests use an in-memory fake.
pub trait RfcommTransport {
    /// Sends `bytes` on `channel`. Implementations should buffer internally rather
    /// than block; callers check [`RfcommTransport::can_send_now`] first.
    fn send(&mut self, channel: RfcommChannelId, bytes: &[u8]);

    /// Whether `channel` currently has write credit. A state machine with a line
    /// ready to emit must leave its "ready to send" state unchanged when this
    /// returns false, and re-check on the next writability notification.
    fn can_send_now(&self, channel: RfcommChannelId) -> bool;
}

/// The synchronous-link half of the transport.
pub trait ScoTransport {
    /// Requests a synchronous connection using `codec` as a hint for which link
    /// parameters to negotiate at the baseband.
    fn open(&mut self, peer: PeerAddress, codec: CodecId);

    fn close(&mut self, handle: ScoHandle);
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::collections::HashMap;

    /// An in-memory [`RfcommTransport`] that records every line sent, for use in
    /// state-machine and peer-loop tests.
    #[derive(Default)]
    pub struct FakeRfcomm {
        pub sent: HashMap<RfcommChannelId, Vec<Vec<u8>>>,
        pub writable: HashMap<RfcommChannelId, bool>,
    }

    impl FakeRfcomm {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn lines_for(&self, channel: RfcommChannelId) -> Vec<String> {
            self.sent
                .get(&channel)
                .into_iter()
                .flatten()
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .collect()
        }
    }

    impl RfcommTransport for FakeRfcomm {
        fn send(&mut self, channel: RfcommChannelId, bytes: &[u8]) {
            self.sent.entry(channel).or_default().push(bytes.to_vec());
        }

        fn can_send_now(&self, channel: RfcommChannelId) -> bool {
            *self.writable.get(&channel).unwrap_or(&true)
        }
    }

    #[derive(Default)]
    pub struct FakeSco {
        pub opened: Vec<(PeerAddress, CodecId)>,
        pub closed: Vec<ScoHandle>,
    }

    impl FakeSco {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl ScoTransport for FakeSco {
        fn open(&mut self, peer: PeerAddress, codec: CodecId) {
            self.opened.push((peer, codec));
        }

        fn close(&mut self, handle: ScoHandle) {
            self.closed.push(handle);
        }
    }

    #[test]
    fn fake_rfcomm_records_sent_lines() {
        let mut transport = FakeRfcomm::new();
        transport.send(RfcommChannelId(1), b"AT+BRSF=195\r\n");
        assert_eq!(transport.lines_for(RfcommChannelId(1)), vec!["AT+BRSF=195\r\n"]);
    }

    #[test]
    fn fake_rfcomm_defaults_to_writable() {
        let transport = FakeRfcomm::new();
        assert!(transport.can_send_now(RfcommChannelId(1)));
    }
}
