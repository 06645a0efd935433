// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Host-facing events: the subtyped records the four state machines surface to
//! whatever application registered a packet handler. Wire framing (the
//! `HCI_EVENT_HFP_META` byte sequence the original C implementation used) is an
//! adapter concern handled by the binary's transport glue, not modeled here.

use crate::connection::PeerAddress;
use crate::protocol::CodecId;

/// A non-zero status indicates the operation the event reports on failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Status(pub u8);

impl Status {
    pub const OK: Status = Status(0);

    pub fn is_ok(&self) -> bool {
        self.0 == 0
    }
}

/// One event surfaced to the host application, always scoped to a peer.
#[derive(Debug, Clone, PartialEq)]
pub struct HostEvent {
    pub peer: PeerAddress,
    pub kind: HostEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostEventKind {
    ServiceLevelConnectionEstablished,
    ServiceLevelConnectionReleased { status: Status },
    CodecsConnectionComplete { codec: CodecId },
    AudioConnectionEstablished { codec: CodecId },
    AudioConnectionReleased { status: Status },
    StartRinging,
    StopRinging,
    CallTerminated,
    ExtendedAudioGatewayError { code: u8 },
}

impl HostEvent {
    pub fn new(peer: PeerAddress, kind: HostEventKind) -> Self {
        HostEvent { peer, kind }
    }
}

/// Registered once per role; receives every [`HostEvent`] as it is produced. The
/// original implementation used a single C function pointer (`hfp_callback_t`)
/// over a flat byte-encoded event; this trait is the typed equivalent.
pub trait EventDispatcher: Send {
    fn dispatch(&mut self, event: HostEvent);
}

/// An `EventDispatcher` backed by a plain closure, convenient for tests and for
/// host applications that do not need a stateful handler object.
pub struct ClosureDispatcher<F>(pub F);

impl<F> EventDispatcher for ClosureDispatcher<F>
where
    F: FnMut(HostEvent) + Send,
{
    fn dispatch(&mut self, event: HostEvent) {
        (self.0)(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ok_reports_success() {
        assert!(Status::OK.is_ok());
        assert!(!Status(1).is_ok());
    }

    #[test]
    fn closure_dispatcher_forwards_events() {
        let mut received = Vec::new();
        {
            let mut dispatcher = ClosureDispatcher(|event: HostEvent| received.push(event));
            dispatcher.dispatch(HostEvent::new(PeerAddress([0; 6]), HostEventKind::StartRinging));
        }
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].kind, HostEventKind::StartRinging);
    }
}
