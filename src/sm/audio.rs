// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Audio (SCO/eSCO) connection state machine: requesting and tearing down the
//! synchronous link once the SLC (and, where applicable, codec negotiation) is
//! settled.

use crate::connection::{ConnectionContext, ScoHandle};
use crate::events::{HostEvent, HostEventKind, Status};
use crate::protocol::CodecId;
use crate::sm::slc::SlcState;

// `W4_SCO_CONNECTED`/`W4_SCO_DISCONNECTED` are collapsed into `Want2ConnectSco`/
// `Want2DisconnectSco`: unlike the RFCOMM side there's no write-credit gate on
// `ScoTransport::open`/`close`, so a request and the wait for its outcome are the
// same state here rather than two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioState {
    Idle,
    Want2ConnectSco,
    Established,
    Want2DisconnectSco,
}

impl Default for AudioState {
    fn default() -> Self {
        AudioState::Idle
    }
}

/// An event arriving from the synchronous-link half of the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoTransportEvent {
    Connected(ScoHandle),
    ConnectFailed,
    Disconnected,
}

#[derive(Debug, Default)]
pub struct AudioOutcome {
    pub host_event: Option<HostEvent>,
    pub request_sco_open: Option<CodecId>,
    pub request_sco_close: bool,
}

/// True when the connection is allowed to enter `Want2ConnectSco`: the SLC must be
/// up, and codec negotiation (if mutually supported) must have finished.
fn can_open_audio(ctx: &ConnectionContext) -> bool {
    matches!(ctx.slc_state, SlcState::Established)
        && (!ctx.codec_negotiation_supported()
            || matches!(ctx.codec_state, crate::sm::codec::CodecState::Exchanged))
}

/// Called by the host-facing API (`establish_audio_connection`) or by the call SM
/// when it needs audio up before ringing. Returns `None` if the precondition isn't
/// met, in which case the caller should refuse the request synchronously.
pub fn request_connect(ctx: &mut ConnectionContext) -> Option<AudioOutcome> {
    if !can_open_audio(ctx) || !matches!(ctx.audio_state, AudioState::Idle) {
        return None;
    }
    ctx.audio_state = AudioState::Want2ConnectSco;
    Some(AudioOutcome { request_sco_open: Some(ctx.selected_codec), ..Default::default() })
}

pub fn request_disconnect(ctx: &mut ConnectionContext) -> Option<AudioOutcome> {
    if !matches!(ctx.audio_state, AudioState::Established) {
        return None;
    }
    ctx.audio_state = AudioState::Want2DisconnectSco;
    Some(AudioOutcome { request_sco_close: true, ..Default::default() })
}

/// Feeds a transport-level SCO event. A disconnected event always drives the
/// machine back to `Idle`, regardless of which state it was in.
pub fn on_transport_event(ctx: &mut ConnectionContext, event: ScoTransportEvent) -> AudioOutcome {
    match event {
        ScoTransportEvent::Connected(handle) => {
            ctx.sco_handle = Some(handle);
            ctx.audio_state = AudioState::Established;
            AudioOutcome {
                host_event: Some(HostEvent::new(
                    ctx.peer,
                    HostEventKind::AudioConnectionEstablished { codec: ctx.selected_codec },
                )),
                ..Default::default()
            }
        }
        ScoTransportEvent::ConnectFailed => {
            ctx.audio_state = AudioState::Idle;
            AudioOutcome {
                host_event: Some(HostEvent::new(
                    ctx.peer,
                    HostEventKind::AudioConnectionReleased { status: Status(1) },
                )),
                ..Default::default()
            }
        }
        ScoTransportEvent::Disconnected => {
            let was_established = matches!(ctx.audio_state, AudioState::Established);
            ctx.sco_handle = None;
            ctx.audio_state = AudioState::Idle;
            let host_event = was_established.then(|| {
                HostEvent::new(ctx.peer, HostEventKind::AudioConnectionReleased { status: Status(0) })
            });
            AudioOutcome { host_event, ..Default::default() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{PeerAddress, RfcommChannelId};
    use crate::protocol::AgFeatures;
    use crate::sm::codec::CodecState;

    fn established_context() -> ConnectionContext {
        let mut ctx = ConnectionContext::new(PeerAddress([0; 6]), RfcommChannelId(1), AgFeatures::empty());
        ctx.slc_state = SlcState::Established;
        ctx
    }

    #[test]
    fn refuses_connect_before_slc_established() {
        let mut ctx = ConnectionContext::new(PeerAddress([0; 6]), RfcommChannelId(1), AgFeatures::empty());
        assert!(request_connect(&mut ctx).is_none());
    }

    #[test]
    fn refuses_connect_before_codec_exchanged_when_negotiated() {
        let mut ctx = established_context();
        ctx.ag_features = AgFeatures::CODEC_NEGOTIATION;
        ctx.hf_features = crate::protocol::HfFeatures::CODEC_NEGOTIATION;
        assert!(request_connect(&mut ctx).is_none());
    }

    #[test]
    fn connects_with_cvsd_when_codec_negotiation_unsupported() {
        let mut ctx = established_context();
        let outcome = request_connect(&mut ctx).unwrap();
        assert_eq!(outcome.request_sco_open, Some(CodecId::CVSD));
        assert_eq!(ctx.audio_state, AudioState::Want2ConnectSco);
    }

    #[test]
    fn connects_once_codec_exchanged() {
        let mut ctx = established_context();
        ctx.ag_features = AgFeatures::CODEC_NEGOTIATION;
        ctx.hf_features = crate::protocol::HfFeatures::CODEC_NEGOTIATION;
        ctx.codec_state = CodecState::Exchanged;
        ctx.selected_codec = CodecId::MSBC;
        let outcome = request_connect(&mut ctx).unwrap();
        assert_eq!(outcome.request_sco_open, Some(CodecId::MSBC));
    }

    #[test]
    fn sco_connected_emits_established_event() {
        let mut ctx = established_context();
        request_connect(&mut ctx).unwrap();
        let outcome = on_transport_event(&mut ctx, ScoTransportEvent::Connected(ScoHandle(7)));
        assert_eq!(ctx.audio_state, AudioState::Established);
        assert_eq!(ctx.sco_handle, Some(ScoHandle(7)));
        assert!(outcome.host_event.is_some());
    }

    #[test]
    fn disconnect_always_returns_to_idle() {
        let mut ctx = established_context();
        request_connect(&mut ctx).unwrap();
        on_transport_event(&mut ctx, ScoTransportEvent::Connected(ScoHandle(1)));
        let outcome = on_transport_event(&mut ctx, ScoTransportEvent::Disconnected);
        assert_eq!(ctx.audio_state, AudioState::Idle);
        assert!(ctx.sco_handle.is_none());
        assert!(outcome.host_event.is_some());
    }
}
