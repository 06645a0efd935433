// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Per-connection orchestration: feeding bytes from the transport into the AT
//! parser, dispatching the resulting events to whichever state machine owns them,
//! and rendering outgoing AT responses back to the transport.

use crate::at::{AtEvent, AtResponse};
use crate::connection::{ConnectionContext, RfcommChannelId};
use crate::events::{EventDispatcher, HostEvent, HostEventKind};
use crate::sm::audio::ScoTransportEvent;
use crate::sm::call::CallEvent;
use crate::sm::slc::SlcState;
use crate::sm::{audio, call, codec, slc};
use crate::transport::{RfcommTransport, ScoTransport};

/// Feeds one byte, received on `channel`, through the connection's AT parser and
/// into whichever state machine currently owns the dispatch, then renders any
/// resulting AT lines out through `transport`. Returns the host events produced,
/// in order.
pub fn feed_byte(
    ctx: &mut ConnectionContext,
    channel: RfcommChannelId,
    byte: u8,
    transport: &mut impl RfcommTransport,
    sco: &mut impl ScoTransport,
    dispatcher: &mut impl EventDispatcher,
) {
    let Some(event) = ctx.parser.parse(byte, false) else { return };
    dispatch_event(ctx, channel, &event, transport, sco, dispatcher);
}

/// True for the events that belong to the codec negotiation SM. Routing only
/// these while established keeps every other post-SLC command (e.g. `+COPS?`)
/// out of `codec::advance`'s catch-all, which would otherwise revert
/// `codec_state` to `Idle` as a side effect of handling an unrelated command.
fn is_codec_event(event: &AtEvent) -> bool {
    matches!(
        event,
        AtEvent::AvailableCodecs(_) | AtEvent::TriggerCodecConnectionSetup | AtEvent::ConfirmCodec(_)
    )
}

fn dispatch_event(
    ctx: &mut ConnectionContext,
    channel: RfcommChannelId,
    event: &AtEvent,
    transport: &mut impl RfcommTransport,
    sco: &mut impl ScoTransport,
    dispatcher: &mut impl EventDispatcher,
) {
    // Call-control events (ATA, +CHUP) are routed to the call SM regardless of
    // phase; everything else belongs to whichever of SLC/codec is still live.
    if let Some(outcome) = call::advance_from_at(ctx, event) {
        send_all(transport, channel, &outcome.responses);
        emit(dispatcher, outcome.host_event);
        return;
    }

    if matches!(ctx.slc_state, SlcState::Established) && is_codec_event(event) {
        let outcome = codec::advance(ctx, event);
        send_all(transport, channel, &outcome.responses);
        if outcome.exchanged {
            emit(
                dispatcher,
                Some(HostEvent::new(
                    ctx.peer,
                    HostEventKind::CodecsConnectionComplete { codec: ctx.selected_codec },
                )),
            );
            if let Some(audio_outcome) = audio::request_connect(ctx) {
                if let Some(codec) = audio_outcome.request_sco_open {
                    sco.open(ctx.peer, codec);
                }
            }
        }
        return;
    }

    let outcome = slc::advance(ctx, event);
    send_all(transport, channel, &outcome.responses);
    emit(dispatcher, outcome.host_event);
}

/// Drives the audio state machine from an SCO transport event, emitting any
/// resulting host event and, if audio just came up while a call is ringing,
/// advancing the call SM in turn.
pub fn on_sco_event(
    ctx: &mut ConnectionContext,
    event: ScoTransportEvent,
    dispatcher: &mut impl EventDispatcher,
) {
    let outcome = audio::on_transport_event(ctx, event);
    emit(dispatcher, outcome.host_event);
    if matches!(event, ScoTransportEvent::Connected(_)) {
        let call_outcome = call::advance(ctx, CallEvent::AudioConnectionEstablished);
        emit(dispatcher, call_outcome.host_event);
    }
}

fn send_all(transport: &mut impl RfcommTransport, channel: RfcommChannelId, responses: &[AtResponse]) {
    if responses.is_empty() {
        return;
    }
    if !transport.can_send_now(channel) {
        // The transport will re-notify writability; responses are regenerated by
        // re-entering the same state machine step, so nothing is buffered here.
        return;
    }
    let mut bytes = Vec::new();
    for response in responses {
        bytes.extend_from_slice(response.render().as_bytes());
    }
    transport.send(channel, &bytes);
}

fn emit(dispatcher: &mut impl EventDispatcher, event: Option<HostEvent>) {
    if let Some(event) = event {
        dispatcher.dispatch(event);
    }
}
