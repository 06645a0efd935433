// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Call control: incoming/outgoing call, ringing, answer, terminate, and the
//! indicator propagation that rides along with each transition.

use crate::at::{AtEvent, AtResponse};
use crate::connection::ConnectionContext;
use crate::events::{HostEvent, HostEventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Want4AudioConnection,
    Ring,
    Want4Answer,
    TransferCallStatus,
    TransferCallsetupStatus,
    Active,
}

impl Default for CallState {
    fn default() -> Self {
        CallState::Idle
    }
}

/// The host-originated or transport-originated events this machine reacts to, kept
/// distinct from [`AtEvent`] because not all of them arrive over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEvent {
    IncomingCall,
    OutgoingCall,
    AudioConnectionEstablished,
    HfAnswered,
    HostAnswered,
    HfHungUp,
    HostTerminated,
}

#[derive(Debug, Default)]
pub struct CallOutcome {
    pub responses: Vec<AtResponse>,
    pub host_event: Option<HostEvent>,
    pub request_audio_connect: bool,
}

const CALL_INDICATOR: &str = "call";
const CALLSETUP_INDICATOR: &str = "callsetup";

fn set_indicator(ctx: &mut ConnectionContext, name: &str, value: u8) -> Option<AtResponse> {
    let index = ctx.ag_indicators.by_name(name)?.index;
    ctx.ag_indicators.set_status(index, value).ok()?;
    if !ctx.indicator_events_enabled {
        ctx.ag_indicators.clear_changed(index);
        return None;
    }
    ctx.ag_indicators.clear_changed(index);
    Some(AtResponse::IndicatorEvent { index, value })
}

/// Advances the call state machine for one event. `event` may originate from the
/// host API (`incoming_call`, `answer_call`, `terminate_call`), from the AT parser
/// (`ATA`, `+CHUP`), or from the audio SM (`AudioConnectionEstablished`).
pub fn advance(ctx: &mut ConnectionContext, event: CallEvent) -> CallOutcome {
    match (ctx.call_state, event) {
        (CallState::Idle, CallEvent::OutgoingCall) => {
            let mut responses = Vec::new();
            if let Some(response) = set_indicator(ctx, CALL_INDICATOR, 1) {
                responses.push(response);
            }
            ctx.call_state = CallState::Active;
            CallOutcome { responses, ..Default::default() }
        }
        (CallState::Idle, CallEvent::IncomingCall) => {
            let mut responses = Vec::new();
            if let Some(response) = set_indicator(ctx, CALLSETUP_INDICATOR, 1) {
                responses.push(response);
            }
            if ctx.in_band_ring {
                ctx.call_state = CallState::Want4AudioConnection;
                CallOutcome { responses, request_audio_connect: true, ..Default::default() }
            } else {
                ctx.call_state = CallState::Ring;
                responses.push(AtResponse::Ring);
                CallOutcome { responses, ..Default::default() }
            }
        }
        (CallState::Want4AudioConnection, CallEvent::AudioConnectionEstablished) => {
            ctx.call_state = CallState::Ring;
            CallOutcome {
                host_event: Some(HostEvent::new(ctx.peer, HostEventKind::StartRinging)),
                responses: vec![AtResponse::Ring],
                ..Default::default()
            }
        }
        (CallState::Ring, CallEvent::HfAnswered) | (CallState::Want4Answer, CallEvent::HfAnswered) => {
            answer(ctx)
        }
        (CallState::Ring, CallEvent::HostAnswered) => answer(ctx),
        (_, CallEvent::HfHungUp) | (_, CallEvent::HostTerminated) if ctx.call_state != CallState::Idle => {
            let mut responses = Vec::new();
            if let Some(response) = set_indicator(ctx, CALL_INDICATOR, 0) {
                responses.push(response);
            }
            if let Some(response) = set_indicator(ctx, CALLSETUP_INDICATOR, 0) {
                responses.push(response);
            }
            ctx.call_state = CallState::Idle;
            CallOutcome {
                responses,
                host_event: Some(HostEvent::new(ctx.peer, HostEventKind::CallTerminated)),
                ..Default::default()
            }
        }
        _ => CallOutcome { responses: vec![AtResponse::Error], ..Default::default() },
    }
}

fn answer(ctx: &mut ConnectionContext) -> CallOutcome {
    let mut responses = Vec::new();
    if let Some(response) = set_indicator(ctx, CALL_INDICATOR, 1) {
        responses.push(response);
    }
    if let Some(response) = set_indicator(ctx, CALLSETUP_INDICATOR, 0) {
        responses.push(response);
    }
    ctx.call_state = CallState::TransferCallStatus;
    let mut outcome = CallOutcome {
        responses,
        host_event: Some(HostEvent::new(ctx.peer, HostEventKind::StopRinging)),
        ..Default::default()
    };
    // +CIEV carries no acknowledgement of its own; the transition to ACTIVE happens
    // as soon as the indicator flush above has been handed to the transport.
    ctx.call_state = CallState::Active;
    outcome.responses.push(AtResponse::Ok);
    outcome
}

/// Handles an AT line received while a call is in progress, translating the wire
/// event into the call event it represents.
pub fn advance_from_at(ctx: &mut ConnectionContext, event: &AtEvent) -> Option<CallOutcome> {
    match event {
        AtEvent::CallAnswered => Some(advance(ctx, CallEvent::HfAnswered)),
        AtEvent::HangUp => Some(advance(ctx, CallEvent::HfHungUp)),
        _ => None,
    }
}
