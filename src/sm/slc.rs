// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The service-level connection state machine: the ordered AT exchange that
//! brings a fresh RFCOMM channel to `SLC_ESTABLISHED`, AG role.

use crate::at::{AtEvent, AtResponse};
use crate::connection::{ConnectionContext, PeerAddress};
use crate::events::{HostEvent, HostEventKind, Status};
use crate::protocol::{AgFeatures, HfFeatures};
use crate::sm::codec::CodecState;

/// The SLC pipeline's current step. Steps whose precondition isn't met (codec
/// negotiation, three-way calling, HF indicators not mutually supported) are
/// skipped entirely rather than represented as a no-op state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlcState {
    AwaitFeatures,
    AwaitCodecList,
    AwaitIndicatorsTest,
    AwaitIndicatorsRead,
    AwaitIndicatorEventsEnable,
    AwaitCallHoldTest,
    AwaitGenericIndicatorsWrite,
    AwaitGenericIndicatorsTest,
    AwaitGenericIndicatorsRead,
    Established,
    Released,
}

impl Default for SlcState {
    fn default() -> Self {
        SlcState::AwaitFeatures
    }
}

/// The result of feeding one [`AtEvent`] to the SLC state machine: zero or more AT
/// lines to send back to the HF, and an optional host event.
#[derive(Debug, Default)]
pub struct SlcOutcome {
    pub responses: Vec<AtResponse>,
    pub host_event: Option<HostEvent>,
}

impl SlcOutcome {
    fn respond(response: AtResponse) -> Self {
        SlcOutcome { responses: vec![response], host_event: None }
    }

    fn respond_then_ok(response: AtResponse) -> Self {
        SlcOutcome { responses: vec![response, AtResponse::Ok], host_event: None }
    }
}

fn codec_negotiation_mutual(ctx: &ConnectionContext) -> bool {
    ctx.ag_features.contains(AgFeatures::CODEC_NEGOTIATION)
        && ctx.hf_features.contains(HfFeatures::CODEC_NEGOTIATION)
}

fn three_way_calling_mutual(ctx: &ConnectionContext) -> bool {
    ctx.ag_features.contains(AgFeatures::THREE_WAY_CALLING)
        && ctx.hf_features.contains(HfFeatures::THREE_WAY_CALLING)
}

fn hf_indicators_mutual(ctx: &ConnectionContext) -> bool {
    ctx.ag_features.contains(AgFeatures::HF_INDICATORS) && ctx.hf_features.contains(HfFeatures::HF_INDICATORS)
}

/// Advances the SLC pipeline. `ctx.slc_state` is read for the current step and
/// written with the next one; the connection's negotiated features, indicators,
/// and codec list are updated as a side effect of processing the matching event.
pub fn advance(ctx: &mut ConnectionContext, event: &AtEvent) -> SlcOutcome {
    let state = ctx.slc_state;
    let outcome = match (state, event) {
        (SlcState::AwaitFeatures, AtEvent::SupportedFeatures(bits)) => {
            ctx.hf_features = HfFeatures::from_bits_truncate(*bits);
            ctx.slc_state = next_after_features(ctx);
            SlcOutcome::respond_then_ok(AtResponse::SupportedFeatures(ctx.ag_features.bits()))
        }
        (SlcState::AwaitCodecList, AtEvent::AvailableCodecs(codecs)) => {
            ctx.hf_supported_codecs =
                codecs.iter().map(|id| crate::protocol::CodecId(*id)).collect();
            // Mirrors the transition `codec::advance` itself makes on `AT+BAC`;
            // this step owns the AT exchange during SLC setup, but the codec SM's
            // own state must also leave `Idle` so a post-SLC `AT+BCC` finds a
            // populated codec list instead of silently reverting.
            ctx.codec_state = CodecState::ReceivedList;
            ctx.slc_state = SlcState::AwaitIndicatorsTest;
            SlcOutcome { responses: vec![AtResponse::Ok], host_event: None }
        }
        (SlcState::AwaitIndicatorsTest, AtEvent::IndicatorsTest) => {
            ctx.slc_state = SlcState::AwaitIndicatorsRead;
            SlcOutcome::respond_then_ok(AtResponse::IndicatorsTest(ctx.ag_indicators.test_response()))
        }
        (SlcState::AwaitIndicatorsRead, AtEvent::IndicatorsRead) => {
            ctx.slc_state = SlcState::AwaitIndicatorEventsEnable;
            SlcOutcome::respond_then_ok(AtResponse::IndicatorsRead(ctx.ag_indicators.status_values()))
        }
        (SlcState::AwaitIndicatorEventsEnable, AtEvent::EnableIndicatorUpdates { mode, .. }) => {
            ctx.indicator_events_enabled = *mode == 3;
            ctx.slc_state = next_after_indicator_enable(ctx);
            SlcOutcome { responses: vec![AtResponse::Ok], host_event: None }
        }
        (SlcState::AwaitCallHoldTest, AtEvent::CallHoldServicesTest) => {
            ctx.slc_state = next_after_call_hold(ctx);
            SlcOutcome::respond_then_ok(AtResponse::CallHoldServicesTest(
                &crate::indicators::CALL_HOLD_SERVICES,
            ))
        }
        (SlcState::AwaitGenericIndicatorsWrite, AtEvent::GenericStatusIndicatorsWrite(uuids)) => {
            let _ = ctx.hf_indicators.set_supported(uuids);
            ctx.slc_state = SlcState::AwaitGenericIndicatorsTest;
            SlcOutcome { responses: vec![AtResponse::Ok], host_event: None }
        }
        (SlcState::AwaitGenericIndicatorsTest, AtEvent::GenericStatusIndicatorsTest) => {
            ctx.slc_state = SlcState::AwaitGenericIndicatorsRead;
            let uuids: Vec<u16> = ctx.hf_indicators.iter().map(|i| i.uuid).collect();
            SlcOutcome::respond_then_ok(AtResponse::GenericStatusIndicatorsTest(uuids))
        }
        (SlcState::AwaitGenericIndicatorsRead, AtEvent::GenericStatusIndicatorsRead) => {
            let entries: Vec<(u16, bool)> = ctx.hf_indicators.iter().map(|i| (i.uuid, i.enabled)).collect();
            ctx.slc_state = SlcState::Established;
            let mut outcome = SlcOutcome::respond_then_ok(AtResponse::GenericStatusIndicatorsRead(entries));
            outcome.host_event =
                Some(HostEvent::new(ctx.peer, HostEventKind::ServiceLevelConnectionEstablished));
            outcome
        }
        (SlcState::Established, AtEvent::OperatorSelectionRead) => SlcOutcome::respond_then_ok(
            AtResponse::OperatorSelectionRead { mode: ctx.operator.mode, operator: ctx.operator.name.clone() },
        ),
        (_, AtEvent::Error) => abort(ctx),
        _ => SlcOutcome { responses: vec![AtResponse::Error], host_event: None },
    };

    // The final step (no generic-indicator exchange) can reach Established directly
    // from the call-hold or indicator-enable step when later optional steps are
    // mutually unsupported; attach the completion event without discarding the
    // response this transition already produced.
    let mut outcome = outcome;
    if matches!(ctx.slc_state, SlcState::Established) && outcome.host_event.is_none() {
        outcome.host_event =
            Some(HostEvent::new(ctx.peer, HostEventKind::ServiceLevelConnectionEstablished));
    }
    outcome
}

fn next_after_features(ctx: &ConnectionContext) -> SlcState {
    if codec_negotiation_mutual(ctx) {
        SlcState::AwaitCodecList
    } else {
        SlcState::AwaitIndicatorsTest
    }
}

fn next_after_indicator_enable(ctx: &ConnectionContext) -> SlcState {
    if three_way_calling_mutual(ctx) {
        SlcState::AwaitCallHoldTest
    } else {
        next_after_call_hold(ctx)
    }
}

fn next_after_call_hold(ctx: &ConnectionContext) -> SlcState {
    if hf_indicators_mutual(ctx) {
        SlcState::AwaitGenericIndicatorsWrite
    } else {
        SlcState::Established
    }
}

/// Releases the SLC pipeline from any non-terminal state, as triggered by a parse
/// error, RFCOMM disconnection, or an explicit `release_service_level_connection`
/// call from the host.
pub fn abort(ctx: &mut ConnectionContext) -> SlcOutcome {
    let was_established = matches!(ctx.slc_state, SlcState::Established);
    ctx.slc_state = SlcState::Released;
    let responses = if was_established { Vec::new() } else { vec![AtResponse::Error] };
    SlcOutcome {
        responses,
        host_event: Some(HostEvent::new(
            ctx.peer,
            HostEventKind::ServiceLevelConnectionReleased { status: Status(1) },
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::RfcommChannelId;
    use crate::protocol::AgFeatures;

    fn context(ag_features: AgFeatures) -> ConnectionContext {
        ConnectionContext::new(PeerAddress([0xD8, 0xBB, 0x2C, 0xDF, 0xF1, 0x08]), RfcommChannelId(1), ag_features)
    }

    #[test]
    fn full_pipeline_with_codec_negotiation_reaches_established() {
        let mut ctx = context(AgFeatures::from_bits_truncate(1007));
        assert_eq!(
            advance(&mut ctx, &AtEvent::SupportedFeatures(1007)).responses,
            vec![AtResponse::SupportedFeatures(1007), AtResponse::Ok]
        );
        assert_eq!(ctx.slc_state, SlcState::AwaitCodecList);

        advance(&mut ctx, &AtEvent::AvailableCodecs(vec![1, 2]));
        assert_eq!(ctx.slc_state, SlcState::AwaitIndicatorsTest);
        assert_eq!(ctx.codec_state, CodecState::ReceivedList);

        advance(&mut ctx, &AtEvent::IndicatorsTest);
        assert_eq!(ctx.slc_state, SlcState::AwaitIndicatorsRead);

        advance(&mut ctx, &AtEvent::IndicatorsRead);
        assert_eq!(ctx.slc_state, SlcState::AwaitIndicatorEventsEnable);

        advance(&mut ctx, &AtEvent::EnableIndicatorUpdates { mode: 3, keyp: 0, disc: 0, ind: 1 });
        assert_eq!(ctx.slc_state, SlcState::AwaitCallHoldTest);

        advance(&mut ctx, &AtEvent::CallHoldServicesTest);
        assert_eq!(ctx.slc_state, SlcState::AwaitGenericIndicatorsWrite);

        advance(&mut ctx, &AtEvent::GenericStatusIndicatorsWrite(vec![1, 2]));
        assert_eq!(ctx.slc_state, SlcState::AwaitGenericIndicatorsTest);

        advance(&mut ctx, &AtEvent::GenericStatusIndicatorsTest);
        assert_eq!(ctx.slc_state, SlcState::AwaitGenericIndicatorsRead);

        let outcome = advance(&mut ctx, &AtEvent::GenericStatusIndicatorsRead);
        assert_eq!(ctx.slc_state, SlcState::Established);
        assert_eq!(
            outcome.host_event.unwrap().kind,
            HostEventKind::ServiceLevelConnectionEstablished
        );
    }

    #[test]
    fn pipeline_without_codec_negotiation_skips_bac_step() {
        let mut ctx = context(AgFeatures::from_bits_truncate(495));
        advance(&mut ctx, &AtEvent::SupportedFeatures(495));
        assert_eq!(ctx.slc_state, SlcState::AwaitIndicatorsTest);
    }

    #[test]
    fn error_event_aborts_and_releases() {
        let mut ctx = context(AgFeatures::from_bits_truncate(1007));
        advance(&mut ctx, &AtEvent::SupportedFeatures(1007));
        let outcome = advance(&mut ctx, &AtEvent::Error);
        assert_eq!(ctx.slc_state, SlcState::Released);
        assert!(matches!(
            outcome.host_event.unwrap().kind,
            HostEventKind::ServiceLevelConnectionReleased { .. }
        ));
    }

    #[test]
    fn parse_error_replies_error_but_does_not_abort_pipeline() {
        let mut ctx = context(AgFeatures::from_bits_truncate(1007));
        advance(&mut ctx, &AtEvent::SupportedFeatures(1007));
        let state_before = ctx.slc_state;
        let outcome = advance(&mut ctx, &AtEvent::ParseError);
        assert_eq!(outcome.responses, vec![AtResponse::Error]);
        assert_eq!(ctx.slc_state, state_before);
    }

    #[test]
    fn unexpected_command_for_current_state_replies_error_without_moving() {
        let mut ctx = context(AgFeatures::from_bits_truncate(1007));
        let outcome = advance(&mut ctx, &AtEvent::IndicatorsTest);
        assert_eq!(outcome.responses, vec![AtResponse::Error]);
        assert_eq!(ctx.slc_state, SlcState::AwaitFeatures);
    }
}
