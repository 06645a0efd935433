// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Codec negotiation: picking a common audio codec once the SLC is up, before a
//! synchronous link is opened.

use crate::at::{AtEvent, AtResponse};
use crate::connection::ConnectionContext;
use crate::protocol::CodecId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecState {
    Idle,
    ReceivedList,
    AgSentCommonCodec,
    AgResendCommonCodec,
    Exchanged,
    Error,
}

impl Default for CodecState {
    fn default() -> Self {
        CodecState::Idle
    }
}

#[derive(Debug, Default)]
pub struct CodecOutcome {
    pub responses: Vec<AtResponse>,
    pub exchanged: bool,
}

/// The AG's codec priority order: mSBC preferred over CVSD when both are mutually
/// available, since mSBC gives wideband audio.
const AG_CODEC_PRIORITY: [CodecId; 2] = [CodecId::MSBC, CodecId::CVSD];

fn pick_common_codec(ctx: &ConnectionContext) -> Option<CodecId> {
    AG_CODEC_PRIORITY
        .iter()
        .find(|candidate| ctx.hf_supported_codecs.contains(candidate))
        .copied()
}

/// Advances the codec negotiation state machine. No-op (and not entered at all by
/// the owning peer loop) unless [`ConnectionContext::codec_negotiation_supported`]
/// returns true.
pub fn advance(ctx: &mut ConnectionContext, event: &AtEvent) -> CodecOutcome {
    match (ctx.codec_state, event) {
        (CodecState::Idle, AtEvent::AvailableCodecs(codecs)) => {
            ctx.hf_supported_codecs = codecs.iter().map(|id| CodecId(*id)).collect();
            ctx.codec_state = CodecState::ReceivedList;
            CodecOutcome::default()
        }
        (CodecState::ReceivedList, AtEvent::TriggerCodecConnectionSetup)
        | (CodecState::AgResendCommonCodec, AtEvent::TriggerCodecConnectionSetup) => {
            match pick_common_codec(ctx) {
                Some(codec) => {
                    ctx.selected_codec = codec;
                    ctx.codec_state = CodecState::AgSentCommonCodec;
                    CodecOutcome { responses: vec![AtResponse::CodecSelect(codec.0)], exchanged: false }
                }
                None => {
                    ctx.codec_state = CodecState::Error;
                    CodecOutcome { responses: vec![AtResponse::Error], exchanged: false }
                }
            }
        }
        (CodecState::AgSentCommonCodec, AtEvent::ConfirmCodec(confirmed)) => {
            if *confirmed == ctx.selected_codec.0 {
                ctx.codec_state = CodecState::Exchanged;
                CodecOutcome { responses: vec![AtResponse::Ok], exchanged: true }
            } else {
                ctx.selected_codec = CodecId(*confirmed);
                if ctx.hf_supported_codecs.contains(&CodecId(*confirmed)) {
                    ctx.codec_state = CodecState::AgResendCommonCodec;
                    CodecOutcome {
                        responses: vec![AtResponse::CodecSelect(*confirmed)],
                        exchanged: false,
                    }
                } else {
                    ctx.codec_state = CodecState::Error;
                    CodecOutcome { responses: vec![AtResponse::Error], exchanged: false }
                }
            }
        }
        _ => {
            ctx.codec_state = CodecState::Idle;
            CodecOutcome::default()
        }
    }
}
