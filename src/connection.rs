// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Per-connection state: the data a single HF peer's slc/codec/audio/call state
//! machines, AT parser, and indicator tables live on.

use crate::at::AtParser;
use crate::indicators::{HfIndicatorTable, IndicatorTable, OperatorInfo};
use crate::protocol::{AgFeatures, CodecId, HfFeatures};
use crate::sm::audio::AudioState;
use crate::sm::call::CallState;
use crate::sm::codec::CodecState;
use crate::sm::slc::SlcState;

/// A Bluetooth device address, six octets, printed colon-separated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerAddress(pub [u8; 6]);

impl std::fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let b = self.0;
        write!(f, "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}", b[0], b[1], b[2], b[3], b[4], b[5])
    }
}

/// An RFCOMM server channel / DLCI pairing identifying one transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RfcommChannelId(pub u16);

/// A synchronous connection handle assigned once audio is established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScoHandle(pub u16);

/// All mutable state owned by one HF peer connection: the four interleaved state
/// machines, the shared AT parser, negotiated feature bitmaps, and the indicator /
/// call-hold / codec tables exchanged during SLC setup.
#[derive(Debug)]
pub struct ConnectionContext {
    pub peer: PeerAddress,
    pub channel: RfcommChannelId,
    pub sco_handle: Option<ScoHandle>,

    pub slc_state: SlcState,
    pub codec_state: CodecState,
    pub audio_state: AudioState,
    pub call_state: CallState,

    pub parser: AtParser,

    pub hf_features: HfFeatures,
    pub ag_features: AgFeatures,
    pub hf_supported_codecs: Vec<CodecId>,
    pub selected_codec: CodecId,

    pub ag_indicators: IndicatorTable,
    pub hf_indicators: HfIndicatorTable,
    pub operator: OperatorInfo,

    pub extended_errors_enabled: bool,
    pub in_band_ring: bool,
    /// Set by `AT+CMER`; gates whether `+CIEV` is ever transmitted for this peer.
    pub indicator_events_enabled: bool,
}

impl ConnectionContext {
    pub fn new(peer: PeerAddress, channel: RfcommChannelId, ag_features: AgFeatures) -> Self {
        ConnectionContext {
            peer,
            channel,
            sco_handle: None,
            slc_state: SlcState::default(),
            codec_state: CodecState::default(),
            audio_state: AudioState::default(),
            call_state: CallState::default(),
            parser: AtParser::new(),
            hf_features: HfFeatures::empty(),
            ag_features,
            hf_supported_codecs: Vec::new(),
            selected_codec: CodecId::default(),
            ag_indicators: IndicatorTable::new(),
            hf_indicators: HfIndicatorTable::new(),
            operator: OperatorInfo::default(),
            extended_errors_enabled: false,
            in_band_ring: false,
            indicator_events_enabled: false,
        }
    }

    /// Whether both sides have advertised codec negotiation support; if not, the
    /// codec state machine is skipped entirely and CVSD is assumed.
    pub fn codec_negotiation_supported(&self) -> bool {
        self.hf_features.supports_codec_negotiation() && self.ag_features.supports_codec_negotiation()
    }

    pub fn slc_established(&self) -> bool {
        matches!(self.slc_state, SlcState::Established)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_address_formats_colon_separated() {
        let addr = PeerAddress([0xD8, 0xBB, 0x2C, 0xDF, 0xF1, 0x08]);
        assert_eq!(addr.to_string(), "D8:BB:2C:DF:F1:08");
    }

    #[test]
    fn fresh_context_has_no_codec_negotiation_until_both_sides_advertise_it() {
        let ctx = ConnectionContext::new(PeerAddress([0; 6]), RfcommChannelId(1), AgFeatures::CODEC_NEGOTIATION);
        assert!(!ctx.codec_negotiation_supported());
    }

    #[test]
    fn codec_negotiation_requires_both_sides() {
        let mut ctx = ConnectionContext::new(PeerAddress([0; 6]), RfcommChannelId(1), AgFeatures::CODEC_NEGOTIATION);
        ctx.hf_features = HfFeatures::CODEC_NEGOTIATION;
        assert!(ctx.codec_negotiation_supported());
    }
}
