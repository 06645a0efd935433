// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Startup configuration for the audio gateway: which optional HFP features this
//! instance advertises, and the RFCOMM channel it listens on. Loaded from a JSON
//! file or built programmatically by the host binary.

use serde::{Deserialize, Serialize};

use crate::protocol::AgFeatures;

/// The feature set this gateway advertises in `AT+BRSF`, expressed as named flags
/// rather than the raw bitmap so a config file stays readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioGatewayFeatureSupport {
    pub three_way_calling: bool,
    pub echo_canceling_noise_reduction: bool,
    pub voice_recognition: bool,
    pub in_band_ring_tone: bool,
    pub attach_phone_number_to_voice_tag: bool,
    pub reject_incoming_call: bool,
    pub enhanced_call_status: bool,
    pub enhanced_call_control: bool,
    pub extended_error_codes: bool,
    pub codec_negotiation: bool,
    pub hf_indicators: bool,
    pub esco_s4_settings: bool,
}

impl Default for AudioGatewayFeatureSupport {
    fn default() -> Self {
        AudioGatewayFeatureSupport {
            three_way_calling: true,
            echo_canceling_noise_reduction: true,
            voice_recognition: false,
            in_band_ring_tone: true,
            attach_phone_number_to_voice_tag: false,
            reject_incoming_call: true,
            enhanced_call_status: true,
            enhanced_call_control: false,
            extended_error_codes: true,
            codec_negotiation: true,
            hf_indicators: true,
            esco_s4_settings: true,
        }
    }
}

impl AudioGatewayFeatureSupport {
    pub fn to_features(&self) -> AgFeatures {
        let mut features = AgFeatures::empty();
        features.set(AgFeatures::THREE_WAY_CALLING, self.three_way_calling);
        features.set(AgFeatures::NR_EC, self.echo_canceling_noise_reduction);
        features.set(AgFeatures::VOICE_RECOGNITION, self.voice_recognition);
        features.set(AgFeatures::IN_BAND_RING, self.in_band_ring_tone);
        features.set(AgFeatures::ATTACH_VOICE_TAG, self.attach_phone_number_to_voice_tag);
        features.set(AgFeatures::REJECT_CALL, self.reject_incoming_call);
        features.set(AgFeatures::ENHANCED_CALL_STATUS, self.enhanced_call_status);
        features.set(AgFeatures::ENHANCED_CALL_CONTROL, self.enhanced_call_control);
        features.set(AgFeatures::EXTENDED_ERROR_CODES, self.extended_error_codes);
        features.set(AgFeatures::CODEC_NEGOTIATION, self.codec_negotiation);
        features.set(AgFeatures::HF_INDICATORS, self.hf_indicators);
        features.set(AgFeatures::ESCO_S4, self.esco_s4_settings);
        features
    }
}

/// Top-level configuration for the gateway binary: which RFCOMM channel to
/// register the HFP service on and which features to advertise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioGatewayConfig {
    pub rfcomm_channel: u8,
    pub service_name: String,
    #[serde(default)]
    pub features: AudioGatewayFeatureSupport,
}

impl Default for AudioGatewayConfig {
    fn default() -> Self {
        AudioGatewayConfig {
            rfcomm_channel: 1,
            service_name: "Hands-Free Audio Gateway".to_string(),
            features: AudioGatewayFeatureSupport::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_enables_codec_negotiation() {
        let config = AudioGatewayConfig::default();
        assert!(config.features.to_features().contains(AgFeatures::CODEC_NEGOTIATION));
    }

    #[test]
    fn disabling_a_feature_clears_its_bit() {
        let mut support = AudioGatewayFeatureSupport::default();
        support.codec_negotiation = false;
        assert!(!support.to_features().contains(AgFeatures::CODEC_NEGOTIATION));
    }

    #[test]
    fn round_trips_through_json() {
        let config = AudioGatewayConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AudioGatewayConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.rfcomm_channel, config.rfcomm_channel);
    }
}
