// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Feature bitmaps exchanged during `AT+BRSF`. Bit positions are fixed by the HFP
//! specification and must not be renumbered.

use bitflags::bitflags;

bitflags! {
    /// Features advertised by the Hands-Free unit.
    #[derive(Default)]
    pub struct HfFeatures: u32 {
        const NR_EC               = 1 << 0;
        const THREE_WAY_CALLING   = 1 << 1;
        const CLI_PRESENTATION    = 1 << 2;
        const VOICE_RECOGNITION   = 1 << 3;
        const REMOTE_VOLUME       = 1 << 4;
        const ENHANCED_CALL_STATUS = 1 << 5;
        const ENHANCED_CALL_CONTROL = 1 << 6;
        const CODEC_NEGOTIATION   = 1 << 7;
        const HF_INDICATORS       = 1 << 8;
        const ESCO_S4             = 1 << 9;
    }
}

bitflags! {
    /// Features advertised by the Audio Gateway.
    #[derive(Default)]
    pub struct AgFeatures: u32 {
        const THREE_WAY_CALLING   = 1 << 0;
        const NR_EC               = 1 << 1;
        const VOICE_RECOGNITION   = 1 << 2;
        const IN_BAND_RING        = 1 << 3;
        const ATTACH_VOICE_TAG    = 1 << 4;
        const REJECT_CALL         = 1 << 5;
        const ENHANCED_CALL_STATUS = 1 << 6;
        const ENHANCED_CALL_CONTROL = 1 << 7;
        const EXTENDED_ERROR_CODES = 1 << 8;
        const CODEC_NEGOTIATION   = 1 << 9;
        const HF_INDICATORS       = 1 << 10;
        const ESCO_S4             = 1 << 11;
    }
}

impl HfFeatures {
    pub fn supports_codec_negotiation(&self) -> bool {
        self.contains(Self::CODEC_NEGOTIATION)
    }
}

impl AgFeatures {
    pub fn supports_codec_negotiation(&self) -> bool {
        self.contains(Self::CODEC_NEGOTIATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hf_bit_positions_match_hfp_spec() {
        assert_eq!(HfFeatures::NR_EC.bits(), 1);
        assert_eq!(HfFeatures::THREE_WAY_CALLING.bits(), 2);
        assert_eq!(HfFeatures::CODEC_NEGOTIATION.bits(), 1 << 7);
        assert_eq!(HfFeatures::HF_INDICATORS.bits(), 1 << 8);
    }

    #[test]
    fn ag_bit_positions_match_hfp_spec() {
        assert_eq!(AgFeatures::THREE_WAY_CALLING.bits(), 1);
        assert_eq!(AgFeatures::IN_BAND_RING.bits(), 1 << 3);
        assert_eq!(AgFeatures::CODEC_NEGOTIATION.bits(), 1 << 9);
        assert_eq!(AgFeatures::HF_INDICATORS.bits(), 1 << 10);
    }

    #[test]
    fn example_feature_values_from_interop_tests() {
        // 1007 = 0b1111101111 : codec negotiation supported.
        let with_codec = AgFeatures::from_bits_truncate(1007);
        assert!(with_codec.supports_codec_negotiation());
        // 495 = 0b0111101111 : codec negotiation not supported.
        let without_codec = AgFeatures::from_bits_truncate(495);
        assert!(!without_codec.supports_codec_negotiation());
    }
}
