// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

/// An audio codec identifier as exchanged in `AT+BAC`/`AT+BCS`. HFP currently
/// defines two: CVSD is mandatory, mSBC is negotiated when both peers advertise
/// codec-negotiation support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodecId(pub u8);

impl CodecId {
    pub const CVSD: CodecId = CodecId(1);
    pub const MSBC: CodecId = CodecId(2);
}

impl Default for CodecId {
    fn default() -> Self {
        CodecId::CVSD
    }
}
