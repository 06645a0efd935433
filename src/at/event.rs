// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

/// A fully tokenized AT line, ready for dispatch to whichever state machine owns the
/// current connection phase. Exactly one of these is produced per complete line.
#[derive(Debug, Clone, PartialEq)]
pub enum AtEvent {
    SupportedFeatures(u32),
    AvailableCodecs(Vec<u8>),
    IndicatorsTest,
    IndicatorsRead,
    EnableIndicatorUpdates { mode: i64, keyp: i64, disc: i64, ind: i64 },
    /// `AT+BIA=<enabled>,,<enabled>,,,<enabled>`. `None` entries are blanks that leave
    /// the corresponding indicator's enabled bit unchanged.
    UpdateIndividualIndicators(Vec<Option<bool>>),
    CallHoldServicesTest,
    CallHoldAction(i64),
    GenericStatusIndicatorsWrite(Vec<u16>),
    GenericStatusIndicatorsTest,
    GenericStatusIndicatorsRead,
    OperatorSelectionRead,
    OperatorSelectionTest,
    ExtendedErrorEnable(bool),
    TriggerCodecConnectionSetup,
    ConfirmCodec(u8),
    CallAnswered,
    HangUp,
    Ok,
    /// The peer sent the literal `ERROR` result code: a negative acknowledgement of
    /// the last command it received, not a parser failure.
    Error,
    /// The parser itself could not tokenize the line (overflow, stray separator,
    /// unexpected byte). Distinct from [`AtEvent::Error`] so state machines can
    /// reply `ERROR` and hold their current state rather than treating it as a
    /// protocol-level abort.
    ParseError,
    Unknown,
}
