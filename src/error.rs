// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use thiserror::Error;

/// Errors surfaced by the HFP Audio Gateway core. These map to the four error kinds
/// in the component design: parse errors and protocol errors are handled locally by
/// the procedures and rarely escape to this type, transport errors force a state
/// machine to its idle terminal state, and resource exhaustion rejects the triggering
/// API call synchronously.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no connection for the given identifier")]
    NoSuchConnection,
    #[error("resource limit exceeded: {0}")]
    ResourceExhausted(&'static str),
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
    #[error("operation invalid in current state")]
    InvalidState,
    #[error("channel closed")]
    ChannelClosed,
}

/// Errors local to driving a single AT exchange. These never propagate to the host
/// application directly; the owning state machine turns them into an `ERROR` response
/// or a release of the connection, per the component's error handling policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("received an AT line that could not be parsed")]
    Unparsable,
    #[error("received an unexpected command for the current state")]
    UnexpectedCommand,
    #[error("the owning procedure has already terminated")]
    AlreadyTerminated,
}
