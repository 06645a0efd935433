// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Hands-Free Profile (HFP) Audio Gateway: the protocol state machines, AT command
//! parser, and connection model that sit above an RFCOMM transport. RFCOMM/L2CAP
//! transport, SDP service discovery, and SCO sample transport are treated as
//! external collaborators; only the interfaces they present here are modeled.

pub mod at;
pub mod byte_utils;
pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod hfp;
pub mod indicators;
pub mod peer;
pub mod protocol;
pub mod registry;
pub mod sdp;
pub mod sm;
pub mod transport;

pub use error::Error;
pub use hfp::{Hfp, HostRequest};
