// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The four interleaved state machines that drive one HFP connection: service-level
//! connection setup, codec negotiation, audio (SCO) connection, and call control.
//! Each is a tagged variant; a transition consumes an event and returns the next
//! state plus whatever AT responses and host events it produces, rather than
//! mutating fields piecewise.

pub mod audio;
pub mod call;
pub mod codec;
pub mod slc;

pub use audio::AudioState;
pub use call::CallState;
pub use codec::CodecState;
pub use slc::SlcState;
