// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

pub mod codec;
pub mod features;

pub use codec::CodecId;
pub use features::{AgFeatures, HfFeatures};
