// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The AG indicator model: the seven standard AG indicators (service, call,
//! callsetup, battchg, signal, roam, callheld), HF generic status indicators,
//! the network operator record, and the call-hold service token list.

use crate::error::Error;

/// Upper bound on the number of AG indicators, HF indicators, or call-hold
/// services tracked at once. Matches the AT parser's own per-line item bound so a
/// single `AT+BIA`/`AT+BIND` line can always address every entry.
pub const MAX_INDICATORS: usize = 20;

/// A single AG indicator, as reported in response to `AT+CIND=?` and updated via
/// unsolicited `+CIEV` events. `index` is the 1-based position used on the wire by
/// both `+CIEV` and `AT+BIA`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgIndicator {
    pub index: u8,
    pub name: &'static str,
    pub min: u8,
    pub max: u8,
    pub status: u8,
    pub mandatory: bool,
    pub enabled: bool,
    pub status_changed: bool,
}

impl AgIndicator {
    const fn new(index: u8, name: &'static str, min: u8, max: u8, status: u8, mandatory: bool) -> Self {
        AgIndicator { index, name, min, max, status, mandatory, enabled: mandatory, status_changed: false }
    }
}

/// The fixed table of AG indicators this gateway supports, in wire order.
pub const DEFAULT_AG_INDICATORS: [AgIndicator; 7] = [
    AgIndicator::new(1, "service", 0, 1, 1, false),
    AgIndicator::new(2, "call", 0, 1, 0, true),
    AgIndicator::new(3, "callsetup", 0, 3, 0, true),
    AgIndicator::new(4, "battchg", 0, 5, 3, false),
    AgIndicator::new(5, "signal", 0, 5, 5, false),
    AgIndicator::new(6, "roam", 0, 1, 0, false),
    AgIndicator::new(7, "callheld", 0, 2, 0, true),
];

/// The standard call-hold service tokens advertised in response to `AT+CHLD=?`.
pub const CALL_HOLD_SERVICES: [&str; 5] = ["1", "1x", "2", "2x", "3"];

/// A live, mutable set of AG indicators for one connection. Seeded from
/// [`DEFAULT_AG_INDICATORS`] and bounded to [`MAX_INDICATORS`] entries.
#[derive(Debug, Clone)]
pub struct IndicatorTable {
    indicators: Vec<AgIndicator>,
}

impl Default for IndicatorTable {
    fn default() -> Self {
        IndicatorTable { indicators: DEFAULT_AG_INDICATORS.to_vec() }
    }
}

impl IndicatorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgIndicator> {
        self.indicators.iter()
    }

    pub fn by_index(&self, index: u8) -> Option<&AgIndicator> {
        self.indicators.iter().find(|i| i.index == index)
    }

    pub fn by_name(&self, name: &str) -> Option<&AgIndicator> {
        self.indicators.iter().find(|i| i.name == name)
    }

    /// Updates the status value for the indicator at `index`, marking it changed so
    /// the event dispatcher knows to emit a `+CIEV`. Returns an error if `index` is
    /// out of range or the new value falls outside the indicator's declared bounds.
    pub fn set_status(&mut self, index: u8, status: u8) -> Result<(), Error> {
        let indicator = self
            .indicators
            .iter_mut()
            .find(|i| i.index == index)
            .ok_or(Error::InvalidState)?;
        if status < indicator.min || status > indicator.max {
            return Err(Error::InvalidState);
        }
        if indicator.status != status {
            indicator.status = status;
            indicator.status_changed = true;
        }
        Ok(())
    }

    pub fn clear_changed(&mut self, index: u8) {
        if let Some(indicator) = self.indicators.iter_mut().find(|i| i.index == index) {
            indicator.status_changed = false;
        }
    }

    /// Applies an `AT+BIA` write: a per-index `Some(enabled)`/`None` (leave
    /// unchanged) list in wire order. Ignores entries beyond the known indicator
    /// count, and never toggles a mandatory indicator off.
    pub fn apply_bia(&mut self, flags: &[Option<bool>]) {
        for (i, flag) in flags.iter().enumerate() {
            let Some(enabled) = flag else { continue };
            if let Some(indicator) = self.indicators.get_mut(i) {
                if !indicator.mandatory {
                    indicator.enabled = *enabled;
                }
            }
        }
    }

    pub fn status_values(&self) -> Vec<u8> {
        self.indicators.iter().map(|i| i.status).collect()
    }

    pub fn test_response(&self) -> Vec<(&'static str, u8, u8)> {
        self.indicators.iter().map(|i| (i.name, i.min, i.max)).collect()
    }
}

/// An HF generic status indicator, identified by its Bluetooth SIG UUID (e.g.
/// `0x0001` for "enhanced safety", `0x0002` for "battery level").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HfIndicator {
    pub uuid: u16,
    pub enabled: bool,
}

/// The set of HF generic status indicators negotiated over `AT+BIND`. Bounded to
/// [`MAX_INDICATORS`] entries; additional `AT+BIND=` writes beyond the bound are
/// dropped rather than causing an allocation failure.
#[derive(Debug, Clone, Default)]
pub struct HfIndicatorTable {
    indicators: Vec<HfIndicator>,
}

impl HfIndicatorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the set of indicators the HF advertised support for via
    /// `AT+BIND=<uuid>,...`. All start disabled until the HF enables them
    /// individually with `AT+BIND=<uuid>,<1|0>`.
    pub fn set_supported(&mut self, uuids: &[u16]) -> Result<(), Error> {
        if uuids.len() > MAX_INDICATORS {
            return Err(Error::ResourceExhausted("too many HF indicators"));
        }
        self.indicators = uuids.iter().map(|uuid| HfIndicator { uuid: *uuid, enabled: false }).collect();
        Ok(())
    }

    pub fn set_enabled(&mut self, uuid: u16, enabled: bool) {
        if let Some(indicator) = self.indicators.iter_mut().find(|i| i.uuid == uuid) {
            indicator.enabled = enabled;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &HfIndicator> {
        self.indicators.iter()
    }
}

/// The network operator name and selection mode, reported via `AT+COPS?`.
#[derive(Debug, Clone, Default)]
pub struct OperatorInfo {
    pub mode: u8,
    pub name: String,
}
