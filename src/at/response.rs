// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use crate::byte_utils::{join, join_bitmap};

/// An outbound AT response or unsolicited result code. Rendered to bytes with
/// `render`, which never allocates beyond the returned `String`.
#[derive(Debug, Clone, PartialEq)]
pub enum AtResponse {
    Ok,
    Error,
    CmeError(u8),
    SupportedFeatures(u32),
    IndicatorsTest(Vec<(&'static str, u8, u8)>),
    IndicatorsRead(Vec<u8>),
    IndicatorEvent { index: u8, value: u8 },
    CallHoldServicesTest(&'static [&'static str]),
    GenericStatusIndicatorsTest(Vec<u16>),
    GenericStatusIndicatorsRead(Vec<(u16, bool)>),
    OperatorSelectionRead { mode: u8, operator: String },
    CodecSelect(u8),
    Ring,
    CallWaitingNotification(String),
    ClipNotification(String),
}

impl AtResponse {
    pub fn render(&self) -> String {
        match self {
            AtResponse::Ok => "OK\r\n".to_string(),
            AtResponse::Error => "ERROR\r\n".to_string(),
            AtResponse::CmeError(code) => format!("+CME ERROR: {}\r\n", code),
            AtResponse::SupportedFeatures(bits) => format!("+BRSF: {}\r\n", bits),
            AtResponse::IndicatorsTest(indicators) => {
                let rendered: Vec<String> = indicators
                    .iter()
                    .map(|(name, min, max)| format!("(\"{}\",({}-{}))", name, min, max))
                    .collect();
                format!("+CIND: {}\r\n", rendered.join(","))
            }
            AtResponse::IndicatorsRead(values) => {
                let mut buffer = [0u8; 64];
                let len = join(values, &mut buffer);
                let rendered = std::str::from_utf8(&buffer[..len]).unwrap_or("");
                format!("+CIND: {}\r\n", rendered)
            }
            AtResponse::IndicatorEvent { index, value } => format!("+CIEV: {},{}\r\n", index, value),
            AtResponse::CallHoldServicesTest(services) => {
                format!("+CHLD: ({})\r\n", services.join(","))
            }
            AtResponse::GenericStatusIndicatorsTest(uuids) => {
                let rendered: Vec<String> = uuids.iter().map(|u| u.to_string()).collect();
                format!("+BIND: ({})\r\n", rendered.join(","))
            }
            AtResponse::GenericStatusIndicatorsRead(entries) => entries
                .iter()
                .map(|(uuid, enabled)| format!("+BIND: {},{}\r\n", uuid, *enabled as u8))
                .collect::<Vec<_>>()
                .join(""),
            AtResponse::OperatorSelectionRead { mode, operator } => {
                format!("+COPS: {},0,\"{}\"\r\n", mode, operator)
            }
            AtResponse::CodecSelect(id) => format!("+BCS: {}\r\n", id),
            AtResponse::Ring => "RING\r\n".to_string(),
            AtResponse::CallWaitingNotification(number) => format!("+CCWA: \"{}\",128\r\n", number),
            AtResponse::ClipNotification(number) => format!("+CLIP: \"{}\",128\r\n", number),
        }
    }
}

/// Renders a bitmap of enabled/disabled indicator indices as a `+BIA`-style list,
/// used when an AG needs to echo back which individual indicators remain active.
pub fn render_enabled_bitmap(bitmap: u32, count: u8) -> String {
    let mut buffer = [0u8; 64];
    let len = join_bitmap(bitmap, count, &mut buffer);
    std::str::from_utf8(&buffer[..len]).unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_ok_and_error() {
        assert_eq!(AtResponse::Ok.render(), "OK\r\n");
        assert_eq!(AtResponse::Error.render(), "ERROR\r\n");
    }

    #[test]
    fn renders_brsf() {
        assert_eq!(AtResponse::SupportedFeatures(23).render(), "+BRSF: 23\r\n");
    }

    #[test]
    fn renders_cind_test() {
        let response = AtResponse::IndicatorsTest(vec![("service", 0, 1), ("call", 0, 1)]);
        assert_eq!(response.render(), "+CIND: (\"service\",(0-1)),(\"call\",(0-1))\r\n");
    }

    #[test]
    fn renders_cind_read() {
        let response = AtResponse::IndicatorsRead(vec![1, 0, 0, 4, 5, 0, 0]);
        assert_eq!(response.render(), "+CIND: 1,0,0,4,5,0,0\r\n");
    }

    #[test]
    fn renders_ciev() {
        assert_eq!(AtResponse::IndicatorEvent { index: 2, value: 1 }.render(), "+CIEV: 2,1\r\n");
    }

    #[test]
    fn renders_chld_test() {
        let response = AtResponse::CallHoldServicesTest(&["0", "1", "2"]);
        assert_eq!(response.render(), "+CHLD: (0,1,2)\r\n");
    }

    #[test]
    fn renders_bind_test_and_read() {
        assert_eq!(
            AtResponse::GenericStatusIndicatorsTest(vec![1, 2]).render(),
            "+BIND: (1,2)\r\n"
        );
        assert_eq!(
            AtResponse::GenericStatusIndicatorsRead(vec![(1, true), (2, false)]).render(),
            "+BIND: 1,1\r\n+BIND: 2,0\r\n"
        );
    }

    #[test]
    fn renders_bcs() {
        assert_eq!(AtResponse::CodecSelect(2).render(), "+BCS: 2\r\n");
    }

    #[test]
    fn renders_cme_error() {
        assert_eq!(AtResponse::CmeError(3).render(), "+CME ERROR: 3\r\n");
    }
}
