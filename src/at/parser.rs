// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use super::event::AtEvent;
use super::token::{match_header, AtToken};

/// Maximum size, in bytes, of a single AT item (a header token or one comma-separated
/// parameter). The parser reuses one buffer of this size across every item in a line,
/// which keeps its memory footprint constant regardless of line length.
pub const MAX_ITEM_LEN: usize = 20;

/// Maximum number of comma-separated items the parser will accumulate for one line
/// before treating the line as malformed.
const MAX_ITEMS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Accumulating the command token, up to `=`, `?`, or end of line.
    CmdHeader,
    /// Deciding whether `=` is followed by a parameter list or a bare `?` (test form).
    SecondItem,
    /// Consuming the trailing `\r`/`\n` that must follow a `=?` test marker.
    ThirdItem,
    /// Accumulating the comma-separated parameter list that follows `=`.
    CmdSequence,
}

/// A streaming, byte-at-a-time AT command tokenizer. Never blocks, never allocates
/// beyond the fixed-size item buffer and a bounded `Vec` of parsed items, and never
/// holds more than one line's worth of state. Matches the phase names used by the
/// original line-buffer design: `CMD_HEADER`, `CMD_SEQUENCE`, `SECOND_ITEM`, and
/// `THIRD_ITEM`.
#[derive(Debug, Clone)]
pub struct AtParser {
    phase: Phase,
    command: AtToken,
    buffer: [u8; MAX_ITEM_LEN],
    buffer_len: usize,
    items: Vec<i64>,
    item_present: Vec<bool>,
    /// Whether whitespace outside the header is preserved rather than skipped. Used
    /// for parameters that carry free-form text rather than decimal numbers.
    pub keep_separator: bool,
    saw_at_prefix: u8,
    /// Set when `ThirdItem` was reached via `=?` rather than a bare `?`, to
    /// distinguish the test form from the read form for tokens that support both.
    entered_via_equals: bool,
}

impl Default for AtParser {
    fn default() -> Self {
        Self::new()
    }
}

impl AtParser {
    pub fn new() -> Self {
        Self {
            phase: Phase::CmdHeader,
            command: AtToken::Unknown,
            buffer: [0; MAX_ITEM_LEN],
            buffer_len: 0,
            items: Vec::new(),
            item_present: Vec::new(),
            keep_separator: false,
            saw_at_prefix: 0,
            entered_via_equals: false,
        }
    }

    /// Returns the parser to its initial state without producing an event. Used both
    /// after a line has been fully consumed and when the parser encounters an error.
    fn reset(&mut self) {
        self.phase = Phase::CmdHeader;
        self.command = AtToken::Unknown;
        self.buffer_len = 0;
        self.items.clear();
        self.item_present.clear();
        self.saw_at_prefix = 0;
        self.entered_via_equals = false;
    }

    fn header_text(&self) -> &str {
        std::str::from_utf8(&self.buffer[..self.buffer_len]).unwrap_or("")
    }

    /// Feeds a single byte, received from the peer (or from the local AG, when
    /// `is_hands_free` is true and the parser is running the symmetric HF role), into
    /// the tokenizer. Returns `Some(event)` exactly when a complete line has been
    /// consumed, `None` while a line is still in progress.
    ///
    /// On malformed input, the parser resets to `CMD_HEADER` and returns
    /// `Some(AtEvent::Error)`, which the owning state machine treats as a negative
    /// acknowledgement from the peer.
    pub fn parse(&mut self, byte: u8, is_hands_free: bool) -> Option<AtEvent> {
        let _ = is_hands_free; // role only affects which dispatcher consumes the event
        match self.phase {
            Phase::CmdHeader => self.feed_header(byte),
            Phase::SecondItem => self.feed_second_item(byte),
            Phase::ThirdItem => self.feed_third_item(byte),
            Phase::CmdSequence => self.feed_sequence(byte),
        }
    }

    fn push_header_byte(&mut self, byte: u8) -> Option<AtEvent> {
        if !self.keep_separator && (byte == b' ' || byte == b'\t') {
            return None;
        }
        if self.buffer_len >= MAX_ITEM_LEN {
            return Some(self.fail());
        }
        self.buffer[self.buffer_len] = byte;
        self.buffer_len += 1;
        None
    }

    fn feed_header(&mut self, byte: u8) -> Option<AtEvent> {
        // Swallow a leading "AT" prefix; it carries no information once the header
        // token itself is recognized.
        if self.saw_at_prefix < 2 && self.buffer_len == 0 {
            let expected = if self.saw_at_prefix == 0 { b'A' } else { b'T' };
            if byte.eq_ignore_ascii_case(&expected) {
                self.saw_at_prefix += 1;
                return None;
            }
        }

        match byte {
            b'\r' | b'\n' => {
                self.command = match_header(self.header_text());
                Some(self.finish_bare())
            }
            b'=' => {
                self.command = match_header(self.header_text());
                self.buffer_len = 0;
                self.phase = Phase::SecondItem;
                None
            }
            b'?' => {
                self.command = match_header(self.header_text());
                self.buffer_len = 0;
                self.entered_via_equals = false;
                self.phase = Phase::ThirdItem;
                None
            }
            b',' => Some(self.fail()),
            _ => self.push_header_byte(byte),
        }
    }

    /// Entered right after `=`. A `?` here means a `=?` test form; anything else
    /// begins the first parameter of a write/execute form.
    fn feed_second_item(&mut self, byte: u8) -> Option<AtEvent> {
        if byte == b'?' {
            self.entered_via_equals = true;
            self.phase = Phase::ThirdItem;
            return None;
        }
        self.phase = Phase::CmdSequence;
        self.feed_sequence(byte)
    }

    /// Consumes the line terminator that follows a bare `?` or a `=?` test marker.
    fn feed_third_item(&mut self, byte: u8) -> Option<AtEvent> {
        match byte {
            b'\r' | b'\n' => {
                let event = self.finish_test_or_read();
                Some(event)
            }
            _ => Some(self.fail()),
        }
    }

    fn feed_sequence(&mut self, byte: u8) -> Option<AtEvent> {
        match byte {
            b',' => {
                self.commit_item();
                if self.items.len() >= MAX_ITEMS {
                    return Some(self.fail());
                }
                None
            }
            b'\r' | b'\n' => {
                self.commit_item();
                Some(self.finish_with_items())
            }
            _ => {
                if !self.keep_separator && (byte == b' ' || byte == b'\t') {
                    return None;
                }
                if self.buffer_len >= MAX_ITEM_LEN {
                    return Some(self.fail());
                }
                self.buffer[self.buffer_len] = byte;
                self.buffer_len += 1;
                None
            }
        }
    }

    fn commit_item(&mut self) {
        if self.buffer_len == 0 {
            self.items.push(0);
            self.item_present.push(false);
        } else {
            let text = std::str::from_utf8(&self.buffer[..self.buffer_len]).unwrap_or("");
            self.items.push(text.parse::<i64>().unwrap_or(0));
            self.item_present.push(true);
        }
        self.buffer_len = 0;
    }

    fn fail(&mut self) -> AtEvent {
        self.reset();
        AtEvent::ParseError
    }

    fn finish_bare(&mut self) -> AtEvent {
        let event = match self.command {
            AtToken::Ata => AtEvent::CallAnswered,
            AtToken::Chup => AtEvent::HangUp,
            AtToken::Bcc => AtEvent::TriggerCodecConnectionSetup,
            AtToken::Ok => AtEvent::Ok,
            AtToken::Error => AtEvent::Error,
            AtToken::Unknown => AtEvent::Unknown,
            _ => AtEvent::ParseError,
        };
        self.reset();
        event
    }

    fn finish_test_or_read(&mut self) -> AtEvent {
        // `ThirdItem` is reached either from a bare `?` (read form, e.g. `AT+CIND?`)
        // or from a `=?` marker (test form, e.g. `AT+CIND=?`); `entered_via_equals`
        // records which.
        let event = match self.command {
            AtToken::Cind => {
                if self.saw_equals() {
                    AtEvent::IndicatorsTest
                } else {
                    AtEvent::IndicatorsRead
                }
            }
            AtToken::Chld => AtEvent::CallHoldServicesTest,
            AtToken::Bind => {
                if self.saw_equals() {
                    AtEvent::GenericStatusIndicatorsTest
                } else {
                    AtEvent::GenericStatusIndicatorsRead
                }
            }
            AtToken::Cops => {
                if self.saw_equals() {
                    AtEvent::OperatorSelectionTest
                } else {
                    AtEvent::OperatorSelectionRead
                }
            }
            _ => AtEvent::ParseError,
        };
        self.reset();
        event
    }

    fn saw_equals(&self) -> bool {
        self.entered_via_equals
    }

    fn finish_with_items(&mut self) -> AtEvent {
        let event = match self.command {
            AtToken::Brsf => AtEvent::SupportedFeatures(*self.items.get(0).unwrap_or(&0) as u32),
            AtToken::Bac => AtEvent::AvailableCodecs(self.items.iter().map(|v| *v as u8).collect()),
            AtToken::Cmer => AtEvent::EnableIndicatorUpdates {
                mode: *self.items.get(0).unwrap_or(&0),
                keyp: *self.items.get(1).unwrap_or(&0),
                disc: *self.items.get(2).unwrap_or(&0),
                ind: *self.items.get(3).unwrap_or(&0),
            },
            AtToken::Bia => {
                let flags = self
                    .items
                    .iter()
                    .zip(self.item_present.iter())
                    .map(|(v, present)| if *present { Some(*v != 0) } else { None })
                    .collect();
                AtEvent::UpdateIndividualIndicators(flags)
            }
            AtToken::Chld => AtEvent::CallHoldAction(*self.items.get(0).unwrap_or(&0)),
            AtToken::Bind => {
                AtEvent::GenericStatusIndicatorsWrite(self.items.iter().map(|v| *v as u16).collect())
            }
            AtToken::Cmee => AtEvent::ExtendedErrorEnable(*self.items.get(0).unwrap_or(&0) != 0),
            AtToken::Bcs => AtEvent::ConfirmCodec(*self.items.get(0).unwrap_or(&0) as u8),
            _ => AtEvent::ParseError,
        };
        self.reset();
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_line(parser: &mut AtParser, line: &str) -> AtEvent {
        let mut last = None;
        for byte in line.as_bytes() {
            if let Some(event) = parser.parse(*byte, false) {
                last = Some(event);
            }
        }
        last.expect("line did not produce an event")
    }

    #[test]
    fn parses_brsf_with_single_parameter() {
        let mut parser = AtParser::new();
        assert_eq!(feed_line(&mut parser, "AT+BRSF=195\r"), AtEvent::SupportedFeatures(195));
    }

    #[test]
    fn parses_bac_with_multiple_codecs() {
        let mut parser = AtParser::new();
        assert_eq!(
            feed_line(&mut parser, "AT+BAC=1,2\r"),
            AtEvent::AvailableCodecs(vec![1, 2])
        );
    }

    #[test]
    fn parses_cind_test_and_read_forms() {
        let mut parser = AtParser::new();
        assert_eq!(feed_line(&mut parser, "AT+CIND=?\r"), AtEvent::IndicatorsTest);
        assert_eq!(feed_line(&mut parser, "AT+CIND?\r"), AtEvent::IndicatorsRead);
    }

    #[test]
    fn parses_cmer_four_parameters() {
        let mut parser = AtParser::new();
        assert_eq!(
            feed_line(&mut parser, "AT+CMER=3,0,0,1\r"),
            AtEvent::EnableIndicatorUpdates { mode: 3, keyp: 0, disc: 0, ind: 1 }
        );
    }

    #[test]
    fn parses_bia_with_blank_entries() {
        let mut parser = AtParser::new();
        assert_eq!(
            feed_line(&mut parser, "AT+BIA=1,,0,,,1\r"),
            AtEvent::UpdateIndividualIndicators(vec![
                Some(true),
                None,
                Some(false),
                None,
                None,
                Some(true),
            ])
        );
    }

    #[test]
    fn parses_chld_test_and_write_forms() {
        let mut parser = AtParser::new();
        assert_eq!(feed_line(&mut parser, "AT+CHLD=?\r"), AtEvent::CallHoldServicesTest);
        assert_eq!(feed_line(&mut parser, "AT+CHLD=1\r"), AtEvent::CallHoldAction(1));
    }

    #[test]
    fn parses_bind_test_read_and_write_forms() {
        let mut parser = AtParser::new();
        assert_eq!(
            feed_line(&mut parser, "AT+BIND=?\r"),
            AtEvent::GenericStatusIndicatorsTest
        );
        assert_eq!(
            feed_line(&mut parser, "AT+BIND?\r"),
            AtEvent::GenericStatusIndicatorsRead
        );
        assert_eq!(
            feed_line(&mut parser, "AT+BIND=1,2\r"),
            AtEvent::GenericStatusIndicatorsWrite(vec![1, 2])
        );
    }

    #[test]
    fn parses_cops_test_and_read_forms() {
        let mut parser = AtParser::new();
        assert_eq!(
            feed_line(&mut parser, "AT+COPS=?\r"),
            AtEvent::OperatorSelectionTest
        );
        assert_eq!(feed_line(&mut parser, "AT+COPS?\r"), AtEvent::OperatorSelectionRead);
    }

    #[test]
    fn parses_bare_commands() {
        let mut parser = AtParser::new();
        assert_eq!(feed_line(&mut parser, "ATA\r"), AtEvent::CallAnswered);
        assert_eq!(feed_line(&mut parser, "AT+CHUP\r"), AtEvent::HangUp);
        assert_eq!(feed_line(&mut parser, "AT+BCC\r"), AtEvent::TriggerCodecConnectionSetup);
        assert_eq!(feed_line(&mut parser, "OK\r"), AtEvent::Ok);
        assert_eq!(feed_line(&mut parser, "ERROR\r"), AtEvent::Error);
    }

    #[test]
    fn parses_bcs_confirmation() {
        let mut parser = AtParser::new();
        assert_eq!(feed_line(&mut parser, "AT+BCS=2\r"), AtEvent::ConfirmCodec(2));
    }

    #[test]
    fn parses_cmee_enable_and_disable() {
        let mut parser = AtParser::new();
        assert_eq!(feed_line(&mut parser, "AT+CMEE=1\r"), AtEvent::ExtendedErrorEnable(true));
        assert_eq!(feed_line(&mut parser, "AT+CMEE=0\r"), AtEvent::ExtendedErrorEnable(false));
    }

    #[test]
    fn unknown_header_yields_unknown_event() {
        let mut parser = AtParser::new();
        assert_eq!(feed_line(&mut parser, "AT+XYZ\r"), AtEvent::Unknown);
    }

    #[test]
    fn overflowing_item_resets_and_emits_parse_error() {
        let mut parser = AtParser::new();
        let overlong = "A".repeat(MAX_ITEM_LEN + 5);
        let line = format!("AT+{}\r", overlong);
        assert_eq!(feed_line(&mut parser, &line), AtEvent::ParseError);
        // parser recovered and can parse the next line cleanly
        assert_eq!(feed_line(&mut parser, "AT+BRSF=195\r"), AtEvent::SupportedFeatures(195));
    }

    #[test]
    fn garbled_line_recovers_on_next_line() {
        let mut parser = AtParser::new();
        assert_eq!(feed_line(&mut parser, "AT+,\r"), AtEvent::ParseError);
        assert_eq!(feed_line(&mut parser, "AT+BAC=1\r"), AtEvent::AvailableCodecs(vec![1]));
    }

    #[test]
    fn too_many_items_is_rejected() {
        let mut parser = AtParser::new();
        let items: Vec<String> = (0..=MAX_ITEMS).map(|i| i.to_string()).collect();
        let line = format!("AT+BAC={}\r", items.join(","));
        assert_eq!(feed_line(&mut parser, &line), AtEvent::ParseError);
    }

    #[test]
    fn accepts_lowercase_command_letters() {
        let mut parser = AtParser::new();
        assert_eq!(feed_line(&mut parser, "at+brsf=195\r"), AtEvent::SupportedFeatures(195));
    }
}
