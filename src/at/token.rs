// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

/// The set of AT tokens the parser recognizes, matched against the header of an
/// incoming line. `Unknown` covers anything outside this table; it is not the same
/// as `Error`, which is reserved for lines the parser could not tokenize at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtToken {
    Brsf,
    Bac,
    Cind,
    Cmer,
    Bia,
    Chld,
    Bind,
    Ciev,
    Cops,
    Cmee,
    CmeError,
    Bcc,
    Bcs,
    Ata,
    Chup,
    Ok,
    Error,
    Unknown,
}

/// Known headers, longest-prefix-first so that `+CME ERROR` is not shadowed by a
/// hypothetical shorter match. Compared case-insensitively.
pub const KNOWN_HEADERS: &[(&str, AtToken)] = &[
    ("+CME ERROR", AtToken::CmeError),
    ("+BRSF", AtToken::Brsf),
    ("+BAC", AtToken::Bac),
    ("+CIND", AtToken::Cind),
    ("+CMER", AtToken::Cmer),
    ("+BIA", AtToken::Bia),
    ("+CHLD", AtToken::Chld),
    ("+BIND", AtToken::Bind),
    ("+CIEV", AtToken::Ciev),
    ("+COPS", AtToken::Cops),
    ("+CMEE", AtToken::Cmee),
    ("+BCC", AtToken::Bcc),
    ("+BCS", AtToken::Bcs),
    // The literal command is "ATA"; the parser strips the leading "AT" before
    // matching, so the header that actually reaches this table is just "A".
    ("A", AtToken::Ata),
    ("+CHUP", AtToken::Chup),
    ("OK", AtToken::Ok),
    ("ERROR", AtToken::Error),
];

/// Matches `header` (already stripped of any leading `AT`) against the known token
/// table. Returns `AtToken::Unknown` if nothing matches.
pub fn match_header(header: &str) -> AtToken {
    let upper = header.to_ascii_uppercase();
    for (prefix, token) in KNOWN_HEADERS {
        if upper == *prefix {
            return *token;
        }
    }
    AtToken::Unknown
}
