// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! SDP record construction. The original platform expresses a service definition
//! as a `ServiceDefinition`/`DataElement`/`ProtocolDescriptor` tree built by a
//! separate SDP server and never touched by the HFP core; here, with no SDP
//! server as a collaborator, the core builds the raw record bytes itself.

/// SDP attribute and protocol UUIDs this record needs. Values are from the
/// Bluetooth SIG-assigned numbers document.
mod uuid {
    pub const PROTOCOL_L2CAP: u16 = 0x0100;
    pub const PROTOCOL_RFCOMM: u16 = 0x0003;
    pub const SERVICE_CLASS_ID_LIST: u16 = 0x0001;
    pub const PROTOCOL_DESCRIPTOR_LIST: u16 = 0x0004;
    pub const BLUETOOTH_PROFILE_DESCRIPTOR_LIST: u16 = 0x0009;
    pub const SERVICE_NAME: u16 = 0x0100; // relative to the base language attribute offset
    pub const HANDSFREE_PROFILE: u16 = 0x111E;
}

/// A minimal SDP data element encoder, just expressive enough to build the
/// service-class, protocol-descriptor, and profile-descriptor lists an HFP
/// record needs.
#[derive(Debug, Clone)]
enum DataElement {
    Uint8(u8),
    Uint16(u16),
    Uuid16(u16),
    Sequence(Vec<DataElement>),
    Text(String),
}

impl DataElement {
    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            DataElement::Uint8(v) => {
                out.push(0x08); // unsigned int, 1 byte
                out.push(*v);
            }
            DataElement::Uint16(v) => {
                out.push(0x09); // unsigned int, 2 bytes
                out.extend_from_slice(&v.to_be_bytes());
            }
            DataElement::Uuid16(v) => {
                out.push(0x19); // UUID, 2 bytes
                out.extend_from_slice(&v.to_be_bytes());
            }
            DataElement::Text(text) => {
                let bytes = text.as_bytes();
                if bytes.len() < 256 {
                    out.push(0x25); // text string, 1-byte length
                    out.push(bytes.len() as u8);
                } else {
                    out.push(0x26); // text string, 2-byte length
                    out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
                }
                out.extend_from_slice(bytes);
            }
            DataElement::Sequence(items) => {
                let mut body = Vec::new();
                for item in items {
                    item.encode(&mut body);
                }
                if body.len() < 256 {
                    out.push(0x35); // sequence, 1-byte length
                    out.push(body.len() as u8);
                } else {
                    out.push(0x36); // sequence, 2-byte length
                    out.extend_from_slice(&(body.len() as u16).to_be_bytes());
                }
                out.extend_from_slice(&body);
            }
        }
    }
}

fn attribute(id: u16, value: DataElement) -> DataElement {
    DataElement::Sequence(vec![DataElement::Uint16(id), value])
}

/// Builds the bytes of an SDP service record advertising the HFP Audio Gateway
/// service on `rfcomm_channel`, under `service_uuid`, with the human-readable
/// `name`. `buffer` is cleared and filled with the encoded record; returns the
/// number of bytes written.
pub fn create_sdp_record(buffer: &mut Vec<u8>, service_uuid: u16, rfcomm_channel: u8, name: &str) -> usize {
    buffer.clear();

    let service_class_list =
        attribute(uuid::SERVICE_CLASS_ID_LIST, DataElement::Sequence(vec![DataElement::Uuid16(service_uuid)]));

    let protocol_descriptor_list = attribute(
        uuid::PROTOCOL_DESCRIPTOR_LIST,
        DataElement::Sequence(vec![
            DataElement::Sequence(vec![DataElement::Uuid16(uuid::PROTOCOL_L2CAP)]),
            DataElement::Sequence(vec![
                DataElement::Uuid16(uuid::PROTOCOL_RFCOMM),
                DataElement::Uint8(rfcomm_channel),
            ]),
        ]),
    );

    let profile_descriptor_list = attribute(
        uuid::BLUETOOTH_PROFILE_DESCRIPTOR_LIST,
        DataElement::Sequence(vec![DataElement::Sequence(vec![
            DataElement::Uuid16(uuid::HANDSFREE_PROFILE),
            DataElement::Uint16(0x0107), // HFP version 1.7
        ])]),
    );

    let service_name = attribute(uuid::SERVICE_NAME, DataElement::Text(name.to_string()));

    let record = DataElement::Sequence(vec![
        service_class_list,
        protocol_descriptor_list,
        profile_descriptor_list,
        service_name,
    ]);
    record.encode(buffer);
    buffer.len()
}
