// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! A manual-test harness for the HFP Audio Gateway core: reads AT lines from
//! stdin as if they arrived from a single RFCOMM peer, prints the AG's responses
//! to stdout, and logs host events. Real deployments wire `hfp_ag::Hfp` to an
//! actual RFCOMM/SCO transport instead of this loop.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Parser;

use hfp_ag::config::AudioGatewayConfig;
use hfp_ag::connection::{PeerAddress, RfcommChannelId};
use hfp_ag::events::{ClosureDispatcher, HostEvent};
use hfp_ag::transport::{RfcommEvent, RfcommTransport, ScoTransport};
use hfp_ag::{Hfp, HostRequest};

#[derive(Parser, Debug)]
#[command(name = "hfp-ag", about = "Hands-Free Profile Audio Gateway core, manual-test harness")]
struct Args {
    /// Path to a JSON config file; falls back to built-in defaults if omitted.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// RFCOMM channel number the (simulated) HF is connecting on.
    #[arg(long, default_value_t = 1)]
    rfcomm_channel: u8,
}

struct StdoutRfcomm;

impl RfcommTransport for StdoutRfcomm {
    fn send(&mut self, _channel: RfcommChannelId, bytes: &[u8]) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(bytes);
        let _ = stdout.flush();
    }

    fn can_send_now(&self, _channel: RfcommChannelId) -> bool {
        true
    }
}

struct NullSco;

impl ScoTransport for NullSco {
    fn open(&mut self, peer: PeerAddress, codec: hfp_ag::protocol::CodecId) {
        log::info!("would open SCO to {} with codec {:?}", peer, codec);
    }

    fn close(&mut self, handle: hfp_ag::connection::ScoHandle) {
        log::info!("would close SCO handle {:?}", handle.0);
    }
}

fn load_config(args: &Args) -> anyhow::Result<AudioGatewayConfig> {
    match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| "parsing config file as JSON")
        }
        None => {
            let mut config = AudioGatewayConfig::default();
            config.rfcomm_channel = args.rfcomm_channel;
            Ok(config)
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(&args)?;

    let dispatcher = ClosureDispatcher(|event: HostEvent| {
        log::info!("host event: {:?} for {}", event.kind, event.peer);
    });
    let mut hfp = Hfp::new(config, StdoutRfcomm, NullSco, dispatcher);

    let peer = PeerAddress([0xD8, 0xBB, 0x2C, 0xDF, 0xF1, 0x08]);
    let channel = RfcommChannelId(1);
    hfp.handle_rfcomm_event(RfcommEvent::ChannelOpened { channel, peer });

    log::info!("reading AT lines from stdin; Ctrl-D to exit");
    for line in io::stdin().lock().lines() {
        let mut line = line.context("reading stdin")?;
        line.push_str("\r\n");
        hfp.handle_rfcomm_event(RfcommEvent::IncomingData { channel, bytes: line.into_bytes() });
    }

    let _ = hfp.handle_request(HostRequest::ReleaseServiceLevelConnection { peer });
    Ok(())
}
