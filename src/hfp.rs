// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The top-level `Hfp` manager: the upward API a host application drives, and the
//! run loop that ties the transport, registry, and state machines together.

use crate::config::AudioGatewayConfig;
use crate::connection::{PeerAddress, RfcommChannelId, ScoHandle};
use crate::error::Error;
use crate::events::EventDispatcher;
use crate::peer;
use crate::protocol::AgFeatures;
use crate::registry::ConnectionRegistry;
use crate::sm::audio::{self, ScoTransportEvent};
use crate::sm::call::{self, CallEvent};
use crate::transport::{RfcommEvent, RfcommTransport, ScoTransport};

/// A request the host application makes of a running [`Hfp`]. The original
/// implementation called straight into the AG's C API from whatever thread the
/// host was on; here, requests are queued and drained from the single run loop so
/// no two requests race on the same connection.
#[derive(Debug, Clone)]
pub enum HostRequest {
    EstablishServiceLevelConnection { peer: PeerAddress },
    ReleaseServiceLevelConnection { peer: PeerAddress },
    EstablishAudioConnection { peer: PeerAddress },
    ReleaseAudioConnection { peer: PeerAddress },
    IncomingCall { peer: PeerAddress },
    OutgoingCall { peer: PeerAddress, number: String },
    AnswerCall { peer: PeerAddress },
    TerminateCall { peer: PeerAddress },
    SetUseInBandRingTone { peer: PeerAddress, enabled: bool },
    SetOperatorName { peer: PeerAddress, name: String },
    ReportExtendedAudioGatewayError { peer: PeerAddress, code: u8 },
}

/// Manages every active HFP connection: the registry of per-peer contexts, the
/// transport the bytes flow over, and the dispatcher host events are surfaced
/// through.
pub struct Hfp<R, S, D> {
    config: AudioGatewayConfig,
    ag_features: AgFeatures,
    registry: ConnectionRegistry,
    rfcomm: R,
    sco: S,
    dispatcher: D,
}

impl<R, S, D> Hfp<R, S, D>
where
    R: RfcommTransport,
    S: ScoTransport,
    D: EventDispatcher,
{
    pub fn new(config: AudioGatewayConfig, rfcomm: R, sco: S, dispatcher: D) -> Self {
        let ag_features = config.features.to_features();
        Hfp { config, ag_features, registry: ConnectionRegistry::new(), rfcomm, sco, dispatcher }
    }

    pub fn config(&self) -> &AudioGatewayConfig {
        &self.config
    }

    /// Handles a byte-level or connection-lifecycle event from the RFCOMM
    /// transport.
    pub fn handle_rfcomm_event(&mut self, event: RfcommEvent) {
        match event {
            RfcommEvent::ChannelOpened { channel, peer } => {
                log::info!("rfcomm channel {:?} opened for peer {}", channel.0, peer);
                self.registry.insert(peer, channel, self.ag_features);
            }
            RfcommEvent::IncomingData { channel, bytes } => {
                for byte in bytes {
                    if let Some(ctx) = self.registry.by_channel_mut(channel) {
                        peer::feed_byte(ctx, channel, byte, &mut self.rfcomm, &mut self.sco, &mut self.dispatcher);
                    }
                }
            }
            RfcommEvent::ChannelClosed { channel } => {
                if let Some(removed) = self.registry.remove(channel) {
                    log::info!("rfcomm channel {:?} closed for peer {}", channel.0, removed.peer);
                }
            }
        }
    }

    pub fn handle_sco_connected(&mut self, channel: RfcommChannelId, handle: ScoHandle) {
        let _ = self.registry.associate_sco_handle(channel, handle);
        if let Some(ctx) = self.registry.by_channel_mut(channel) {
            peer::on_sco_event(ctx, ScoTransportEvent::Connected(handle), &mut self.dispatcher);
        }
    }

    pub fn handle_sco_connect_failed(&mut self, channel: RfcommChannelId) {
        if let Some(ctx) = self.registry.by_channel_mut(channel) {
            peer::on_sco_event(ctx, ScoTransportEvent::ConnectFailed, &mut self.dispatcher);
        }
    }

    pub fn handle_sco_disconnected(&mut self, handle: ScoHandle) {
        let channel = self.registry.by_sco_handle(handle).map(|ctx| ctx.channel);
        if let Some(channel) = channel {
            if let Some(ctx) = self.registry.by_channel_mut(channel) {
                peer::on_sco_event(ctx, ScoTransportEvent::Disconnected, &mut self.dispatcher);
            }
        }
    }

    /// Dispatches one host-originated request. Resource exhaustion and
    /// no-such-connection are the only synchronous failures the public API
    /// surfaces; everything else resolves asynchronously via the dispatcher.
    pub fn handle_request(&mut self, request: HostRequest) -> Result<(), Error> {
        match request {
            // Opening the underlying RFCOMM channel is the transport's job; once it
            // reports `ChannelOpened`, the SLC pipeline starts on its own as the HF
            // sends its opening `AT+BRSF`.
            HostRequest::EstablishServiceLevelConnection { .. } => Ok(()),
            HostRequest::ReleaseServiceLevelConnection { peer } => {
                let ctx = self.registry.by_peer_mut(peer).ok_or(Error::NoSuchConnection)?;
                crate::sm::slc::abort(ctx);
                Ok(())
            }
            HostRequest::EstablishAudioConnection { peer } => {
                let ctx = self.registry.by_peer_mut(peer).ok_or(Error::NoSuchConnection)?;
                match audio::request_connect(ctx) {
                    Some(outcome) => {
                        if let Some(codec) = outcome.request_sco_open {
                            self.sco.open(peer, codec);
                        }
                        Ok(())
                    }
                    None => Err(Error::InvalidState),
                }
            }
            HostRequest::ReleaseAudioConnection { peer } => {
                let ctx = self.registry.by_peer_mut(peer).ok_or(Error::NoSuchConnection)?;
                match audio::request_disconnect(ctx) {
                    Some(outcome) => {
                        if outcome.request_sco_close {
                            if let Some(handle) = ctx.sco_handle {
                                self.sco.close(handle);
                            }
                        }
                        Ok(())
                    }
                    None => Err(Error::InvalidState),
                }
            }
            HostRequest::IncomingCall { peer } => {
                let channel = {
                    let ctx = self.registry.by_peer_mut(peer).ok_or(Error::NoSuchConnection)?;
                    let outcome = call::advance(ctx, CallEvent::IncomingCall);
                    if let Some(event) = outcome.host_event {
                        self.dispatcher.dispatch(event);
                    }
                    if outcome.request_audio_connect {
                        Some(ctx.channel)
                    } else {
                        None
                    }
                };
                if channel.is_some() {
                    self.handle_request(HostRequest::EstablishAudioConnection { peer })?;
                }
                Ok(())
            }
            HostRequest::OutgoingCall { peer, number } => {
                log::debug!("dialing {} for peer {}", number, peer);
                let ctx = self.registry.by_peer_mut(peer).ok_or(Error::NoSuchConnection)?;
                let outcome = call::advance(ctx, CallEvent::OutgoingCall);
                if let Some(event) = outcome.host_event {
                    self.dispatcher.dispatch(event);
                }
                Ok(())
            }
            HostRequest::AnswerCall { peer } => {
                let ctx = self.registry.by_peer_mut(peer).ok_or(Error::NoSuchConnection)?;
                let outcome = call::advance(ctx, CallEvent::HostAnswered);
                if let Some(event) = outcome.host_event {
                    self.dispatcher.dispatch(event);
                }
                Ok(())
            }
            HostRequest::TerminateCall { peer } => {
                let ctx = self.registry.by_peer_mut(peer).ok_or(Error::NoSuchConnection)?;
                let outcome = call::advance(ctx, CallEvent::HostTerminated);
                if let Some(event) = outcome.host_event {
                    self.dispatcher.dispatch(event);
                }
                Ok(())
            }
            HostRequest::SetUseInBandRingTone { peer, enabled } => {
                let ctx = self.registry.by_peer_mut(peer).ok_or(Error::NoSuchConnection)?;
                ctx.in_band_ring = enabled;
                Ok(())
            }
            HostRequest::SetOperatorName { peer, name } => {
                let ctx = self.registry.by_peer_mut(peer).ok_or(Error::NoSuchConnection)?;
                ctx.operator.name = name;
                Ok(())
            }
            HostRequest::ReportExtendedAudioGatewayError { peer, code } => {
                let ctx = self.registry.by_peer_mut(peer).ok_or(Error::NoSuchConnection)?;
                ctx.extended_errors_enabled = true;
                self.dispatcher.dispatch(crate::events::HostEvent::new(
                    peer,
                    crate::events::HostEventKind::ExtendedAudioGatewayError { code },
                ));
                Ok(())
            }
        }
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ClosureDispatcher;
    use crate::transport::fake::{FakeRfcomm, FakeSco};

    fn hfp() -> Hfp<FakeRfcomm, FakeSco, ClosureDispatcher<impl FnMut(crate::events::HostEvent)>> {
        Hfp::new(
            AudioGatewayConfig::default(),
            FakeRfcomm::new(),
            FakeSco::new(),
            ClosureDispatcher(|_event: crate::events::HostEvent| {}),
        )
    }

    fn addr() -> PeerAddress {
        PeerAddress([0xD8, 0xBB, 0x2C, 0xDF, 0xF1, 0x08])
    }

    #[test]
    fn channel_opened_inserts_a_connection() {
        let mut hfp = hfp();
        hfp.handle_rfcomm_event(RfcommEvent::ChannelOpened { channel: RfcommChannelId(1), peer: addr() });
        assert_eq!(hfp.connection_count(), 1);
    }

    #[test]
    fn channel_closed_removes_the_connection() {
        let mut hfp = hfp();
        hfp.handle_rfcomm_event(RfcommEvent::ChannelOpened { channel: RfcommChannelId(1), peer: addr() });
        hfp.handle_rfcomm_event(RfcommEvent::ChannelClosed { channel: RfcommChannelId(1) });
        assert_eq!(hfp.connection_count(), 0);
    }

    #[test]
    fn request_against_unknown_peer_fails_synchronously() {
        let mut hfp = hfp();
        let result = hfp.handle_request(HostRequest::AnswerCall { peer: addr() });
        assert!(matches!(result, Err(Error::NoSuchConnection)));
    }

    #[test]
    fn incoming_data_drives_the_slc_pipeline() {
        let mut hfp = hfp();
        hfp.handle_rfcomm_event(RfcommEvent::ChannelOpened { channel: RfcommChannelId(1), peer: addr() });
        hfp.handle_rfcomm_event(RfcommEvent::IncomingData {
            channel: RfcommChannelId(1),
            bytes: b"AT+BRSF=495\r\n".to_vec(),
        });
        let ctx = hfp.registry.by_peer(addr()).unwrap();
        assert_eq!(ctx.slc_state, crate::sm::slc::SlcState::AwaitIndicatorsTest);
    }
}
