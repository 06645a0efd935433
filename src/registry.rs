// Copyright 2024 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The connection registry: the owned set of per-peer [`ConnectionContext`]
//! values, looked up by RFCOMM channel, peer address, or SCO handle. Replaces the
//! original implementation's intrusive singly-linked list; everything outside the
//! registry holds a key, never a raw reference.

use std::collections::HashMap;

use crate::connection::{ConnectionContext, PeerAddress, RfcommChannelId, ScoHandle};
use crate::error::Error;
use crate::protocol::AgFeatures;

#[derive(Default)]
pub struct ConnectionRegistry {
    by_channel: HashMap<RfcommChannelId, ConnectionContext>,
    peer_to_channel: HashMap<PeerAddress, RfcommChannelId>,
    sco_to_channel: HashMap<ScoHandle, RfcommChannelId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context for `peer` on `channel`, replacing any prior context for
    /// the same peer. Returns a mutable reference to the freshly inserted context.
    pub fn insert(
        &mut self,
        peer: PeerAddress,
        channel: RfcommChannelId,
        ag_features: AgFeatures,
    ) -> &mut ConnectionContext {
        if let Some(old_channel) = self.peer_to_channel.insert(peer, channel) {
            self.by_channel.remove(&old_channel);
        }
        self.by_channel.insert(channel, ConnectionContext::new(peer, channel, ag_features));
        self.by_channel.get_mut(&channel).expect("just inserted")
    }

    pub fn by_channel(&self, channel: RfcommChannelId) -> Option<&ConnectionContext> {
        self.by_channel.get(&channel)
    }

    pub fn by_channel_mut(&mut self, channel: RfcommChannelId) -> Option<&mut ConnectionContext> {
        self.by_channel.get_mut(&channel)
    }

    pub fn by_peer(&self, peer: PeerAddress) -> Option<&ConnectionContext> {
        let channel = self.peer_to_channel.get(&peer)?;
        self.by_channel.get(channel)
    }

    pub fn by_peer_mut(&mut self, peer: PeerAddress) -> Option<&mut ConnectionContext> {
        let channel = *self.peer_to_channel.get(&peer)?;
        self.by_channel.get_mut(&channel)
    }

    pub fn by_sco_handle(&self, handle: ScoHandle) -> Option<&ConnectionContext> {
        let channel = self.sco_to_channel.get(&handle)?;
        self.by_channel.get(channel)
    }

    /// Records that `handle` now belongs to the connection on `channel`, so a
    /// later SCO-disconnected event can be routed back by handle alone.
    pub fn associate_sco_handle(&mut self, channel: RfcommChannelId, handle: ScoHandle) -> Result<(), Error> {
        if !self.by_channel.contains_key(&channel) {
            return Err(Error::NoSuchConnection);
        }
        self.sco_to_channel.insert(handle, channel);
        Ok(())
    }

    /// Removes the connection on `channel`, as driven by an RFCOMM-disconnected
    /// event. Tolerates `channel` not being present.
    pub fn remove(&mut self, channel: RfcommChannelId) -> Option<ConnectionContext> {
        let removed = self.by_channel.remove(&channel)?;
        self.peer_to_channel.remove(&removed.peer);
        self.sco_to_channel.retain(|_, ch| *ch != channel);
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.by_channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_channel.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ConnectionContext> {
        self.by_channel.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: u8) -> PeerAddress {
        PeerAddress([0, 0, 0, 0, 0, last])
    }

    #[test]
    fn insert_then_lookup_by_all_three_keys() {
        let mut registry = ConnectionRegistry::new();
        registry.insert(addr(1), RfcommChannelId(5), AgFeatures::empty());
        registry.associate_sco_handle(RfcommChannelId(5), ScoHandle(9)).unwrap();

        assert!(registry.by_channel(RfcommChannelId(5)).is_some());
        assert!(registry.by_peer(addr(1)).is_some());
        assert!(registry.by_sco_handle(ScoHandle(9)).is_some());
    }

    #[test]
    fn lookup_of_missing_connection_is_none_not_a_panic() {
        let registry = ConnectionRegistry::new();
        assert!(registry.by_channel(RfcommChannelId(1)).is_none());
        assert!(registry.by_peer(addr(1)).is_none());
        assert!(registry.by_sco_handle(ScoHandle(1)).is_none());
    }

    #[test]
    fn remove_clears_all_three_indices() {
        let mut registry = ConnectionRegistry::new();
        registry.insert(addr(2), RfcommChannelId(1), AgFeatures::empty());
        registry.associate_sco_handle(RfcommChannelId(1), ScoHandle(3)).unwrap();
        assert!(registry.remove(RfcommChannelId(1)).is_some());
        assert!(registry.by_peer(addr(2)).is_none());
        assert!(registry.by_sco_handle(ScoHandle(3)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_of_missing_channel_is_a_noop() {
        let mut registry = ConnectionRegistry::new();
        assert!(registry.remove(RfcommChannelId(42)).is_none());
    }

    #[test]
    fn reinserting_a_peer_on_a_new_channel_drops_the_old_one() {
        let mut registry = ConnectionRegistry::new();
        registry.insert(addr(1), RfcommChannelId(1), AgFeatures::empty());
        registry.insert(addr(1), RfcommChannelId(2), AgFeatures::empty());
        assert!(registry.by_channel(RfcommChannelId(1)).is_none());
        assert!(registry.by_channel(RfcommChannelId(2)).is_some());
        assert_eq!(registry.len(), 1);
    }
}
