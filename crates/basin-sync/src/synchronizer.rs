//! # Synchronizer
//!
//! The dispatch loop. Owns the peer set and session manager for its
//! lifetime; both are created at construction and drained on stop, never
//! shared as ambient state.

use tokio::sync::mpsc;

use basin_types::PeerId;

use crate::config::SyncConfig;
use crate::message::{
    BlocksRequestMessage, HelloMessage, Message, HELLO_FLAG_ACK, HELLO_FLAG_FULL_HISTORY,
};
use crate::peer_set::PeerSet;
use crate::ports::{ChainState, Consensus, Network, NetworkEvent};
use crate::session::SessionManager;

/// Drives the catch-up protocol for one node.
///
/// Events are processed one at a time in arrival order, so handlers need
/// no locking around peer/session state. The loop ends when the event
/// channel closes; open sessions are abandoned at that point.
pub struct Synchronizer<S, N, C>
where
    S: ChainState,
    N: Network,
    C: Consensus,
{
    pub(crate) config: SyncConfig,
    pub(crate) state: S,
    pub(crate) network: N,
    pub(crate) consensus: C,
    pub(crate) peer_set: PeerSet,
    pub(crate) sessions: SessionManager,
}

impl<S, N, C> Synchronizer<S, N, C>
where
    S: ChainState,
    N: Network,
    C: Consensus,
{
    pub fn new(config: SyncConfig, state: S, network: N, consensus: C) -> Self {
        let sessions = SessionManager::new(config.max_open_sessions);
        Self {
            config,
            state,
            network,
            consensus,
            peer_set: PeerSet::new(),
            sessions,
        }
    }

    pub fn self_id(&self) -> PeerId {
        self.network.self_id()
    }

    pub fn peer_set(&self) -> &PeerSet {
        &self.peer_set
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Run the dispatch loop until the event channel closes.
    pub async fn start(mut self, mut events: mpsc::Receiver<NetworkEvent>) {
        tracing::info!(peer = %self.self_id(), "synchronizer started");
        self.broadcast_hello();

        let mut ticker = tokio::time::interval(self.config.session_timeout);
        loop {
            tokio::select! {
                maybe_event = events.recv() => match maybe_event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                _ = ticker.tick() => self.on_tick(),
            }
        }

        self.sessions.close_all();
        tracing::info!(peer = %self.self_id(), "synchronizer stopped");
    }

    /// Process one inbound event.
    pub fn handle_event(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::Connected(peer_id) => {
                tracing::debug!(peer = %peer_id, "peer connected");
                self.say_hello(peer_id, false);
            }
            NetworkEvent::Disconnected(peer_id) => {
                // Any session toward the peer is left to the timeout sweep.
                tracing::debug!(peer = %peer_id, "peer disconnected");
            }
            NetworkEvent::Message { from, message } => self.dispatch(from, message),
        }
    }

    fn dispatch(&mut self, from: PeerId, message: Message) {
        self.peer_set.increase_received_messages(from);
        tracing::debug!(peer = %from, %message, "message received");

        let result = message.basic_check().and_then(|()| match &message {
            Message::Hello(msg) => self.handle_hello(msg, from),
            Message::Proposal(msg) => self.handle_proposal(msg, from),
            Message::BlocksRequest(msg) => self.handle_blocks_request(msg, from),
            Message::BlocksResponse(msg) => self.handle_blocks_response(msg, from),
        });

        if let Err(err) = result {
            self.peer_set.increase_invalid_messages(from);
            tracing::warn!(
                peer = %from,
                kind = %message.message_type(),
                error = %err,
                "message rejected"
            );
        }
    }

    /// Announce ourselves to everyone; used once on start.
    pub fn broadcast_hello(&mut self) {
        let hello = self.make_hello(false);
        self.network.broadcast(Message::Hello(hello));
    }

    /// Greet one peer; `ack` marks the reply leg of a handshake.
    pub(crate) fn say_hello(&mut self, to: PeerId, ack: bool) {
        let hello = self.make_hello(ack);
        self.network.send_to(Message::Hello(hello), to);
    }

    fn make_hello(&self, ack: bool) -> HelloMessage {
        let mut flags = 0;
        if ack {
            flags |= HELLO_FLAG_ACK;
        }
        if self.config.full_history {
            flags |= HELLO_FLAG_FULL_HISTORY;
        }
        HelloMessage::new(
            self.network.self_id(),
            self.config.moniker.clone(),
            self.state.last_block_height(),
            flags,
        )
    }

    /// Open a catch-up session toward a peer that is ahead of us, if a
    /// slot is free and no request toward it is already in flight.
    pub(crate) fn try_sync(&mut self) {
        let our_height = self.state.last_block_height();
        if self.sessions.number_of_open_sessions() >= self.config.max_open_sessions {
            return;
        }

        let sessions = &self.sessions;
        let candidate = self
            .peer_set
            .iter()
            .filter(|peer| {
                peer.is_known_or_trusty()
                    && peer.height > our_height
                    && !sessions.has_open_session_with(&peer.peer_id)
            })
            .max_by_key(|peer| peer.height)
            .map(|peer| (peer.peer_id, peer.height));

        if let Some((peer_id, their_height)) = candidate {
            let from = our_height + 1;
            let to = their_height.min(our_height + self.config.latest_block_interval);
            self.request_blocks(peer_id, from, to);
        }
    }

    /// Open a session and send the blocks-request it tracks.
    pub(crate) fn request_blocks(&mut self, to_peer: PeerId, from: u32, to: u32) {
        let Some(session) = self.sessions.open_session(to_peer, from, to) else {
            return;
        };
        let session_id = session.id;
        tracing::info!(peer = %to_peer, session_id, from, to, "requesting blocks");
        self.network.send_to(
            Message::BlocksRequest(BlocksRequestMessage::new(session_id, from, to)),
            to_peer,
        );
    }

    fn on_tick(&mut self) {
        for session in self.sessions.close_expired_sessions(self.config.session_timeout) {
            tracing::warn!(
                session_id = session.id,
                peer = %session.peer_id,
                "session timed out"
            );
        }
        self.try_sync();
    }

    #[cfg(test)]
    pub(crate) fn expire_sessions(&mut self) {
        self.on_tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{BlocksResponseMessage, ResponseCode};
    use crate::peer::PeerStatus;
    use crate::testing::{chain_with_blocks, MockNetwork, NullConsensus, TestNode};
    use basin_types::testing;
    use std::time::Duration;

    #[test]
    fn test_connected_event_sends_hello() {
        let mut node = TestNode::with_chain_height(0);
        let peer = testing::generate_test_peer_id();

        node.sync.handle_event(NetworkEvent::Connected(peer));

        let sent = node.network.take_sent();
        assert_eq!(sent.len(), 1);
        match &sent[0].1 {
            Message::Hello(hello) => {
                assert_eq!(sent[0].0, peer);
                assert!(!hello.is_ack());
                assert_eq!(hello.height, 0);
            }
            other => panic!("expected hello, got {other}"),
        }
    }

    #[test]
    fn test_dispatch_counts_messages() {
        let mut node = TestNode::with_chain_height(0);
        let peer = testing::generate_test_peer_id();

        // Structurally invalid: inverted range.
        node.sync.handle_event(NetworkEvent::Message {
            from: peer,
            message: Message::BlocksRequest(BlocksRequestMessage::new(0, 9, 2)),
        });

        let descriptor = node.sync.peer_set().peer(&peer).unwrap();
        assert_eq!(descriptor.received_messages, 1);
        assert_eq!(descriptor.invalid_messages, 1);
    }

    #[test]
    fn test_try_sync_opens_one_session_toward_tallest_peer() {
        let mut node = TestNode::with_chain_height(0);
        let short = testing::generate_test_peer_id();
        let tall = testing::generate_test_peer_id();
        node.sync.peer_set.update_status(short, PeerStatus::Known);
        node.sync.peer_set.update_height(short, 5);
        node.sync.peer_set.update_status(tall, PeerStatus::Known);
        node.sync.peer_set.update_height(tall, 50);

        node.sync.try_sync();

        assert_eq!(node.sync.sessions().number_of_open_sessions(), 1);
        let sent = node.network.take_sent();
        assert_eq!(sent.len(), 1);
        match &sent[0].1 {
            Message::BlocksRequest(req) => {
                assert_eq!(sent[0].0, tall);
                assert_eq!(req.from, 1);
                assert_eq!(req.to, 50);
            }
            other => panic!("expected blocks-request, got {other}"),
        }

        // A request toward that peer is already in flight.
        node.sync.try_sync();
        assert_eq!(node.sync.sessions().number_of_open_sessions(), 1);
    }

    #[test]
    fn test_try_sync_ignores_untrusted_peers() {
        let mut node = TestNode::with_chain_height(0);
        let peer = testing::generate_test_peer_id();
        node.sync.peer_set.update_height(peer, 50);

        node.sync.try_sync();
        assert_eq!(node.sync.sessions().number_of_open_sessions(), 0);
        assert!(node.network.take_sent().is_empty());
    }

    #[test]
    fn test_tick_abandons_expired_sessions() {
        let mut node = TestNode::with_chain_height(0);
        node.sync.config.session_timeout = Duration::ZERO;
        let peer = testing::generate_test_peer_id();
        node.sync.request_blocks(peer, 1, 10);
        assert_eq!(node.sync.sessions().number_of_open_sessions(), 1);

        node.sync.expire_sessions();
        assert_eq!(node.sync.sessions().number_of_open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_start_stops_when_channel_closes() {
        let (chain, _) = chain_with_blocks(0);
        let network = MockNetwork::new(testing::generate_test_peer_id());
        let handle_network = network.clone();
        let sync = Synchronizer::new(
            SyncConfig::default(),
            chain,
            network,
            NullConsensus::default(),
        );

        let (tx, rx) = mpsc::channel(8);
        let task = tokio::spawn(sync.start(rx));

        let peer = testing::generate_test_peer_id();
        tx.send(NetworkEvent::Message {
            from: peer,
            message: Message::BlocksResponse(BlocksResponseMessage::new(
                ResponseCode::NoMoreBlocks,
                99,
                0,
                vec![],
                None,
            )),
        })
        .await
        .unwrap();

        drop(tx);
        task.await.unwrap();

        // The startup hello went out before the loop ended.
        assert_eq!(handle_network.take_broadcasts().len(), 1);
    }
}
