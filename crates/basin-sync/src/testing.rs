//! Test doubles for the synchronizer's ports and a pre-wired node
//! fixture. Compiled into the crate so downstream integration tests can
//! reuse the same doubles.

use std::sync::Arc;

use parking_lot::Mutex;

use basin_store::{InMemoryKvStore, LedgerStore, StoreConfig};
use basin_types::{testing, Block, PeerId};

use crate::chain::LedgerChain;
use crate::config::SyncConfig;
use crate::message::{BlocksRequestMessage, BlocksResponseMessage, HelloMessage, Message, HELLO_FLAG_ACK};
use crate::ports::{ChainState, Consensus, Network, NetworkEvent};
use crate::synchronizer::Synchronizer;

/// [`Network`] double that records outbound traffic.
#[derive(Clone)]
pub struct MockNetwork {
    self_id: PeerId,
    sent: Arc<Mutex<Vec<(PeerId, Message)>>>,
    broadcasts: Arc<Mutex<Vec<Message>>>,
}

impl MockNetwork {
    pub fn new(self_id: PeerId) -> Self {
        Self {
            self_id,
            sent: Arc::new(Mutex::new(Vec::new())),
            broadcasts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Drain and return every directed message sent so far.
    pub fn take_sent(&self) -> Vec<(PeerId, Message)> {
        std::mem::take(&mut *self.sent.lock())
    }

    /// Drain and return every broadcast sent so far.
    pub fn take_broadcasts(&self) -> Vec<Message> {
        std::mem::take(&mut *self.broadcasts.lock())
    }
}

impl Network for MockNetwork {
    fn send_to(&self, message: Message, to: PeerId) {
        self.sent.lock().push((to, message));
    }

    fn broadcast(&self, message: Message) {
        self.broadcasts.lock().push(message);
    }

    fn self_id(&self) -> PeerId {
        self.self_id
    }

    fn num_connected_peers(&self) -> usize {
        0
    }
}

/// [`Consensus`] double that records relayed proposals.
#[derive(Clone, Default)]
pub struct NullConsensus {
    proposals: Arc<Mutex<Vec<(u32, i16, Vec<u8>)>>>,
}

impl NullConsensus {
    pub fn take_proposals(&self) -> Vec<(u32, i16, Vec<u8>)> {
        std::mem::take(&mut *self.proposals.lock())
    }
}

impl Consensus for NullConsensus {
    fn set_proposal(&self, height: u32, round: i16, payload: Vec<u8>) {
        self.proposals.lock().push((height, round, payload));
    }
}

/// Wire-encode one generated block.
pub fn wire_block(height: u32) -> Vec<u8> {
    bincode::serialize(&testing::generate_test_block(height))
        .expect("test block serializes")
}

/// A chain adapter over an in-memory store pre-committed up to `height`.
///
/// Block `h` is committed with its successor's `prev_certificate`; the
/// tip gets a fresh one, so `last_certificate` is always present when
/// `height > 0`.
pub fn chain_with_blocks(height: u32) -> (LedgerChain<InMemoryKvStore>, Vec<Block>) {
    let store = LedgerStore::open(&StoreConfig::default(), InMemoryKvStore::new())
        .expect("open in-memory store");

    let blocks: Vec<Block> = (1..=height).map(testing::generate_test_block).collect();
    for (i, block) in blocks.iter().enumerate() {
        let cert = blocks
            .get(i + 1)
            .and_then(|next| next.prev_certificate.clone())
            .unwrap_or_else(testing::generate_test_certificate);
        store
            .save_block(i as u32 + 1, block, &cert)
            .expect("save test block");
        store.write_batch().expect("commit test block");
    }

    (LedgerChain::new(Arc::new(store)), blocks)
}

/// A synchronizer wired to test doubles, with handles kept for
/// inspection.
pub struct TestNode {
    pub sync: Synchronizer<LedgerChain<InMemoryKvStore>, MockNetwork, NullConsensus>,
    pub network: MockNetwork,
    pub consensus: NullConsensus,
}

impl TestNode {
    /// A node whose chain is committed up to `height`.
    pub fn with_chain_height(height: u32) -> Self {
        Self::with_config(SyncConfig::default(), height)
    }

    pub fn with_config(config: SyncConfig, height: u32) -> Self {
        let (chain, _) = chain_with_blocks(height);
        let network = MockNetwork::new(testing::generate_test_peer_id());
        let consensus = NullConsensus::default();
        let sync = Synchronizer::new(config, chain, network.clone(), consensus.clone());
        Self {
            sync,
            network,
            consensus,
        }
    }

    pub fn chain_height(&self) -> u32 {
        self.sync.state.last_block_height()
    }

    /// Raw committed block payload, as served to peers.
    pub fn block_data(&self, height: u32) -> Option<Vec<u8>> {
        self.sync.state.block_data(height)
    }

    pub fn receive_hello(&mut self, peer: PeerId, moniker: &str, height: u32, ack: bool) {
        self.receive_hello_as(peer, peer, moniker, height, ack);
    }

    /// Hello claiming `claimed` as its sender while arriving from
    /// `actual`.
    pub fn receive_hello_as(
        &mut self,
        claimed: PeerId,
        actual: PeerId,
        moniker: &str,
        height: u32,
        ack: bool,
    ) {
        let flags = if ack { HELLO_FLAG_ACK } else { 0 };
        self.sync.handle_event(NetworkEvent::Message {
            from: actual,
            message: Message::Hello(HelloMessage::new(claimed, moniker, height, flags)),
        });
    }

    pub fn receive_blocks_request(&mut self, peer: PeerId, session_id: i32, from: u32, to: u32) {
        self.sync.handle_event(NetworkEvent::Message {
            from: peer,
            message: Message::BlocksRequest(BlocksRequestMessage::new(session_id, from, to)),
        });
    }

    pub fn receive_blocks_response(&mut self, peer: PeerId, response: BlocksResponseMessage) {
        self.sync.handle_event(NetworkEvent::Message {
            from: peer,
            message: Message::BlocksResponse(response),
        });
    }

    /// Open a session toward `peer` without emitting the request.
    pub fn open_session_toward(&mut self, peer: PeerId, from: u32, to: u32) -> i32 {
        self.sync
            .sessions
            .open_session(peer, from, to)
            .expect("session slot available")
            .id
    }

    /// Every blocks-response sent so far, drained in order.
    pub fn take_responses(&mut self) -> Vec<BlocksResponseMessage> {
        self.network
            .take_sent()
            .into_iter()
            .filter_map(|(_, message)| match message {
                Message::BlocksResponse(response) => Some(response),
                _ => None,
            })
            .collect()
    }
}
