//! Serving side of the catch-up protocol.

use basin_types::PeerId;

use crate::error::SyncError;
use crate::message::{BlocksRequestMessage, BlocksResponseMessage, Message, ResponseCode};
use crate::ports::{ChainState, Consensus, Network};
use crate::synchronizer::Synchronizer;

impl<S, N, C> Synchronizer<S, N, C>
where
    S: ChainState,
    N: Network,
    C: Consensus,
{
    pub(crate) fn handle_blocks_request(
        &mut self,
        msg: &BlocksRequestMessage,
        initiator: PeerId,
    ) -> Result<(), SyncError> {
        if self.sessions.number_of_open_sessions() >= self.config.max_open_sessions {
            tracing::warn!(peer = %initiator, "rejecting request, busy");
            self.respond(ResponseCode::Busy, 0, 0, vec![], initiator);
            return Ok(());
        }

        let peer = self.peer_set.get_peer(initiator);
        let status = peer.status;
        if !peer.is_known_or_trusty() {
            self.respond(ResponseCode::Rejected, msg.session_id, 0, vec![], initiator);
            return Err(SyncError::InvalidMessage(format!(
                "not serving a peer with status {status}"
            )));
        }

        let our_height = self.state.last_block_height();
        let horizon = our_height.saturating_sub(self.config.latest_block_interval);
        if !self.config.full_history && msg.from < horizon {
            self.respond(ResponseCode::Rejected, msg.session_id, 0, vec![], initiator);
            return Err(SyncError::InvalidMessage(format!(
                "blocks below height {horizon} are pruned here"
            )));
        }

        let mut height = msg.from;
        loop {
            let remaining = msg.to - height + 1;
            let count = self.config.block_per_message.min(remaining);
            let blocks = self.prepare_blocks(height, count);
            if blocks.is_empty() {
                break;
            }
            let served = blocks.len() as u32;
            self.respond(ResponseCode::MoreBlocks, msg.session_id, height, blocks, initiator);
            height = height.saturating_add(served).min(msg.to);
            if height >= msg.to {
                break;
            }
        }

        // Everything up to `height - 1` is now on the requester's side.
        self.peer_set.update_height(initiator, height - 1);

        if msg.to >= our_height {
            if let Some(cert) = self.state.last_certificate() {
                let response = BlocksResponseMessage::new(
                    ResponseCode::Synced,
                    msg.session_id,
                    our_height,
                    vec![],
                    Some(cert),
                );
                self.network.send_to(Message::BlocksResponse(response), initiator);
                return Ok(());
            }
        }
        self.respond(ResponseCode::NoMoreBlocks, msg.session_id, 0, vec![], initiator);
        Ok(())
    }

    fn respond(
        &mut self,
        code: ResponseCode,
        session_id: i32,
        from: u32,
        blocks: Vec<Vec<u8>>,
        to: PeerId,
    ) {
        let response = BlocksResponseMessage::new(code, session_id, from, blocks, None);
        tracing::debug!(peer = %to, response = %response, "responding");
        self.network.send_to(Message::BlocksResponse(response), to);
    }

    /// Collect up to `count` consecutive committed block payloads
    /// starting at `from`, stopping at the first gap. Heights past
    /// `u32::MAX` cannot exist and read as a gap.
    fn prepare_blocks(&self, from: u32, count: u32) -> Vec<Vec<u8>> {
        (0..count)
            .map_while(|i| {
                let height = from.checked_add(i)?;
                self.state.block_data(height)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::message::{Message, ResponseCode};
    use crate::peer::PeerStatus;
    use crate::testing::TestNode;
    use basin_types::testing;

    #[test]
    fn test_busy_when_session_cap_reached() {
        let mut node = TestNode::with_chain_height(10);
        node.sync.config.max_open_sessions = 1;
        node.sync
            .request_blocks(testing::generate_test_peer_id(), 11, 20);
        node.network.take_sent();

        let peer = testing::generate_test_peer_id();
        node.sync.peer_set.update_status(peer, PeerStatus::Known);
        node.receive_blocks_request(peer, 7, 2, 10);

        let responses = node.take_responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].code, ResponseCode::Busy);
        assert_eq!(responses[0].session_id, 0);
        assert!(responses[0].blocks.is_empty());
        // No session was created for the rejected request.
        assert_eq!(node.sync.sessions().number_of_open_sessions(), 1);
        // Being busy is not the requester's fault.
        let descriptor = node.sync.peer_set().peer(&peer).unwrap();
        assert_eq!(descriptor.invalid_messages, 0);
    }

    #[test]
    fn test_unknown_peer_is_rejected() {
        let mut node = TestNode::with_chain_height(10);
        let peer = testing::generate_test_peer_id();

        node.receive_blocks_request(peer, 7, 2, 10);

        let responses = node.take_responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].code, ResponseCode::Rejected);
        assert_eq!(responses[0].session_id, 7);
        let descriptor = node.sync.peer_set().peer(&peer).unwrap();
        assert_eq!(descriptor.invalid_messages, 1);
    }

    #[test]
    fn test_pruned_range_is_rejected() {
        let mut node = TestNode::with_chain_height(10);
        node.sync.config.latest_block_interval = 5;
        let peer = testing::generate_test_peer_id();
        node.sync.peer_set.update_status(peer, PeerStatus::Known);

        node.receive_blocks_request(peer, 7, 2, 10);

        let responses = node.take_responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].code, ResponseCode::Rejected);
    }

    #[test]
    fn test_full_history_node_serves_old_ranges() {
        let mut node = TestNode::with_chain_height(10);
        node.sync.config.latest_block_interval = 5;
        node.sync.config.full_history = true;
        let peer = testing::generate_test_peer_id();
        node.sync.peer_set.update_status(peer, PeerStatus::Known);

        node.receive_blocks_request(peer, 7, 2, 4);

        let responses = node.take_responses();
        assert_eq!(responses[0].code, ResponseCode::MoreBlocks);
        assert_eq!(responses[0].from, 2);
    }

    #[test]
    fn test_request_is_served_in_batches_then_synced() {
        let mut node = TestNode::with_chain_height(10);
        node.sync.config.block_per_message = 3;
        let peer = testing::generate_test_peer_id();
        node.sync.peer_set.update_status(peer, PeerStatus::Known);

        node.receive_blocks_request(peer, 7, 2, 10);

        let responses = node.take_responses();
        assert_eq!(responses.len(), 4);
        for response in &responses[..3] {
            assert_eq!(response.code, ResponseCode::MoreBlocks);
            assert_eq!(response.session_id, 7);
        }
        assert_eq!(responses[0].from, 2);
        assert_eq!(responses[0].count(), 3);
        assert_eq!(responses[1].from, 5);
        assert_eq!(responses[1].count(), 3);
        assert_eq!(responses[2].from, 8);
        assert_eq!(responses[2].count(), 3);

        assert_eq!(responses[3].code, ResponseCode::Synced);
        assert_eq!(responses[3].from, 10);
        assert!(responses[3].last_certificate.is_some());

        let descriptor = node.sync.peer_set().peer(&peer).unwrap();
        assert_eq!(descriptor.height, 9);
    }

    #[test]
    fn test_partial_request_ends_with_no_more_blocks() {
        let mut node = TestNode::with_chain_height(10);
        let peer = testing::generate_test_peer_id();
        node.sync.peer_set.update_status(peer, PeerStatus::Known);

        node.receive_blocks_request(peer, 7, 2, 6);

        let responses = node.take_responses();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].code, ResponseCode::MoreBlocks);
        assert_eq!(responses[0].from, 2);
        assert_eq!(responses[0].count(), 5);
        assert_eq!(responses[1].code, ResponseCode::NoMoreBlocks);
    }

    #[test]
    fn test_max_height_request_is_served_without_panicking() {
        let mut node = TestNode::with_chain_height(10);
        let peer = testing::generate_test_peer_id();
        node.sync.peer_set.update_status(peer, PeerStatus::Known);

        node.receive_blocks_request(peer, 7, u32::MAX, u32::MAX);

        let responses = node.take_responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].code, ResponseCode::Synced);
        assert!(responses[0].blocks.is_empty());
    }

    #[test]
    fn test_request_beyond_tip_reports_synced() {
        let mut node = TestNode::with_chain_height(10);
        let peer = testing::generate_test_peer_id();
        node.sync.peer_set.update_status(peer, PeerStatus::Known);

        node.receive_blocks_request(peer, 7, 11, 20);

        let responses = node.take_responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].code, ResponseCode::Synced);
        assert_eq!(responses[0].from, 10);
    }
}
