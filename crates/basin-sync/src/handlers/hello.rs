//! Handshake handling.

use basin_types::PeerId;

use crate::error::SyncError;
use crate::message::HelloMessage;
use crate::peer::PeerStatus;
use crate::ports::{ChainState, Consensus, Network};
use crate::synchronizer::Synchronizer;

impl<S, N, C> Synchronizer<S, N, C>
where
    S: ChainState,
    N: Network,
    C: Consensus,
{
    pub(crate) fn handle_hello(
        &mut self,
        msg: &HelloMessage,
        initiator: PeerId,
    ) -> Result<(), SyncError> {
        if msg.peer_id != initiator {
            return Err(SyncError::InvalidMessage(format!(
                "hello claims id {} but arrived from {}",
                msg.peer_id, initiator
            )));
        }

        let peer = self.peer_set.get_peer(initiator);
        let status = peer.status;
        if peer.is_banned() {
            return Err(SyncError::InvalidMessage("peer is banned".to_string()));
        }

        self.peer_set.update_moniker(initiator, msg.moniker.clone());
        self.peer_set.update_height(initiator, msg.height);
        self.peer_set
            .update_full_history(initiator, msg.has_full_history());
        if status == PeerStatus::Unknown {
            self.peer_set.update_status(initiator, PeerStatus::Known);
        }
        tracing::info!(
            peer = %initiator,
            moniker = %msg.moniker,
            height = msg.height,
            ack = msg.is_ack(),
            "hello received"
        );

        if !msg.is_ack() {
            self.say_hello(initiator, true);
        }

        // The peer may be ahead of us.
        self.try_sync();
        Ok(())
    }
}
