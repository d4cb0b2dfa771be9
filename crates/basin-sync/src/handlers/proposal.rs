//! Proposal relay.

use basin_types::PeerId;

use crate::error::SyncError;
use crate::message::ProposalMessage;
use crate::ports::{ChainState, Consensus, Network};
use crate::synchronizer::Synchronizer;

impl<S, N, C> Synchronizer<S, N, C>
where
    S: ChainState,
    N: Network,
    C: Consensus,
{
    /// Proposals are not validated here; the consensus engine decides
    /// what to do with them.
    pub(crate) fn handle_proposal(
        &mut self,
        msg: &ProposalMessage,
        initiator: PeerId,
    ) -> Result<(), SyncError> {
        tracing::debug!(peer = %initiator, height = msg.height, round = msg.round, "proposal relayed");
        self.consensus
            .set_proposal(msg.height, msg.round, msg.payload.clone());
        Ok(())
    }
}
