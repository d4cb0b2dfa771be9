//! Requesting side of the catch-up protocol.

use basin_types::PeerId;

use crate::error::SyncError;
use crate::message::{BlocksResponseMessage, ResponseCode};
use crate::ports::{ChainState, Consensus, Network};
use crate::session::SessionStatus;
use crate::synchronizer::Synchronizer;

impl<S, N, C> Synchronizer<S, N, C>
where
    S: ChainState,
    N: Network,
    C: Consensus,
{
    pub(crate) fn handle_blocks_response(
        &mut self,
        msg: &BlocksResponseMessage,
        initiator: PeerId,
    ) -> Result<(), SyncError> {
        // Busy responses carry no usable session id; the session at that
        // peer times out on its own.
        if msg.code == ResponseCode::Busy {
            tracing::info!(peer = %initiator, "peer is busy");
            return Ok(());
        }

        let Some(session) = self.sessions.find_session(msg.session_id) else {
            // Late response for a session already closed or expired.
            tracing::debug!(
                peer = %initiator,
                session_id = msg.session_id,
                "response for an unknown session"
            );
            return Ok(());
        };
        if session.peer_id != initiator {
            return Err(SyncError::InvalidMessage(format!(
                "response for session #{} from the wrong peer",
                msg.session_id
            )));
        }

        match msg.code {
            ResponseCode::Busy => unreachable!("handled above"),
            ResponseCode::Rejected => {
                tracing::warn!(peer = %initiator, session_id = msg.session_id, "request rejected");
                self.sessions
                    .close_session(msg.session_id, SessionStatus::Uncompleted);
            }
            ResponseCode::MoreBlocks => {
                for (i, data) in msg.blocks.iter().enumerate() {
                    let height = msg.from.checked_add(i as u32).ok_or_else(|| {
                        SyncError::InvalidMessage("block height overflow".to_string())
                    })?;
                    self.state.add_block(height, data)?;
                }
                self.peer_set.update_height(initiator, msg.last_height());
                // The session stays open until a terminal response.
            }
            ResponseCode::NoMoreBlocks => {
                self.sessions
                    .close_session(msg.session_id, SessionStatus::Uncompleted);
                // Another peer may hold the rest.
                self.try_sync();
            }
            ResponseCode::Synced => {
                // basic_check guarantees the certificate is present.
                if let Some(cert) = &msg.last_certificate {
                    self.state.commit_certificate(cert)?;
                }
                self.peer_set.update_height(initiator, msg.from);
                self.sessions
                    .close_session(msg.session_id, SessionStatus::Completed);
                tracing::info!(
                    peer = %initiator,
                    height = self.state.last_block_height(),
                    "caught up"
                );
            }
        }
        Ok(())
    }
}
