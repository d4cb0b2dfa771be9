//! End-to-end catch-up between two synchronizers wired back to back.
//!
//! Outbound traffic from each node's mock transport is pumped into the
//! other node until the wire goes quiet, so a whole conversation runs
//! without any real networking.

use basin_sync::testing::TestNode;
use basin_sync::{Message, NetworkEvent, ResponseCode, SyncConfig};

/// Deliver queued traffic between the two nodes until both are idle.
/// Returns every message that crossed the wire, in delivery order.
fn pump(a: &mut TestNode, b: &mut TestNode) -> Vec<Message> {
    let a_id = a.sync.self_id();
    let b_id = b.sync.self_id();
    let mut delivered = Vec::new();

    loop {
        let mut traffic = Vec::new();
        for (to, message) in a.network.take_sent() {
            traffic.push((a_id, to, message));
        }
        for message in a.network.take_broadcasts() {
            traffic.push((a_id, b_id, message));
        }
        for (to, message) in b.network.take_sent() {
            traffic.push((b_id, to, message));
        }
        for message in b.network.take_broadcasts() {
            traffic.push((b_id, a_id, message));
        }
        if traffic.is_empty() {
            return delivered;
        }

        for (from, to, message) in traffic {
            delivered.push(message.clone());
            if to == a_id {
                a.sync.handle_event(NetworkEvent::Message { from, message });
            } else if to == b_id {
                b.sync.handle_event(NetworkEvent::Message { from, message });
            }
        }
    }
}

fn connect(a: &mut TestNode, b: &mut TestNode) -> Vec<Message> {
    let b_id = b.sync.self_id();
    a.sync.handle_event(NetworkEvent::Connected(b_id));
    pump(a, b)
}

#[test]
fn test_fresh_node_catches_up_to_a_peer() {
    let mut server = TestNode::with_chain_height(10);
    let mut fresh = TestNode::with_chain_height(0);

    connect(&mut server, &mut fresh);

    assert_eq!(fresh.chain_height(), 10);
    assert_eq!(fresh.sync.sessions().number_of_open_sessions(), 0);

    // Both sides learned each other's height along the way.
    let server_id = server.sync.self_id();
    let fresh_id = fresh.sync.self_id();
    assert_eq!(fresh.sync.peer_set().peer(&server_id).unwrap().height, 10);
    assert_eq!(server.sync.peer_set().peer(&fresh_id).unwrap().height, 9);
}

#[test]
fn test_replicated_blocks_are_byte_identical() {
    let mut server = TestNode::with_chain_height(5);
    let mut fresh = TestNode::with_chain_height(0);

    connect(&mut server, &mut fresh);

    assert_eq!(fresh.chain_height(), 5);
    for height in 1..=5 {
        assert_eq!(fresh.block_data(height), server.block_data(height));
    }
}

#[test]
fn test_catch_up_runs_in_batches() {
    let config = SyncConfig {
        block_per_message: 3,
        ..SyncConfig::default()
    };
    let mut server = TestNode::with_config(config, 10);
    let mut fresh = TestNode::with_chain_height(0);

    let delivered = connect(&mut server, &mut fresh);

    let mut more_blocks = 0;
    let mut synced = 0;
    for message in &delivered {
        if let Message::BlocksResponse(response) = message {
            match response.code {
                ResponseCode::MoreBlocks => {
                    assert!(response.count() <= 3);
                    more_blocks += 1;
                }
                ResponseCode::Synced => {
                    assert!(response.last_certificate.is_some());
                    synced += 1;
                }
                other => panic!("unexpected response code: {other}"),
            }
        }
    }
    assert_eq!(more_blocks, 4);
    assert_eq!(synced, 1);
    assert_eq!(fresh.chain_height(), 10);
}

#[test]
fn test_partially_synced_node_requests_only_the_gap() {
    let mut server = TestNode::with_chain_height(10);
    let mut behind = TestNode::with_chain_height(6);

    let delivered = connect(&mut server, &mut behind);

    let request = delivered
        .iter()
        .find_map(|message| match message {
            Message::BlocksRequest(req) => Some(*req),
            _ => None,
        })
        .expect("a blocks-request crossed the wire");
    assert_eq!(request.from, 7);
    assert_eq!(request.to, 10);
    assert_eq!(behind.chain_height(), 10);
}

#[test]
fn test_busy_server_leaves_the_requester_waiting() {
    let config = SyncConfig {
        max_open_sessions: 0,
        ..SyncConfig::default()
    };
    let mut server = TestNode::with_config(config, 10);
    let mut fresh = TestNode::with_chain_height(0);

    let delivered = connect(&mut server, &mut fresh);

    assert!(delivered.iter().any(|message| matches!(
        message,
        Message::BlocksResponse(response) if response.code == ResponseCode::Busy
    )));
    // No progress; the session expires locally later.
    assert_eq!(fresh.chain_height(), 0);
    assert_eq!(fresh.sync.sessions().number_of_open_sessions(), 1);
}

#[test]
fn test_synced_peers_exchange_no_requests() {
    let mut alice = TestNode::with_chain_height(10);
    let mut bob = TestNode::with_chain_height(10);

    let delivered = connect(&mut alice, &mut bob);

    assert!(!delivered
        .iter()
        .any(|message| matches!(message, Message::BlocksRequest(_))));
    assert_eq!(alice.sync.sessions().number_of_open_sessions(), 0);
    assert_eq!(bob.sync.sessions().number_of_open_sessions(), 0);
}
