//! Integration tests for local registration, peer status and directory queries.

mod common;

use common::{init_tracing, new_manager, three_group_status};
use gateway_directory::{NodeId, NodeStatus, P2pId};

// ==================== Registration Tests ====================

#[test]
fn test_register_unregister_scenario() {
    init_tracing();
    let manager = new_manager("local");
    let node = NodeId::from("n");

    let seq = manager.status_seq();
    assert!(manager.register_node("G", &node, None));
    assert_eq!(manager.status_seq(), seq + 1);

    assert!(!manager.register_node("G", &node, None));
    assert_eq!(manager.status_seq(), seq + 1);

    assert!(manager.unregister_node("G", &node));
    assert_eq!(manager.status_seq(), seq + 2);

    assert!(!manager.unregister_node("G", &node));
    assert_eq!(manager.status_seq(), seq + 2);

    let status = NodeStatus::decode(&manager.generate_node_status()).expect("decode status");
    assert_eq!(status.seq(), manager.status_seq());
    assert!(status.groups().is_empty());
}

#[test]
fn test_register_loop_over_distinct_groups() {
    init_tracing();
    let manager = new_manager("local");

    for i in 0..100 {
        let group = format!("group{i}");
        let node = NodeId::from(format!("nodeID{i}"));

        let seq = manager.status_seq();
        assert!(manager.register_node(&group, &node, None));
        assert_eq!(manager.status_seq(), seq + 1);

        let seq = manager.status_seq();
        assert!(!manager.register_node(&group, &node, None));
        assert_eq!(manager.status_seq(), seq);

        assert!(!manager.generate_node_status().is_empty());

        let seq = manager.status_seq();
        assert!(manager.unregister_node(&group, &node));
        assert_eq!(manager.status_seq(), seq + 1);

        let seq = manager.status_seq();
        assert!(!manager.unregister_node(&group, &node));
        assert_eq!(manager.status_seq(), seq);
    }

    assert!(manager.local_router_table().is_empty());
}

#[test]
fn test_generated_status_tracks_every_registration() {
    init_tracing();
    let manager = new_manager("local");

    for i in 0..100 {
        let seq = manager.status_seq();
        assert!(manager.register_node(
            &format!("group{i}"),
            &NodeId::from(format!("nodeID{i}")),
            None
        ));

        let status = NodeStatus::decode(&manager.generate_node_status()).expect("decode status");
        assert_eq!(status.seq(), seq + 1);
        assert_eq!(status.groups().len(), i + 1);
    }
}

// ==================== Gate Tests ====================

#[test]
fn test_update_peer_status_commits_gate() {
    init_tracing();
    let manager = new_manager("local");
    let peer = P2pId::new("xxxxxxxxxxxxxxxxxxxxx");

    assert!(manager.status_changed(&peer, 110));

    manager.update_peer_status(&peer, NodeStatus::new(110, "testUUID", vec![]));
    assert!(!manager.status_changed(&peer, 110));

    assert!(manager.status_changed(&peer, 1));
    manager.update_peer_status(&peer, NodeStatus::new(1, "testUUID", vec![]));
    assert!(!manager.status_changed(&peer, 1));
}

#[test]
fn test_gate_commits_separately_from_snapshot() {
    init_tracing();
    let manager = new_manager("local");
    let peer = P2pId::new("xxxxxxxxxxxxxxxxxxxxx");

    // Decide on the announced seq, commit the gate, fetch the body later.
    assert!(manager.status_changed(&peer, 110));
    manager.set_status_seq(&peer, 110);
    assert!(!manager.status_changed(&peer, 110));
    assert!(manager.peer_status(&peer).is_none());

    assert!(manager.status_changed(&peer, 1));
    manager.set_status_seq(&peer, 1);
    assert!(!manager.status_changed(&peer, 1));

    manager.update_peer_status(&peer, NodeStatus::new(110, "testUUID", vec![]));
    assert_eq!(manager.peer_seq(&peer), Some(110));
    manager.set_status_seq(&peer, 1);
    assert!(!manager.status_changed(&peer, 1));
    assert_eq!(manager.peer_status(&peer).map(|s| s.seq()), Some(110));
}

// ==================== Query Tests ====================

#[test]
fn test_query_grows_with_each_peer() {
    init_tracing();
    let manager = new_manager("local");
    let status = three_group_status(110);
    let p1 = P2pId::new("xxxxx");
    let p2 = P2pId::new("yyyyy");
    let p3 = P2pId::new("zzzzz");

    manager.update_peer_status(&p1, status.clone());
    {
        let router = manager.peers_router_table();
        let by_group = router.query_p2p_ids_by_group_id("group1");
        assert_eq!(by_group.len(), 1);
        assert_eq!(by_group.iter().next(), Some(&p1));

        let by_node = router.query_p2p_ids("group1", &NodeId::from("a0"));
        assert_eq!(by_node.len(), 1);
        assert_eq!(by_node.iter().next(), Some(&p1));
    }
    assert_eq!(manager.group_node_ids("group1").len(), 3);

    manager.update_peer_status(&p2, status.clone());
    {
        let router = manager.peers_router_table();
        assert_eq!(router.query_p2p_ids_by_group_id("group2").len(), 2);
        assert_eq!(router.query_p2p_ids("group2", &NodeId::from("a1")).len(), 2);
    }

    manager.update_peer_status(&p3, status);
    let router = manager.peers_router_table();
    assert_eq!(router.query_p2p_ids_by_group_id("group3").len(), 3);
    assert_eq!(router.query_p2p_ids("group3", &NodeId::from("a2")).len(), 3);
}

#[test]
fn test_remove_peers_one_by_one() {
    init_tracing();
    let manager = new_manager("local");
    let status = three_group_status(110);
    let p1 = P2pId::new("xxxxx");
    let p2 = P2pId::new("yyyyy");
    let p3 = P2pId::new("zzzzz");
    let a0 = NodeId::from("a0");

    manager.update_peer_status(&p1, status.clone());
    manager.update_peer_status(&p2, status.clone());
    manager.update_peer_status(&p3, status);

    {
        let router = manager.peers_router_table();
        let by_group = router.query_p2p_ids_by_group_id("group1");
        assert_eq!(by_group.len(), 3);
        assert!(by_group.contains(&p1) && by_group.contains(&p2) && by_group.contains(&p3));
        assert_eq!(router.query_p2p_ids("group1", &a0).len(), 3);
    }

    manager.on_remove_node_ids(&p1);
    {
        let router = manager.peers_router_table();
        let by_group = router.query_p2p_ids_by_group_id("group1");
        assert_eq!(by_group.len(), 2);
        assert!(!by_group.contains(&p1));
        let by_node = router.query_p2p_ids("group1", &a0);
        assert!(by_node.contains(&p2) && by_node.contains(&p3));
    }

    manager.on_remove_node_ids(&p2);
    {
        let router = manager.peers_router_table();
        assert_eq!(router.query_p2p_ids_by_group_id("group1").len(), 1);
        assert!(router.query_p2p_ids("group1", &a0).contains(&p3));
    }

    manager.on_remove_node_ids(&p3);
    manager.on_remove_node_ids(&p3);
    let router = manager.peers_router_table();
    assert!(router.query_p2p_ids_by_group_id("group1").is_empty());
    assert!(router.query_p2p_ids("group1", &a0).is_empty());
    assert!(router.is_empty());
}
