use std::collections::HashSet;

use microkernel_api::address::{ActorId, NodeId};

#[test]
fn test_node_and_sequence_packing() {
    let id = ActorId::new(3, 42);
    assert_eq!(id.node(), 3);
    assert_eq!(id.seq(), 42);
    assert_eq!(id.as_raw(), (3u64 << 32) | 42);
    assert_eq!(ActorId::from_raw(id.as_raw()), id);
    assert_eq!(u64::from(id), id.as_raw());
}

#[test]
fn test_extreme_values() {
    let id = ActorId::new(NodeId::MAX, u32::MAX);
    assert_eq!(id.node(), NodeId::MAX);
    assert_eq!(id.seq(), u32::MAX);
    assert!(id.is_valid());
}

// Sequence zero is invalid on every node
#[test]
fn test_invalid_address() {
    assert!(!ActorId::INVALID.is_valid());
    assert!(!ActorId::new(7, 0).is_valid());
    assert_eq!(ActorId::default(), ActorId::INVALID);
    assert!(ActorId::new(0, 1).is_valid());
}

#[test]
fn test_formatting() {
    assert_eq!(ActorId::new(1, 5).to_string(), "<1.5>");
    assert_eq!(ActorId::INVALID.to_string(), "<invalid>");
    assert_eq!(format!("{:?}", ActorId::new(1, 5)), "ActorId(1:5)");
}

#[test]
fn test_ordering_follows_node_then_sequence() {
    let mut ids = vec![ActorId::new(1, 1), ActorId::new(0, 9), ActorId::new(0, 2)];
    ids.sort();
    assert_eq!(ids, vec![ActorId::new(0, 2), ActorId::new(0, 9), ActorId::new(1, 1)]);

    let set: HashSet<ActorId> = ids.iter().copied().collect();
    assert!(set.contains(&ActorId::new(0, 9)));
    assert!(!set.contains(&ActorId::new(1, 9)));
}
