use super::*;

macro_rules! leaf {
    ($($value:expr),* $(,)?) => {
        Node {
            values: vec![$($value),*],
            ..Default::default()
        }
    };
}

/// Allocates a parent with the given leaves as children and wires up the
/// back-handles.
fn family(arena: &mut Arena, leaves: Vec<Node>) -> (NodeId, Vec<NodeId>) {
    let parent = arena.alloc(Node::default());
    let mut children = Vec::new();
    for leaf in leaves {
        let id = arena.alloc(leaf);
        arena.get_mut(id).parent = Some(parent);
        arena.get_mut(parent).children.push(id);
        children.push(id);
    }
    (parent, children)
}

#[test]
fn is_leaf() {
    let mut arena = Arena::default();
    let (parent, children) = family(&mut arena, vec![leaf![10], leaf![30]]);

    assert!(!arena.get(parent).is_leaf());
    assert!(arena.get(children[0]).is_leaf());
}

#[test]
fn overflow_at_fan_out_boundary() {
    let node = leaf![10, 20];
    assert!(!node.is_overflow(2));
    assert!(node.is_overflow(1));
}

#[test]
fn underflow_non_root() {
    let mut arena = Arena::default();
    let (_, children) = family(&mut arena, vec![leaf![10], leaf![]]);

    assert!(!arena.get(children[0]).is_underflow(1));
    assert!(arena.get(children[1]).is_underflow(1));
}

#[test]
fn underflow_root_only_when_empty() {
    let one_value = leaf![10];
    let empty = leaf![];

    // A root with any value at all is never underfull, even below the
    // non-root minimum.
    assert!(!one_value.is_underflow(3));
    assert!(empty.is_underflow(3));
    assert!(empty.is_underflow(0));
}

#[test]
fn index_in_parent() {
    let mut arena = Arena::default();
    let (_, children) = family(&mut arena, vec![leaf![10], leaf![30], leaf![50]]);

    for (i, &child) in children.iter().enumerate() {
        assert_eq!(arena.index_in_parent(child), i);
    }
}

#[test]
#[should_panic(expected = "the root has no parent")]
fn index_in_parent_of_root() {
    let mut arena = Arena::default();
    let root = arena.alloc(leaf![10]);
    arena.index_in_parent(root);
}

#[test]
fn neighbors() {
    let mut arena = Arena::default();
    let (_, children) = family(&mut arena, vec![leaf![10], leaf![30], leaf![50]]);

    assert_eq!(arena.left_neighbor(children[0]), None);
    assert_eq!(arena.left_neighbor(children[1]), Some(children[0]));
    assert_eq!(arena.right_neighbor(children[1]), Some(children[2]));
    assert_eq!(arena.right_neighbor(children[2]), None);
}

#[test]
fn alloc_reuses_freed_slots() {
    let mut arena = Arena::default();
    let first = arena.alloc(leaf![10]);
    let second = arena.alloc(leaf![20]);
    assert_eq!(arena.live(), 2);

    let freed = arena.free(first);
    assert_eq!(freed.values, vec![10]);
    assert_eq!(arena.live(), 1);

    let reused = arena.alloc(leaf![30]);
    assert_eq!(reused, first);
    assert_eq!(arena.live(), 2);
    assert_eq!(arena.get(second).values, vec![20]);
    assert_eq!(arena.get(reused).values, vec![30]);
}

#[test]
#[should_panic(expected = "node must not be freed twice")]
fn double_free() {
    let mut arena = Arena::default();
    let id = arena.alloc(leaf![10]);
    arena.free(id);
    arena.free(id);
}
