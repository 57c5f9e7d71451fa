use super::*;

fn entry(success: bool) -> PackratEntry {
    PackratEntry {
        end: State::default(),
        cst: success.then(|| CstNode::new("Rule")),
        success,
        consumed: 0,
    }
}

#[test]
fn entries_are_write_once() {
    let mut cache = PackratCache::default();
    assert!(cache.insert(("Rule", (0, 0)), entry(true)));
    assert!(!cache.insert(("Rule", (0, 0)), entry(false)));
    assert!(cache.get(&("Rule", (0, 0))).is_some_and(|e| e.success));
    assert!(cache.insert(("Rule", (1, 0)), entry(false)));
    assert!(cache.insert(("Other", (0, 0)), entry(false)));
    assert_eq!(cache.len(), 3);

    cache.clear();
    assert!(cache.get(&("Rule", (0, 0))).is_none());
}
