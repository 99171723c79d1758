use xtrace_collapse::aggregator::{
    build_collapsed_stacks, calculate_hot_paths, CallStack, FrequencyTable, StackOrder,
};

#[test]
fn test_push_then_pop_restores_path() {
    let mut stack = CallStack::new();
    stack.push("{main}", 0.0);
    stack.push("require", 1.0);
    let before = stack.path().to_string();

    stack.push("strlen", 2.0);
    let (path, duration) = stack.pop(5.0).unwrap();

    assert_eq!(path, "{main};require;strlen");
    assert_eq!(duration, 3.0);
    assert_eq!(stack.path(), before);
}

#[test]
fn test_deep_stack_unwinds_to_empty() {
    let mut stack = CallStack::new();
    for i in 0..100 {
        stack.push(format!("fn{i}"), i as f64);
    }
    for _ in 0..100 {
        assert!(stack.pop(1000.0).is_some());
    }

    assert!(stack.is_empty());
    assert_eq!(stack.path(), "");
    assert_eq!(stack.max_depth(), 100);
}

#[test]
fn test_identical_paths_accumulate() {
    let mut stack = CallStack::new();
    let mut table = FrequencyTable::new();

    stack.push("{main}", 0.0);
    for (start, end) in [(1.0, 4.0), (10.0, 17.0)] {
        stack.push("f", start);
        let (path, duration) = stack.pop(end).unwrap();
        table.record(path, duration);
    }

    assert_eq!(table.len(), 1);
    assert_eq!(table.get("{main};f"), Some(10.0));
}

#[test]
fn test_unmatched_exit_changes_nothing() {
    let mut stack = CallStack::new();
    assert_eq!(stack.pop(1.0), None);
    assert_eq!(stack.depth(), 0);
    assert_eq!(stack.path(), "");
}

#[test]
fn test_hot_paths_from_table() {
    let mut table = FrequencyTable::new();
    table.record("{main}".to_string(), 100.0);
    table.record("{main};a".to_string(), 75.0);
    table.record("{main};b".to_string(), 20.0);

    let stacks = build_collapsed_stacks(table, StackOrder::Unordered);
    let hot = calculate_hot_paths(&stacks, 2);

    assert_eq!(hot.len(), 2);
    assert_eq!(hot[1].stack, "{main};a");
    assert_eq!(hot[1].percentage, 75.0);
}
