use blimmp_layout::{
    EdgeSpec, LayoutConfig, LayoutDiagnostic, NodeSpec, Point, RankDir, layout,
};

fn nodes(ids: &[&str]) -> Vec<NodeSpec> {
    ids.iter().map(|id| NodeSpec::new(*id, 40.0, 40.0)).collect()
}

fn edges(pairs: &[(&str, &str)]) -> Vec<EdgeSpec> {
    pairs.iter().map(|(s, t)| EdgeSpec::new(*s, *t)).collect()
}

#[test]
fn layout_can_layout_a_single_node() {
    let result = layout(&nodes(&["a"]), &[], &LayoutConfig::default());
    let a = result.node("a").unwrap();
    assert_eq!((a.x, a.y), (20.0, 20.0));
    assert_eq!(result.extent.width(), 40.0);
    assert_eq!(result.extent.height(), 40.0);
    assert!(result.diagnostics.is_empty());
}

#[test]
fn layout_can_layout_two_nodes_connected_by_an_edge() {
    let result = layout(
        &nodes(&["a", "b"]),
        &edges(&[("a", "b")]),
        &LayoutConfig::default(),
    );
    let a = result.node("a").unwrap();
    let b = result.node("b").unwrap();
    assert_eq!((a.x, a.y), (20.0, 20.0));
    assert_eq!((b.x, b.y), (20.0, 110.0));
    assert_eq!((a.layer, b.layer), (0, 1));
    assert_eq!(
        result.edges[0].points,
        vec![Point::new(20.0, 20.0), Point::new(20.0, 110.0)]
    );
}

#[test]
fn layout_respects_ranksep() {
    let config = LayoutConfig {
        ranksep: 200.0,
        ..Default::default()
    };
    let result = layout(&nodes(&["a", "b"]), &edges(&[("a", "b")]), &config);
    assert_eq!(result.node("b").unwrap().y, 40.0 + 200.0 + 20.0);
}

#[test]
fn layout_can_layout_left_to_right() {
    let config = LayoutConfig {
        rankdir: RankDir::LR,
        ..Default::default()
    };
    let result = layout(&nodes(&["a", "b"]), &edges(&[("a", "b")]), &config);
    let a = result.node("a").unwrap();
    let b = result.node("b").unwrap();
    assert_eq!(a.y, b.y);
    assert!(b.x > a.x);
}

#[test]
fn long_edges_are_routed_through_intermediate_layers() {
    let result = layout(
        &nodes(&["a", "b", "c"]),
        &edges(&[("a", "b"), ("b", "c"), ("a", "c")]),
        &LayoutConfig::default(),
    );
    assert_eq!(result.layer_count(), 3);
    let long = &result.edges[2];
    assert_eq!(long.points.len(), 3);
    let a = result.node("a").unwrap();
    let c = result.node("c").unwrap();
    assert_eq!(long.points[0], Point::new(a.x, a.y));
    assert_eq!(long.points[2], Point::new(c.x, c.y));
    assert_eq!(long.points[1].y, result.node("b").unwrap().y);
}

#[test]
fn dangling_edge_gets_a_placeholder_route_and_diagnostic() {
    let result = layout(
        &nodes(&["K00001", "K00002"]),
        &edges(&[("K00001", "K00002"), ("K00001", "X9")]),
        &LayoutConfig::default(),
    );
    assert_eq!(result.edges.len(), 2);
    assert!(!result.edges[0].placeholder);

    let dangling = &result.edges[1];
    assert!(dangling.placeholder);
    assert_eq!(
        dangling.points,
        vec![Point::new(0.0, 0.0), Point::new(0.0, 10.0)]
    );
    assert_eq!(
        result.diagnostics,
        vec![LayoutDiagnostic::DanglingEdge {
            index: 1,
            source: "K00001".to_string(),
            target: "X9".to_string(),
            missing: vec!["X9".to_string()],
        }]
    );
}

#[test]
fn isolated_node_is_still_positioned() {
    let result = layout(
        &nodes(&["a", "b", "lonely"]),
        &edges(&[("a", "b")]),
        &LayoutConfig::default(),
    );
    let lonely = result.node("lonely").unwrap();
    assert_eq!(lonely.layer, 0);
    assert!(lonely.x.is_finite() && lonely.y.is_finite());
    assert_ne!(lonely.x, result.node("a").unwrap().x);
}

#[test]
fn cycles_are_broken_and_routes_keep_their_direction() {
    let result = layout(
        &nodes(&["a", "b"]),
        &edges(&[("a", "b"), ("b", "a")]),
        &LayoutConfig::default(),
    );
    let a = result.node("a").unwrap();
    let b = result.node("b").unwrap();
    assert!(a.layer < b.layer);

    let back = &result.edges[1];
    assert!(back.reversed);
    assert_eq!(back.points.first(), Some(&Point::new(b.x, b.y)));
    assert_eq!(back.points.last(), Some(&Point::new(a.x, a.y)));
    assert!(result.diagnostics.iter().any(|d| matches!(
        d,
        LayoutDiagnostic::CycleEdgeReversed { index: 1, .. }
    )));
}

#[test]
fn self_loops_do_not_affect_ranking() {
    let result = layout(
        &nodes(&["a", "b"]),
        &edges(&[("a", "a"), ("a", "b")]),
        &LayoutConfig::default(),
    );
    assert_eq!(result.node("a").unwrap().layer, 0);
    assert_eq!(result.node("b").unwrap().layer, 1);
    let lp = &result.edges[0].points;
    assert_eq!(lp.first(), lp.last());
    assert!(!result.edges[0].reversed);
}

#[test]
fn duplicate_node_ids_keep_the_first_occurrence() {
    let mut input = nodes(&["a", "b"]);
    input.push(NodeSpec::new("a", 100.0, 100.0));
    let result = layout(&input, &[], &LayoutConfig::default());
    assert_eq!(result.nodes.len(), 2);
    assert_eq!(result.node("a").unwrap().width, 40.0);
    assert_eq!(
        result.diagnostics,
        vec![LayoutDiagnostic::DuplicateNode {
            id: "a".to_string()
        }]
    );
}

#[test]
fn empty_input_produces_empty_result() {
    let result = layout(&[], &[], &LayoutConfig::default());
    assert!(result.nodes.is_empty());
    assert!(result.edges.is_empty());
    assert_eq!(result.layer_count(), 0);
}

#[test]
fn layout_result_serializes_diagnostics_with_kind_tag() {
    let result = layout(
        &nodes(&["a"]),
        &edges(&[("a", "missing")]),
        &LayoutConfig::default(),
    );
    let json = serde_json::to_value(&result.diagnostics).unwrap();
    assert_eq!(json[0]["kind"], "dangling_edge");
    assert_eq!(json[0]["missing"][0], "missing");
}
