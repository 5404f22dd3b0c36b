use blimmp_core::{BestPathRecord, GraphEdge, GraphNode, ModuleDataset, ModuleId, Scores};
use blimmp_layout::LayoutDiagnostic;
use blimmp_render::color::Rgb;
use blimmp_render::legend::LegendKind;
use blimmp_render::{NodeFill, RenderConfig, ScoreView, ViewState, render_scene, render_svg};

fn node(id: &str, occurrence: Option<f64>) -> GraphNode {
    GraphNode {
        occurrence,
        ..GraphNode::new(id)
    }
}

fn scored(id: &str, before: f64, after: f64, significance: Option<f64>) -> GraphNode {
    GraphNode {
        occurrence: Some(1.0),
        scores: Some(Scores { before, after }),
        significance,
        ..GraphNode::new(id)
    }
}

fn dataset(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> ModuleDataset {
    ModuleDataset {
        module_id: ModuleId::parse("M00001").unwrap(),
        nodes,
        edges,
        best_path: None,
        metadata: None,
    }
}

fn view() -> ViewState {
    ViewState::for_width(1750.0, &RenderConfig::default())
}

#[test]
fn radius_scale_spans_occurrence_extent() {
    let ds = dataset(
        vec![
            node("A", Some(1.0)),
            node("B", Some(5.0)),
            node("C", Some(10.0)),
        ],
        vec![GraphEdge::new("A", "B", 1.0), GraphEdge::new("B", "C", 1.0)],
    );
    let scene = render_scene(&ds, &view(), &RenderConfig::default()).unwrap();
    assert_eq!(scene.node("A").unwrap().radius, 5.0);
    assert_eq!(scene.node("C").unwrap().radius, 20.0);
    let b = scene.node("B").unwrap().radius;
    assert!((b - (5.0 + 15.0 * 4.0 / 9.0)).abs() < 1e-9);
}

#[test]
fn missing_radius_defaults_to_ten() {
    let ds = dataset(vec![node("A", None), node("B", None)], vec![]);
    let scene = render_scene(&ds, &view(), &RenderConfig::default()).unwrap();
    assert!(scene.nodes.iter().all(|n| n.radius == 10.0));
}

#[test]
fn dangling_edge_renders_with_placeholder_route() {
    let ds = dataset(
        vec![node("K00001", Some(2.0)), node("K00002", Some(4.0))],
        vec![
            GraphEdge::new("K00001", "K00002", 1.0),
            GraphEdge::new("K00001", "X9", 1.0),
        ],
    );
    let scene = render_scene(&ds, &view(), &RenderConfig::default()).unwrap();
    assert_eq!(scene.nodes.len(), 2);
    assert_eq!(scene.edges.len(), 2);
    assert!(!scene.edges[0].placeholder);
    assert!(scene.edges[1].placeholder);
    assert_eq!(scene.edges[1].route.len(), 2);
    assert!(scene.diagnostics.iter().any(|d| matches!(
        d,
        LayoutDiagnostic::DanglingEdge { missing, .. } if missing == &vec!["X9".to_string()]
    )));
}

#[test]
fn toggling_score_view_only_changes_the_score_half() {
    let ds = dataset(
        vec![
            scored("K1", 0.2, 0.8, Some(1e-10)),
            node("K2", Some(3.0)),
        ],
        vec![GraphEdge::new("K1", "K2", 1.0)],
    );
    let config = RenderConfig::default();
    let mut state = view();
    let before = render_scene(&ds, &state, &config).unwrap();
    state.score_view = ScoreView::After;
    let after = render_scene(&ds, &state, &config).unwrap();

    let (b, a) = (before.node("K1").unwrap(), after.node("K1").unwrap());
    assert_eq!((b.x, b.y, b.radius), (a.x, a.y, a.radius));
    match (b.fill, a.fill) {
        (
            NodeFill::Split {
                score: s0,
                significance: e0,
            },
            NodeFill::Split {
                score: s1,
                significance: e1,
            },
        ) => {
            assert_ne!(s0, s1);
            assert_eq!(e0, e1);
        }
        other => panic!("expected split fills, got {other:?}"),
    }
    assert_eq!(before.node("K2"), after.node("K2"));
    assert_eq!(before.edges, after.edges);
}

#[test]
fn non_finite_significance_uses_neutral_color() {
    let ds = dataset(
        vec![
            scored("K1", 0.5, 0.5, Some(0.0)),
            scored("K2", 0.5, 0.5, Some(-3.0)),
            scored("K3", 0.5, 0.5, None),
        ],
        vec![],
    );
    let scene = render_scene(&ds, &view(), &RenderConfig::default()).unwrap();
    for n in &scene.nodes {
        match n.fill {
            NodeFill::Split { significance, .. } => {
                assert_eq!(significance, Rgb::new(0x88, 0x88, 0x88))
            }
            other => panic!("expected split fill, got {other:?}"),
        }
    }
}

#[test]
fn sentinels_use_the_fixed_color() {
    let ds = dataset(
        vec![GraphNode::new("start"), node("K1", Some(1.0)), GraphNode::new("end")],
        vec![GraphEdge::new("start", "K1", 0.0), GraphEdge::new("K1", "end", 0.0)],
    );
    let scene = render_scene(&ds, &view(), &RenderConfig::default()).unwrap();
    let sentinel = NodeFill::Sentinel {
        color: Rgb::new(0x2c, 0x7f, 0xb8),
    };
    assert_eq!(scene.node("start").unwrap().fill, sentinel);
    assert_eq!(scene.node("end").unwrap().fill, sentinel);
}

#[test]
fn rendering_is_idempotent() {
    let ds = dataset(
        vec![
            scored("K1", 0.1, 0.9, Some(1e-20)),
            scored("K2", 0.4, 0.3, Some(1e-3)),
            node("K3", Some(7.0)),
            node("K3_2", Some(2.0)),
        ],
        vec![
            GraphEdge::new("K1", "K2", 3.0),
            GraphEdge::new("K1", "K3", 1.0),
            GraphEdge::new("K2", "K3_2", 9.0),
            GraphEdge::new("K3", "K1", 2.0),
        ],
    );
    let config = RenderConfig::default();
    let first = render_scene(&ds, &view(), &config).unwrap();
    let second = render_scene(&ds, &view(), &config).unwrap();
    assert_eq!(first, second);
    assert_eq!(render_svg(&first), render_svg(&second));
}

#[test]
fn labels_strip_suffix_and_sit_above_the_node() {
    let ds = dataset(vec![node("K00844_2", None)], vec![]);
    let scene = render_scene(&ds, &view(), &RenderConfig::default()).unwrap();
    let n = scene.node("K00844_2").unwrap();
    assert_eq!(n.label, "K00844");
    assert_eq!(n.label_dy, -14.0);
}

#[test]
fn legends_follow_active_scales() {
    let config = RenderConfig::default();
    let scored_only = dataset(vec![scored("K1", 0.2, 0.8, Some(1e-5))], vec![]);
    let scene = render_scene(&scored_only, &view(), &config).unwrap();
    let kinds: Vec<LegendKind> = scene.legend.legends.iter().map(|l| l.kind).collect();
    assert_eq!(kinds, vec![LegendKind::Score, LegendKind::Significance]);
    assert_eq!(scene.legend.legends[0].title, "Score (before)");
    assert_eq!(scene.legend.x, 1750.0 - 250.0 + 20.0);

    let significance = &scene.legend.legends[1];
    let labels: Vec<&str> = significance.ticks.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["1e-50", "1e-25", "1e0"]);
    assert_eq!(significance.stops.first().unwrap().color, Rgb::new(255, 0, 0));
    assert_eq!(significance.stops.last().unwrap().color, Rgb::WHITE);

    let plain = dataset(
        vec![node("A", Some(1.0)), node("B", Some(3.0))],
        vec![GraphEdge::new("A", "B", 2.0)],
    );
    let scene = render_scene(&plain, &view(), &config).unwrap();
    let kinds: Vec<LegendKind> = scene.legend.legends.iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        vec![LegendKind::NodeOccurrence, LegendKind::EdgeOccurrence]
    );
}

#[test]
fn best_path_summary_uses_four_decimals() {
    let mut ds = dataset(vec![node("A", None)], vec![]);
    ds.best_path = Some(BestPathRecord {
        path_label: "A -> B".to_string(),
        aggregate_before: Some(0.4481234),
        aggregate_after: None,
        path_id: Some(1),
        raw_before: None,
        raw_after: None,
    });
    let scene = render_scene(&ds, &view(), &RenderConfig::default()).unwrap();
    let table = scene.summary.as_ref().unwrap();
    let values: Vec<(&str, &str)> = table
        .rows
        .iter()
        .map(|r| (r.label.as_str(), r.value.as_str()))
        .collect();
    assert_eq!(
        values,
        vec![
            ("Module", "M00001"),
            ("Best path", "A -> B"),
            ("Before", "0.4481"),
            ("After", "n/a"),
        ]
    );
}

#[test]
fn svg_carries_tooltips_and_data_attributes() {
    let ds = dataset(
        vec![scored("K1", 0.2, 0.8, Some(1e-30)), node("K<2>", Some(3.0))],
        vec![GraphEdge::new("K1", "K<2>", 4.0)],
    );
    let scene = render_scene(&ds, &view(), &RenderConfig::default()).unwrap();
    let svg = render_svg(&scene);
    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(svg.contains(r#"data-id="K1""#));
    assert!(svg.contains(r#"data-id="K&lt;2&gt;""#));
    assert!(svg.contains("E-value: 1e-30"));
    assert!(svg.contains(r#"class="score""#));
    assert!(svg.contains(r#"marker-end="url(#arrow-0)""#));
    assert!(svg.contains(r#"markerUnits="strokeWidth""#));
    assert!(svg.contains("Color Scales"));
    assert!(svg.trim_end().ends_with("</svg>"));
}

#[test]
fn empty_dataset_renders_an_empty_scene() {
    let ds = dataset(vec![], vec![]);
    let scene = render_scene(&ds, &view(), &RenderConfig::default()).unwrap();
    assert!(scene.nodes.is_empty());
    assert!(scene.edges.is_empty());
    assert!(scene.legend.legends.is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let config = RenderConfig {
        height: 0.0,
        ..Default::default()
    };
    let ds = dataset(vec![], vec![]);
    assert!(render_scene(&ds, &view(), &config).is_err());
}
