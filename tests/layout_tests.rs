use approx::assert_relative_eq;
use sankey_rs::SankeyError;
use sankey_rs::core::{
    DROPOFF_PADDING_RATIO, FlowRecord, LayoutOptions, MAX_DROPOFF_NODE_SHARE, NodeWidth,
    PathCommand, PixelPoint, Rect, SankeyGraph, SankeyLayout, build_graph, compute_layout,
};

fn link(from: &str, to: &str, weight: f64) -> FlowRecord {
    FlowRecord::new(from, Some(to), weight)
}

fn dropoff(from: &str, weight: f64) -> FlowRecord {
    FlowRecord::new(from, None, weight)
}

/// One wide source feeding a hub that fans out into four leaves.
fn fan_out_graph() -> SankeyGraph {
    build_graph(&[
        link("Big", "X", 100.0),
        link("X", "a", 23.0),
        link("X", "b", 23.0),
        link("X", "c", 23.0),
        link("X", "d", 23.0),
        dropoff("X", 8.0),
    ])
    .expect("graph")
}

fn layout_of(graph: &SankeyGraph, width: f64, height: f64) -> SankeyLayout {
    compute_layout(graph, Rect::from_size(width, height), LayoutOptions::default()).expect("layout")
}

#[test]
fn overflowing_level_shrinks_padding_to_fit_exactly() {
    let graph = fan_out_graph();
    let layout = layout_of(&graph, 300.0, 100.0);

    assert_eq!(layout.levels.len(), 3);
    assert_relative_eq!(layout.column_width, 100.0);
    assert_relative_eq!(layout.node_width, 12.0);
    assert_relative_eq!(layout.dropoff_padding, 12.0 * DROPOFF_PADDING_RATIO);
    assert_relative_eq!(layout.weight_aspect, 0.964, epsilon = 1e-12);

    let leaves = &layout.levels[2];
    assert!(leaves.padding < 20.0);
    assert_relative_eq!(leaves.padding, (100.0 - 92.0 * 0.964) / 3.0, epsilon = 1e-9);
    assert_relative_eq!(leaves.height, 100.0, epsilon = 1e-9);
    assert_relative_eq!(leaves.top, 0.0, epsilon = 1e-9);

    let hub = &layout.levels[1];
    assert_relative_eq!(hub.height, 100.0, epsilon = 1e-9);
    for level in &layout.levels {
        assert!(level.height <= 100.0 + 1e-9);
    }
}

#[test]
fn single_link_geometry_is_snapped_and_centered() {
    let graph = build_graph(&[link("A", "B", 10.0)]).expect("graph");
    let layout = layout_of(&graph, 300.0, 100.0);

    assert_relative_eq!(layout.weight_aspect, 10.0);
    let a = layout.node_by_id(0).expect("A");
    let b = layout.node_by_id(1).expect("B");
    assert_relative_eq!(a.rect.left, 66.5);
    assert_relative_eq!(a.rect.right(), 84.5);
    assert_relative_eq!(b.rect.left, 216.5);
    assert_relative_eq!(a.rect.top, 0.5);

    let flow = &layout.flows[0];
    assert_relative_eq!(flow.left, a.rect.right());
    assert_relative_eq!(flow.right, b.rect.left);
    assert_relative_eq!(flow.curvy, 0.33 * (300.0 - 18.0));
    assert!(matches!(
        flow.path.commands().first(),
        Some(PathCommand::MoveTo { .. })
    ));
    assert!(matches!(flow.path.commands().last(), Some(PathCommand::Close)));
}

#[test]
fn nodes_stay_inside_bounds() {
    let graph = fan_out_graph();
    let bounds = Rect::new(10.0, 20.0, 300.0, 100.0);
    let layout = compute_layout(&graph, bounds, LayoutOptions::default()).expect("layout");

    for node in &layout.nodes {
        assert!(node.rect.left >= bounds.left - 1.0);
        assert!(node.rect.right() <= bounds.right() + 1.0);
        assert!(node.rect.top >= bounds.top - 1.0);
        assert!(node.rect.bottom() <= bounds.bottom() + 1.0);
    }
}

#[test]
fn attachments_stack_contiguously_in_neighbor_order() {
    let graph = fan_out_graph();
    let layout = layout_of(&graph, 300.0, 100.0);

    let hub_index = graph.node_index("X").expect("X");
    let hub = layout.node(hub_index).expect("hub geometry");
    assert_eq!(hub.outcome.len(), 4);
    assert_relative_eq!(hub.outcome[0].y1, hub.rect.top);
    for pair in hub.outcome.windows(2) {
        assert_relative_eq!(pair[0].y2, pair[1].y1, epsilon = 1e-9);
    }

    let target_ids: Vec<usize> = hub
        .outcome
        .iter()
        .map(|segment| {
            let to = graph.flow(segment.flow).to.expect("link");
            graph.node(to).id
        })
        .collect();
    let mut sorted = target_ids.clone();
    sorted.sort_unstable();
    assert_eq!(target_ids, sorted);

    let stacked = hub.outcome[3].y2 - hub.outcome[0].y1;
    assert_relative_eq!(stacked, 92.0 * layout.weight_aspect, epsilon = 1e-9);
}

fn outcome_by_target(graph: &SankeyGraph, layout: &SankeyLayout, name: &str) -> Vec<(String, f64, f64)> {
    let index = graph.node_index(name).expect("node");
    layout
        .node(index)
        .expect("geometry")
        .outcome
        .iter()
        .map(|segment| {
            let to = graph.flow(segment.flow).to.expect("link");
            (graph.node(to).name.clone(), segment.y1, segment.y2)
        })
        .collect()
}

fn income_by_source(graph: &SankeyGraph, layout: &SankeyLayout, name: &str) -> Vec<(String, f64, f64)> {
    let index = graph.node_index(name).expect("node");
    layout
        .node(index)
        .expect("geometry")
        .income
        .iter()
        .map(|segment| {
            let from = graph.flow(segment.flow).from;
            (graph.node(from).name.clone(), segment.y1, segment.y2)
        })
        .collect()
}

#[test]
fn attachments_follow_neighbor_ids_not_declaration_order() {
    // X is created before Y, then S declares S->Y before S->X and Y hears
    // from S before P.
    let shuffled = build_graph(&[
        link("P", "X", 5.0),
        link("S", "Y", 3.0),
        link("S", "X", 4.0),
        link("P", "Y", 5.0),
    ])
    .expect("graph");
    let ordered = build_graph(&[
        link("P", "X", 5.0),
        link("P", "Y", 5.0),
        link("S", "X", 4.0),
        link("S", "Y", 3.0),
    ])
    .expect("graph");

    let id = |graph: &SankeyGraph, name: &str| graph.node_by_name(name).expect("node").id;
    for graph in [&shuffled, &ordered] {
        assert!(id(graph, "P") < id(graph, "S"));
        assert!(id(graph, "X") < id(graph, "Y"));
    }

    let shuffled_layout = layout_of(&shuffled, 300.0, 100.0);
    let ordered_layout = layout_of(&ordered, 300.0, 100.0);

    let s_outcome = outcome_by_target(&shuffled, &shuffled_layout, "S");
    let targets: Vec<&str> = s_outcome.iter().map(|(name, _, _)| name.as_str()).collect();
    assert_eq!(targets, vec!["X", "Y"]);
    let y_income = income_by_source(&shuffled, &shuffled_layout, "Y");
    let sources: Vec<&str> = y_income.iter().map(|(name, _, _)| name.as_str()).collect();
    assert_eq!(sources, vec!["P", "S"]);

    assert_eq!(s_outcome, outcome_by_target(&ordered, &ordered_layout, "S"));
    assert_eq!(y_income, income_by_source(&ordered, &ordered_layout, "Y"));
    for name in ["P", "S"] {
        assert_eq!(
            outcome_by_target(&shuffled, &shuffled_layout, name),
            outcome_by_target(&ordered, &ordered_layout, name)
        );
    }
    for name in ["X", "Y"] {
        assert_eq!(
            income_by_source(&shuffled, &shuffled_layout, name),
            income_by_source(&ordered, &ordered_layout, name)
        );
    }
}

#[test]
fn ribbons_connect_their_attachment_segments() {
    let graph = fan_out_graph();
    let layout = layout_of(&graph, 300.0, 100.0);

    for flow in &layout.flows {
        let from = layout.node(flow.from).expect("source");
        let to = layout.node(flow.to).expect("target");
        let start = from
            .outcome
            .iter()
            .find(|segment| segment.flow == flow.flow)
            .expect("outgoing segment");
        let end = to
            .income
            .iter()
            .find(|segment| segment.flow == flow.flow)
            .expect("incoming segment");
        assert_relative_eq!(flow.left_top.y, start.y1);
        assert_relative_eq!(flow.left_bottom.y, start.y2);
        assert_relative_eq!(flow.right_top.y, end.y1);
        assert_relative_eq!(flow.right_bottom.y, end.y2);
        assert!(flow.path.is_finite());
    }
}

#[test]
fn dropoff_stub_hangs_off_the_node_bottom() {
    let graph = fan_out_graph();
    let layout = layout_of(&graph, 300.0, 100.0);

    assert_eq!(layout.dropoffs.len(), 1);
    let stub = &layout.dropoffs[0];
    let hub = layout.node(stub.from).expect("hub");
    assert_relative_eq!(stub.left, hub.rect.right());
    assert_relative_eq!(stub.y2, hub.rect.bottom());
    assert_relative_eq!(stub.y2 - stub.y1, 8.0 * layout.weight_aspect, epsilon = 1e-9);
    assert_relative_eq!(stub.radius, layout.node_width / 4.0);

    let bbox = stub.path.bounding_box().expect("bbox");
    assert_relative_eq!(bbox.bottom(), stub.y2 + layout.dropoff_padding, epsilon = 1e-9);
    assert_eq!(stub.data_index, 5);
    assert!(layout.dropoff_by_data_index(5).is_some());
}

#[test]
fn ribbon_contains_points_on_its_centerline() {
    let graph = build_graph(&[link("A", "B", 10.0), link("A", "C", 10.0)]).expect("graph");
    let layout = layout_of(&graph, 400.0, 200.0);

    for flow in &layout.flows {
        let x = (flow.left + flow.right) / 2.0;
        let (top, bottom) = flow.span_at(x).expect("span");
        assert!(bottom > top);
        assert!(flow.contains(PixelPoint::new(x, (top + bottom) / 2.0), 0.0));
        assert!(!flow.contains(PixelPoint::new(x, bottom + 5.0), 0.5));
        assert!(flow.span_at(flow.right + 1.0).is_none());
    }
}

#[test]
fn pixel_node_width_is_clamped_to_the_column() {
    let graph = build_graph(&[link("A", "B", 10.0)]).expect("graph");
    let options = LayoutOptions::default().with_node_width(NodeWidth::Pixels(500.0));
    let layout = compute_layout(&graph, Rect::from_size(300.0, 100.0), options).expect("layout");
    assert_relative_eq!(layout.node_width, layout.column_width);
}

#[test]
fn wide_nodes_keep_dropoff_stubs_inside_the_bounds() {
    let graph = build_graph(&[
        link("A", "B", 10.0),
        link("B", "C", 6.0),
        dropoff("B", 4.0),
        link("C", "D", 6.0),
        dropoff("D", 2.0),
    ])
    .expect("graph");
    let bounds = Rect::from_size(300.0, 40.0);
    let options = LayoutOptions::default().with_node_width(NodeWidth::Percent(100.0));
    let layout = compute_layout(&graph, bounds, options).expect("layout");

    assert_relative_eq!(layout.node_width, layout.column_width * MAX_DROPOFF_NODE_SHARE);
    assert_eq!(layout.dropoffs.len(), 2);
    for stub in &layout.dropoffs {
        let bbox = stub.path.bounding_box().expect("bbox");
        assert!(bbox.left >= bounds.left - 1.0, "{bbox:?}");
        assert!(bbox.right() <= bounds.right() + 1.0, "{bbox:?}");
        assert!(bbox.top >= bounds.top - 1.0, "{bbox:?}");
        assert!(bbox.bottom() <= bounds.bottom() + 1.0, "{bbox:?}");
    }
    for flow in &layout.flows {
        assert!(flow.left >= bounds.left - 1.0);
        assert!(flow.right <= bounds.right() + 1.0);
    }
}

#[test]
fn single_level_has_straight_ribbons() {
    let graph = build_graph(&[dropoff("A", 4.0), dropoff("B", 6.0)]).expect("graph");
    let layout = layout_of(&graph, 200.0, 100.0);
    assert_eq!(layout.levels.len(), 1);
    assert_relative_eq!(layout.curvy, 0.0);
    assert_eq!(layout.dropoffs.len(), 2);
}

#[test]
fn empty_graph_yields_empty_layout() {
    let graph = build_graph(&[]).expect("graph");
    let layout = layout_of(&graph, 200.0, 100.0);
    assert!(layout.is_empty());
    assert!(layout.flows.is_empty());
}

#[test]
fn invalid_bounds_and_options_are_rejected() {
    let graph = build_graph(&[link("A", "B", 1.0)]).expect("graph");
    let err = compute_layout(&graph, Rect::from_size(0.0, 100.0), LayoutOptions::default())
        .expect_err("zero width");
    assert!(matches!(err, SankeyError::InvalidBounds { .. }));

    let err = compute_layout(
        &graph,
        Rect::from_size(100.0, 100.0),
        LayoutOptions::default().with_curve_factor(-0.1),
    )
    .expect_err("negative curve");
    assert!(matches!(err, SankeyError::InvalidOption(_)));
}

#[test]
fn layout_is_deterministic() {
    let graph = fan_out_graph();
    let first = layout_of(&graph, 640.0, 480.0);
    let second = layout_of(&graph, 640.0, 480.0);
    assert_eq!(first, second);
}

#[test]
fn layout_snapshots_serialize_with_their_paths() {
    let graph = fan_out_graph();
    let layout = layout_of(&graph, 300.0, 100.0);

    let value = serde_json::to_value(&layout).expect("serialize layout");
    let node_path = &value["nodes"][0]["path"]["commands"];
    assert_eq!(node_path.as_array().map(Vec::len), Some(6));

    let restored: SankeyLayout = serde_json::from_value(value).expect("deserialize layout");
    assert_eq!(restored.nodes.len(), layout.nodes.len());
    assert_eq!(restored.flows.len(), layout.flows.len());
    assert_eq!(restored.dropoffs.len(), 1);
    assert_eq!(
        restored.dropoffs[0].path.commands().len(),
        layout.dropoffs[0].path.commands().len()
    );
    assert_relative_eq!(restored.weight_aspect, layout.weight_aspect, epsilon = 1e-12);
}
