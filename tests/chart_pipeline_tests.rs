use sankey_rs::SankeyError;
use sankey_rs::api::{FLOW_Z_INDEX, InvalidationTopic, NODE_Z_INDEX, PipelineStats, SankeyChart};
use sankey_rs::core::{FlowIndex, FlowRow, LayoutOptions, NodeIndex, NodeWidth, Rect};
use sankey_rs::interaction::ElementRef;
use sankey_rs::labels::LabelsConfig;
use sankey_rs::render::{Color, Fill, NullRenderer, Stroke, TextAnchor};
use sankey_rs::style::{
    ColorContext, ColorResolver, DARKEN_FACTOR, ElementStyle, FLOW_OPACITY, Palette, PointState,
    RangePalette, StateStyle, dropoff_gradient,
};

fn rows() -> Vec<FlowRow> {
    vec![FlowRow::link("A", "B", 10.0), FlowRow::dropoff("A", 5.0)]
}

fn chart() -> SankeyChart<NullRenderer> {
    let mut chart =
        SankeyChart::new(NullRenderer::default(), Rect::from_size(300.0, 100.0)).expect("chart");
    chart.set_data(rows());
    chart
}

fn first_color() -> Color {
    Color::from_hex("#1D8BD1").expect("hex")
}

const A: ElementRef = ElementRef::Node(NodeIndex::new(0));
const B: ElementRef = ElementRef::Node(NodeIndex::new(1));
const AB: ElementRef = ElementRef::Flow(FlowIndex::new(0));
const A_DROPOFF: ElementRef = ElementRef::Dropoff(FlowIndex::new(1));

#[test]
fn invalid_bounds_are_rejected_on_construction() {
    let result = SankeyChart::new(NullRenderer::default(), Rect::from_size(-1.0, 100.0));
    assert!(matches!(result, Err(SankeyError::InvalidBounds { .. })));
}

#[test]
fn stages_run_once_until_invalidated() {
    let mut chart = chart();
    chart.compute().expect("compute");
    chart.compute().expect("compute again");
    assert_eq!(
        chart.stats(),
        PipelineStats {
            graph_builds: 1,
            layout_passes: 1,
            appearance_passes: 1,
            frames_built: 0,
        }
    );
}

#[test]
fn style_change_reruns_appearance_only() {
    let mut chart = chart();
    chart.compute().expect("compute");

    chart.set_node_style(ElementStyle {
        normal: StateStyle::default().with_fill(Fill::solid(Color::WHITE)),
        ..ElementStyle::default()
    });
    chart.compute().expect("compute");

    let stats = chart.stats();
    assert_eq!(stats.graph_builds, 1);
    assert_eq!(stats.layout_passes, 1);
    assert_eq!(stats.appearance_passes, 2);
    let appearance = chart.appearance_of(A).expect("compute").expect("A");
    assert_eq!(appearance.fill, Fill::solid(Color::WHITE));
}

#[test]
fn bounds_change_relayouts_without_rebuilding_the_graph() {
    let mut chart = chart();
    chart.compute().expect("compute");
    chart.clear_pending_invalidation();
    chart
        .set_bounds(Rect::from_size(600.0, 200.0))
        .expect("bounds");
    assert!(chart.pending_invalidation().contains(InvalidationTopic::Bounds));
    assert!(!chart.pending_invalidation().contains(InvalidationTopic::Data));
    chart.compute().expect("compute");

    let stats = chart.stats();
    assert_eq!(stats.graph_builds, 1);
    assert_eq!(stats.layout_passes, 2);
    assert_eq!(chart.layout().map(|layout| layout.bounds.width), Some(600.0));

    chart
        .set_layout_options(LayoutOptions::default().with_node_width(NodeWidth::Pixels(10.0)))
        .expect("options");
    chart.compute().expect("compute");
    assert_eq!(chart.stats().layout_passes, 3);
    assert_eq!(chart.layout().map(|layout| layout.node_width), Some(10.0));
}

#[test]
fn data_change_rebuilds_everything() {
    let mut chart = chart();
    chart.compute().expect("compute");
    chart.append_row(FlowRow::link("B", "C", 4.0));
    assert!(chart.graph().is_none());
    chart.compute().expect("compute");

    assert_eq!(chart.stats().graph_builds, 2);
    let graph = chart.graph().expect("graph");
    assert_eq!(graph.nodes().len(), 3);
    assert_eq!(chart.rows().len(), 3);
}

#[test]
fn failed_data_pass_is_retried_after_a_fix() {
    let mut chart = chart();
    chart.set_data(vec![FlowRow::link("A", "B", 1.0), FlowRow::link("B", "A", 1.0)]);
    let err = chart.compute().expect_err("cycle");
    assert!(matches!(err, SankeyError::NotLayerable { .. }));
    assert!(chart.graph().is_none());
    assert!(chart.render().is_err());

    chart.set_data(rows());
    chart.compute().expect("compute");
    assert!(chart.layout().is_some());
}

#[test]
fn default_theme_colors_elements_from_the_palette() {
    let mut chart = chart();
    let node = chart.appearance_of(A).expect("compute").expect("A");
    assert_eq!(node.state, PointState::Normal);
    assert_eq!(node.fill, Fill::solid(first_color()));
    assert_eq!(
        node.stroke,
        Stroke::solid(first_color().darken(DARKEN_FACTOR), 1.0)
    );

    let flow = chart.appearance_of(AB).expect("compute").expect("flow");
    assert_eq!(flow.fill, Fill::solid(first_color().with_alpha(FLOW_OPACITY)));
    assert_eq!(flow.stroke, Stroke::None);

    let stub = chart.appearance_of(A_DROPOFF).expect("compute").expect("stub");
    assert_eq!(stub.fill, Fill::LinearGradient(dropoff_gradient()));
}

#[test]
fn conflict_nodes_get_a_red_outline() {
    let mut chart = chart();
    chart.set_data(vec![FlowRow::link("A", "B", 10.0), FlowRow::link("B", "C", 4.0)]);
    let b = chart.appearance_of(B).expect("compute").expect("B");
    assert_eq!(b.stroke, Stroke::solid(Color::RED, 2.0));
}

#[test]
fn callback_styles_see_node_context() {
    let mut chart = chart();
    chart.set_node_style(ElementStyle {
        normal: StateStyle {
            fill: Some(ColorResolver::callback(|context: &ColorContext| {
                match context {
                    ColorContext::Node { name, .. } if name == "B" => Fill::solid(Color::RED),
                    _ => Fill::None,
                }
            })),
            stroke: None,
        },
        ..ElementStyle::default()
    });

    let b = chart.appearance_of(B).expect("compute").expect("B");
    let a = chart.appearance_of(A).expect("compute").expect("A");
    assert_eq!(b.fill, Fill::solid(Color::RED));
    assert_eq!(a.fill, Fill::None);
}

#[test]
fn hover_restyles_without_a_full_appearance_pass() {
    let mut chart = chart();
    chart.compute().expect("compute");
    let center = chart
        .layout()
        .and_then(|layout| layout.node(NodeIndex::new(0)))
        .map(|node| node.center())
        .expect("A center");
    chart.clear_pending_invalidation();

    let outcome = chart.pointer_move(center.x, center.y).expect("pointer");
    assert_eq!(outcome.changes.len(), 2);
    assert_eq!(chart.stats().appearance_passes, 1);

    let hovered = chart.appearance_of(A).expect("compute").expect("A");
    assert_eq!(hovered.state, PointState::Hovered);
    assert_eq!(hovered.fill, Fill::solid(first_color().darken(DARKEN_FACTOR)));
    assert!(chart.pending_invalidation().contains(InvalidationTopic::FlowLabels));

    chart.pointer_leave().expect("leave");
    let normal = chart.appearance_of(A).expect("compute").expect("A");
    assert_eq!(normal.state, PointState::Normal);
}

#[test]
fn palette_swap_recolors_nodes() {
    let mut chart = chart();
    let palette = Palette::Range(RangePalette::new(vec![Color::RED, Color::WHITE], Some(3)));
    chart.set_palette(palette).expect("palette");
    let a = chart.appearance_of(A).expect("compute").expect("A");
    assert_eq!(a.fill, Fill::solid(Color::RED));

    let empty = Palette::Range(RangePalette::new(Vec::new(), None));
    assert!(chart.set_palette(empty).is_err());
}

#[test]
fn render_frame_paints_ribbons_under_nodes() {
    let mut chart = chart();
    let frame = chart.build_render_frame().expect("frame");

    assert_eq!(frame.paths.len(), 4);
    let z: Vec<i32> = frame.paths_in_paint_order().map(|path| path.z_index).collect();
    assert_eq!(z, vec![FLOW_Z_INDEX, FLOW_Z_INDEX, NODE_Z_INDEX, NODE_Z_INDEX]);
    let texts: Vec<&str> = frame.texts.iter().map(|text| text.text.as_str()).collect();
    assert_eq!(texts, vec!["A", "B"]);
    assert!(frame.validate().is_ok());
    assert_eq!(chart.stats().frames_built, 1);
}

#[test]
fn flow_labels_follow_the_hovered_node() {
    let mut chart = chart();
    let mut labels = LabelsConfig::default();
    labels.node.enabled = false;
    labels.flow.enabled = true;
    labels.dropoff.enabled = true;
    chart.set_labels(labels);

    let frame = chart.build_render_frame().expect("frame");
    let anchors: Vec<(String, TextAnchor)> = frame
        .texts
        .iter()
        .map(|text| (text.text.clone(), text.anchor))
        .collect();
    assert_eq!(
        anchors,
        vec![
            ("10".to_owned(), TextAnchor::CenterBottom),
            ("5".to_owned(), TextAnchor::LeftCenter),
        ]
    );

    chart.hover(A).expect("hover");
    let frame = chart.build_render_frame().expect("frame");
    assert_eq!(frame.texts[0].anchor, TextAnchor::RightBottom);

    chart.hover(B).expect("hover");
    let frame = chart.build_render_frame().expect("frame");
    assert_eq!(frame.texts[0].anchor, TextAnchor::LeftBottom);
}

#[test]
fn render_gate_only_draws_pending_changes() {
    let mut chart = chart();
    assert!(chart.render_if_invalidated().expect("first render"));
    assert_eq!(chart.renderer().frames_rendered, 1);
    assert_eq!(chart.renderer().last_path_count, 4);
    assert!(!chart.has_pending_invalidation());
    assert!(!chart.render_if_invalidated().expect("idle"));

    chart.set_flow_style(ElementStyle::default());
    assert!(chart.render_if_invalidated().expect("restyled"));
    assert_eq!(chart.renderer().frames_rendered, 2);
}

#[test]
fn selection_is_cleared_by_data_changes() {
    let mut chart = chart();
    chart.select(B).expect("select");
    assert_eq!(
        chart.appearance_of(B).expect("compute").map(|a| a.state),
        Some(PointState::Selected)
    );

    chart.set_data(rows());
    assert_eq!(chart.interaction().selected().count(), 0);
    assert_eq!(
        chart.appearance_of(B).expect("compute").map(|a| a.state),
        Some(PointState::Normal)
    );
}

#[test]
fn stale_element_handles_are_rejected() {
    let mut chart = chart();
    chart.compute().expect("compute");

    let missing_node = ElementRef::Node(NodeIndex::new(7));
    let missing_flow = ElementRef::Flow(FlowIndex::new(9));
    let wrong_kind = ElementRef::Flow(FlowIndex::new(1));

    for element in [missing_node, missing_flow, wrong_kind] {
        assert!(matches!(chart.hover(element), Err(SankeyError::InvalidData(_))));
        assert!(matches!(chart.select(element), Err(SankeyError::InvalidData(_))));
        assert!(matches!(chart.out(element), Err(SankeyError::InvalidData(_))));
        assert_eq!(chart.appearance_of(element).expect("compute"), None);
    }
    assert_eq!(chart.interaction().selected().count(), 0);
    assert_eq!(chart.interaction().hovered(), None);
    assert_eq!(chart.stats().appearance_passes, 1);

    chart.hover(A_DROPOFF).expect("hover");
    assert_eq!(
        chart.appearance_of(A_DROPOFF).expect("compute").map(|a| a.state),
        Some(PointState::Hovered)
    );
}

#[test]
fn handles_from_previous_data_go_stale() {
    let mut chart = chart();
    chart.set_data(vec![
        FlowRow::link("A", "B", 1.0),
        FlowRow::link("B", "C", 1.0),
        FlowRow::link("C", "D", 1.0),
    ]);
    let d = ElementRef::Node(NodeIndex::new(3));
    chart.select(d).expect("select");

    chart.set_data(rows());
    assert!(chart.hover(d).is_err());
    assert!(chart.hover(A).is_ok());
}
