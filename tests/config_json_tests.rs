use sankey_rs::api::{SANKEY_CONFIG_JSON_SCHEMA_V1, SankeyChart, SankeyConfig};
use sankey_rs::core::{
    FlowRow, LevelShiftRule, LevelingOptions, MissingPolicy, NodeIndex, NodeWidth, Rect,
};
use sankey_rs::interaction::ElementRef;
use sankey_rs::render::{Color, Fill, NullRenderer};
use sankey_rs::style::{ColorContext, ColorResolver, ElementStyle, StateStyle};
use serde_json::{Value, json};

fn empty_chart() -> SankeyChart<NullRenderer> {
    SankeyChart::new(NullRenderer::default(), Rect::from_size(400.0, 200.0)).expect("chart")
}

#[test]
fn default_config_round_trips_through_the_contract() {
    let config = SankeyConfig::default().with_data(vec![
        FlowRow::link("A", "B", 10.0),
        FlowRow::dropoff("A", 2.5),
    ]);
    let json = config.to_json_contract_v1_pretty().expect("serialize");

    let value: Value = serde_json::from_str(&json).expect("json");
    assert_eq!(value["schema_version"], json!(SANKEY_CONFIG_JSON_SCHEMA_V1));
    assert_eq!(value["config"]["nodeWidth"], json!("12%"));
    assert_eq!(value["config"]["nodePadding"], json!(20.0));
    assert_eq!(value["config"]["palette"]["type"], json!("distinct"));
    assert_eq!(value["config"]["data"][1]["to"], Value::Null);

    let restored = SankeyConfig::from_json_compat_str(&json).expect("parse");
    assert_eq!(restored, config);
}

#[test]
fn bare_config_objects_are_accepted() {
    let config = SankeyConfig::from_json_compat_str(
        r#"{
            "data": [{"from": "A", "to": "B", "weight": "7"}],
            "nodeWidth": 24,
            "curveFactor": 0.5,
            "missingPolicy": "allFieldsMissing",
            "leveling": {"shiftRule": "exclusive", "pinSinks": false}
        }"#,
    )
    .expect("bare config");

    assert_eq!(config.node_width, NodeWidth::Pixels(24.0));
    assert_eq!(config.node_padding, 20.0);
    assert_eq!(config.curve_factor, 0.5);
    assert_eq!(config.missing_policy, MissingPolicy::AllFieldsMissing);
    assert_eq!(
        config.leveling,
        LevelingOptions::default()
            .with_shift_rule(LevelShiftRule::Exclusive)
            .with_pin_sinks(false)
    );
    assert_eq!(config.data.len(), 1);
    assert!(config.labels.node.enabled);
    assert!(!config.labels.flow.enabled);
}

#[test]
fn unknown_schema_versions_and_bad_json_are_rejected() {
    assert!(SankeyConfig::from_json_compat_str(r#"{"schema_version": 2, "config": {}}"#).is_err());
    assert!(SankeyConfig::from_json_compat_str("{not json").is_err());
    assert!(SankeyConfig::from_json_compat_str(r#"{"nodeWidth": "wide"}"#).is_err());
}

#[test]
fn setup_by_json_replaces_data_and_options() {
    let mut chart = empty_chart();
    chart
        .setup_by_json(
            r#"{
                "data": [
                    {"from": "A", "to": "B", "flow": 10},
                    {"from": "B", "to": null, "flow": 4}
                ],
                "nodePadding": 8,
                "nodeWidth": "20%",
                "tooltip": {"titleFormat": "{%type}: {%name}"}
            }"#,
        )
        .expect("setup");

    assert_eq!(chart.layout_options().node_padding, 8.0);
    assert_eq!(chart.layout_options().node_width, NodeWidth::Percent(20.0));
    assert_eq!(chart.tooltip_settings().title_format.template(), "{%type}: {%name}");

    let outcome = chart
        .hover(ElementRef::Node(NodeIndex::new(1)))
        .expect("hover");
    assert_eq!(outcome.tooltip.map(|t| t.title).as_deref(), Some("node: B"));

    let layout = chart.layout().expect("layout");
    assert_eq!(layout.nodes.len(), 2);
    assert_eq!(layout.dropoffs.len(), 1);
}

#[test]
fn invalid_setup_keeps_the_previous_state() {
    let mut chart = empty_chart();
    chart.set_data(vec![FlowRow::link("A", "B", 1.0)]);

    let result = chart.setup_by_json(r#"{"data": [], "curveFactor": 2.0}"#);
    assert!(result.is_err());
    assert_eq!(chart.rows().len(), 1);
    assert_eq!(chart.layout_options().curve_factor, 0.33);
}

#[test]
fn serialize_snapshots_settings_and_skips_callbacks() {
    let mut chart = empty_chart();
    chart.set_data(vec![FlowRow::link("A", "B", 3.0)]);
    chart.set_node_style(ElementStyle {
        normal: StateStyle {
            fill: Some(ColorResolver::callback(|context: &ColorContext| {
                Fill::solid(context.source_color())
            })),
            stroke: None,
        },
        hovered: StateStyle::default().with_fill(Fill::solid(Color::WHITE)),
        ..ElementStyle::default()
    });

    let snapshot = chart.serialize();
    assert_eq!(snapshot.data, vec![FlowRow::link("A", "B", 3.0)]);

    let value = serde_json::to_value(&snapshot).expect("json");
    assert_eq!(value["node"]["normal"], json!({}));
    assert_eq!(value["node"]["hovered"]["fill"]["kind"], json!("solid"));
    assert_eq!(value["node"]["hovered"]["fill"]["color"], json!("#ffffff"));
    assert!(value.get("flow").is_none());

    let mut restored = empty_chart();
    restored
        .setup_by_json(&chart.config_json_contract_v1_pretty().expect("contract"))
        .expect("setup");
    assert_eq!(restored.rows(), chart.rows());
    assert!(restored.node_style().normal.is_empty());
    assert_eq!(
        restored.node_style().hovered,
        StateStyle::default().with_fill(Fill::solid(Color::WHITE))
    );
}
