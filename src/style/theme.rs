use crate::render::{Color, Fill, GradientKey, LinearGradient, Stroke};
use crate::style::resolver::{ColorContext, ColorResolver, ElementStyle, StateStyle};

/// Share of the way towards black used for hover and outline shades.
pub const DARKEN_FACTOR: f64 = 0.2;
pub const FLOW_OPACITY: f64 = 0.5;
pub const CONFLICT_STROKE_THICKNESS: f64 = 2.0;

/// Stock styles applied beneath user overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct SankeyTheme {
    pub node: ElementStyle,
    pub flow: ElementStyle,
    pub dropoff: ElementStyle,
}

impl Default for SankeyTheme {
    fn default() -> Self {
        Self {
            node: default_node_style(),
            flow: default_flow_style(),
            dropoff: default_dropoff_style(),
        }
    }
}

fn source_fill() -> ColorResolver<Fill> {
    ColorResolver::callback(|context: &ColorContext| Fill::solid(context.source_color()))
}

fn darkened_source_fill() -> ColorResolver<Fill> {
    ColorResolver::callback(|context: &ColorContext| {
        Fill::solid(context.source_color().darken(DARKEN_FACTOR))
    })
}

fn default_node_style() -> ElementStyle {
    ElementStyle {
        normal: StateStyle {
            fill: Some(source_fill()),
            stroke: Some(ColorResolver::callback(|context: &ColorContext| {
                if context.is_conflict() {
                    Stroke::solid(Color::RED, CONFLICT_STROKE_THICKNESS)
                } else {
                    Stroke::solid(context.source_color().darken(DARKEN_FACTOR), 1.0)
                }
            })),
        },
        hovered: StateStyle {
            fill: Some(darkened_source_fill()),
            stroke: None,
        },
        selected: StateStyle::default(),
    }
}

fn default_flow_style() -> ElementStyle {
    ElementStyle {
        normal: StateStyle {
            fill: Some(ColorResolver::callback(|context: &ColorContext| {
                Fill::solid(context.source_color().with_alpha(FLOW_OPACITY))
            })),
            stroke: Some(ColorResolver::Constant(Stroke::None)),
        },
        hovered: StateStyle {
            fill: Some(darkened_source_fill()),
            stroke: None,
        },
        selected: StateStyle::default(),
    }
}

/// Vertical red-to-white fade.
#[must_use]
pub fn dropoff_gradient() -> LinearGradient {
    LinearGradient {
        angle: -90.0,
        keys: vec![
            GradientKey {
                offset: 0.0,
                color: Color::RED,
            },
            GradientKey {
                offset: 1.0,
                color: Color::WHITE,
            },
        ],
    }
}

fn default_dropoff_style() -> ElementStyle {
    ElementStyle {
        normal: StateStyle {
            fill: Some(ColorResolver::Constant(Fill::LinearGradient(
                dropoff_gradient(),
            ))),
            stroke: Some(ColorResolver::Constant(Stroke::None)),
        },
        hovered: StateStyle::default(),
        selected: StateStyle::default(),
    }
}
