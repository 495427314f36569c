use serde::{Deserialize, Serialize};

use crate::core::graph::{Flow, Node, SankeyGraph};
use crate::style::ElementKind;

/// Values exposed to label and tooltip templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelContext {
    #[serde(rename = "type")]
    pub element_type: ElementKind,
    pub name: String,
    pub value: f64,
}

impl LabelContext {
    #[must_use]
    pub fn node(node: &Node) -> Self {
        Self {
            element_type: ElementKind::Node,
            name: node.name.clone(),
            value: node.weight,
        }
    }

    /// Context for a ribbon (`"A -> B"`) or a drop-off (`"A dropoff"`).
    #[must_use]
    pub fn flow(graph: &SankeyGraph, flow: &Flow) -> Self {
        let from = &graph.node(flow.from).name;
        match flow.to {
            Some(to) => Self {
                element_type: ElementKind::Flow,
                name: format!("{from} -> {}", graph.node(to).name),
                value: flow.weight,
            },
            None => Self {
                element_type: ElementKind::Dropoff,
                name: format!("{from} dropoff"),
                value: flow.weight,
            },
        }
    }
}

/// Expands `{%name}`, `{%value}` and `{%type}` tokens.
///
/// Token names are case-insensitive; unknown tokens are left verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenFormatter {
    template: String,
}

impl TokenFormatter {
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    #[must_use]
    pub fn format(&self, context: &LabelContext) -> String {
        let mut out = String::with_capacity(self.template.len() + context.name.len());
        let mut rest = self.template.as_str();
        while let Some(start) = rest.find("{%") {
            out.push_str(&rest[..start]);
            let token = &rest[start..];
            let Some(end) = token.find('}') else {
                out.push_str(token);
                return out;
            };
            let name = token[2..end].trim();
            match name.to_ascii_lowercase().as_str() {
                "name" => out.push_str(&context.name),
                "value" => out.push_str(&format_value(context.value)),
                "type" => out.push_str(&context.element_type.to_string()),
                _ => out.push_str(&token[..=end]),
            }
            rest = &token[end + 1..];
        }
        out.push_str(rest);
        out
    }
}

/// Integral values print without a fraction.
#[must_use]
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
