use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::render::{Color, Fill, Stroke};

/// What a color resolver sees about the element being painted.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorContext {
    Node {
        id: usize,
        name: String,
        source_color: Color,
        conflict: bool,
    },
    Flow {
        from: String,
        to: String,
        source_color: Color,
    },
    Dropoff {
        from: String,
        source_color: Color,
    },
}

impl ColorContext {
    /// Palette color of the node the element belongs to.
    #[must_use]
    pub fn source_color(&self) -> Color {
        match self {
            Self::Node { source_color, .. }
            | Self::Flow { source_color, .. }
            | Self::Dropoff { source_color, .. } => *source_color,
        }
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Node { conflict: true, .. })
    }
}

pub type ResolverFn<T> = dyn Fn(&ColorContext) -> T + Send + Sync;

/// Fixed value or a function of the element context.
pub enum ColorResolver<T> {
    Constant(T),
    Callback(Arc<ResolverFn<T>>),
}

impl<T: Clone> ColorResolver<T> {
    pub fn callback(callback: impl Fn(&ColorContext) -> T + Send + Sync + 'static) -> Self {
        Self::Callback(Arc::new(callback))
    }

    #[must_use]
    pub fn resolve(&self, context: &ColorContext) -> T {
        match self {
            Self::Constant(value) => value.clone(),
            Self::Callback(callback) => callback(context),
        }
    }

    #[must_use]
    pub fn is_callback(&self) -> bool {
        matches!(self, Self::Callback(_))
    }
}

impl<T: Clone> Clone for ColorResolver<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Constant(value) => Self::Constant(value.clone()),
            Self::Callback(callback) => Self::Callback(Arc::clone(callback)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ColorResolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl<T: PartialEq> PartialEq for ColorResolver<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Constant(a), Self::Constant(b)) => a == b,
            (Self::Callback(a), Self::Callback(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T> From<T> for ColorResolver<T> {
    fn from(value: T) -> Self {
        Self::Constant(value)
    }
}

/// Constants serialize as their value; callbacks cannot be represented and
/// serialize as `null`, which reads back as "unset".
impl<T: Serialize> Serialize for ColorResolver<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Constant(value) => value.serialize(serializer),
            Self::Callback(_) => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ColorResolver<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::Constant)
    }
}

fn skip_resolver<T: Clone>(resolver: &Option<ColorResolver<T>>) -> bool {
    resolver.as_ref().is_none_or(|resolver| resolver.is_callback())
}

/// Fill and stroke for one interaction state; unset values defer to the
/// next style in the fallback chain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StateStyle {
    #[serde(skip_serializing_if = "skip_resolver")]
    pub fill: Option<ColorResolver<Fill>>,
    #[serde(skip_serializing_if = "skip_resolver")]
    pub stroke: Option<ColorResolver<Stroke>>,
}

impl StateStyle {
    #[must_use]
    pub fn with_fill(mut self, fill: impl Into<ColorResolver<Fill>>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    #[must_use]
    pub fn with_stroke(mut self, stroke: impl Into<ColorResolver<Stroke>>) -> Self {
        self.stroke = Some(stroke.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fill.is_none() && self.stroke.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementStyle {
    #[serde(skip_serializing_if = "StateStyle::is_empty")]
    pub normal: StateStyle,
    #[serde(skip_serializing_if = "StateStyle::is_empty")]
    pub hovered: StateStyle,
    #[serde(skip_serializing_if = "StateStyle::is_empty")]
    pub selected: StateStyle,
}

impl ElementStyle {
    #[must_use]
    pub fn state(&self, state: PointState) -> &StateStyle {
        match state {
            PointState::Normal => &self.normal,
            PointState::Hovered => &self.hovered,
            PointState::Selected => &self.selected,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.hovered.is_empty() && self.selected.is_empty()
    }
}

/// Visual state of a diagram element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointState {
    #[default]
    Normal,
    Hovered,
    Selected,
}

/// Resolves fill and stroke through `user[state] -> theme[state] ->
/// user[normal] -> theme[normal]`.
#[must_use]
pub fn resolve_fill(
    user: &ElementStyle,
    theme: &ElementStyle,
    state: PointState,
    context: &ColorContext,
) -> Fill {
    fallback_chain(user, theme, state)
        .find_map(|style| style.fill.as_ref())
        .map_or(Fill::None, |resolver| resolver.resolve(context))
}

#[must_use]
pub fn resolve_stroke(
    user: &ElementStyle,
    theme: &ElementStyle,
    state: PointState,
    context: &ColorContext,
) -> Stroke {
    fallback_chain(user, theme, state)
        .find_map(|style| style.stroke.as_ref())
        .map_or(Stroke::None, |resolver| resolver.resolve(context))
}

fn fallback_chain<'a>(
    user: &'a ElementStyle,
    theme: &'a ElementStyle,
    state: PointState,
) -> impl Iterator<Item = &'a StateStyle> {
    [
        user.state(state),
        theme.state(state),
        &user.normal,
        &theme.normal,
    ]
    .into_iter()
}
