use crate::core::types::Rect;
use crate::error::SankeyResult;
use crate::render::{PathPrimitive, TextPrimitive};

/// Backend-agnostic scene for one diagram draw pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub bounds: Rect,
    pub paths: Vec<PathPrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            paths: Vec::new(),
            texts: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: PathPrimitive) -> Self {
        self.paths.push(path);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: TextPrimitive) -> Self {
        self.texts.push(text);
        self
    }

    /// Paths in paint order; equal z-indices keep insertion order.
    pub fn paths_in_paint_order(&self) -> impl Iterator<Item = &PathPrimitive> + '_ {
        let mut ordered: Vec<&PathPrimitive> = self.paths.iter().collect();
        ordered.sort_by_key(|path| path.z_index);
        ordered.into_iter()
    }

    pub fn validate(&self) -> SankeyResult<()> {
        self.bounds.validate()?;
        for path in &self.paths {
            path.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.texts.is_empty()
    }
}
