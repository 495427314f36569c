use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::types::{PixelPoint, Rect};

/// Drawing command in pixel space, mirroring a vector path API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "camelCase")]
pub enum PathCommand {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    /// Cubic Bezier to `(x, y)` through two control points.
    CurveTo {
        c1x: f64,
        c1y: f64,
        c2x: f64,
        c2y: f64,
        x: f64,
        y: f64,
    },
    /// Elliptic arc continuing from the current point.
    ///
    /// Angles are in degrees, clockwise in screen space; `x`/`y` is the
    /// resulting end point so consumers need not re-derive it.
    ArcTo {
        rx: f64,
        ry: f64,
        start_angle: f64,
        sweep_angle: f64,
        x: f64,
        y: f64,
    },
    Close,
}

/// Ordered command list; ribbons and stubs stay under the inline capacity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathData {
    commands: SmallVec<[PathCommand; 8]>,
}

impl PathData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.commands.push(PathCommand::MoveTo { x, y });
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.commands.push(PathCommand::LineTo { x, y });
        self
    }

    pub fn curve_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) -> &mut Self {
        self.commands.push(PathCommand::CurveTo {
            c1x,
            c1y,
            c2x,
            c2y,
            x,
            y,
        });
        self
    }

    /// Appends an arc starting at the current point.
    ///
    /// The current point is taken to sit at `start_angle` on the ellipse; the
    /// end point follows from sweeping `sweep_angle` degrees.
    pub fn arc_to(&mut self, rx: f64, ry: f64, start_angle: f64, sweep_angle: f64) -> &mut Self {
        let current = self.current_point().unwrap_or(PixelPoint::new(0.0, 0.0));
        let start = start_angle.to_radians();
        let end = (start_angle + sweep_angle).to_radians();
        let center_x = current.x - rx * start.cos();
        let center_y = current.y - ry * start.sin();
        self.commands.push(PathCommand::ArcTo {
            rx,
            ry,
            start_angle,
            sweep_angle,
            x: center_x + rx * end.cos(),
            y: center_y + ry * end.sin(),
        });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::Close);
        self
    }

    /// End point of the last positioned command.
    #[must_use]
    pub fn current_point(&self) -> Option<PixelPoint> {
        self.commands.iter().rev().find_map(|command| match *command {
            PathCommand::MoveTo { x, y }
            | PathCommand::LineTo { x, y }
            | PathCommand::CurveTo { x, y, .. }
            | PathCommand::ArcTo { x, y, .. } => Some(PixelPoint::new(x, y)),
            PathCommand::Close => None,
        })
    }

    /// Every anchor point and control point, in command order.
    #[must_use]
    pub fn points(&self) -> Vec<PixelPoint> {
        let mut points = Vec::with_capacity(self.commands.len() * 2);
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo { x, y }
                | PathCommand::LineTo { x, y }
                | PathCommand::ArcTo { x, y, .. } => points.push(PixelPoint::new(x, y)),
                PathCommand::CurveTo {
                    c1x,
                    c1y,
                    c2x,
                    c2y,
                    x,
                    y,
                } => {
                    points.push(PixelPoint::new(c1x, c1y));
                    points.push(PixelPoint::new(c2x, c2y));
                    points.push(PixelPoint::new(x, y));
                }
                PathCommand::Close => {}
            }
        }
        points
    }

    /// Axis-aligned box around all points; `None` for an empty path.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Rect> {
        let points = self.points();
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for point in &points[1..] {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.points()
            .iter()
            .all(|point| point.x.is_finite() && point.y.is_finite())
    }
}

/// Point on a cubic Bezier at parameter `t`.
#[must_use]
pub fn cubic_point(p0: PixelPoint, c1: PixelPoint, c2: PixelPoint, p1: PixelPoint, t: f64) -> PixelPoint {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    PixelPoint::new(
        a * p0.x + b * c1.x + c * c2.x + d * p1.x,
        a * p0.y + b * c1.y + c * c2.y + d * p1.y,
    )
}
