//! Field regions used by positional predicates.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A closed area of the field, in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Region {
    /// Axis-aligned rectangle, `min` and `max` are opposite corners
    Rectangle { min: Point2<f64>, max: Point2<f64> },

    Circle { center: Point2<f64>, radius: f64 },
}

impl Region {
    /// Creates a rectangle from any two opposite corners.
    pub fn rectangle(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self::Rectangle {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Creates a circle. Negative radii are treated as their magnitude.
    pub fn circle(center: Point2<f64>, radius: f64) -> Self {
        Self::Circle {
            center,
            radius: radius.abs(),
        }
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        match self {
            Region::Rectangle { min, max } => {
                point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
            }
            Region::Circle { center, radius } => nalgebra::distance(center, point) <= *radius,
        }
    }

    /// Returns the geometric centre.
    pub fn centre(&self) -> Point2<f64> {
        match self {
            Region::Rectangle { min, max } => nalgebra::center(min, max),
            Region::Circle { center, .. } => *center,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Region::Rectangle { min, max } => write!(
                f,
                "rect[({:.2}, {:.2})..({:.2}, {:.2})]",
                min.x, min.y, max.x, max.y
            ),
            Region::Circle { center, radius } => {
                write!(f, "circle[({:.2}, {:.2}) r={:.2}]", center.x, center.y, radius)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle_normalizes_corners() {
        let region = Region::rectangle(Point2::new(1.0, -1.0), Point2::new(-1.0, 1.0));

        assert!(region.contains(&Point2::new(0.0, 0.0)));
        assert!(region.contains(&Point2::new(1.0, 1.0)));
        assert!(!region.contains(&Point2::new(1.01, 0.0)));
    }

    #[test]
    fn test_circle_contains() {
        let region = Region::circle(Point2::new(2.0, 0.0), -0.5);

        assert!(region.contains(&Point2::new(2.4, 0.0)));
        assert!(!region.contains(&Point2::new(2.6, 0.0)));
    }

    #[test]
    fn test_centre() {
        let region = Region::rectangle(Point2::new(0.0, 0.0), Point2::new(4.0, 2.0));
        let centre = region.centre();

        assert_relative_eq!(centre.x, 2.0);
        assert_relative_eq!(centre.y, 1.0);
    }
}
