use geo::{coord, Coord};
use serde::Deserialize;

/// Axis-aligned rectangle the catchments are clipped to
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "ExtentBounds")]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// `[extent]` table as written; corners may be given in either order
#[derive(Deserialize)]
struct ExtentBounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl From<ExtentBounds> for Extent {
    fn from(b: ExtentBounds) -> Self {
        Extent::new(b.min_x, b.min_y, b.max_x, b.max_y)
    }
}

impl Extent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// Smallest extent covering all coordinates, grown by `margin` on every side
    pub fn covering<I>(coords: I, margin: f64) -> Option<Self>
    where
        I: IntoIterator<Item = Coord<f64>>,
    {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let mut extent = Extent::new(first.x, first.y, first.x, first.y);
        for c in iter {
            extent.min_x = extent.min_x.min(c.x);
            extent.min_y = extent.min_y.min(c.y);
            extent.max_x = extent.max_x.max(c.x);
            extent.max_y = extent.max_y.max(c.y);
        }
        Some(Extent::new(
            extent.min_x - margin,
            extent.min_y - margin,
            extent.max_x + margin,
            extent.max_y + margin,
        ))
    }

    /// Boundary-inclusive
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn area(&self) -> f64 {
        (self.max_x - self.min_x) * (self.max_y - self.min_y)
    }

    /// Corner ring, counter-clockwise from the south-west corner
    pub fn corners(&self) -> Vec<Coord<f64>> {
        vec![
            coord! { x: self.min_x, y: self.min_y },
            coord! { x: self.max_x, y: self.min_y },
            coord! { x: self.max_x, y: self.max_y },
            coord! { x: self.min_x, y: self.max_y },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalises_corners() {
        let extent = Extent::new(10.0, 20.0, 0.0, 5.0);
        assert_eq!(extent, Extent::new(0.0, 5.0, 10.0, 20.0));
        assert_eq!(extent.area(), 150.0);
        assert!(extent.contains(0.0, 20.0));
        assert!(!extent.contains(10.5, 10.0));
    }

    #[test]
    fn test_covering_adds_margin() {
        let coords = vec![coord! { x: 1.0, y: 2.0 }, coord! { x: 5.0, y: -3.0 }];
        let extent = Extent::covering(coords, 10.0).unwrap();
        assert_eq!(extent, Extent::new(-9.0, -13.0, 15.0, 12.0));
        assert!(Extent::covering(Vec::new(), 1.0).is_none());
    }
}
