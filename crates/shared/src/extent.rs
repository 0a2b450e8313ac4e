use geo::Rect;
use serde::{Deserialize, Serialize};

use crate::features::MapFeature;

/// Axis-aligned bounding box in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for Extent {
    fn default() -> Self {
        Extent::empty()
    }
}

impl Extent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Extent {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Sentinel extent that any real bounds will replace.
    pub fn empty() -> Self {
        Extent::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY)
    }

    pub fn is_empty(&self) -> bool {
        !(self.min_x <= self.max_x && self.min_y <= self.max_y)
    }

    pub fn extend_rect(&mut self, rect: &Rect<f64>) {
        let (min, max) = (rect.min(), rect.max());
        self.min_x = self.min_x.min(min.x);
        self.min_y = self.min_y.min(min.y);
        self.max_x = self.max_x.max(max.x);
        self.max_y = self.max_y.max(max.y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Running min/max over every feature's bounding box.
    ///
    /// Returns the sentinel extent when there are no features; callers must
    /// check [`Extent::is_empty`] before using it.
    pub fn of_features(features: &[MapFeature]) -> Extent {
        let mut extent = Extent::empty();
        for rect in features.iter().filter_map(MapFeature::bounding_rect) {
            extent.extend_rect(&rect);
        }
        extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::fixtures::{project, square, task};
    use crate::features::{build_feature_collection, read_features};
    use crate::models::TaskStatus;
    use crate::projection::Projection;

    fn contains_rect(extent: &Extent, rect: &Rect<f64>) -> bool {
        extent.min_x <= rect.min().x
            && extent.min_y <= rect.min().y
            && extent.max_x >= rect.max().x
            && extent.max_y >= rect.max().y
    }

    #[test]
    fn test_empty_is_sentinel() {
        let extent = Extent::of_features(&[]);
        assert!(extent.is_empty());
        assert_eq!(extent.min_x, f64::INFINITY);
        assert_eq!(extent.max_y, f64::NEG_INFINITY);
    }

    #[test]
    fn test_single_feature() {
        let p = project(1, vec![task(1, TaskStatus::Ready, square(2.0, 3.0, 1.0))]);
        let features = read_features(&build_feature_collection(&p), Projection::Geographic).unwrap();
        let extent = Extent::of_features(&features);
        assert_eq!(extent, Extent::new(2.0, 3.0, 3.0, 4.0));
        assert!(!extent.is_empty());
    }

    #[test]
    fn test_extent_is_tight_over_all_features() {
        let p = project(
            1,
            vec![
                task(1, TaskStatus::Ready, square(85.30, 27.70, 0.01)),
                task(2, TaskStatus::Mapped, square(85.32, 27.68, 0.02)),
                task(3, TaskStatus::Validated, square(85.28, 27.71, 0.005)),
            ],
        );
        let features = read_features(&build_feature_collection(&p), Projection::WebMercator).unwrap();
        let extent = Extent::of_features(&features);

        let rects: Vec<_> = features.iter().filter_map(|f| f.bounding_rect()).collect();
        for rect in &rects {
            assert!(contains_rect(&extent, rect));
        }
        // Each bound is attained by some feature.
        assert!(rects.iter().any(|r| r.min().x == extent.min_x));
        assert!(rects.iter().any(|r| r.min().y == extent.min_y));
        assert!(rects.iter().any(|r| r.max().x == extent.max_x));
        assert!(rects.iter().any(|r| r.max().y == extent.max_y));
    }

    #[test]
    fn test_center_and_size() {
        let extent = Extent::new(0.0, 10.0, 4.0, 20.0);
        assert_eq!(extent.center(), (2.0, 15.0));
        assert_eq!(extent.width(), 4.0);
        assert_eq!(extent.height(), 10.0);
    }
}
