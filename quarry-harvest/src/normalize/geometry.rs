use serde_json::json;

/// Rectangular spatial extent in WGS84 degrees.
///
/// Callers are expected to pass `left <= right` and `bottom <= top`; this is
/// not enforced, and degenerate boxes produce degenerate polygons rather
/// than errors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl BoundingBox {
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    /// Closed polygon ring: left-bottom, left-top, right-top, right-bottom,
    /// back to left-bottom.
    pub fn ring(&self) -> [[f64; 2]; 5] {
        [
            [self.left, self.bottom],
            [self.left, self.top],
            [self.right, self.top],
            [self.right, self.bottom],
            [self.left, self.bottom],
        ]
    }

    /// Renders the box as a GeoJSON Polygon geometry.
    pub fn to_geojson(&self) -> serde_json::Value {
        json!({
            "type": "Polygon",
            "coordinates": [self.ring()],
        })
    }

    /// Renders the box as a well-known-text polygon.
    pub fn to_wkt(&self) -> String {
        let ring = self.ring();
        let points = ring
            .iter()
            .map(|[x, y]| format!("{x} {y}"))
            .collect::<Vec<_>>()
            .join(", ");

        format!("POLYGON (({points}))")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_is_closed_and_covers_the_bounds() {
        let ring = BoundingBox::new(0.0, 0.0, 10.0, 10.0).ring();

        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);

        let xs: Vec<f64> = ring.iter().map(|p| p[0]).collect();
        let ys: Vec<f64> = ring.iter().map(|p| p[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f64::INFINITY, f64::min), 0.0);
        assert_eq!(xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 10.0);
        assert_eq!(ys.iter().cloned().fold(f64::INFINITY, f64::min), 0.0);
        assert_eq!(ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max), 10.0);
    }

    #[test]
    fn geojson_polygon_has_the_expected_shape() {
        let geometry = BoundingBox::new(-10.5, 35.0, 30.0, 70.0).to_geojson();

        assert_eq!(geometry["type"], "Polygon");
        let ring = geometry["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], serde_json::json!([-10.5, 35.0]));
        assert_eq!(ring[2], serde_json::json!([30.0, 70.0]));
    }

    #[test]
    fn wkt_renders_the_closed_ring() {
        let wkt = BoundingBox::new(0.0, 0.0, 10.0, 10.0).to_wkt();
        assert_eq!(wkt, "POLYGON ((0 0, 0 10, 10 10, 10 0, 0 0))");
    }

    #[test]
    fn degenerate_boxes_are_accepted() {
        let ring = BoundingBox::new(5.0, 5.0, 5.0, 5.0).ring();
        assert!(ring.iter().all(|p| *p == [5.0, 5.0]));
    }
}
