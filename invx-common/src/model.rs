//! Shared data model
//!
//! Recognized text fragments arrive from the OCR adapter with a
//! quadrilateral pixel bounding box. Metric samples and summaries are the
//! values stored and broadcast by the metrics hub.

use serde::{Deserialize, Serialize};

/// A pixel-space corner of a bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Quadrilateral bounding box
///
/// Corners are ordered top-left, top-right, bottom-right, bottom-left.
/// On the wire this is the flat `{x1, y1, ..., x4, y4}` object emitted by
/// the recognizer adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "FlatQuad", into = "FlatQuad")]
pub struct Quad {
    pub corners: [Point; 4],
}

impl Quad {
    pub const fn new(top_left: Point, top_right: Point, bottom_right: Point, bottom_left: Point) -> Self {
        Self {
            corners: [top_left, top_right, bottom_right, bottom_left],
        }
    }

    /// Axis-aligned box spanning `x1..=x2` horizontally and `y1..=y2` vertically
    pub const fn from_rect(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self::new(
            Point::new(x1, y1),
            Point::new(x2, y1),
            Point::new(x2, y2),
            Point::new(x1, y2),
        )
    }

    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    pub fn top_right(&self) -> Point {
        self.corners[1]
    }

    /// Horizontal extent `(x1, x2)` taken from the top edge
    pub fn horizontal_span(&self) -> (i32, i32) {
        (self.top_left().x, self.top_right().x)
    }
}

#[derive(Serialize, Deserialize)]
struct FlatQuad {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    x3: i32,
    y3: i32,
    x4: i32,
    y4: i32,
}

impl From<FlatQuad> for Quad {
    fn from(f: FlatQuad) -> Self {
        Quad::new(
            Point::new(f.x1, f.y1),
            Point::new(f.x2, f.y2),
            Point::new(f.x3, f.y3),
            Point::new(f.x4, f.y4),
        )
    }
}

impl From<Quad> for FlatQuad {
    fn from(q: Quad) -> Self {
        let [a, b, c, d] = q.corners;
        FlatQuad {
            x1: a.x,
            y1: a.y,
            x2: b.x,
            y2: b.y,
            x3: c.x,
            y3: c.y,
            x4: d.x,
            y4: d.y,
        }
    }
}

/// One recognized span of text with its bounding box
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    pub bounding_box: Quad,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, bounding_box: Quad) -> Self {
        Self {
            text: text.into(),
            bounding_box,
        }
    }
}

/// A named group of fragments sharing horizontal extent with a header
///
/// `members[0]` is always the header fragment that defines the column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub members: Vec<TextFragment>,
}

impl Column {
    /// The header fragment, `None` only for a column built by hand with no members
    pub fn header(&self) -> Option<&TextFragment> {
        self.members.first()
    }

    /// Members other than the header
    pub fn cells(&self) -> &[TextFragment] {
        self.members.get(1..).unwrap_or(&[])
    }
}

/// One recorded observation from processing a single document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Unique per document
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub latency_ms: u64,
    /// Heuristic accuracy in `[0, 95]`
    pub accuracy_pct: u8,
}

/// Aggregate of all samples at a point in time
///
/// Serialized with the field names dashboard viewers expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: u64,
    #[serde(rename = "avgLatency")]
    pub avg_latency_ms: i64,
    #[serde(rename = "avgAccuracy")]
    pub avg_accuracy_pct: f64,
    /// Cumulative document count, not a rate
    pub throughput: u64,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_without_members() {
        let column: Column = serde_json::from_value(json!({"name": "Price", "members": []})).unwrap();
        assert!(column.header().is_none());
        assert!(column.cells().is_empty());
    }

    #[test]
    fn test_quad_reads_flat_recognizer_shape() {
        let value = json!({
            "text": "Price",
            "bounding_box": {"x1": 10, "y1": 5, "x2": 50, "y2": 5, "x3": 50, "y3": 20, "x4": 10, "y4": 20}
        });
        let fragment: TextFragment = serde_json::from_value(value).unwrap();
        assert_eq!(fragment.bounding_box, Quad::from_rect(10, 5, 50, 20));
        assert_eq!(fragment.bounding_box.horizontal_span(), (10, 50));
    }

    #[test]
    fn test_quad_writes_flat_shape() {
        let value = serde_json::to_value(Quad::from_rect(1, 2, 3, 4)).unwrap();
        assert_eq!(
            value,
            json!({"x1": 1, "y1": 2, "x2": 3, "y2": 2, "x3": 3, "y3": 4, "x4": 1, "y4": 4})
        );
    }

    #[test]
    fn test_horizontal_span_uses_top_edge() {
        // Skewed box: bottom edge is wider than the top edge
        let quad = Quad::new(
            Point::new(12, 0),
            Point::new(40, 2),
            Point::new(48, 20),
            Point::new(4, 18),
        );
        assert_eq!(quad.horizontal_span(), (12, 40));
    }

    #[test]
    fn test_summary_uses_viewer_field_names() {
        let summary = Summary {
            total: 2,
            avg_latency_ms: 150,
            avg_accuracy_pct: 85.0,
            throughput: 2,
            timestamp: 1_700_000_000_000,
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["avgLatency"], 150);
        assert_eq!(value["avgAccuracy"], 85.0);
        assert_eq!(value["throughput"], 2);
        assert!(value.get("avg_latency_ms").is_none());
    }
}
