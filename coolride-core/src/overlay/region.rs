//! Overlay parts behind an R-tree of their bounding boxes

use geo::{BoundingRect, Intersects, LineString, Rect};
use rstar::{
    AABB, RTree,
    primitives::{GeomWithData, Rectangle},
};

type PartEnvelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// A unioned overlay split into its parts, each findable by bounding box.
#[derive(Debug, Clone)]
pub struct IndexedRegion<G> {
    parts: Vec<G>,
    index: RTree<PartEnvelope>,
}

impl<G> IndexedRegion<G>
where
    G: BoundingRect<f64, Output = Option<Rect<f64>>>,
{
    pub fn new(parts: Vec<G>) -> Self {
        let envelopes = parts
            .iter()
            .enumerate()
            .filter_map(|(idx, part)| {
                part.bounding_rect().map(|rect| {
                    PartEnvelope::new(
                        Rectangle::from_corners(
                            [rect.min().x, rect.min().y],
                            [rect.max().x, rect.max().y],
                        ),
                        idx,
                    )
                })
            })
            .collect();

        Self {
            parts,
            index: RTree::bulk_load(envelopes),
        }
    }

    pub fn parts(&self) -> &[G] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Exact intersection test, pre-filtered by bounding boxes.
    pub fn intersects_line(&self, line: &LineString<f64>) -> bool
    where
        LineString<f64>: Intersects<G>,
    {
        let Some(rect) = line.bounding_rect() else {
            return false;
        };
        let envelope =
            AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);
        self.index
            .locate_in_envelope_intersecting(&envelope)
            .any(|entry| line.intersects(&self.parts[entry.data]))
    }
}

#[cfg(test)]
mod tests {
    use geo::{Polygon, line_string, polygon};

    use super::*;

    fn squares() -> IndexedRegion<Polygon<f64>> {
        IndexedRegion::new(vec![
            polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)],
            polygon![(x: 5.0, y: 5.0), (x: 6.0, y: 5.0), (x: 6.0, y: 6.0), (x: 5.0, y: 6.0)],
        ])
    }

    #[test]
    fn crossing_line_intersects() {
        let line = line_string![(x: -1.0, y: 0.5), (x: 2.0, y: 0.5)];
        assert!(squares().intersects_line(&line));
    }

    #[test]
    fn bbox_overlap_without_contact_is_rejected() {
        // Diagonal line whose bbox overlaps the first square but misses it.
        let line = line_string![(x: 0.6, y: -1.0), (x: 2.0, y: 0.4)];
        assert!(!squares().intersects_line(&line));
    }

    #[test]
    fn line_inside_a_part_intersects() {
        let line = line_string![(x: 5.2, y: 5.2), (x: 5.8, y: 5.8)];
        assert!(squares().intersects_line(&line));
    }
}
