// Copyright 2018 Kodebox, Inc.
// This file is part of InkChain.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::parse::PathCommand;
use crate::point::{Bounds, Point};
use crate::segment::{ScanHit, Segment};
use crate::EPSILON;

/// One subpath: the ordered vertices drawn from a single moveto. Closed iff
/// the last vertex repeats the first.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ring {
    vertices: Vec<Point>,
}

impl Ring {
    pub(crate) fn new(vertices: Vec<Point>) -> Self {
        debug_assert!(!vertices.is_empty());
        Ring {
            vertices,
        }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn is_closed(&self) -> bool {
        self.vertices.len() > 1 && self.vertices.first() == self.vertices.last()
    }

    pub fn segments(&self) -> Vec<Segment> {
        self.vertices.windows(2).map(|pair| Segment::new(pair[0], pair[1])).collect()
    }
}

/// Parsed path geometry: the resolved command list and one ring per moveto.
#[derive(Clone, Debug, PartialEq)]
pub struct PathFigure {
    commands: Vec<PathCommand>,
    rings: Vec<Ring>,
    bounds: Bounds,
}

impl PathFigure {
    pub(crate) fn new(commands: Vec<PathCommand>, rings: Vec<Ring>) -> Self {
        let bounds = Bounds::of(rings.iter().flat_map(|ring| ring.vertices().iter().cloned()))
            .expect("every ring starts with a moveto vertex");
        PathFigure {
            commands,
            rings,
            bounds,
        }
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn vertices(&self) -> impl Iterator<Item = Point> + '_ {
        self.rings.iter().flat_map(|ring| ring.vertices().iter().cloned())
    }

    pub fn segments(&self) -> Vec<Segment> {
        self.rings.iter().flat_map(Ring::segments).collect()
    }

    /// The normalized SVG `d` string. Parsing it back yields identical
    /// geometry.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        for command in &self.commands {
            if !out.is_empty() {
                out.push(' ');
            }
            match command {
                PathCommand::MoveTo(x, y) => out.push_str(&format!("M {} {}", x, y)),
                PathCommand::MoveBy(dx, dy) => out.push_str(&format!("m {} {}", dx, dy)),
                PathCommand::LineTo(x, y) => out.push_str(&format!("L {} {}", x, y)),
                PathCommand::LineBy(dx, dy) => out.push_str(&format!("l {} {}", dx, dy)),
                PathCommand::Close => out.push('Z'),
            }
        }
        out
    }

    /// Stroke cost: every segment rounds its length up, and a degenerate
    /// segment still costs one unit.
    pub fn perimeter_cost(&self) -> u64 {
        self.segments()
            .iter()
            .map(|segment| {
                let length = segment.length().ceil() as u64;
                if length == 0 {
                    1
                } else {
                    length
                }
            })
            .sum()
    }

    /// Inclusive-edge pixel count by horizontal scan line: per row, the
    /// deduplicated crossing set is paired left-to-right and the spans
    /// between pairs summed.
    pub fn pixel_area(&self) -> u64 {
        let segments = self.segments();
        let mut total = 0.0;
        for y in self.bounds.min.y..=self.bounds.max.y {
            let xs = scan_intersections(&segments, y);
            for pair in xs.chunks(2) {
                if pair.len() == 2 {
                    total += pair[1] - pair[0];
                }
            }
        }
        total.ceil() as u64
    }

    /// Odd crossing parity on both sides of `p` along its scan line.
    /// Boundary points are contained.
    pub fn contains(&self, p: Point) -> bool {
        let segments = self.segments();
        if segments.iter().any(|segment| segment.passes_through(p)) {
            return true
        }
        let xs = scan_intersections(&segments, p.y);
        let px = p.x as f64;
        let left = xs.iter().filter(|x| **x < px - EPSILON).count();
        let right = xs.iter().filter(|x| **x > px + EPSILON).count();
        left % 2 == 1 && right % 2 == 1
    }

    /// Any contact between non-adjacent segments of a ring. Shared endpoints
    /// of ring neighbours are the joints of the outline, not crossings, but a
    /// tangency between any other pair counts.
    pub fn self_intersects(&self) -> bool {
        for ring in &self.rings {
            let segments = ring.segments();
            let count = segments.len();
            for i in 0..count {
                for j in (i + 1)..count {
                    let adjacent = j == i + 1 || (i == 0 && j == count - 1 && ring.is_closed());
                    if adjacent {
                        continue
                    }
                    if segments[i].intersects(&segments[j]) {
                        return true
                    }
                }
            }
        }
        false
    }
}

/// The ordered, deduplicated intersection set of the scan line at `y` with
/// the given segments. Segments lying along the line contribute both
/// endpoints.
fn scan_intersections(segments: &[Segment], y: i64) -> Vec<f64> {
    let mut xs: Vec<f64> = Vec::new();
    for segment in segments {
        match segment.scan_hit(y) {
            ScanHit::Miss => {}
            ScanHit::Cross(x) => xs.push(x),
            ScanHit::Along(x1, x2) => {
                xs.push(x1 as f64);
                xs.push(x2 as f64);
            }
        }
    }
    xs.sort_by(|p, q| p.partial_cmp(q).unwrap_or(std::cmp::Ordering::Equal));
    xs.dedup_by(|p, q| (*p - *q).abs() < EPSILON);
    xs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_path;

    #[test]
    fn stroke_cost_rounds_each_segment_up() {
        // A single diagonal of length √50.
        let path = parse_path("M 10 10 L 5 5").unwrap();
        assert_eq!(8, path.perimeter_cost());
    }

    #[test]
    fn degenerate_segment_costs_one() {
        let path = parse_path("M 4 4 L 4 4").unwrap();
        assert_eq!(1, path.perimeter_cost());
    }

    #[test]
    fn pixel_area_of_a_square() {
        let path = parse_path("M 5 5 h 5 v 5 h -5 Z").unwrap();
        assert_eq!(30, path.pixel_area());
    }

    #[test]
    fn pixel_area_of_a_right_triangle() {
        // Hypotenuse from (10,10) down to (2,2): row y spans x in [2, y].
        let path = parse_path("M 2 2 L 10 10 V 2 Z").unwrap();
        let expected: u64 = (2..=10).map(|y| y - 2).sum();
        assert_eq!(expected, path.pixel_area());
    }

    #[test]
    fn contains_interior_boundary_and_exterior() {
        let path = parse_path("M 5 5 h 5 v 5 h -5 Z").unwrap();
        assert!(path.contains(Point::new(7, 7)));
        assert!(path.contains(Point::new(5, 7)));
        assert!(path.contains(Point::new(10, 10)));
        assert!(!path.contains(Point::new(4, 7)));
        assert!(!path.contains(Point::new(11, 7)));
        assert!(!path.contains(Point::new(7, 12)));
    }

    #[test]
    fn crossing_outline_self_intersects() {
        // A bowtie drawn as one ring.
        let path = parse_path("M 1 1 L 9 9 L 9 1 L 1 9 Z").unwrap();
        assert!(path.self_intersects());
    }

    #[test]
    fn self_tangent_outline_self_intersects() {
        // Two lobes pinched at (5,5): the pinch vertex is shared by
        // non-adjacent segments.
        let path = parse_path("M 1 1 L 5 5 L 9 1 L 9 9 L 5 5 L 1 9 Z").unwrap();
        assert!(path.self_intersects());
    }

    #[test]
    fn convex_outline_does_not_self_intersect() {
        let path = parse_path("M 5 1 L 9 5 L 5 9 L 1 5 Z").unwrap();
        assert!(!path.self_intersects());
    }

    #[test]
    fn canonical_reparse_preserves_geometry() {
        let path = parse_path("   M 10 10 L 5 , 5 h -3 Z").unwrap();
        let reparsed = parse_path(&path.canonical()).unwrap();
        assert_eq!(path, reparsed);
    }
}
