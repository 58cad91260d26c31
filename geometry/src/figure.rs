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

use crate::circle::CircleFigure;
use crate::path::PathFigure;
use crate::point::Bounds;

/// The two shape variants. Every geometric operation dispatches on the tag;
/// circle-against-path is the single cross-variant case.
#[derive(Clone, Debug, PartialEq)]
pub enum Figure {
    Path(PathFigure),
    Circle(CircleFigure),
}

impl Figure {
    pub fn bounds(&self) -> Bounds {
        match self {
            Figure::Path(path) => *path.bounds(),
            Figure::Circle(circle) => circle.bounds(),
        }
    }

    /// Ink cost: pixel area when the interior is filled, summed rounded-up
    /// segment lengths otherwise.
    pub fn ink_cost(&self, filled: bool) -> u64 {
        match (self, filled) {
            (Figure::Path(path), true) => path.pixel_area(),
            (Figure::Path(path), false) => path.perimeter_cost(),
            (Figure::Circle(circle), true) => circle.pixel_area(),
            (Figure::Circle(circle), false) => circle.perimeter_cost(),
        }
    }

    /// Strict canvas bound check. For paths every vertex must be inside; for
    /// circles the bounding box must be.
    pub fn is_inside(&self, x_max: i64, y_max: i64) -> bool {
        match self {
            Figure::Path(path) => path.vertices().all(|vertex| vertex.is_inside(x_max, y_max)),
            Figure::Circle(circle) => circle.bounds().is_inside(x_max, y_max),
        }
    }

    /// Shape-on-shape contact. The fill flags say whether each side's
    /// interior counts: outlines always conflict on touch, interiors only
    /// when filled.
    pub fn overlaps(&self, self_filled: bool, other: &Figure, other_filled: bool) -> bool {
        match (self, other) {
            (Figure::Path(a), Figure::Path(b)) => {
                let segments_a = a.segments();
                let segments_b = b.segments();
                if segments_a.iter().any(|sa| segments_b.iter().any(|sb| sa.intersects(sb))) {
                    return true
                }
                if self_filled && b.vertices().any(|vertex| a.contains(vertex)) {
                    return true
                }
                other_filled && a.vertices().any(|vertex| b.contains(vertex))
            }
            (Figure::Circle(a), Figure::Circle(b)) => circles_overlap(a, self_filled, b, other_filled),
            (Figure::Path(path), Figure::Circle(circle)) => {
                path_circle_overlap(path, self_filled, circle, other_filled)
            }
            (Figure::Circle(circle), Figure::Path(path)) => {
                path_circle_overlap(path, other_filled, circle, self_filled)
            }
        }
    }
}

fn circles_overlap(a: &CircleFigure, a_filled: bool, b: &CircleFigure, b_filled: bool) -> bool {
    let distance = a.center.distance(&b.center);
    let ra = a.radius as f64;
    let rb = b.radius as f64;

    // The rims themselves cross or touch.
    if (ra - rb).abs() <= distance && distance <= ra + rb {
        return true
    }
    // One circle entirely within the other: a conflict only if the outer
    // interior is filled.
    if a_filled && distance + rb <= ra {
        return true
    }
    b_filled && distance + ra <= rb
}

fn path_circle_overlap(path: &PathFigure, path_filled: bool, circle: &CircleFigure, circle_filled: bool) -> bool {
    let segments = path.segments();
    if segments.iter().any(|segment| circle.rim_meets(segment)) {
        return true
    }
    if circle_filled
        && (segments.iter().any(|segment| circle.disk_meets(segment))
            || path.vertices().any(|vertex| circle.contains(vertex)))
    {
        return true
    }
    path_filled && path.contains(circle.center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse_circle, parse_path};

    fn path(svg: &str) -> Figure {
        Figure::Path(parse_path(svg).unwrap())
    }

    fn circle(svg: &str) -> Figure {
        Figure::Circle(parse_circle(svg).unwrap())
    }

    #[test]
    fn cost_matches_the_fill_mode() {
        let square = path("M 5 5 h 5 v 5 h -5 Z");
        assert_eq!(30, square.ink_cost(true));
        assert_eq!(20, square.ink_cost(false));
    }

    #[test]
    fn bounds_strictness() {
        assert!(path("M 1 1 L 9 9").is_inside(10, 10));
        assert!(!path("M 0 1 L 9 9").is_inside(10, 10));
        assert!(!path("M 1 1 L 10 9").is_inside(10, 10));
        assert!(circle("x 5 y 5 r 3").is_inside(10, 10));
        assert!(!circle("x 5 y 5 r 4").is_inside(10, 10));
    }

    #[test]
    fn crossing_outlines_overlap_regardless_of_fill() {
        let a = path("M 1 5 L 9 5");
        let b = path("M 5 1 L 5 9");
        assert!(a.overlaps(false, &b, false));
        assert!(b.overlaps(false, &a, false));
    }

    #[test]
    fn nested_outlines_only_overlap_when_the_outer_is_filled() {
        let outer = path("M 1 1 h 10 v 10 h -10 Z");
        let inner = path("M 4 4 h 2 v 2 h -2 Z");
        assert!(!outer.overlaps(false, &inner, false));
        assert!(outer.overlaps(true, &inner, false));
        assert!(inner.overlaps(false, &outer, true));
        // The inner fill does not reach the outer outline.
        assert!(!inner.overlaps(true, &outer, false));
    }

    #[test]
    fn bounding_box_containment_is_not_overlap() {
        // The hook wraps around the small square without touching it.
        let hook = path("M 1 1 L 12 1 L 12 12 L 1 12");
        let boxed = path("M 5 5 h 2 v 2 h -2 Z");
        assert!(!hook.overlaps(false, &boxed, false));
    }

    #[test]
    fn concentric_circles() {
        let outer = circle("x 20 y 20 r 9");
        let inner = circle("x 20 y 20 r 3");
        assert!(!outer.overlaps(false, &inner, false));
        assert!(outer.overlaps(true, &inner, false));
        assert!(inner.overlaps(false, &outer, true));
        assert!(!inner.overlaps(true, &outer, false));
    }

    #[test]
    fn tangent_circles_overlap() {
        let a = circle("x 10 y 10 r 5");
        let b = circle("x 20 y 10 r 5");
        assert!(a.overlaps(false, &b, false));
        let apart = circle("x 21 y 10 r 5");
        assert!(!a.overlaps(false, &apart, false));
    }

    #[test]
    fn circle_against_path() {
        let rim = circle("x 10 y 10 r 5");
        let crossing = path("M 10 10 L 30 10");
        assert!(rim.overlaps(false, &crossing, false));

        // A path strictly inside the circle touches only a filled disk.
        let inside = path("M 9 9 L 11 11");
        assert!(!rim.overlaps(false, &inside, false));
        assert!(rim.overlaps(true, &inside, false));

        // A filled path containing the center conflicts with the circle.
        let around_center = path("M 8 8 h 4 v 4 h -4 Z");
        assert!(rim.overlaps(false, &around_center, true));
        assert!(!rim.overlaps(false, &around_center, false));
    }
}
