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

use crate::EPSILON;

/// A point on the canvas grid.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Point {
            x,
            y,
        }
    }

    pub fn translated(&self, dx: i64, dy: i64) -> Self {
        Point::new(self.x + dx, self.y + dy)
    }

    /// The canvas bound is strict: points on the edges are outside.
    pub fn is_inside(&self, x_max: i64, y_max: i64) -> bool {
        0 < self.x && self.x < x_max && 0 < self.y && self.y < y_max
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned bounding box, inclusive on all four sides.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn of<I: IntoIterator<Item = Point>>(points: I) -> Option<Bounds> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        Some(bounds)
    }

    pub fn contains(&self, p: Point) -> bool {
        self.min.x <= p.x && p.x <= self.max.x && self.min.y <= p.y && p.y <= self.max.y
    }

    /// Containment of a fractional solution, with slack for the division.
    pub fn contains_f(&self, x: f64, y: f64) -> bool {
        self.min.x as f64 - EPSILON <= x
            && x <= self.max.x as f64 + EPSILON
            && self.min.y as f64 - EPSILON <= y
            && y <= self.max.y as f64 + EPSILON
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Strictly inside the canvas on every side.
    pub fn is_inside(&self, x_max: i64, y_max: i64) -> bool {
        self.min.is_inside(x_max, y_max) && self.max.is_inside(x_max, y_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_outside() {
        assert!(Point::new(1, 1).is_inside(1024, 1024));
        assert!(!Point::new(0, 5).is_inside(1024, 1024));
        assert!(!Point::new(5, 0).is_inside(1024, 1024));
        assert!(!Point::new(1024, 5).is_inside(1024, 1024));
        assert!(!Point::new(5, 1024).is_inside(1024, 1024));
    }

    #[test]
    fn bounds_of_points() {
        let bounds = Bounds::of(vec![Point::new(3, 9), Point::new(7, 1), Point::new(5, 5)]).unwrap();
        assert_eq!(bounds.min, Point::new(3, 1));
        assert_eq!(bounds.max, Point::new(7, 9));
        assert_eq!(None, Bounds::of(vec![]));
    }

    #[test]
    fn touching_bounds_intersect() {
        let a = Bounds::of(vec![Point::new(0, 0), Point::new(4, 4)]).unwrap();
        let b = Bounds::of(vec![Point::new(4, 4), Point::new(8, 8)]).unwrap();
        let c = Bounds::of(vec![Point::new(5, 5), Point::new(8, 8)]).unwrap();
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
