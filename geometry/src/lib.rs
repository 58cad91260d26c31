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

//! Pure geometry over integer canvas coordinates: SVG parsing, ink costs,
//! validity and shape-on-shape overlap. Nothing in here knows about chains,
//! identities or serialization.

mod circle;
mod error;
mod figure;
mod parse;
mod path;
mod point;
mod segment;

pub use crate::circle::CircleFigure;
pub use crate::error::Error;
pub use crate::figure::Figure;
pub use crate::parse::{parse_circle, parse_path, PathCommand};
pub use crate::path::{PathFigure, Ring};
pub use crate::point::{Bounds, Point};
pub use crate::segment::{ScanHit, Segment};

/// Slack for comparisons on scan-line and intersection coordinates, which are
/// exact integer solutions divided by small determinants.
pub(crate) const EPSILON: f64 = 1e-9;
