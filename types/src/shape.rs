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

use igeometry::{parse_circle, parse_path, Figure};
use ikey::Public;
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};

use crate::error::Error;
use crate::Ink;

pub const TRANSPARENT: &str = "transparent";

/// Longest accepted SVG string for a single shape.
pub const MAX_SVG_LENGTH: usize = 256;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum ShapeKind {
    Path,
    Circle,
}

impl Encodable for ShapeKind {
    fn rlp_append(&self, s: &mut RlpStream) {
        match self {
            ShapeKind::Path => s.append(&0u8),
            ShapeKind::Circle => s.append(&1u8),
        };
    }
}

impl Decodable for ShapeKind {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        match rlp.as_val::<u8>()? {
            0u8 => Ok(ShapeKind::Path),
            1 => Ok(ShapeKind::Circle),
            _ => Err(DecoderError::Custom("Unexpected ShapeKind value")),
        }
    }
}

/// A drawable shape: the raw SVG data, paint attributes and owning identity,
/// with the parsed geometry cached alongside. Construction enforces every
/// canvas-independent rule, so a `Shape` in hand is always well-formed.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    kind: ShapeKind,
    svg: String,
    fill: String,
    stroke: String,
    owner: Public,
    figure: Figure,
}

impl Shape {
    pub fn new(
        kind: ShapeKind,
        svg: String,
        fill: String,
        stroke: String,
        owner: Public,
    ) -> Result<Shape, Error> {
        if svg.len() > MAX_SVG_LENGTH {
            return Err(Error::ShapeSvgTooLong {
                length: svg.len(),
                limit: MAX_SVG_LENGTH,
            })
        }
        let filled = fill != TRANSPARENT;
        if !filled && stroke == TRANSPARENT {
            return Err(Error::InvalidShapeFillStroke)
        }

        let figure = match kind {
            ShapeKind::Path => {
                Figure::Path(parse_path(&svg).map_err(|err| Error::InvalidShapeSvg(err.to_string()))?)
            }
            ShapeKind::Circle => {
                Figure::Circle(parse_circle(&svg).map_err(|err| Error::InvalidShapeSvg(err.to_string()))?)
            }
        };

        if filled {
            if let Figure::Path(path) = &figure {
                if path.rings().len() != 1 {
                    return Err(Error::InvalidShapeSvg("a filled path must consist of a single subpath".into()))
                }
                if !path.rings()[0].is_closed() {
                    return Err(Error::InvalidShapeSvg("a filled path must be closed".into()))
                }
                if path.self_intersects() {
                    return Err(Error::InvalidShapeSvg("a filled path may not intersect itself".into()))
                }
            }
        }

        Ok(Shape {
            kind,
            svg,
            fill,
            stroke,
            owner,
            figure,
        })
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn svg(&self) -> &str {
        &self.svg
    }

    pub fn fill(&self) -> &str {
        &self.fill
    }

    pub fn stroke(&self) -> &str {
        &self.stroke
    }

    pub fn owner(&self) -> &Public {
        &self.owner
    }

    pub fn figure(&self) -> &Figure {
        &self.figure
    }

    pub fn is_filled(&self) -> bool {
        self.fill != TRANSPARENT
    }

    /// Ink to draw this shape: pixel area when filled, perimeter otherwise.
    pub fn ink_cost(&self) -> Ink {
        self.figure.ink_cost(self.is_filled())
    }

    /// Strictly within the canvas.
    pub fn is_inside(&self, x_max: u32, y_max: u32) -> bool {
        self.figure.is_inside(i64::from(x_max), i64::from(y_max))
    }

    pub fn overlaps(&self, other: &Shape) -> bool {
        self.figure.overlaps(self.is_filled(), other.figure(), other.is_filled())
    }

    /// The SVG fragment served to art nodes.
    pub fn render_svg(&self) -> String {
        match &self.figure {
            Figure::Path(_) => {
                format!("<path d=\"{}\" stroke=\"{}\" fill=\"{}\"/>", self.svg, self.stroke, self.fill)
            }
            Figure::Circle(circle) => format!(
                "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" stroke=\"{}\" fill=\"{}\"/>",
                circle.center.x, circle.center.y, circle.radius, self.stroke, self.fill
            ),
        }
    }
}

impl Encodable for Shape {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(5);
        s.append(&self.kind);
        s.append(&self.svg);
        s.append(&self.fill);
        s.append(&self.stroke);
        s.append(&self.owner);
    }
}

impl Decodable for Shape {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        let item_count = rlp.item_count()?;
        if item_count != 5 {
            return Err(DecoderError::RlpIncorrectListLen)
        }
        Shape::new(rlp.val_at(0)?, rlp.val_at(1)?, rlp.val_at(2)?, rlp.val_at(3)?, rlp.val_at(4)?)
            .map_err(|_| DecoderError::Custom("Invalid shape"))
    }
}
