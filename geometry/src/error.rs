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

use std::fmt;

/// SVG parse failures.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// A character that is neither a command letter, a number nor a separator.
    UnexpectedCharacter(char),
    /// A command letter the grammar does not recognize.
    UnexpectedCommand(char),
    /// A number where a command letter was expected.
    UnexpectedNumber(i64),
    /// A token that does not parse as a signed 64-bit integer.
    InvalidNumber(String),
    /// The string ended while a command still wanted arguments.
    UnexpectedEnd,
    /// Path data must begin with a moveto.
    MissingMoveTo,
    /// A circle attribute given twice.
    DuplicateAttribute(char),
    /// A circle missing one of its three attributes.
    MissingAttribute(char),
    NonPositiveRadius(i64),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedCharacter(c) => write!(f, "Unexpected character {:?} in svg data", c),
            Error::UnexpectedCommand(c) => write!(f, "Unrecognized command {:?}", c),
            Error::UnexpectedNumber(n) => write!(f, "Number {} found where a command was expected", n),
            Error::InvalidNumber(s) => write!(f, "Cannot parse {:?} as a number", s),
            Error::UnexpectedEnd => write!(f, "Svg data ended in the middle of a command"),
            Error::MissingMoveTo => write!(f, "Path data must begin with a moveto"),
            Error::DuplicateAttribute(c) => write!(f, "Circle attribute {:?} given twice", c),
            Error::MissingAttribute(c) => write!(f, "Circle attribute {:?} is missing", c),
            Error::NonPositiveRadius(r) => write!(f, "Circle radius must be positive, got {}", r),
        }
    }
}
