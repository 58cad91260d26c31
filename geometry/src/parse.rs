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
use crate::error::Error;
use crate::path::{PathFigure, Ring};
use crate::point::Point;

/// A resolved path command. `H`, `V` and their relative forms normalize to
/// line commands during parsing; the absolute/relative distinction survives
/// so the canonical form can be regenerated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PathCommand {
    /// `M`: begin a ring at an absolute position.
    MoveTo(i64, i64),
    /// `m`: begin a ring at a cursor-relative position.
    MoveBy(i64, i64),
    /// `L`, `H`, `V`: extend the ring to an absolute position.
    LineTo(i64, i64),
    /// `l`, `h`, `v`: extend the ring by a delta.
    LineBy(i64, i64),
    /// `Z`/`z`: close the ring onto its first vertex.
    Close,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Command(char),
    Number(i64),
}

/// Splits the SVG string into command letters and signed integers. Runs of
/// whitespace and commas only separate tokens; a sign glued to digits belongs
/// to the number.
fn tokenize(svg: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut chars = svg.chars().peekable();
    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() || ch == ',' {
            chars.next();
        } else if ch.is_ascii_alphabetic() {
            chars.next();
            tokens.push(Token::Command(ch));
        } else if ch == '-' || ch == '+' || ch.is_ascii_digit() {
            let mut buf = String::new();
            buf.push(ch);
            chars.next();
            while let Some(&digit) = chars.peek() {
                if !digit.is_ascii_digit() {
                    break
                }
                buf.push(digit);
                chars.next();
            }
            let number = buf.parse::<i64>().map_err(|_| Error::InvalidNumber(buf.clone()))?;
            tokens.push(Token::Number(number));
        } else {
            return Err(Error::UnexpectedCharacter(ch))
        }
    }
    Ok(tokens)
}

fn take_number(tokens: &[Token], index: &mut usize) -> Result<i64, Error> {
    match tokens.get(*index) {
        Some(Token::Number(n)) => {
            *index += 1;
            Ok(*n)
        }
        Some(Token::Command(c)) => Err(Error::UnexpectedCommand(*c)),
        None => Err(Error::UnexpectedEnd),
    }
}

/// Parses path data. Every `M`/`m` begins a new ring; `Z`/`z` closes the
/// current ring by appending its first vertex.
pub fn parse_path(svg: &str) -> Result<PathFigure, Error> {
    let tokens = tokenize(svg)?;
    let mut commands = Vec::new();
    let mut rings: Vec<Ring> = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut cursor = Point::default();

    let mut index = 0;
    while index < tokens.len() {
        let letter = match tokens[index] {
            Token::Command(c) => c,
            Token::Number(n) => return Err(Error::UnexpectedNumber(n)),
        };
        index += 1;

        match letter {
            'M' | 'm' => {
                let x = take_number(&tokens, &mut index)?;
                let y = take_number(&tokens, &mut index)?;
                if !current.is_empty() {
                    rings.push(Ring::new(current));
                }
                if letter == 'M' {
                    cursor = Point::new(x, y);
                    commands.push(PathCommand::MoveTo(x, y));
                } else {
                    cursor = cursor.translated(x, y);
                    commands.push(PathCommand::MoveBy(x, y));
                }
                current = vec![cursor];
            }
            'L' | 'l' | 'H' | 'h' | 'V' | 'v' => {
                if current.is_empty() {
                    return Err(Error::MissingMoveTo)
                }
                match letter {
                    'L' => {
                        let x = take_number(&tokens, &mut index)?;
                        let y = take_number(&tokens, &mut index)?;
                        cursor = Point::new(x, y);
                        commands.push(PathCommand::LineTo(x, y));
                    }
                    'l' => {
                        let dx = take_number(&tokens, &mut index)?;
                        let dy = take_number(&tokens, &mut index)?;
                        cursor = cursor.translated(dx, dy);
                        commands.push(PathCommand::LineBy(dx, dy));
                    }
                    'H' => {
                        let x = take_number(&tokens, &mut index)?;
                        cursor = Point::new(x, cursor.y);
                        commands.push(PathCommand::LineTo(cursor.x, cursor.y));
                    }
                    'h' => {
                        let dx = take_number(&tokens, &mut index)?;
                        cursor = cursor.translated(dx, 0);
                        commands.push(PathCommand::LineBy(dx, 0));
                    }
                    'V' => {
                        let y = take_number(&tokens, &mut index)?;
                        cursor = Point::new(cursor.x, y);
                        commands.push(PathCommand::LineTo(cursor.x, cursor.y));
                    }
                    'v' => {
                        let dy = take_number(&tokens, &mut index)?;
                        cursor = cursor.translated(0, dy);
                        commands.push(PathCommand::LineBy(0, dy));
                    }
                    _ => unreachable!(),
                }
                current.push(cursor);
            }
            'Z' | 'z' => {
                if current.is_empty() {
                    return Err(Error::MissingMoveTo)
                }
                let first = current[0];
                current.push(first);
                cursor = first;
                commands.push(PathCommand::Close);
            }
            other => return Err(Error::UnexpectedCommand(other)),
        }
    }

    if current.is_empty() {
        return Err(Error::MissingMoveTo)
    }
    rings.push(Ring::new(current));
    Ok(PathFigure::new(commands, rings))
}

/// Parses circle data: exactly three commands from `{X|x, Y|y, R|r}`, each
/// with one number, in any order.
pub fn parse_circle(svg: &str) -> Result<CircleFigure, Error> {
    let tokens = tokenize(svg)?;
    let mut x = None;
    let mut y = None;
    let mut r = None;

    let mut index = 0;
    while index < tokens.len() {
        let letter = match tokens[index] {
            Token::Command(c) => c,
            Token::Number(n) => return Err(Error::UnexpectedNumber(n)),
        };
        index += 1;
        let value = take_number(&tokens, &mut index)?;

        let slot = match letter.to_ascii_lowercase() {
            'x' => &mut x,
            'y' => &mut y,
            'r' => &mut r,
            other => return Err(Error::UnexpectedCommand(other)),
        };
        if slot.is_some() {
            return Err(Error::DuplicateAttribute(letter.to_ascii_lowercase()))
        }
        *slot = Some(value);
    }

    let x = x.ok_or(Error::MissingAttribute('x'))?;
    let y = y.ok_or(Error::MissingAttribute('y'))?;
    let r = r.ok_or(Error::MissingAttribute('r'))?;
    if r <= 0 {
        return Err(Error::NonPositiveRadius(r))
    }
    Ok(CircleFigure::new(Point::new(x, y), r))
}
