use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr, VariantArray};

use crate::location::Coord;

/// The four axis-aligned directions a vine head may face.
///
/// Level files spell these exactly `"up"`, `"down"`, `"left"` and `"right"`.
/// `Up` increases `y`, matching the bottom-left origin of [`Point`](crate::Point).
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(VariantArray, EnumString, IntoStaticStr, strum::Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward increasing `y`.
    Up,
    /// Toward decreasing `y`.
    Down,
    /// Toward decreasing `x`.
    Left,
    /// Toward increasing `x`.
    Right,
}

impl Direction {
    /// The unit step `(dx, dy)` taken by a head facing this way.
    pub const fn delta(&self) -> (Coord, Coord) {
        match self {
            Self::Right => (1, 0),
            Self::Left => (-1, 0),
            Self::Up => (0, 1),
            Self::Down => (0, -1),
        }
    }

    /// The opposite direction.
    pub const fn invert(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// The direction of the unit step from `from` to `to`, if the two are orthogonally adjacent.
    pub fn between(from: crate::Point, to: crate::Point) -> Option<Self> {
        let delta = (to.x - from.x, to.y - from.y);
        Self::VARIANTS.iter().copied().find(|dir| dir.delta() == delta)
    }
}

/// A vine's facing as found in level content.
///
/// Content may name a direction this engine does not know; such a vine keeps the raw string for diagnostics
/// and moves by `(0, 0)`, which makes it permanently immovable.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Heading {
    /// One of the four known directions.
    Toward(Direction),
    /// Anything else, kept verbatim.
    Unrecognized(String),
}

impl Heading {
    /// The known direction, if any.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Self::Toward(direction) => Some(*direction),
            Self::Unrecognized(_) => None,
        }
    }

    /// The per-step head displacement; `(0, 0)` for an unrecognized heading.
    pub fn delta(&self) -> (Coord, Coord) {
        self.direction().map_or((0, 0), |direction| direction.delta())
    }
}

impl From<Direction> for Heading {
    fn from(value: Direction) -> Self {
        Self::Toward(value)
    }
}

impl From<&str> for Heading {
    fn from(value: &str) -> Self {
        match Direction::from_str(value) {
            Ok(direction) => Self::Toward(direction),
            Err(_) => Self::Unrecognized(value.to_owned()),
        }
    }
}

impl From<String> for Heading {
    fn from(value: String) -> Self {
        match Direction::from_str(&value) {
            Ok(direction) => Self::Toward(direction),
            Err(_) => Self::Unrecognized(value),
        }
    }
}

impl From<Heading> for String {
    fn from(value: Heading) -> Self {
        match value {
            Heading::Toward(direction) => <&'static str>::from(direction).to_owned(),
            Heading::Unrecognized(raw) => raw,
        }
    }
}

impl Display for Heading {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Toward(direction) => write!(f, "{direction}"),
            Self::Unrecognized(raw) => write!(f, "{raw:?}"),
        }
    }
}
