use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::EnumIter;

use super::core::GameError;

pub const BULL: u8 = 25;
pub const MISS: u8 = 0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
pub enum Multiplier {
    Single = 1,
    Double = 2,
    Triple = 3,
}

impl Multiplier {
    pub fn value(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u8> for Multiplier {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Multiplier::Single),
            2 => Ok(Multiplier::Double),
            3 => Ok(Multiplier::Triple),
            other => Err(GameError::InvalidArgument(format!(
                "multiplier must be 1, 2 or 3, got {}",
                other
            ))),
        }
    }
}

/// Where a single dart landed.
///
/// Only valid combinations can be built: segment 0 (miss), 1-20 or 25 (bull),
/// and never a triple bull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawScore")]
pub struct Score {
    segment: u8,
    multiplier: Multiplier,
    is_outer: bool,
}

/// Wire shape of a [`Score`], validated through [`Score::new`] on the way in
#[derive(Deserialize)]
struct RawScore {
    segment: u8,
    multiplier: Multiplier,
    #[serde(default)]
    is_outer: bool,
}

impl TryFrom<RawScore> for Score {
    type Error = GameError;

    fn try_from(raw: RawScore) -> Result<Self, Self::Error> {
        Ok(Score::new(raw.segment, raw.multiplier)?.with_outer(raw.is_outer))
    }
}

impl Score {
    pub fn new(segment: u8, multiplier: Multiplier) -> Result<Self, GameError> {
        match segment {
            MISS | 1..=20 => {}
            BULL if multiplier == Multiplier::Triple => {
                return Err(GameError::InvalidArgument(
                    "triple bull is not a valid score".to_string(),
                ))
            }
            BULL => {}
            other => {
                return Err(GameError::InvalidArgument(format!(
                    "segment must be 0, 1-20 or 25, got {}",
                    other
                )))
            }
        }

        Ok(Self {
            segment,
            multiplier,
            is_outer: false,
        })
    }

    pub fn miss() -> Self {
        Self {
            segment: MISS,
            multiplier: Multiplier::Single,
            is_outer: false,
        }
    }

    /// Marks the dart as landing in the outer part of its bed. Informational only.
    pub fn with_outer(mut self, is_outer: bool) -> Self {
        self.is_outer = is_outer;
        self
    }

    pub fn segment(&self) -> u8 {
        self.segment
    }

    pub fn multiplier(&self) -> Multiplier {
        self.multiplier
    }

    pub fn is_outer(&self) -> bool {
        self.is_outer
    }

    pub fn is_miss(&self) -> bool {
        self.segment == MISS
    }

    pub fn is_double(&self) -> bool {
        !self.is_miss() && self.multiplier == Multiplier::Double
    }

    pub fn is_triple(&self) -> bool {
        !self.is_miss() && self.multiplier == Multiplier::Triple
    }

    pub fn points(&self) -> u32 {
        match self.segment {
            MISS => 0,
            BULL if self.multiplier == Multiplier::Double => 50,
            BULL => 25,
            segment => segment as u32 * self.multiplier.value(),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.segment, self.multiplier) {
            (MISS, _) => write!(f, "MISS"),
            (BULL, Multiplier::Double) => write!(f, "DBULL"),
            (BULL, _) => write!(f, "BULL"),
            (segment, Multiplier::Single) => write!(f, "S{}", segment),
            (segment, Multiplier::Double) => write!(f, "D{}", segment),
            (segment, Multiplier::Triple) => write!(f, "T{}", segment),
        }
    }
}
