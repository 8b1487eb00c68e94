//! Dartboard geometry and the physical dart model.
//!
//! Coordinates are millimetres from the centre of the bull, `y` pointing up;
//! angles run clockwise from the top where the 20 sits.

use rand::Rng;
use std::f64::consts::PI;

use super::types::SkillLevel;
use crate::game::{Multiplier, Score, BULL};

/// Segments clockwise starting at the top
pub const SEGMENT_ORDER: [u8; 20] = [
    20, 1, 18, 4, 13, 6, 10, 15, 2, 17, 3, 19, 7, 16, 8, 11, 14, 9, 12, 5,
];

pub const INNER_BULL_RADIUS: f64 = 6.35;
pub const OUTER_BULL_RADIUS: f64 = 15.9;
pub const TRIPLE_INNER_RADIUS: f64 = 99.0;
pub const TRIPLE_OUTER_RADIUS: f64 = 107.0;
pub const DOUBLE_INNER_RADIUS: f64 = 162.0;
pub const DOUBLE_OUTER_RADIUS: f64 = 170.0;

const SEGMENT_DEGREES: f64 = 18.0;
const MIN_DISPERSION_MM: f64 = 3.0;
const DISPERSION_RANGE_MM: f64 = 137.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    fn polar(radius: f64, degrees: f64) -> Self {
        let radians = degrees.to_radians();
        Self {
            x: radius * radians.sin(),
            y: radius * radians.cos(),
        }
    }

    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Clockwise from the top, in [0, 360)
    pub fn degrees(&self) -> f64 {
        self.x.atan2(self.y).to_degrees().rem_euclid(360.0)
    }
}

/// Standard deviation of a dart around its aim point. Strictly decreasing in skill.
pub fn dispersion_mm(skill: SkillLevel) -> f64 {
    MIN_DISPERSION_MM + DISPERSION_RANGE_MM * (1.0 - skill.fraction()).powf(1.5)
}

/// The point a thrower aims at for a given target bed
pub fn aim_point(target: &Score) -> Point {
    if target.is_miss() {
        return Point::polar(DOUBLE_OUTER_RADIUS + 30.0, 0.0);
    }
    if target.segment() == BULL {
        return match target.multiplier() {
            Multiplier::Double => Point { x: 0.0, y: 0.0 },
            _ => Point::polar((INNER_BULL_RADIUS + OUTER_BULL_RADIUS) / 2.0, 0.0),
        };
    }

    let index = SEGMENT_ORDER
        .iter()
        .position(|s| *s == target.segment())
        .unwrap_or(0);
    let radius = match target.multiplier() {
        Multiplier::Single => (TRIPLE_OUTER_RADIUS + DOUBLE_INNER_RADIUS) / 2.0,
        Multiplier::Double => (DOUBLE_INNER_RADIUS + DOUBLE_OUTER_RADIUS) / 2.0,
        Multiplier::Triple => (TRIPLE_INNER_RADIUS + TRIPLE_OUTER_RADIUS) / 2.0,
    };
    Point::polar(radius, index as f64 * SEGMENT_DEGREES)
}

/// Reads the score off the board where a dart landed. Always a valid score.
pub fn resolve(point: Point) -> Score {
    let radius = point.radius();
    if radius > DOUBLE_OUTER_RADIUS {
        return Score::miss();
    }
    if radius <= INNER_BULL_RADIUS {
        return Score::new(BULL, Multiplier::Double).unwrap_or_else(|_| Score::miss());
    }
    if radius <= OUTER_BULL_RADIUS {
        return Score::new(BULL, Multiplier::Single).unwrap_or_else(|_| Score::miss());
    }

    let index = ((point.degrees() + SEGMENT_DEGREES / 2.0) / SEGMENT_DEGREES) as usize % 20;
    let segment = SEGMENT_ORDER[index];

    let (multiplier, is_outer) = if radius >= DOUBLE_INNER_RADIUS {
        (Multiplier::Double, false)
    } else if (TRIPLE_INNER_RADIUS..=TRIPLE_OUTER_RADIUS).contains(&radius) {
        (Multiplier::Triple, false)
    } else {
        (Multiplier::Single, radius > TRIPLE_OUTER_RADIUS)
    };

    Score::new(segment, multiplier)
        .map(|score| score.with_outer(is_outer))
        .unwrap_or_else(|_| Score::miss())
}

/// Throws one dart at `target` with Gaussian scatter of `sigma` mm
pub fn throw_at<R: Rng + ?Sized>(target: &Score, sigma: f64, rng: &mut R) -> Score {
    let aim = aim_point(target);
    let (dx, dy) = standard_normal_pair(rng);
    resolve(Point {
        x: aim.x + dx * sigma,
        y: aim.y + dy * sigma,
    })
}

/// Box-Muller transform
fn standard_normal_pair<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    // 1 - [0, 1) keeps ln away from zero
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    let magnitude = (-2.0 * u1.ln()).sqrt();
    let angle = 2.0 * PI * u2;
    (magnitude * angle.cos(), magnitude * angle.sin())
}
