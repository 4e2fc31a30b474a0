//! Conversion between minute-of-day values and dial angles.
//!
//! Angles are degrees in `[0, 360)`, measured clockwise from the top of the
//! dial. In 24-hour mode one revolution covers the whole day; in 12-hour mode
//! one revolution covers 720 minutes and the active [`Half`] supplies the
//! AM/PM offset.

use crate::domain::models::{MINUTES_PER_DAY, SNAP_MINUTES};
use serde::{Deserialize, Serialize};

const FULL_TURN_DEG: f64 = 360.0;
const HALF_DAY_MIN: u16 = MINUTES_PER_DAY / 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Half {
    Am,
    Pm,
}

impl Half {
    pub fn of_minute(minute: u16) -> Self {
        if minute % MINUTES_PER_DAY < HALF_DAY_MIN {
            Self::Am
        } else {
            Self::Pm
        }
    }

    pub fn offset(self) -> u16 {
        match self {
            Self::Am => 0,
            Self::Pm => HALF_DAY_MIN,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    TwentyFourHour,
    TwelveHour(Half),
}

impl DisplayMode {
    /// Minutes covered by one full revolution of the dial.
    pub fn revolution_minutes(self) -> u16 {
        match self {
            Self::TwentyFourHour => MINUTES_PER_DAY,
            Self::TwelveHour(_) => HALF_DAY_MIN,
        }
    }

    /// Switches between 24h and 12h. Entering 12h mode picks the half that
    /// contains `now_minute`.
    pub fn toggle(self, now_minute: u16) -> Self {
        match self {
            Self::TwentyFourHour => Self::TwelveHour(Half::of_minute(now_minute)),
            Self::TwelveHour(_) => Self::TwentyFourHour,
        }
    }

    /// Replaces the half selector; no effect in 24-hour mode.
    pub fn with_half(self, half: Half) -> Self {
        match self {
            Self::TwentyFourHour => Self::TwentyFourHour,
            Self::TwelveHour(_) => Self::TwelveHour(half),
        }
    }

    pub fn half(self) -> Option<Half> {
        match self {
            Self::TwentyFourHour => None,
            Self::TwelveHour(half) => Some(half),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TwentyFourHour => "24h",
            Self::TwelveHour(_) => "12h",
        }
    }
}

pub fn minute_to_angle(minute: u16, mode: DisplayMode) -> f64 {
    let revolution = mode.revolution_minutes();
    let within = (minute % MINUTES_PER_DAY) % revolution;
    f64::from(within) * FULL_TURN_DEG / f64::from(revolution)
}

pub fn angle_to_minute(angle: f64, mode: DisplayMode) -> u16 {
    let revolution = mode.revolution_minutes();
    let angle = normalize_angle(angle);
    let raw = (angle * f64::from(revolution) / FULL_TURN_DEG).round() as i32;
    let within = raw.rem_euclid(i32::from(revolution));
    let offset = mode.half().map(Half::offset).unwrap_or(0);
    normalize_minute(within + i32::from(offset))
}

/// Folds any angle into `[0, 360)`. Non-finite input maps to 0.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(FULL_TURN_DEG);
    if wrapped >= FULL_TURN_DEG { 0.0 } else { wrapped }
}

/// Signed shortest rotation from `from` to `to`, in `(-180, 180]`.
pub fn angular_delta(from: f64, to: f64) -> f64 {
    let delta = normalize_angle(to) - normalize_angle(from);
    if delta > FULL_TURN_DEG / 2.0 {
        delta - FULL_TURN_DEG
    } else if delta <= -FULL_TURN_DEG / 2.0 {
        delta + FULL_TURN_DEG
    } else {
        delta
    }
}

pub fn normalize_minute(minute: i32) -> u16 {
    minute.rem_euclid(i32::from(MINUTES_PER_DAY)) as u16
}

/// Rounds to the nearest grid step, wrapping at midnight.
pub fn snap_to_grid(minute: i32) -> u16 {
    normalize_minute(round_to_step(minute))
}

pub(crate) fn round_to_step(value: i32) -> i32 {
    let step = i32::from(SNAP_MINUTES);
    (value + step / 2).div_euclid(step) * step
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Angle of `point` around `center` in screen coordinates (y grows downward).
pub fn point_to_angle(center: Point, point: Point) -> f64 {
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    normalize_angle(dx.atan2(-dy).to_degrees())
}
