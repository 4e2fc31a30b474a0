//! Active-task detection and focus countdown.
//!
//! Stateless: every call recomputes from the clock reading and the task, so
//! repeated ticks cannot drift.

use crate::domain::models::{MINUTES_PER_DAY, Task};
use chrono::Timelike;
use serde::Serialize;

const SECONDS_PER_MINUTE: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub minute: u16,
    pub second: u8,
}

impl ClockReading {
    pub fn new(minute: u16, second: u8) -> Self {
        Self {
            minute: minute % MINUTES_PER_DAY,
            second: second.min(59),
        }
    }

    pub fn from_time<T: Timelike>(time: &T) -> Self {
        Self::new(
            (time.hour() * 60 + time.minute()) as u16,
            time.second() as u8,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusStatus {
    pub task_id: String,
    pub active: bool,
    /// Seconds until the task ends. Negative values are possible and mean
    /// the end has already passed within the current minute.
    pub remaining_seconds: i64,
}

impl FocusStatus {
    pub fn display_seconds(&self) -> u32 {
        self.remaining_seconds.max(0) as u32
    }

    pub fn countdown_label(&self) -> String {
        let total = self.display_seconds();
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        if hours > 0 {
            format!("{hours}:{minutes:02}:{seconds:02}")
        } else {
            format!("{minutes:02}:{seconds:02}")
        }
    }
}

/// Circular containment with both boundaries inclusive.
pub fn within(now: u16, start: u16, duration: u16) -> bool {
    let day = u32::from(MINUTES_PER_DAY);
    let start = u32::from(start);
    let mut now = u32::from(now);
    let mut end = start + u32::from(duration);
    if end <= start {
        end += day;
    }
    if now < start {
        now += day;
    }
    start <= now && now <= end
}

pub fn is_active(selected: Option<&Task>, clock: ClockReading) -> bool {
    let Some(task) = selected else {
        return false;
    };
    let Some(start) = task.start_min else {
        return false;
    };
    within(clock.minute, start, task.duration_min)
}

pub fn remaining_seconds(task: &Task, clock: ClockReading) -> Option<i64> {
    let start = i64::from(task.start_min?);
    let day = i64::from(MINUTES_PER_DAY);
    let minutes_left = (start + i64::from(task.duration_min) - i64::from(clock.minute) + day) % day;
    Some(minutes_left * SECONDS_PER_MINUTE - i64::from(clock.second))
}

/// Focus state of the selected task, or `None` when nothing placed is selected.
pub fn focus_status(selected: Option<&Task>, clock: ClockReading) -> Option<FocusStatus> {
    let task = selected?;
    let remaining = remaining_seconds(task, clock)?;
    Some(FocusStatus {
        task_id: task.id.clone(),
        active: is_active(Some(task), clock),
        remaining_seconds: remaining,
    })
}
