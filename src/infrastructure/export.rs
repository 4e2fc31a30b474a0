//! Calendar exports of a day's placed tasks.
//!
//! Times are floating local wall-clock values: `start_min` and
//! `duration_min` are minutes from the viewed date's midnight and no timezone
//! conversion is applied. Unplaced tasks are skipped.

use crate::domain::models::Task;
use crate::infrastructure::error::InfraError;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use url::Url;

const GOOGLE_CALENDAR_RENDER_URL: &str = "https://calendar.google.com/calendar/render";
const ICS_PRODID: &str = "-//Radial Planner//Day Export//EN";
const ICS_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const ICS_LINE_LIMIT: usize = 75;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Wall-clock window of a placed task; midnight-crossing tasks end on the next day.
pub fn task_window(date: NaiveDate, task: &Task) -> Option<TaskWindow> {
    let start_min = task.start_min?;
    let end_min = task.linear_end()?;
    let midnight = date.and_time(NaiveTime::MIN);
    Some(TaskWindow {
        start: midnight + Duration::minutes(i64::from(start_min)),
        end: midnight + Duration::minutes(i64::from(end_min)),
    })
}

pub fn to_ics(date: NaiveDate, tasks: &[Task], generated_at: DateTime<Utc>) -> String {
    let stamp = generated_at.format("%Y%m%dT%H%M%SZ").to_string();
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{ICS_PRODID}"),
        "CALSCALE:GREGORIAN".to_string(),
    ];

    for task in tasks {
        let Some(window) = task_window(date, task) else {
            continue;
        };
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}-{}@radial-planner", task.id, date.format("%Y%m%d")));
        lines.push(format!("DTSTAMP:{stamp}"));
        lines.push(format!("DTSTART:{}", window.start.format(ICS_DATETIME_FORMAT)));
        lines.push(format!("DTEND:{}", window.end.format(ICS_DATETIME_FORMAT)));
        lines.push(format!("SUMMARY:{}", escape_ics_text(&task.title)));
        lines.push(format!(
            "CATEGORIES:{}",
            task.category.as_str().to_ascii_uppercase()
        ));
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());
    let folded = lines.iter().map(|line| fold_ics_line(line)).collect::<Vec<_>>();
    let mut calendar = folded.join("\r\n");
    calendar.push_str("\r\n");
    calendar
}

pub fn google_calendar_url(date: NaiveDate, task: &Task) -> Result<Url, InfraError> {
    let window = task_window(date, task).ok_or_else(|| {
        InfraError::InvalidInput(format!("task is not placed: {}", task.id))
    })?;
    let dates = format!(
        "{}/{}",
        window.start.format(ICS_DATETIME_FORMAT),
        window.end.format(ICS_DATETIME_FORMAT)
    );
    let details = format!("Category: {}", task.category.as_str());
    let url = Url::parse_with_params(
        GOOGLE_CALENDAR_RENDER_URL,
        &[
            ("action", "TEMPLATE"),
            ("text", task.title.as_str()),
            ("dates", dates.as_str()),
            ("details", details.as_str()),
        ],
    )?;
    Ok(url)
}

#[derive(Debug, Serialize)]
struct DayExport<'a> {
    date: String,
    tasks: Vec<&'a Task>,
}

pub fn to_json(date: NaiveDate, tasks: &[Task]) -> Result<String, InfraError> {
    let export = DayExport {
        date: date.format("%Y-%m-%d").to_string(),
        tasks: tasks.iter().filter(|task| task.is_placed()).collect(),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Splits a content line into 75-octet pieces; continuation lines start with a space.
fn fold_ics_line(line: &str) -> String {
    let mut folded = String::with_capacity(line.len() + line.len() / ICS_LINE_LIMIT * 3);
    let mut width = 0;
    for character in line.chars() {
        let size = character.len_utf8();
        if width + size > ICS_LINE_LIMIT {
            folded.push_str("\r\n ");
            width = 1;
        }
        folded.push(character);
        width += size;
    }
    folded
}

fn escape_ics_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}
