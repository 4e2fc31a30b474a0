//! Pure transforms over one day's task collection.
//!
//! Every operation takes the current snapshot by reference and returns the
//! next snapshot. An unknown id yields an unchanged copy; nothing here fails.

use crate::domain::ids::IdGenerator;
use crate::domain::models::{MIN_DURATION_MIN, MINUTES_PER_DAY, Task};
use crate::domain::time_angle::{normalize_minute, round_to_step};
use log::debug;

const TASK_ID_PREFIX: &str = "tsk";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Place { task_id: String, start_min: u16 },
    Move { task_id: String, start_min: u16 },
    Resize { task_id: String, start_min: u16, duration_min: u16 },
    Split { task_id: String, at_min: u16 },
    Unschedule { task_id: String },
    Delete { task_id: String },
}

impl Mutation {
    pub fn task_id(&self) -> &str {
        match self {
            Self::Place { task_id, .. }
            | Self::Move { task_id, .. }
            | Self::Resize { task_id, .. }
            | Self::Split { task_id, .. }
            | Self::Unschedule { task_id }
            | Self::Delete { task_id } => task_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Place { .. } => "place",
            Self::Move { .. } => "move",
            Self::Resize { .. } => "resize",
            Self::Split { .. } => "split",
            Self::Unschedule { .. } => "unschedule",
            Self::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// Overlapping placements are accepted as-is.
    #[default]
    Allow,
    /// Place, move and resize results that intersect another placed task are refused.
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulePolicy {
    pub overlap: OverlapPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
    Applied,
    UnknownTask,
    NotPlaced,
    RejectedOverlap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub tasks: Vec<Task>,
    pub status: MutationStatus,
}

impl MutationOutcome {
    fn unchanged(tasks: &[Task], status: MutationStatus) -> Self {
        Self {
            tasks: tasks.to_vec(),
            status,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.status == MutationStatus::Applied
    }
}

pub fn apply_mutation(
    tasks: &[Task],
    mutation: &Mutation,
    policy: &SchedulePolicy,
    ids: &dyn IdGenerator,
) -> MutationOutcome {
    let Some(task) = find_task(tasks, mutation.task_id()) else {
        debug!(
            "event=mutation_skipped op={} task_id={} reason=unknown_task",
            mutation.name(),
            mutation.task_id()
        );
        return MutationOutcome::unchanged(tasks, MutationStatus::UnknownTask);
    };

    let next = match mutation {
        Mutation::Place { task_id, start_min } => place_task(tasks, task_id, *start_min),
        Mutation::Move { task_id, start_min } => move_task(tasks, task_id, *start_min),
        Mutation::Resize {
            task_id,
            start_min,
            duration_min,
        } => resize_task(tasks, task_id, *start_min, *duration_min),
        Mutation::Split { task_id, at_min } => {
            if !task.is_placed() {
                return MutationOutcome::unchanged(tasks, MutationStatus::NotPlaced);
            }
            split_task(tasks, task_id, *at_min, ids)
        }
        Mutation::Unschedule { task_id } => unschedule_task(tasks, task_id),
        Mutation::Delete { task_id } => delete_task(tasks, task_id),
    };

    let checks_overlap = matches!(
        mutation,
        Mutation::Place { .. } | Mutation::Move { .. } | Mutation::Resize { .. }
    );
    if checks_overlap
        && policy.overlap == OverlapPolicy::Reject
        && !overlapping_ids(&next, mutation.task_id()).is_empty()
    {
        debug!(
            "event=mutation_skipped op={} task_id={} reason=overlap",
            mutation.name(),
            mutation.task_id()
        );
        return MutationOutcome::unchanged(tasks, MutationStatus::RejectedOverlap);
    }

    debug!(
        "event=mutation_applied op={} task_id={}",
        mutation.name(),
        mutation.task_id()
    );
    MutationOutcome {
        tasks: next,
        status: MutationStatus::Applied,
    }
}

/// Gives an unplaced (or placed) task a position on the dial.
pub fn place_task(tasks: &[Task], task_id: &str, start_min: u16) -> Vec<Task> {
    move_task(tasks, task_id, start_min)
}

pub fn move_task(tasks: &[Task], task_id: &str, start_min: u16) -> Vec<Task> {
    let start_min = normalize_minute(i32::from(start_min));
    update_task(tasks, task_id, |task| task.start_min = Some(start_min))
}

/// The caller is expected to pass `duration_min >= 5`; smaller values are floored.
pub fn resize_task(tasks: &[Task], task_id: &str, start_min: u16, duration_min: u16) -> Vec<Task> {
    let start_min = normalize_minute(i32::from(start_min));
    let duration_min = duration_min.clamp(MIN_DURATION_MIN, MINUTES_PER_DAY);
    update_task(tasks, task_id, |task| {
        task.start_min = Some(start_min);
        task.duration_min = duration_min;
    })
}

pub fn unschedule_task(tasks: &[Task], task_id: &str) -> Vec<Task> {
    update_task(tasks, task_id, |task| task.start_min = None)
}

pub fn delete_task(tasks: &[Task], task_id: &str) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.id != task_id)
        .cloned()
        .collect()
}

/// Replaces a placed task with two halves cut at `at_min`.
///
/// A split point earlier than the start is read as the next day, and a point
/// past the end is clamped to the end. Both halves are floored at five
/// minutes, so their total can differ from the original duration by a few
/// minutes; that slack is left as-is.
pub fn split_task(tasks: &[Task], task_id: &str, at_min: u16, ids: &dyn IdGenerator) -> Vec<Task> {
    let Some(index) = tasks.iter().position(|task| task.id == task_id) else {
        return tasks.to_vec();
    };
    let original = &tasks[index];
    let Some(start) = original.start_min.map(i32::from) else {
        return tasks.to_vec();
    };

    let day = i32::from(MINUTES_PER_DAY);
    let duration = i32::from(original.duration_min);
    let mut end = (start + duration) % day;
    if end <= start {
        end += day;
    }

    let mut at = i32::from(at_min);
    if at < start {
        at += day;
    }
    let at = at.min(end);

    let min_duration = i32::from(MIN_DURATION_MIN);
    let first_duration = round_to_step(at - start).max(min_duration);
    let second_duration = (duration - first_duration).max(min_duration);

    let first = Task {
        id: ids.next_id(TASK_ID_PREFIX),
        duration_min: first_duration as u16,
        start_min: Some(start as u16),
        ..original.clone()
    };
    let second = Task {
        id: ids.next_id(TASK_ID_PREFIX),
        duration_min: second_duration as u16,
        start_min: Some(normalize_minute(start + first_duration)),
        ..original.clone()
    };

    let mut next = Vec::with_capacity(tasks.len() + 1);
    next.extend_from_slice(&tasks[..index]);
    next.push(first);
    next.push(second);
    next.extend_from_slice(&tasks[index + 1..]);
    next
}

/// Half-open containment `[start, start + duration)` on the circular day.
pub fn covers_minute(task: &Task, minute: u16) -> bool {
    let Some(start) = task.start_min else {
        return false;
    };
    if task.duration_min >= MINUTES_PER_DAY {
        return true;
    }
    let offset = (i32::from(minute) - i32::from(start)).rem_euclid(i32::from(MINUTES_PER_DAY));
    offset < i32::from(task.duration_min)
}

pub fn intervals_overlap(left: &Task, right: &Task) -> bool {
    match (left.start_min, right.start_min) {
        (Some(left_start), Some(right_start)) => {
            covers_minute(left, right_start) || covers_minute(right, left_start)
        }
        _ => false,
    }
}

/// Ids of placed tasks whose interval intersects the given task's interval.
pub fn overlapping_ids(tasks: &[Task], task_id: &str) -> Vec<String> {
    let Some(target) = find_task(tasks, task_id) else {
        return Vec::new();
    };
    tasks
        .iter()
        .filter(|candidate| candidate.id != task_id)
        .filter(|candidate| intervals_overlap(target, candidate))
        .map(|candidate| candidate.id.clone())
        .collect()
}

pub fn find_task<'a>(tasks: &'a [Task], task_id: &str) -> Option<&'a Task> {
    tasks.iter().find(|task| task.id == task_id)
}

fn update_task<F>(tasks: &[Task], task_id: &str, mut update: F) -> Vec<Task>
where
    F: FnMut(&mut Task),
{
    tasks
        .iter()
        .map(|task| {
            let mut task = task.clone();
            if task.id == task_id {
                update(&mut task);
            }
            task
        })
        .collect()
}
