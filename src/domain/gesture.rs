//! Gesture recognition on the dial: turns raw pointer events into intents.
//!
//! # State Machine
//!
//! ```text
//! Idle --down on dial--> Pressed
//! Pressed --move past threshold, on task--> Dragging
//! Pressed --move past threshold, on empty dial--> Ignored
//! Pressed --held past long-press threshold, on task--> LongPressed   (SplitRequest)
//! Pressed --quick release--> Idle                                  (tap intents)
//! Dragging --release--> Idle                                       (DragEnd)
//! any --leave / cancel / second pointer / off-dial move--> Idle    (DragCancel when dragging)
//! ```
//!
//! # Invariants
//!
//! 1. Only one pointer is tracked at a time; a second pointer cancels the gesture.
//! 2. Drag previews never commit. Only `DragEnd` carries a mutation, so a
//!    cancelled drag leaves the schedule untouched.
//! 3. Tap and drag never both emit for the same press.
//! 4. Minutes carried by `PlaceAt`, `SplitRequest` and drag results are on the 5-minute grid.
//!
//! [`transition`] is a pure function; [`GestureRecognizer`] only stores its result.

use crate::domain::models::{MIN_DURATION_MIN, MINUTES_PER_DAY, Task};
use crate::domain::schedule::{Mutation, covers_minute};
use crate::domain::time_angle::{
    DisplayMode, Point, angle_to_minute, angular_delta, normalize_minute, point_to_angle,
    round_to_step, snap_to_grid,
};
use std::time::{Duration, Instant};

/// Pointer travel (px) before a press becomes a drag.
pub const DRAG_THRESHOLD_PX: f64 = 8.0;
pub const LONG_PRESS_THRESHOLD: Duration = Duration::from_millis(500);
pub const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);
pub const DOUBLE_TAP_DISTANCE_PX: f64 = 24.0;
/// Angular distance from an arc boundary that still grabs the edge instead of the body.
pub const EDGE_TOLERANCE_DEG: f64 = 3.0;

const FULL_TURN_DEG: f64 = 360.0;

// ---------------------------------------------------------------------------
// Dial geometry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragHandle {
    Body,
    StartEdge,
    EndEdge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Empty,
    Task { task_id: String, handle: DragHandle },
}

/// Circular hit surface. Task arcs are drawn in the band between the radii;
/// the disc inside `inner_radius` is empty dial space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dial {
    pub center: Point,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl Dial {
    pub fn new(center: Point, inner_radius: f64, outer_radius: f64) -> Self {
        Self {
            center,
            inner_radius,
            outer_radius,
        }
    }

    pub fn contains(&self, pos: Point) -> bool {
        self.center.distance(pos) <= self.outer_radius
    }

    pub fn angle_at(&self, pos: Point) -> f64 {
        point_to_angle(self.center, pos)
    }

    /// Unsnapped minute under the pointer.
    pub fn minute_at(&self, pos: Point, mode: DisplayMode) -> u16 {
        angle_to_minute(self.angle_at(pos), mode)
    }

    /// `None` when the point is off the dial. The last task in the collection
    /// is drawn on top and therefore wins.
    pub fn hit_test(&self, pos: Point, tasks: &[Task], mode: DisplayMode) -> Option<HitTarget> {
        let radius = self.center.distance(pos);
        if radius > self.outer_radius {
            return None;
        }
        if radius < self.inner_radius {
            return Some(HitTarget::Empty);
        }

        let minute = self.minute_at(pos, mode);
        let edge_tolerance =
            EDGE_TOLERANCE_DEG * f64::from(mode.revolution_minutes()) / FULL_TURN_DEG;

        for task in tasks.iter().rev() {
            let Some(start) = task.start_min else {
                continue;
            };
            // Short arcs keep the middle half as body so they stay movable.
            let tolerance = edge_tolerance.min(f64::from(task.duration_min) / 4.0);
            let end = normalize_minute(i32::from(start) + i32::from(task.duration_min));
            let to_start = f64::from(minute_distance(minute, start));
            let to_end = f64::from(minute_distance(minute, end));

            let handle = if to_start <= tolerance || to_end <= tolerance {
                if to_end <= to_start {
                    DragHandle::EndEdge
                } else {
                    DragHandle::StartEdge
                }
            } else if covers_minute(task, minute) {
                DragHandle::Body
            } else {
                continue;
            };
            return Some(HitTarget::Task {
                task_id: task.id.clone(),
                handle,
            });
        }
        Some(HitTarget::Empty)
    }
}

fn minute_distance(left: u16, right: u16) -> u16 {
    let forward = (i32::from(left) - i32::from(right)).rem_euclid(i32::from(MINUTES_PER_DAY));
    forward.min(i32::from(MINUTES_PER_DAY) - forward) as u16
}

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    /// Pointer left the hit-testing surface.
    Leave,
    /// Platform cancelled the pointer (e.g. touch interrupted).
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: u32,
    pub kind: PointerKind,
    pub pos: Point,
    pub at: Instant,
}

impl PointerEvent {
    pub fn new(pointer_id: u32, kind: PointerKind, pos: Point, at: Instant) -> Self {
        Self {
            pointer_id,
            kind,
            pos,
            at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureInput {
    Pointer(PointerEvent),
    /// Timer tick used to detect long presses while the pointer is held.
    Tick(Instant),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    PlaceAt { minute: u16 },
    Select { task_id: String },
    Deselect,
    EditRequest { task_id: String },
    SplitRequest { task_id: String, minute: u16 },
    DragStart { task_id: String, handle: DragHandle },
    DragMove { task_id: String, minute: u16, preview: Mutation },
    DragEnd { mutation: Mutation },
    DragCancel { task_id: String },
}

/// Snapshot of everything the recognizer reads but does not own.
#[derive(Debug, Clone, Copy)]
pub struct GestureContext<'a> {
    pub dial: &'a Dial,
    pub tasks: &'a [Task],
    pub mode: DisplayMode,
    /// A task from the unplaced list is waiting for a position.
    pub placing: bool,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub pointer_id: u32,
    /// Task as it was when the drag started.
    pub task: Task,
    pub handle: DragHandle,
    last_angle: f64,
    /// Accumulated rotation, so a drag may travel past half a turn.
    travel_deg: f64,
    pub preview: Mutation,
}

impl DragSession {
    fn begin(
        pointer_id: u32,
        task: Task,
        handle: DragHandle,
        grab_angle: f64,
        mode: DisplayMode,
    ) -> Self {
        let preview = drag_mutation(&task, handle, 0.0, mode);
        Self {
            pointer_id,
            task,
            handle,
            last_angle: grab_angle,
            travel_deg: 0.0,
            preview,
        }
    }

    fn follow(&mut self, angle: f64, mode: DisplayMode) {
        self.travel_deg += angular_delta(self.last_angle, angle);
        self.last_angle = angle;
        self.preview = drag_mutation(&self.task, self.handle, self.travel_deg, mode);
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Pressed {
        pointer_id: u32,
        origin: Point,
        at: Instant,
        target: HitTarget,
    },
    Dragging(DragSession),
    /// Long press already fired; waiting for release.
    LongPressed { pointer_id: u32 },
    /// Press on empty dial that moved too far to be a tap.
    Ignored { pointer_id: u32 },
}

impl GestureState {
    fn pointer_id(&self) -> Option<u32> {
        match self {
            Self::Idle => None,
            Self::Pressed { pointer_id, .. }
            | Self::LongPressed { pointer_id }
            | Self::Ignored { pointer_id } => Some(*pointer_id),
            Self::Dragging(session) => Some(session.pointer_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TapRecord {
    pub task_id: String,
    pub pos: Point,
    pub at: Instant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: GestureState,
    pub last_tap: Option<TapRecord>,
    pub intents: Vec<Intent>,
}

impl Transition {
    fn to(state: GestureState, last_tap: Option<TapRecord>) -> Self {
        Self {
            state,
            last_tap,
            intents: Vec::new(),
        }
    }

    fn emit(mut self, intent: Intent) -> Self {
        self.intents.push(intent);
        self
    }
}

// ---------------------------------------------------------------------------
// Transition function
// ---------------------------------------------------------------------------

pub fn transition(
    state: &GestureState,
    last_tap: Option<&TapRecord>,
    input: &GestureInput,
    ctx: &GestureContext<'_>,
) -> Transition {
    let last_tap = last_tap.cloned();
    match input {
        GestureInput::Tick(now) => on_tick(state, last_tap, *now, ctx),
        GestureInput::Pointer(event) => {
            if let Some(active) = state.pointer_id()
                && active != event.pointer_id
            {
                // A second pointer interrupts whatever is in progress.
                return cancel(state, last_tap);
            }
            match event.kind {
                PointerKind::Down => on_down(state, last_tap, event, ctx),
                PointerKind::Move => on_move(state, last_tap, event, ctx),
                PointerKind::Up => on_up(state, last_tap, event, ctx),
                PointerKind::Leave | PointerKind::Cancel => cancel(state, last_tap),
            }
        }
    }
}

fn on_tick(
    state: &GestureState,
    last_tap: Option<TapRecord>,
    now: Instant,
    ctx: &GestureContext<'_>,
) -> Transition {
    if let GestureState::Pressed {
        pointer_id,
        origin,
        at,
        target: HitTarget::Task { task_id, .. },
    } = state
        && now.saturating_duration_since(*at) >= LONG_PRESS_THRESHOLD
    {
        let state = GestureState::LongPressed {
            pointer_id: *pointer_id,
        };
        return Transition::to(state, None).emit(split_request(task_id, *origin, ctx));
    }
    Transition::to(state.clone(), last_tap)
}

fn on_down(
    state: &GestureState,
    last_tap: Option<TapRecord>,
    event: &PointerEvent,
    ctx: &GestureContext<'_>,
) -> Transition {
    if *state != GestureState::Idle {
        return cancel(state, last_tap);
    }
    let Some(target) = ctx.dial.hit_test(event.pos, ctx.tasks, ctx.mode) else {
        return Transition::to(GestureState::Idle, last_tap);
    };
    Transition::to(
        GestureState::Pressed {
            pointer_id: event.pointer_id,
            origin: event.pos,
            at: event.at,
            target,
        },
        last_tap,
    )
}

fn on_move(
    state: &GestureState,
    last_tap: Option<TapRecord>,
    event: &PointerEvent,
    ctx: &GestureContext<'_>,
) -> Transition {
    if *state != GestureState::Idle && !ctx.dial.contains(event.pos) {
        return cancel(state, last_tap);
    }

    match state {
        GestureState::Pressed {
            pointer_id,
            origin,
            target,
            ..
        } => {
            if origin.distance(event.pos) < DRAG_THRESHOLD_PX {
                return Transition::to(state.clone(), last_tap);
            }
            let HitTarget::Task { task_id, handle } = target else {
                return Transition::to(
                    GestureState::Ignored {
                        pointer_id: *pointer_id,
                    },
                    last_tap,
                );
            };
            let Some(task) = ctx
                .tasks
                .iter()
                .find(|task| &task.id == task_id && task.is_placed())
            else {
                return Transition::to(GestureState::Idle, last_tap);
            };

            let mut session = DragSession::begin(
                *pointer_id,
                task.clone(),
                *handle,
                ctx.dial.angle_at(*origin),
                ctx.mode,
            );
            session.follow(ctx.dial.angle_at(event.pos), ctx.mode);
            let drag_move = drag_move(&session, event.pos, ctx);
            Transition::to(GestureState::Dragging(session), None)
                .emit(Intent::DragStart {
                    task_id: task_id.clone(),
                    handle: *handle,
                })
                .emit(drag_move)
        }
        GestureState::Dragging(session) => {
            let mut session = session.clone();
            session.follow(ctx.dial.angle_at(event.pos), ctx.mode);
            let drag_move = drag_move(&session, event.pos, ctx);
            Transition::to(GestureState::Dragging(session), last_tap).emit(drag_move)
        }
        _ => Transition::to(state.clone(), last_tap),
    }
}

fn on_up(
    state: &GestureState,
    last_tap: Option<TapRecord>,
    event: &PointerEvent,
    ctx: &GestureContext<'_>,
) -> Transition {
    match state {
        GestureState::Pressed {
            origin, at, target, ..
        } => {
            let held = event.at.saturating_duration_since(*at);
            if held >= LONG_PRESS_THRESHOLD {
                // The tick that would have fired the long press never arrived.
                let transition = Transition::to(GestureState::Idle, None);
                return match target {
                    HitTarget::Task { task_id, .. } => {
                        transition.emit(split_request(task_id, *origin, ctx))
                    }
                    HitTarget::Empty => transition,
                };
            }
            on_tap(target, last_tap, event, ctx)
        }
        GestureState::Dragging(session) => {
            if !ctx.dial.contains(event.pos) {
                return cancel(state, last_tap);
            }
            let mut session = session.clone();
            session.follow(ctx.dial.angle_at(event.pos), ctx.mode);
            Transition::to(GestureState::Idle, last_tap).emit(Intent::DragEnd {
                mutation: session.preview,
            })
        }
        _ => Transition::to(GestureState::Idle, last_tap),
    }
}

fn on_tap(
    target: &HitTarget,
    last_tap: Option<TapRecord>,
    event: &PointerEvent,
    ctx: &GestureContext<'_>,
) -> Transition {
    match target {
        HitTarget::Empty if ctx.placing => {
            let minute = snap_to_grid(i32::from(ctx.dial.minute_at(event.pos, ctx.mode)));
            Transition::to(GestureState::Idle, None).emit(Intent::PlaceAt { minute })
        }
        HitTarget::Empty => Transition::to(GestureState::Idle, None).emit(Intent::Deselect),
        HitTarget::Task { task_id, .. } => {
            let is_double = last_tap.as_ref().is_some_and(|last| {
                &last.task_id == task_id
                    && event.at.saturating_duration_since(last.at) <= DOUBLE_TAP_WINDOW
                    && last.pos.distance(event.pos) <= DOUBLE_TAP_DISTANCE_PX
            });
            if is_double {
                return Transition::to(GestureState::Idle, None).emit(Intent::EditRequest {
                    task_id: task_id.clone(),
                });
            }
            let record = TapRecord {
                task_id: task_id.clone(),
                pos: event.pos,
                at: event.at,
            };
            Transition::to(GestureState::Idle, Some(record)).emit(Intent::Select {
                task_id: task_id.clone(),
            })
        }
    }
}

fn cancel(state: &GestureState, last_tap: Option<TapRecord>) -> Transition {
    let transition = Transition::to(GestureState::Idle, last_tap);
    match state {
        GestureState::Dragging(session) => transition.emit(Intent::DragCancel {
            task_id: session.task.id.clone(),
        }),
        _ => transition,
    }
}

fn split_request(task_id: &str, origin: Point, ctx: &GestureContext<'_>) -> Intent {
    Intent::SplitRequest {
        task_id: task_id.to_string(),
        minute: snap_to_grid(i32::from(ctx.dial.minute_at(origin, ctx.mode))),
    }
}

fn drag_move(session: &DragSession, pos: Point, ctx: &GestureContext<'_>) -> Intent {
    Intent::DragMove {
        task_id: session.task.id.clone(),
        minute: snap_to_grid(i32::from(ctx.dial.minute_at(pos, ctx.mode))),
        preview: session.preview.clone(),
    }
}

/// Mutation produced by rotating `handle` of `task` by `travel_deg`.
fn drag_mutation(task: &Task, handle: DragHandle, travel_deg: f64, mode: DisplayMode) -> Mutation {
    let delta = (travel_deg * f64::from(mode.revolution_minutes()) / FULL_TURN_DEG).round() as i32;
    let start = i32::from(task.start_min.unwrap_or(0));
    let duration = i32::from(task.duration_min);
    let min_duration = i32::from(MIN_DURATION_MIN);
    let max_duration = i32::from(MINUTES_PER_DAY);
    let task_id = task.id.clone();

    match handle {
        DragHandle::Body => Mutation::Move {
            task_id,
            start_min: snap_to_grid(start + delta),
        },
        DragHandle::StartEdge => {
            let end = start + duration;
            let new_start =
                round_to_step(start + delta).clamp(end - max_duration, end - min_duration);
            Mutation::Resize {
                task_id,
                start_min: normalize_minute(new_start),
                duration_min: (end - new_start) as u16,
            }
        }
        DragHandle::EndEdge => {
            let new_end = round_to_step(start + duration + delta);
            Mutation::Resize {
                task_id,
                start_min: normalize_minute(start),
                duration_min: (new_end - start).clamp(min_duration, max_duration) as u16,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// GestureRecognizer
// ---------------------------------------------------------------------------

/// Stateful wrapper around [`transition`].
///
/// Feed pointer events through [`process`](GestureRecognizer::process) and
/// call [`tick`](GestureRecognizer::tick) periodically so held presses can
/// turn into long presses.
#[derive(Debug, Default)]
pub struct GestureRecognizer {
    state: GestureState,
    last_tap: Option<TapRecord>,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, event: &PointerEvent, ctx: &GestureContext<'_>) -> Vec<Intent> {
        self.apply(&GestureInput::Pointer(*event), ctx)
    }

    pub fn tick(&mut self, now: Instant, ctx: &GestureContext<'_>) -> Vec<Intent> {
        self.apply(&GestureInput::Tick(now), ctx)
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging(_))
    }

    /// Drops any in-progress gesture and tap history without emitting intents.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.last_tap = None;
    }

    fn apply(&mut self, input: &GestureInput, ctx: &GestureContext<'_>) -> Vec<Intent> {
        let next = transition(&self.state, self.last_tap.as_ref(), input, ctx);
        self.state = next.state;
        self.last_tap = next.last_tap;
        next.intents
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Category, PaletteColor};
    use crate::domain::time_angle::Half;

    const RING_RADIUS: f64 = 150.0;

    fn dial() -> Dial {
        Dial::new(Point::new(200.0, 200.0), 100.0, 180.0)
    }

    fn ring_point(minute: f64) -> Point {
        let angle = (minute / 4.0).to_radians();
        Point::new(
            200.0 + RING_RADIUS * angle.sin(),
            200.0 - RING_RADIUS * angle.cos(),
        )
    }

    fn task(id: &str, start: u16, duration: u16) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {id}"),
            icon: String::new(),
            duration_min: duration,
            category: Category::Admin,
            color: PaletteColor::Amber,
            start_min: Some(start),
        }
    }

    struct Harness {
        dial: Dial,
        tasks: Vec<Task>,
        mode: DisplayMode,
        placing: bool,
        recognizer: GestureRecognizer,
        base: Instant,
    }

    impl Harness {
        fn new(tasks: Vec<Task>) -> Self {
            Self {
                dial: dial(),
                tasks,
                mode: DisplayMode::TwentyFourHour,
                placing: false,
                recognizer: GestureRecognizer::new(),
                base: Instant::now(),
            }
        }

        fn at(&self, ms: u64) -> Instant {
            self.base + Duration::from_millis(ms)
        }

        fn send(&mut self, kind: PointerKind, pos: Point, ms: u64) -> Vec<Intent> {
            self.send_from(1, kind, pos, ms)
        }

        fn send_from(&mut self, pointer_id: u32, kind: PointerKind, pos: Point, ms: u64) -> Vec<Intent> {
            let event = PointerEvent::new(pointer_id, kind, pos, self.at(ms));
            let ctx = GestureContext {
                dial: &self.dial,
                tasks: &self.tasks,
                mode: self.mode,
                placing: self.placing,
            };
            self.recognizer.process(&event, &ctx)
        }

        fn tick(&mut self, ms: u64) -> Vec<Intent> {
            let now = self.at(ms);
            let ctx = GestureContext {
                dial: &self.dial,
                tasks: &self.tasks,
                mode: self.mode,
                placing: self.placing,
            };
            self.recognizer.tick(now, &ctx)
        }

        fn tap(&mut self, pos: Point, ms: u64) -> Vec<Intent> {
            let mut intents = self.send(PointerKind::Down, pos, ms);
            intents.extend(self.send(PointerKind::Up, pos, ms + 50));
            intents
        }
    }

    #[test]
    fn hit_test_distinguishes_edges_body_and_empty() {
        let dial = dial();
        let tasks = vec![task("a", 540, 60)];
        let mode = DisplayMode::TwentyFourHour;

        let hit = |minute: f64| dial.hit_test(ring_point(minute), &tasks, mode);
        assert_eq!(
            hit(540.0),
            Some(HitTarget::Task {
                task_id: "a".to_string(),
                handle: DragHandle::StartEdge
            })
        );
        assert_eq!(
            hit(600.0),
            Some(HitTarget::Task {
                task_id: "a".to_string(),
                handle: DragHandle::EndEdge
            })
        );
        assert_eq!(
            hit(570.0),
            Some(HitTarget::Task {
                task_id: "a".to_string(),
                handle: DragHandle::Body
            })
        );
        assert_eq!(hit(800.0), Some(HitTarget::Empty));
        assert_eq!(
            dial.hit_test(Point::new(200.0, 200.0), &tasks, mode),
            Some(HitTarget::Empty)
        );
        assert_eq!(dial.hit_test(Point::new(0.0, 0.0), &tasks, mode), None);
    }

    #[test]
    fn short_task_keeps_a_body_between_its_edges() {
        let dial = dial();
        let tasks = vec![task("short", 540, 20)];
        let mode = DisplayMode::TwentyFourHour;

        assert_eq!(
            dial.hit_test(ring_point(550.0), &tasks, mode),
            Some(HitTarget::Task {
                task_id: "short".to_string(),
                handle: DragHandle::Body
            })
        );
        assert_eq!(
            dial.hit_test(ring_point(542.0), &tasks, mode),
            Some(HitTarget::Task {
                task_id: "short".to_string(),
                handle: DragHandle::StartEdge
            })
        );
        assert_eq!(
            dial.hit_test(ring_point(558.0), &tasks, mode),
            Some(HitTarget::Task {
                task_id: "short".to_string(),
                handle: DragHandle::EndEdge
            })
        );
    }

    #[test]
    fn hit_test_prefers_topmost_task() {
        let dial = dial();
        let tasks = vec![task("under", 540, 120), task("over", 560, 60)];
        assert_eq!(
            dial.hit_test(ring_point(590.0), &tasks, DisplayMode::TwentyFourHour),
            Some(HitTarget::Task {
                task_id: "over".to_string(),
                handle: DragHandle::Body
            })
        );
    }

    #[test]
    fn hit_test_in_twelve_hour_mode_uses_active_half() {
        let dial = dial();
        let tasks = vec![task("pm", 900, 60)];
        // 15:30 sits where 03:30 sits on a 12-hour dial.
        let pos = {
            let angle = (210.0_f64 / 2.0).to_radians();
            Point::new(200.0 + RING_RADIUS * angle.sin(), 200.0 - RING_RADIUS * angle.cos())
        };
        assert_eq!(
            dial.hit_test(pos, &tasks, DisplayMode::TwelveHour(Half::Pm)),
            Some(HitTarget::Task {
                task_id: "pm".to_string(),
                handle: DragHandle::Body
            })
        );
        assert_eq!(
            dial.hit_test(pos, &tasks, DisplayMode::TwelveHour(Half::Am)),
            Some(HitTarget::Empty)
        );
    }

    #[test]
    fn tap_on_empty_dial_deselects() {
        let mut harness = Harness::new(vec![task("a", 540, 60)]);
        let intents = harness.tap(ring_point(800.0), 0);
        assert_eq!(intents, vec![Intent::Deselect]);
        assert_eq!(*harness.recognizer.state(), GestureState::Idle);
    }

    #[test]
    fn tap_while_placing_emits_snapped_place() {
        let mut harness = Harness::new(Vec::new());
        harness.placing = true;
        let intents = harness.tap(ring_point(542.0), 0);
        assert_eq!(intents, vec![Intent::PlaceAt { minute: 540 }]);
    }

    #[test]
    fn tap_on_task_while_placing_still_selects() {
        let mut harness = Harness::new(vec![task("a", 540, 60)]);
        harness.placing = true;
        let intents = harness.tap(ring_point(570.0), 0);
        assert_eq!(
            intents,
            vec![Intent::Select {
                task_id: "a".to_string()
            }]
        );
    }

    #[test]
    fn double_tap_on_task_requests_edit() {
        let mut harness = Harness::new(vec![task("a", 540, 60)]);
        let first = harness.tap(ring_point(570.0), 0);
        assert_eq!(
            first,
            vec![Intent::Select {
                task_id: "a".to_string()
            }]
        );
        let second = harness.tap(ring_point(571.0), 150);
        assert_eq!(
            second,
            vec![Intent::EditRequest {
                task_id: "a".to_string()
            }]
        );
    }

    #[test]
    fn slow_second_tap_selects_again() {
        let mut harness = Harness::new(vec![task("a", 540, 60)]);
        let _ = harness.tap(ring_point(570.0), 0);
        let second = harness.tap(ring_point(570.0), 1_000);
        assert_eq!(
            second,
            vec![Intent::Select {
                task_id: "a".to_string()
            }]
        );
    }

    #[test]
    fn long_press_on_task_requests_split_once() {
        let mut harness = Harness::new(vec![task("a", 540, 60)]);
        assert!(harness.send(PointerKind::Down, ring_point(572.0), 0).is_empty());
        assert!(harness.tick(200).is_empty());

        let fired = harness.tick(600);
        assert_eq!(
            fired,
            vec![Intent::SplitRequest {
                task_id: "a".to_string(),
                minute: 570
            }]
        );
        assert!(harness.tick(900).is_empty());
        assert!(harness.send(PointerKind::Up, ring_point(572.0), 1_000).is_empty());
        assert_eq!(*harness.recognizer.state(), GestureState::Idle);
    }

    #[test]
    fn late_release_without_tick_still_splits() {
        let mut harness = Harness::new(vec![task("a", 540, 60)]);
        let _ = harness.send(PointerKind::Down, ring_point(580.0), 0);
        let intents = harness.send(PointerKind::Up, ring_point(580.0), 700);
        assert_eq!(
            intents,
            vec![Intent::SplitRequest {
                task_id: "a".to_string(),
                minute: 580
            }]
        );
    }

    #[test]
    fn long_press_on_empty_dial_emits_nothing() {
        let mut harness = Harness::new(Vec::new());
        let _ = harness.send(PointerKind::Down, ring_point(100.0), 0);
        assert!(harness.tick(800).is_empty());
        assert!(harness.send(PointerKind::Up, ring_point(100.0), 900).is_empty());
    }

    #[test]
    fn dragging_body_moves_task_on_release() {
        let mut harness = Harness::new(vec![task("a", 540, 60)]);
        let _ = harness.send(PointerKind::Down, ring_point(560.0), 0);
        let moved = harness.send(PointerKind::Move, ring_point(620.0), 100);

        let expected = Mutation::Move {
            task_id: "a".to_string(),
            start_min: 600,
        };
        assert_eq!(
            moved,
            vec![
                Intent::DragStart {
                    task_id: "a".to_string(),
                    handle: DragHandle::Body
                },
                Intent::DragMove {
                    task_id: "a".to_string(),
                    minute: 620,
                    preview: expected.clone()
                },
            ]
        );
        assert!(harness.recognizer.is_dragging());

        let ended = harness.send(PointerKind::Up, ring_point(620.0), 200);
        assert_eq!(ended, vec![Intent::DragEnd { mutation: expected }]);
    }

    #[test]
    fn dragging_middle_of_short_task_moves_it() {
        let mut harness = Harness::new(vec![task("short", 540, 20)]);
        let _ = harness.send(PointerKind::Down, ring_point(550.0), 0);
        let _ = harness.send(PointerKind::Move, ring_point(600.0), 100);
        let ended = harness.send(PointerKind::Up, ring_point(600.0), 200);
        assert_eq!(
            ended,
            vec![Intent::DragEnd {
                mutation: Mutation::Move {
                    task_id: "short".to_string(),
                    start_min: 590
                }
            }]
        );
    }

    #[test]
    fn dragging_end_edge_resizes() {
        let mut harness = Harness::new(vec![task("a", 540, 60)]);
        let _ = harness.send(PointerKind::Down, ring_point(600.0), 0);
        let _ = harness.send(PointerKind::Move, ring_point(662.0), 100);
        let ended = harness.send(PointerKind::Up, ring_point(662.0), 200);
        assert_eq!(
            ended,
            vec![Intent::DragEnd {
                mutation: Mutation::Resize {
                    task_id: "a".to_string(),
                    start_min: 540,
                    duration_min: 120
                }
            }]
        );
    }

    #[test]
    fn dragging_start_edge_keeps_end_fixed() {
        let mut harness = Harness::new(vec![task("a", 540, 60)]);
        let _ = harness.send(PointerKind::Down, ring_point(540.0), 0);
        let _ = harness.send(PointerKind::Move, ring_point(500.0), 100);
        let ended = harness.send(PointerKind::Up, ring_point(500.0), 200);
        assert_eq!(
            ended,
            vec![Intent::DragEnd {
                mutation: Mutation::Resize {
                    task_id: "a".to_string(),
                    start_min: 500,
                    duration_min: 100
                }
            }]
        );
    }

    #[test]
    fn shrinking_past_the_other_edge_floors_duration() {
        let mut harness = Harness::new(vec![task("a", 540, 60)]);
        let _ = harness.send(PointerKind::Down, ring_point(600.0), 0);
        let _ = harness.send(PointerKind::Move, ring_point(520.0), 100);
        let ended = harness.send(PointerKind::Up, ring_point(520.0), 200);
        assert_eq!(
            ended,
            vec![Intent::DragEnd {
                mutation: Mutation::Resize {
                    task_id: "a".to_string(),
                    start_min: 540,
                    duration_min: 5
                }
            }]
        );
    }

    #[test]
    fn drag_across_midnight_wraps_start() {
        let mut harness = Harness::new(vec![task("late", 1420, 30)]);
        let _ = harness.send(PointerKind::Down, ring_point(1435.0), 0);
        let _ = harness.send(PointerKind::Move, ring_point(1439.0), 50);
        let _ = harness.send(PointerKind::Move, ring_point(1460.0), 100);
        let ended = harness.send(PointerKind::Up, ring_point(1460.0), 150);
        assert_eq!(
            ended,
            vec![Intent::DragEnd {
                mutation: Mutation::Move {
                    task_id: "late".to_string(),
                    start_min: 5
                }
            }]
        );
    }

    #[test]
    fn leaving_the_dial_cancels_drag_without_commit() {
        let mut harness = Harness::new(vec![task("a", 540, 60)]);
        let _ = harness.send(PointerKind::Down, ring_point(560.0), 0);
        let _ = harness.send(PointerKind::Move, ring_point(620.0), 100);
        let cancelled = harness.send(PointerKind::Move, Point::new(500.0, 500.0), 150);
        assert_eq!(
            cancelled,
            vec![Intent::DragCancel {
                task_id: "a".to_string()
            }]
        );
        assert!(harness.send(PointerKind::Up, Point::new(500.0, 500.0), 200).is_empty());
    }

    #[test]
    fn second_pointer_cancels_drag() {
        let mut harness = Harness::new(vec![task("a", 540, 60)]);
        let _ = harness.send(PointerKind::Down, ring_point(560.0), 0);
        let _ = harness.send(PointerKind::Move, ring_point(620.0), 100);
        let cancelled = harness.send_from(2, PointerKind::Down, ring_point(100.0), 150);
        assert_eq!(
            cancelled,
            vec![Intent::DragCancel {
                task_id: "a".to_string()
            }]
        );
        assert!(!harness.recognizer.is_dragging());
        assert!(harness.send(PointerKind::Up, ring_point(620.0), 200).is_empty());
    }

    #[test]
    fn leave_during_press_emits_nothing() {
        let mut harness = Harness::new(vec![task("a", 540, 60)]);
        let _ = harness.send(PointerKind::Down, ring_point(560.0), 0);
        assert!(harness.send(PointerKind::Leave, ring_point(560.0), 50).is_empty());
        assert!(harness.send(PointerKind::Up, ring_point(560.0), 80).is_empty());
    }

    #[test]
    fn drag_over_empty_dial_is_ignored() {
        let mut harness = Harness::new(Vec::new());
        harness.placing = true;
        let _ = harness.send(PointerKind::Down, ring_point(100.0), 0);
        assert!(harness.send(PointerKind::Move, ring_point(200.0), 50).is_empty());
        assert!(harness.send(PointerKind::Up, ring_point(200.0), 100).is_empty());
    }

    #[test]
    fn press_off_dial_is_ignored() {
        let mut harness = Harness::new(Vec::new());
        assert!(harness.tap(Point::new(395.0, 395.0), 0).is_empty());
    }

    #[test]
    fn transition_is_pure() {
        let dial = dial();
        let tasks = vec![task("a", 540, 60)];
        let ctx = GestureContext {
            dial: &dial,
            tasks: &tasks,
            mode: DisplayMode::TwentyFourHour,
            placing: false,
        };
        let now = Instant::now();
        let down = GestureInput::Pointer(PointerEvent::new(
            7,
            PointerKind::Down,
            ring_point(570.0),
            now,
        ));

        let first = transition(&GestureState::Idle, None, &down, &ctx);
        let second = transition(&GestureState::Idle, None, &down, &ctx);
        assert_eq!(first, second);
        assert!(matches!(first.state, GestureState::Pressed { pointer_id: 7, .. }));

        let idle_tick = transition(&GestureState::Idle, None, &GestureInput::Tick(now), &ctx);
        assert_eq!(idle_tick.state, GestureState::Idle);
        assert!(idle_tick.intents.is_empty());
    }
}
