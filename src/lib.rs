//! Radial 24-hour day planner engine.
//!
//! `domain` holds the pure dial arithmetic, gesture recognition and schedule
//! transforms. `application` wires them to persistence through [`Planner`] and
//! drives the focus countdown. `infrastructure` owns config, SQLite storage
//! and calendar exports.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::bootstrap::{BootstrapResult, bootstrap_workspace};
pub use application::focus_clock::{FocusTicker, NowProvider, SelectionSource, local_clock};
pub use application::planner::{DayView, Planner};
pub use domain::gesture::{
    Dial, DragHandle, GestureContext, GestureRecognizer, HitTarget, Intent, PointerEvent,
    PointerKind,
};
pub use domain::ids::{IdGenerator, SequentialIdGenerator, TimestampIdGenerator};
pub use domain::models::{Category, DaySchedule, NewTask, PaletteColor, Task, TaskPatch};
pub use domain::monitor::{ClockReading, FocusStatus};
pub use domain::schedule::{Mutation, MutationOutcome, MutationStatus, OverlapPolicy, SchedulePolicy};
pub use domain::time_angle::{DisplayMode, Half, Point, angle_to_minute, minute_to_angle};
pub use infrastructure::config::{AppConfig, PlannerSettings};
pub use infrastructure::day_store::{DayStore, InMemoryDayStore, SqliteDayStore};
pub use infrastructure::error::InfraError;
