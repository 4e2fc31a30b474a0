pub mod bootstrap;
pub mod focus_clock;
pub mod planner;
