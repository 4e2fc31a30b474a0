pub mod gesture;
pub mod ids;
pub mod models;
pub mod monitor;
pub mod schedule;
pub mod time_angle;
