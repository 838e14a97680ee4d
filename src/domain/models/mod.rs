pub mod booking;
pub mod schedule;
