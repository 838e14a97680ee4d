pub mod availability;
pub mod month;
pub mod settings;
