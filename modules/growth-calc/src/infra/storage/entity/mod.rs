pub mod calculation;
pub mod calculation_event;
