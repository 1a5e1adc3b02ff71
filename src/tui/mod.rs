pub mod app;
pub mod chart;
pub mod events;
pub mod ui;
