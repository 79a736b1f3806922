pub mod controls;
pub mod stage;
