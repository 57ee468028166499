pub mod events;
pub mod form;
pub mod gate;
pub mod prediction;
pub mod types;
