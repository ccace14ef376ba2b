pub mod aggregate;
pub mod events;
