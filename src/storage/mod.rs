pub mod events;
pub mod migrations;
pub mod schema;
