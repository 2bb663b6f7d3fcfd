pub mod session;
pub mod setup;
pub mod sources;
pub mod terminal;
pub mod ui;
