pub mod actor;
pub mod catalog;
pub mod common;
pub mod gesture;
pub mod layout_engine;
pub mod model;
