pub mod drawer;
pub mod gesture;
pub mod home;
pub mod system;
