pub mod classes;
pub mod header;
pub mod statusbar;
pub mod streak;
pub mod timer;
