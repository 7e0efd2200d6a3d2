pub mod core;
pub mod marks;
pub mod rankings;
pub mod reports;
pub mod students;
