pub mod bookings;
pub mod courses;
pub mod notify;
pub mod orders;
pub mod packages;
pub mod reports;
pub mod students;
pub mod teachers;
pub mod users;
