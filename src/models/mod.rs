pub mod booking;
pub mod package;
pub mod student;
pub mod teacher;
pub mod user;

pub use booking::{Booking, BookingStatus, TrialBooking};
pub use package::{Course, Order, OrderStatus, OrderedPackage, Package};
pub use student::Student;
pub use teacher::Teacher;
pub use user::User;
