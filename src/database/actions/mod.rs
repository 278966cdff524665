//! Data-access actions: one struct per entity over the shared pool, each
//! exposing the uniform create/find/update/remove surface. Timestamps are
//! server-set; updates are partial and always refresh `updated_at`.

pub mod bookings;
pub mod courses;
pub mod orders;
pub mod packages;
pub mod students;
pub mod teachers;
pub mod users;

pub use bookings::{BookingActions, TrialBookingActions};
pub use courses::CourseActions;
pub use orders::{OrderActions, OrderedPackageActions};
pub use packages::PackageActions;
pub use students::StudentActions;
pub use teachers::TeacherActions;
pub use users::UserActions;
