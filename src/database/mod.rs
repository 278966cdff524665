pub mod actions;
pub mod manager;
pub mod page;

pub use manager::DatabaseError;
pub use page::{Page, Paginated};
