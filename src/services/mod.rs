pub mod booking_service;
pub mod outbound;

pub use booking_service::BookingService;
