pub mod admin;
pub mod auth;
pub mod student;
pub mod teacher;
pub mod webhooks;
