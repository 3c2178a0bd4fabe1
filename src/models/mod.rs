pub mod bookmark;
pub mod event;
pub mod user;
