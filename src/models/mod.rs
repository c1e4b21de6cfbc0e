pub mod alert;
pub mod event;
pub mod health;
pub mod notification;
