pub mod admin;
pub mod health;
pub mod pages;
pub mod translate;
pub mod upload;
pub mod watch;
