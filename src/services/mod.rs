pub mod database;
pub mod lecture;
pub mod media;
pub mod qr;
pub mod repository;
pub mod resolver;
pub mod storage;
pub mod translation;
