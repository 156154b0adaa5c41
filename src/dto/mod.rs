pub mod lecture;
