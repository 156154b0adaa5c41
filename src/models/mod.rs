pub mod category;
pub mod language;
pub mod lecture;

pub use category::CategoryTree;
pub use language::LanguageCode;
pub use lecture::{CategoryPath, LectureGroup, VideoAsset, VideoMetadata};
