pub mod catalog;
pub mod comment;
pub mod syllabus;
pub mod user;

pub use catalog::{Course, Department};
pub use comment::{Comment, CommentEntry, CommentThread, NewCommentRequest};
pub use syllabus::{Card, CardFilter, Syllabus, SyllabusStatus};
pub use user::User;
