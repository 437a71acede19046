/// Comments and project activity

pub mod types;

pub use types::{Activity, Comment, CommentCreate, CommentUpdate};
