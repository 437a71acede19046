/// File attachments on issues and comments

pub mod types;

pub use types::{validate_size, Attachment, AttachmentCreate, AttachmentTarget, FileType, ImagePreview};
