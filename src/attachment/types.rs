/// Attachment type definitions
///
/// Only the metadata lives here; file bytes are stored by an external
/// storage service under `storage_path`.

use crate::config::LimitsConfig;
use crate::enums::string_enum;
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_STORAGE_BUCKET: &str = "attachments";

string_enum! {
    /// Coarse file category used for icons and previews
    pub enum FileType {
        Image => "image",
        Document => "document",
        Archive => "archive",
        Log => "log",
        Other => "other",
    }
}

impl FileType {
    /// Classify an upload from its MIME type, falling back to the file extension
    pub fn classify(mime_type: &str, original_name: &str) -> Self {
        let mime = mime_type.to_ascii_lowercase();
        let extension = original_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if mime.starts_with("image/") {
            return FileType::Image;
        }
        if extension == "log" || mime == "text/x-log" {
            return FileType::Log;
        }

        match mime.as_str() {
            "application/zip"
            | "application/gzip"
            | "application/x-gzip"
            | "application/x-tar"
            | "application/x-7z-compressed"
            | "application/vnd.rar"
            | "application/x-rar-compressed" => FileType::Archive,
            "application/pdf" | "application/msword" | "application/rtf" => FileType::Document,
            m if m.starts_with("text/") || m.starts_with("application/vnd.openxmlformats-officedocument.") => {
                FileType::Document
            }
            _ => match extension.as_str() {
                "png" | "jpg" | "jpeg" | "gif" | "webp" | "svg" => FileType::Image,
                "zip" | "gz" | "tgz" | "tar" | "7z" | "rar" => FileType::Archive,
                "pdf" | "doc" | "docx" | "txt" | "md" | "odt" | "xlsx" | "csv" => FileType::Document,
                _ => FileType::Other,
            },
        }
    }
}

/// What an attachment hangs off; exactly one of the two
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentTarget {
    Issue(Uuid),
    Comment(Uuid),
}

/// Stored attachment metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    /// Generated storage file name
    pub filename: String,
    /// Name the file was uploaded with
    pub original_name: String,
    pub mime_type: String,
    pub file_type: FileType,
    pub size_bytes: u64,
    pub storage_path: String,
    #[serde(default = "default_bucket")]
    pub storage_bucket: String,
    pub issue_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub project_id: Uuid,
    pub uploaded_by: Uuid,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn default_bucket() -> String {
    DEFAULT_STORAGE_BUCKET.to_string()
}

impl Attachment {
    /// Record an uploaded file against an issue or a comment
    pub fn create(
        input: AttachmentCreate,
        target: AttachmentTarget,
        project_id: Uuid,
        uploaded_by: Uuid,
        storage_path: String,
        limits: &LimitsConfig,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        input.validate(limits)?;
        let (issue_id, comment_id) = match target {
            AttachmentTarget::Issue(id) => (Some(id), None),
            AttachmentTarget::Comment(id) => (None, Some(id)),
        };

        Ok(Self {
            id: Uuid::new_v4(),
            file_type: FileType::classify(&input.mime_type, &input.original_name),
            filename: input.filename,
            original_name: input.original_name,
            mime_type: input.mime_type,
            size_bytes: input.size_bytes,
            storage_path,
            storage_bucket: default_bucket(),
            issue_id,
            comment_id,
            project_id,
            uploaded_by,
            description: input.description,
            created_at: now,
        })
    }

    /// The single owner of this attachment
    ///
    /// Fails for records that reference both or neither of issue and comment.
    pub fn target(&self) -> Result<AttachmentTarget, ValidationError> {
        match (self.issue_id, self.comment_id) {
            (Some(issue), None) => Ok(AttachmentTarget::Issue(issue)),
            (None, Some(comment)) => Ok(AttachmentTarget::Comment(comment)),
            _ => Err(ValidationError::new(
                "issue_id",
                "attachment must belong to exactly one issue or comment",
            )),
        }
    }
}

/// Upload metadata input
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentCreate {
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub description: Option<String>,
}

impl AttachmentCreate {
    pub fn validate(&self, limits: &LimitsConfig) -> Result<(), ValidationError> {
        validate_size(self.size_bytes, limits.max_attachment_bytes)
    }
}

/// Size must be positive and within `max_bytes`
pub fn validate_size(size_bytes: u64, max_bytes: u64) -> Result<(), ValidationError> {
    if size_bytes == 0 {
        return Err(ValidationError::new("size_bytes", "file is empty"));
    }
    if size_bytes > max_bytes {
        return Err(ValidationError::new(
            "size_bytes",
            format!("file size exceeds maximum of {} bytes", max_bytes),
        ));
    }
    Ok(())
}

/// Rendered preview of an image attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePreview {
    pub id: Uuid,
    pub attachment_id: Uuid,
    pub width: u32,
    pub height: u32,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(size_bytes: u64) -> AttachmentCreate {
        AttachmentCreate {
            filename: "a1b2c3.png".into(),
            original_name: "screenshot.png".into(),
            mime_type: "image/png".into(),
            size_bytes,
            description: None,
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(FileType::classify("image/jpeg", "x.jpg"), FileType::Image);
        assert_eq!(FileType::classify("text/plain", "server.log"), FileType::Log);
        assert_eq!(FileType::classify("text/plain", "notes.txt"), FileType::Document);
        assert_eq!(FileType::classify("application/pdf", "invoice.pdf"), FileType::Document);
        assert_eq!(FileType::classify("application/zip", "bundle.zip"), FileType::Archive);
        assert_eq!(FileType::classify("application/octet-stream", "dump.tgz"), FileType::Archive);
        assert_eq!(FileType::classify("application/octet-stream", "core"), FileType::Other);
    }

    #[test]
    fn test_size_limits() {
        let limits = LimitsConfig::default();
        assert!(upload(1).validate(&limits).is_ok());
        assert!(upload(limits.max_attachment_bytes).validate(&limits).is_ok());
        assert!(upload(limits.max_attachment_bytes + 1).validate(&limits).is_err());
        assert_eq!(upload(0).validate(&limits).unwrap_err().message, "file is empty");
    }

    #[test]
    fn test_create_for_comment() {
        let comment_id = Uuid::new_v4();
        let attachment = Attachment::create(
            upload(2048),
            AttachmentTarget::Comment(comment_id),
            Uuid::new_v4(),
            Uuid::new_v4(),
            "proj/2024/a1b2c3.png".into(),
            &LimitsConfig::default(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(attachment.file_type, FileType::Image);
        assert_eq!(attachment.storage_bucket, "attachments");
        assert_eq!(attachment.issue_id, None);
        assert_eq!(attachment.target().unwrap(), AttachmentTarget::Comment(comment_id));
    }

    #[test]
    fn test_target_requires_exactly_one_owner() {
        let mut attachment = Attachment::create(
            upload(10),
            AttachmentTarget::Issue(Uuid::new_v4()),
            Uuid::new_v4(),
            Uuid::new_v4(),
            "p/x.png".into(),
            &LimitsConfig::default(),
            Utc::now(),
        )
        .unwrap();
        attachment.comment_id = Some(Uuid::new_v4());
        assert!(attachment.target().is_err());

        attachment.issue_id = None;
        attachment.comment_id = None;
        assert!(attachment.target().is_err());
    }
}
