//! Compose-flow draft model.
//!
//! Drafts live only in memory; publishing yields a `PublishedPost` that the
//! caller may hand to a backend. Nothing here is persisted by core.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attachment source selected in the compose UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    /// Photos or videos.
    Media,
    /// PDF / office / text documents.
    Document,
    /// Pasted URL.
    Link,
}

/// One attachment reference. No bytes are uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub url: String,
}

/// In-progress post text plus ordered attachments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl PostDraft {
    /// A draft is empty when its text is blank and it has no attachments.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.attachments.is_empty()
    }
}

/// Visibility and notification toggles chosen before saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSettings {
    pub is_public: bool,
    pub allow_comments: bool,
    pub notify_followers: bool,
}

impl Default for PostSettings {
    fn default() -> Self {
        Self {
            is_public: true,
            allow_comments: true,
            notify_followers: true,
        }
    }
}

/// Result of a completed compose flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPost {
    pub id: Uuid,
    pub draft: PostDraft,
    pub settings: PostSettings,
    /// RFC 3339 publish timestamp.
    pub published_at: String,
}

#[cfg(test)]
mod tests {
    use super::{Attachment, AttachmentKind, PostDraft, PostSettings};

    #[test]
    fn draft_with_only_whitespace_is_empty() {
        let draft = PostDraft {
            text: " \n ".to_string(),
            attachments: Vec::new(),
        };
        assert!(draft.is_empty());
    }

    #[test]
    fn draft_with_attachment_is_not_empty() {
        let draft = PostDraft {
            text: String::new(),
            attachments: vec![Attachment {
                kind: AttachmentKind::Media,
                url: "https://example.com/p.jpg".to_string(),
            }],
        };
        assert!(!draft.is_empty());
    }

    #[test]
    fn settings_default_to_everything_enabled() {
        let settings = PostSettings::default();
        assert!(settings.is_public && settings.allow_comments && settings.notify_followers);
    }
}
