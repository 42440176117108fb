//! Post compose flow: draft editing, then publish settings.
//!
//! # Responsibility
//! - Collect post text and attachment references.
//! - Gate the settings stage on a non-empty draft.
//! - Produce a `PublishedPost` and reset on save.
//!
//! # Invariants
//! - Attachments are placeholder references; no bytes are uploaded.
//! - Settings can only change in the `Options` stage.
//! - Nothing is persisted.

use crate::clock::{Clock, SystemClock};
use crate::model::draft::{Attachment, AttachmentKind, PostDraft, PostSettings, PublishedPost};
use crate::model::post::format_timestamp;
use crate::service::notice::Notice;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("valid link regex"));

const PLACEHOLDER_IMAGE_BASE: &str = "https://images.unsplash.com/photo-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeStage {
    Editing,
    Options,
}

pub type ComposeResult<T> = Result<T, ComposeError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// Blank text and no attachments.
    EmptyPost,
    InvalidLink(String),
    /// Links are added through `add_link`, not as files.
    LinkRequiresUrl,
    AttachmentOutOfRange { index: usize, len: usize },
    WrongStage { expected: ComposeStage, actual: ComposeStage },
}

impl ComposeError {
    pub fn notice(&self) -> Notice {
        match self {
            Self::EmptyPost => Notice::destructive(
                "Cannot post empty content",
                "Please add some text or attachments to your post",
            ),
            Self::InvalidLink(_) => {
                Notice::destructive("Invalid link", "Links must start with http:// or https://")
            }
            other => Notice::destructive("Cannot update post", other.to_string()),
        }
    }
}

impl Display for ComposeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPost => write!(f, "post has no text and no attachments"),
            Self::InvalidLink(value) => write!(f, "invalid link `{value}`"),
            Self::LinkRequiresUrl => write!(f, "link attachments need a url"),
            Self::AttachmentOutOfRange { index, len } => {
                write!(f, "attachment index {index} out of range (len {len})")
            }
            Self::WrongStage { expected, actual } => {
                write!(f, "compose stage is {actual:?}, expected {expected:?}")
            }
        }
    }
}

impl Error for ComposeError {}

pub struct ComposeService<C: Clock = SystemClock> {
    clock: C,
    draft: PostDraft,
    settings: PostSettings,
    stage: ComposeStage,
}

impl Default for ComposeService {
    fn default() -> Self {
        Self::new()
    }
}

impl ComposeService {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> ComposeService<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            draft: PostDraft::default(),
            settings: PostSettings::default(),
            stage: ComposeStage::Editing,
        }
    }

    pub fn stage(&self) -> ComposeStage {
        self.stage
    }

    pub fn draft(&self) -> &PostDraft {
        &self.draft
    }

    pub fn settings(&self) -> PostSettings {
        self.settings
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> ComposeResult<()> {
        self.expect_stage(ComposeStage::Editing)?;
        self.draft.text = text.into();
        Ok(())
    }

    /// Attaches `count` selected files as placeholder image references.
    ///
    /// Returns `None` when no files were selected.
    pub fn attach_files(
        &mut self,
        kind: AttachmentKind,
        count: usize,
    ) -> ComposeResult<Option<Notice>> {
        self.expect_stage(ComposeStage::Editing)?;
        if kind == AttachmentKind::Link {
            return Err(ComposeError::LinkRequiresUrl);
        }
        if count == 0 {
            return Ok(None);
        }

        self.draft
            .attachments
            .extend((0..count).map(|_| Attachment {
                kind,
                url: placeholder_url(),
            }));
        Ok(Some(Notice::info(
            "Files attached",
            format!("{count} files have been attached to your post"),
        )))
    }

    pub fn add_link(&mut self, url: &str) -> ComposeResult<()> {
        self.expect_stage(ComposeStage::Editing)?;
        let url = url.trim();
        if !LINK_RE.is_match(url) {
            return Err(ComposeError::InvalidLink(url.to_string()));
        }
        self.draft.attachments.push(Attachment {
            kind: AttachmentKind::Link,
            url: url.to_string(),
        });
        Ok(())
    }

    pub fn remove_attachment(&mut self, index: usize) -> ComposeResult<Attachment> {
        self.expect_stage(ComposeStage::Editing)?;
        let len = self.draft.attachments.len();
        if index >= len {
            return Err(ComposeError::AttachmentOutOfRange { index, len });
        }
        Ok(self.draft.attachments.remove(index))
    }

    /// Moves a non-empty draft to the settings stage.
    pub fn submit(&mut self) -> ComposeResult<()> {
        self.expect_stage(ComposeStage::Editing)?;
        if self.draft.is_empty() {
            return Err(ComposeError::EmptyPost);
        }
        self.stage = ComposeStage::Options;
        Ok(())
    }

    pub fn set_public(&mut self, value: bool) -> ComposeResult<()> {
        self.expect_stage(ComposeStage::Options)?;
        self.settings.is_public = value;
        Ok(())
    }

    pub fn set_allow_comments(&mut self, value: bool) -> ComposeResult<()> {
        self.expect_stage(ComposeStage::Options)?;
        self.settings.allow_comments = value;
        Ok(())
    }

    pub fn set_notify_followers(&mut self, value: bool) -> ComposeResult<()> {
        self.expect_stage(ComposeStage::Options)?;
        self.settings.notify_followers = value;
        Ok(())
    }

    /// Returns to editing; the draft is kept.
    pub fn cancel(&mut self) {
        self.stage = ComposeStage::Editing;
    }

    /// Publishes the draft and resets the composer.
    pub fn save(&mut self) -> ComposeResult<(PublishedPost, Notice)> {
        self.expect_stage(ComposeStage::Options)?;
        let published = PublishedPost {
            id: Uuid::new_v4(),
            draft: std::mem::take(&mut self.draft),
            settings: std::mem::take(&mut self.settings),
            published_at: format_timestamp(self.clock.now()),
        };
        self.stage = ComposeStage::Editing;

        info!(
            "event=compose_save module=service status=ok post_id={} attachments={} public={}",
            published.id,
            published.draft.attachments.len(),
            published.settings.is_public
        );
        Ok((
            published,
            Notice::info("Post published!", "Your post has been published successfully"),
        ))
    }

    fn expect_stage(&self, expected: ComposeStage) -> ComposeResult<()> {
        if self.stage != expected {
            return Err(ComposeError::WrongStage {
                expected,
                actual: self.stage,
            });
        }
        Ok(())
    }
}

fn placeholder_url() -> String {
    format!(
        "{PLACEHOLDER_IMAGE_BASE}{}?w=500&h=500",
        Uuid::new_v4().simple()
    )
}
