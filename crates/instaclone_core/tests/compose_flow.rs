use chrono::{DateTime, TimeZone, Utc};
use instaclone_core::{AttachmentKind, Clock, ComposeError, ComposeService, ComposeStage};

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap()
    }
}

#[test]
fn empty_draft_cannot_be_submitted() {
    let mut compose = ComposeService::new();
    compose.set_text("   ").unwrap();

    let err = compose.submit().unwrap_err();
    assert_eq!(err, ComposeError::EmptyPost);
    assert_eq!(err.notice().title, "Cannot post empty content");
    assert_eq!(compose.stage(), ComposeStage::Editing);
}

#[test]
fn attachments_only_draft_is_accepted() {
    let mut compose = ComposeService::new();
    let notice = compose.attach_files(AttachmentKind::Media, 2).unwrap().unwrap();
    assert_eq!(notice.description, "2 files have been attached to your post");
    assert_eq!(compose.draft().attachments.len(), 2);
    assert!(compose.draft().attachments[0]
        .url
        .starts_with("https://images.unsplash.com/photo-"));

    compose.submit().unwrap();
    assert_eq!(compose.stage(), ComposeStage::Options);
}

#[test]
fn zero_files_and_link_kind_are_handled() {
    let mut compose = ComposeService::new();
    assert_eq!(compose.attach_files(AttachmentKind::Document, 0).unwrap(), None);
    assert_eq!(
        compose.attach_files(AttachmentKind::Link, 1).unwrap_err(),
        ComposeError::LinkRequiresUrl
    );
    assert!(compose.draft().attachments.is_empty());
}

#[test]
fn links_are_validated_and_attachments_removable() {
    let mut compose = ComposeService::new();
    assert!(matches!(
        compose.add_link("not a link"),
        Err(ComposeError::InvalidLink(_))
    ));
    compose.add_link(" https://example.com/article ").unwrap();
    compose.attach_files(AttachmentKind::Document, 1).unwrap();

    let removed = compose.remove_attachment(0).unwrap();
    assert_eq!(removed.kind, AttachmentKind::Link);
    assert_eq!(removed.url, "https://example.com/article");
    assert_eq!(
        compose.remove_attachment(5).unwrap_err(),
        ComposeError::AttachmentOutOfRange { index: 5, len: 1 }
    );
}

#[test]
fn settings_change_only_in_options_stage() {
    let mut compose = ComposeService::new();
    assert!(matches!(
        compose.set_public(false),
        Err(ComposeError::WrongStage { .. })
    ));

    compose.set_text("hello").unwrap();
    compose.submit().unwrap();
    assert!(matches!(
        compose.set_text("edit"),
        Err(ComposeError::WrongStage { .. })
    ));
    compose.set_public(false).unwrap();
    compose.cancel();
    assert_eq!(compose.stage(), ComposeStage::Editing);
    assert_eq!(compose.draft().text, "hello");
    assert!(!compose.settings().is_public);
}

#[test]
fn save_publishes_and_resets() {
    let mut compose = ComposeService::with_clock(FixedClock);
    compose.set_text("Road trip").unwrap();
    compose.add_link("https://maps.example.com/route").unwrap();
    compose.submit().unwrap();
    compose.set_allow_comments(false).unwrap();
    compose.set_notify_followers(false).unwrap();

    let (published, notice) = compose.save().unwrap();
    assert_eq!(notice.title, "Post published!");
    assert_eq!(published.draft.text, "Road trip");
    assert_eq!(published.draft.attachments.len(), 1);
    assert!(published.settings.is_public);
    assert!(!published.settings.allow_comments);
    assert!(!published.settings.notify_followers);
    assert_eq!(published.published_at, "2024-06-01T08:30:00.000Z");

    assert_eq!(compose.stage(), ComposeStage::Editing);
    assert!(compose.draft().is_empty());
    assert!(compose.settings().allow_comments);
}
