//! Post/Status model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{self, Rendered};
use crate::dispatch::MediaKind;

/// A post/status as read from the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Network-specific ID
    pub id: String,
    /// Author handle (`user@instance`)
    pub author_handle: String,
    /// Author display name
    pub author_name: String,
    /// Original HTML content
    pub content_raw: String,
    /// Content warning, empty if none
    pub spoiler_text: String,
    /// When the post was created
    pub created_at: DateTime<Utc>,
    /// URL to the post on the web
    pub url: Option<String>,
    /// Whether this is a boost
    pub is_repost: bool,
    /// Who boosted it (if repost)
    pub repost_author: Option<String>,
    /// Media attachments
    pub media: Vec<MediaAttachment>,
}

/// Media attachment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAttachment {
    /// Media URL
    pub url: String,
    /// Media type (image, video, gifv, audio)
    pub media_type: MediaType,
    /// Alt text description
    pub alt_text: Option<String>,
}

/// Media type as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Image (JPEG, PNG, GIF, WebP)
    Image,
    /// Video (MP4, WebM)
    Video,
    /// Animated GIF (Mastodon-specific)
    Gifv,
    /// Audio file
    Audio,
    /// Unknown or unsupported media type
    Unknown,
}

impl MediaType {
    /// Parse the API's `type` field
    pub fn from_api(s: &str) -> Self {
        match s {
            "image" => Self::Image,
            "video" => Self::Video,
            "gifv" => Self::Gifv,
            "audio" => Self::Audio,
            _ => Self::Unknown,
        }
    }

    /// Which viewer handles this type. Gifv plays in the video viewer.
    pub const fn kind(self) -> Option<MediaKind> {
        match self {
            Self::Image => Some(MediaKind::Image),
            Self::Video | Self::Gifv => Some(MediaKind::Video),
            Self::Audio => Some(MediaKind::Audio),
            Self::Unknown => None,
        }
    }
}

impl Post {
    /// Parse a Mastodon status JSON document
    pub fn from_status_json(json: &str) -> serde_json::Result<Self> {
        let status: Status = serde_json::from_str(json)?;
        Ok(status.into_post())
    }

    /// Display text and external links of the body
    pub fn rendered(&self) -> Rendered {
        content::extract(&self.content_raw)
    }

    /// Attachment URLs grouped by viewer kind, in order of first appearance
    pub fn media_by_kind(&self) -> Vec<(MediaKind, Vec<String>)> {
        let mut groups: Vec<(MediaKind, Vec<String>)> = Vec::new();
        for attachment in &self.media {
            let Some(kind) = attachment.media_type.kind() else {
                tracing::debug!("Skipping attachment with unknown type: {}", attachment.url);
                continue;
            };
            match groups.iter_mut().find(|(k, _)| *k == kind) {
                Some((_, urls)) => urls.push(attachment.url.clone()),
                None => groups.push((kind, vec![attachment.url.clone()])),
            }
        }
        groups
    }
}

// ==================== API Types ====================

#[derive(Debug, Deserialize)]
struct Status {
    id: String,
    created_at: DateTime<Utc>,
    content: String,
    #[serde(default)]
    spoiler_text: String,
    url: Option<String>,
    account: StatusAccount,
    reblog: Option<Box<Self>>,
    #[serde(default)]
    media_attachments: Vec<StatusMedia>,
}

#[derive(Debug, Deserialize)]
struct StatusAccount {
    username: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    acct: String,
}

#[derive(Debug, Deserialize)]
struct StatusMedia {
    url: String,
    #[serde(rename = "type")]
    media_type: String,
    description: Option<String>,
}

impl Status {
    fn into_post(self) -> Post {
        if let Some(reblog) = self.reblog {
            let mut post = reblog.into_post();
            post.is_repost = true;
            post.repost_author = Some(self.account.display_name);
            return post;
        }

        Post {
            id: self.id,
            author_handle: if self.account.acct.is_empty() {
                self.account.username
            } else {
                self.account.acct
            },
            author_name: self.account.display_name,
            content_raw: self.content,
            spoiler_text: self.spoiler_text,
            created_at: self.created_at,
            url: self.url,
            is_repost: false,
            repost_author: None,
            media: self
                .media_attachments
                .into_iter()
                .map(|m| MediaAttachment {
                    media_type: MediaType::from_api(&m.media_type),
                    url: m.url,
                    alt_text: m.description,
                })
                .collect(),
        }
    }
}
