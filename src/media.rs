//! Typed attachment records.
//!
//! [`MediaBundle::extract`] maps each raw attachment list of a record to its
//! typed counterpart independently. A missing list becomes an empty `Vec`:
//! media presence is optional per record, never a malformed-input case.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::raw::{RawMedia, RawRecord, parse_s_timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Photo {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Video {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioFile {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gif {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sticker {
    pub uri: String,
}

/// A generic file attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentFile {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// All attachments carried by one media message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaBundle {
    pub photos: Vec<Photo>,
    pub videos: Vec<Video>,
    pub audio_files: Vec<AudioFile>,
    pub gifs: Vec<Gif>,
    pub stickers: Vec<Sticker>,
    pub files: Vec<AttachmentFile>,
}

impl MediaBundle {
    /// Extracts every attachment list from `record`.
    pub fn extract(record: &RawRecord) -> Self {
        Self {
            photos: map_list(record.photos.as_deref(), |raw| Photo {
                uri: raw.uri.clone(),
                created_at: created_at(raw),
            }),
            videos: map_list(record.videos.as_deref(), |raw| Video {
                uri: raw.uri.clone(),
                thumbnail_uri: raw.thumbnail.as_ref().map(|thumb| thumb.uri.clone()),
                created_at: created_at(raw),
            }),
            audio_files: map_list(record.audio_files.as_deref(), |raw| AudioFile {
                uri: raw.uri.clone(),
                created_at: created_at(raw),
            }),
            gifs: map_list(record.gifs.as_deref(), |raw| Gif {
                uri: raw.uri.clone(),
            }),
            stickers: record
                .sticker
                .iter()
                .map(|raw| Sticker {
                    uri: raw.uri.clone(),
                })
                .collect(),
            files: map_list(record.files.as_deref(), |raw| AttachmentFile {
                uri: raw.uri.clone(),
                created_at: created_at(raw),
            }),
        }
    }

    /// Total number of attachments.
    pub fn len(&self) -> usize {
        self.photos.len()
            + self.videos.len()
            + self.audio_files.len()
            + self.gifs.len()
            + self.stickers.len()
            + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the location of every attachment.
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.photos
            .iter()
            .map(|m| m.uri.as_str())
            .chain(self.videos.iter().map(|m| m.uri.as_str()))
            .chain(self.audio_files.iter().map(|m| m.uri.as_str()))
            .chain(self.gifs.iter().map(|m| m.uri.as_str()))
            .chain(self.stickers.iter().map(|m| m.uri.as_str()))
            .chain(self.files.iter().map(|m| m.uri.as_str()))
    }
}

fn map_list<T>(list: Option<&[RawMedia]>, f: impl Fn(&RawMedia) -> T) -> Vec<T> {
    list.unwrap_or_default().iter().map(f).collect()
}

fn created_at(raw: &RawMedia) -> Option<DateTime<Utc>> {
    raw.creation_timestamp.and_then(parse_s_timestamp)
}
