//! Row types returned by the page record queries.
//!
//! These are plain projections of the `pages` table, shaped for the search
//! indexer. They are serde-serializable so downstream indexing pipelines can
//! pass them along without reshaping.

use serde::{Deserialize, Serialize};

/// Page type marking a row as a mount point.
pub const MOUNT_POINT_DOKTYPE: i64 = 7;

/// Parent-id sentinel marking a deleted placeholder row.
pub const DELETED_MARKER_PID: i64 = -1;

/// Default language id.
pub const DEFAULT_LANGUAGE_UID: i64 = 0;

/// A site root page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RootPage {
    /// Page uid.
    pub uid: i64,
    /// Page title.
    pub title: String,
}

/// A mount relationship between two pages.
///
/// Computed per query, never persisted. The destination is the mount-point
/// page itself; the source is the page whose subtree gets spliced in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MountPointProperties {
    /// Uid of the mount-point page.
    pub uid: i64,
    /// Destination uid (same as `uid`, kept separate for indexer consumers).
    pub mount_page_destination: i64,
    /// Uid of the mounted source page.
    pub mount_page_source: i64,
    /// Whether the mount point overlays the source page in place.
    pub mount_page_overlayed: bool,
}

/// A translation overlay of a default-language page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TranslationOverlay {
    /// Parent page id of the overlay row.
    pub pid: i64,
    /// Uid of the default-language page this row overlays.
    pub l10n_parent: i64,
    /// Language id of the overlay.
    pub sys_language_uid: i64,
}
