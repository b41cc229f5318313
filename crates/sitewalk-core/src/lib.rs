//! # sitewalk-core
//!
//! Page-tree record access for CMS search indexing.
//!
//! This crate gives a search indexer read-only access to the page tree
//! stored in a CMS-owned `pages` table: site roots, mount points, sub-page
//! id lists, translation overlays, and content-reference lookups. It is a
//! thin repository layer; queries are assembled as SQL and executed through
//! `sqlx`, and the one expensive subtree walk is memoized per execution
//! context.
//!
//! ## Architecture
//!
//! - **Configuration**: database and tree-walk settings in TOML
//! - **Restrictions**: composable row-visibility WHERE fragments
//! - **Tree listing**: subtree enumeration delegated to the database engine
//! - **Transient cache**: request-scoped memoization with hit/miss counters
//! - **Repository**: the query surface returning plain row structs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sitewalk_core::{db, PagesRepository};
//!
//! # async fn demo() -> sitewalk_core::Result<()> {
//! let pool = db::connect_in_memory().await?;
//! let repository = PagesRepository::new(pool);
//!
//! for root in repository.find_all_root_pages().await? {
//!     println!("site root {}: {}", root.uid, root.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`]. Database failures keep the
//! driver error as their source; argument validation fails before any query
//! is issued.

/// Request-scoped memoization for tree walks
pub mod cache;
/// Configuration management
pub mod config;
/// SQLite pool construction
pub mod db;
/// Error types and result aliases
pub mod error;
/// The page record query surface
pub mod pages;
/// Row-visibility restrictions
pub mod restriction;
/// Depth-limited page-tree listing
pub mod tree;
/// Row types returned by queries
pub mod types;

// Re-export commonly used types
pub use cache::{CacheStatsSnapshot, TransientCache};
pub use config::{Config, DatabaseConfig, TreeConfig};
pub use error::{Error, Result};
pub use pages::PagesRepository;
pub use restriction::{Restriction, RestrictionSet};
pub use types::{MountPointProperties, RootPage, TranslationOverlay};
