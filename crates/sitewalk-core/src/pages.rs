//! Read-only query surface over the `pages` table.
//!
//! [`PagesRepository`] translates page-tree questions from the search
//! indexer into SQL and returns plain row structs or id lists. Queries are
//! assembled as SQL text, parameters are bound where caller data is not
//! already validated as integers, and the one expensive subtree walk is
//! memoized in a [`TransientCache`] for the lifetime of the repository.

use crate::cache::{cache_key, CacheStatsSnapshot, TransientCache};
use crate::config::{Config, DEFAULT_TREE_DEPTH_LIMIT};
use crate::restriction::{Restriction, RestrictionSet};
use crate::tree;
use crate::types::{
    MountPointProperties, RootPage, TranslationOverlay, DEFAULT_LANGUAGE_UID, DELETED_MARKER_PID,
    MOUNT_POINT_DOKTYPE,
};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::sqlite::SqlitePool;
use tracing::debug;

#[allow(clippy::expect_used)]
static LOGICAL_OPERATOR_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:(?:and|or)\s+)+").expect("static pattern compiles"));

/// Repository encapsulating database access to page records.
pub struct PagesRepository {
    pool: SqlitePool,
    transient_cache: TransientCache,
    tree_depth_limit: u32,
}

impl PagesRepository {
    /// Create a repository over an existing pool with the default tree
    /// depth limit.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            transient_cache: TransientCache::new(),
            tree_depth_limit: DEFAULT_TREE_DEPTH_LIMIT,
        }
    }

    /// Create a repository honoring the configured tree depth limit.
    #[must_use]
    pub fn with_config(pool: SqlitePool, config: &Config) -> Self {
        Self {
            pool,
            transient_cache: TransientCache::new(),
            tree_depth_limit: config.tree.depth_limit,
        }
    }

    /// Snapshot the transient cache counters.
    pub fn cache_stats(&self) -> CacheStatsSnapshot {
        self.transient_cache.stats()
    }

    /// Gets the site's root pages. The "is root of website" flag must be
    /// set, which usually is the case for pages with `pid = 0`.
    ///
    /// Returns partial page records containing the uid and title fields.
    pub async fn find_all_root_pages(&self) -> Result<Vec<RootPage>> {
        let mut sql = format!(
            "SELECT uid, title FROM pages \
             WHERE pid != {DELETED_MARKER_PID} AND is_siteroot = 1"
        );
        and_restrictions(&mut sql, &RestrictionSet::deleted_only());
        and_default_language(&mut sql);

        let rows: Vec<RootPage> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        debug!(root_pages = rows.len(), "queried site root pages");
        Ok(rows)
    }

    /// Finds the mount properties for mount points (destinations) by the
    /// mounted page uid (source) or by the root line of the mounted page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] before issuing any query when
    /// `root_line_parent_page_ids` contains a value that cannot be a page
    /// uid.
    pub async fn find_mount_point_properties_by_page_id_or_by_root_line_parent_page_ids(
        &self,
        mounted_page_uid: i64,
        root_line_parent_page_ids: &[i64],
    ) -> Result<Vec<MountPointProperties>> {
        validate_root_line_page_ids(root_line_parent_page_ids)?;

        let mut sql = format!(
            "SELECT uid, uid AS mount_page_destination, \
             mount_pid AS mount_page_source, mount_pid_ol AS mount_page_overlayed \
             FROM pages WHERE {}",
            mount_point_destination_conditions(mounted_page_uid, root_line_parent_page_ids)
        );
        and_restrictions(&mut sql, &RestrictionSet::deleted_only());
        and_default_language(&mut sql);

        let rows: Vec<MountPointProperties> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        debug!(
            mounted_page_uid,
            mount_points = rows.len(),
            "queried mount point destinations"
        );
        Ok(rows)
    }

    /// Generates the list of page ids in the site below `root_page_id`,
    /// including the root itself and every page type except soft-deleted
    /// rows.
    ///
    /// When `additional_where_clause` is non-empty, the listed ids are
    /// narrowed to rows matching the raw SQL fragment (a leading `AND` or
    /// `OR` is tolerated and stripped). The result is memoized per
    /// `(root_page_id, additional_where_clause)` pair; repeated calls with
    /// identical arguments do not touch the database again.
    pub async fn find_all_sub_page_ids_by_root_page(
        &self,
        root_page_id: i64,
        additional_where_clause: &str,
    ) -> Result<Vec<i64>> {
        let identifier = cache_key(
            "sub-page-ids",
            &[&root_page_id.to_string(), additional_where_clause],
        );
        if let Some(page_ids) = self.transient_cache.get(&identifier) {
            return Ok(page_ids);
        }

        let mut page_ids =
            tree::tree_list(&self.pool, root_page_id, self.tree_depth_limit, "deleted = 0")
                .await?;

        if !additional_where_clause.trim().is_empty() {
            page_ids = self
                .filter_page_ids_by_additional_where_clause(&page_ids, additional_where_clause)
                .await?;
        }

        self.transient_cache.set(identifier, page_ids.clone());
        Ok(page_ids)
    }

    /// Finds every descendant of pages inside the subtree of `root_page_id`
    /// that carry the `no_search_sub_entries` flag.
    ///
    /// The full subtree is listed first, the flagged pages within it are
    /// selected without any row-visibility restriction, and the subtrees
    /// below each flagged page are concatenated. `max_depth` is accepted for
    /// signature compatibility with callers; the nested subtree listings
    /// always use the repository's configured depth ceiling. Returns an
    /// empty list when nothing is flagged.
    pub async fn find_all_pages_within_no_search_sub_entries_marked_pages_by_root_page(
        &self,
        root_page_id: i64,
        _max_depth: u32,
        additional_where_clause: &str,
    ) -> Result<Vec<i64>> {
        let whole_pagetree = self
            .find_all_sub_page_ids_by_root_page(root_page_id, additional_where_clause)
            .await?;
        if whole_pagetree.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT uid FROM pages WHERE uid IN ({}) AND no_search_sub_entries = ?",
            join_uids(&whole_pagetree)
        );
        let flagged: Vec<i64> = sqlx::query_scalar(&sql)
            .bind(1_i64)
            .fetch_all(&self.pool)
            .await?;

        if flagged.is_empty() {
            return Ok(Vec::new());
        }

        let mut page_ids = Vec::new();
        for uid in flagged {
            page_ids.extend(self.find_all_sub_page_ids_by_root_page(uid, "").await?);
        }
        Ok(page_ids)
    }

    /// Finds translation overlays of the given default-language page.
    ///
    /// Soft-deleted overlays and overlays outside their backend visibility
    /// window are excluded.
    pub async fn find_translation_overlays_by_page_id(
        &self,
        page_id: i64,
    ) -> Result<Vec<TranslationOverlay>> {
        let mut sql =
            String::from("SELECT pid, l10n_parent, sys_language_uid FROM pages WHERE l10n_parent = ?");
        and_restrictions(
            &mut sql,
            &RestrictionSet::deleted_only().with(Restriction::BackendVisibility),
        );

        let rows: Vec<TranslationOverlay> = sqlx::query_as(&sql)
            .bind(page_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Finds pages that are showing content from the page currently being
    /// updated.
    ///
    /// Returns the uids of pages whose `content_from_pid` points at
    /// `page_id`.
    pub async fn find_page_uids_with_contents_from_pid(&self, page_id: i64) -> Result<Vec<i64>> {
        let mut sql = String::from("SELECT uid FROM pages WHERE content_from_pid = ?");
        and_restrictions(&mut sql, &RestrictionSet::deleted_only());
        and_default_language(&mut sql);

        let uids: Vec<i64> = sqlx::query_scalar(&sql)
            .bind(page_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(uids)
    }

    /// Finds all mount pages matching the given raw where clause.
    ///
    /// All row-visibility restrictions are dropped for this query; only the
    /// default-language constraint remains. The clause is passed to the
    /// database unvalidated.
    pub async fn find_all_mount_pages_by_where_clause(
        &self,
        where_clause: &str,
    ) -> Result<Vec<MountPointProperties>> {
        let mut sql = String::from(
            "SELECT uid, uid AS mount_page_destination, \
             mount_pid AS mount_page_source, mount_pid_ol AS mount_page_overlayed \
             FROM pages WHERE ",
        );
        if where_clause.trim().is_empty() {
            sql.push_str(&format!("sys_language_uid = {DEFAULT_LANGUAGE_UID}"));
        } else {
            sql.push_str(&format!(
                "({where_clause}) AND sys_language_uid = {DEFAULT_LANGUAGE_UID}"
            ));
        }

        let rows: Vec<MountPointProperties> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Narrow a listed id set to the rows matching the caller-supplied
    /// filter, keeping the soft-delete restriction.
    async fn filter_page_ids_by_additional_where_clause(
        &self,
        page_ids: &[i64],
        additional_where_clause: &str,
    ) -> Result<Vec<i64>> {
        if page_ids.is_empty() {
            return Ok(Vec::new());
        }

        let clause = strip_logical_operator_prefix(additional_where_clause);
        let mut sql = format!("SELECT uid FROM pages WHERE uid IN ({})", join_uids(page_ids));
        and_restrictions(&mut sql, &RestrictionSet::deleted_only());
        sql.push_str(&format!(" AND ({clause})"));

        let uids: Vec<i64> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        Ok(uids)
    }
}

/// WHERE body selecting mount-point destinations.
///
/// Retrieves records whose `mount_pid` equals `mounted_page_uid` with the
/// overlay flag set, or whose `mount_pid` is among the root line parents.
fn mount_point_destination_conditions(
    mounted_page_uid: i64,
    root_line_parent_page_ids: &[i64],
) -> String {
    let direct = format!("(mount_pid = {mounted_page_uid} AND mount_pid_ol = 1)");
    let selector = if root_line_parent_page_ids.is_empty() {
        direct
    } else {
        format!(
            "({direct} OR mount_pid IN ({}))",
            join_uids(root_line_parent_page_ids)
        )
    };
    format!("doktype = {MOUNT_POINT_DOKTYPE} AND no_search = 0 AND {selector}")
}

fn validate_root_line_page_ids(root_line_parent_page_ids: &[i64]) -> Result<()> {
    for &uid in root_line_parent_page_ids {
        if uid <= 0 {
            return Err(Error::InvalidArgument(format!(
                "root line parent page id {uid} is not a valid page uid"
            )));
        }
    }
    Ok(())
}

fn join_uids(uids: &[i64]) -> String {
    uids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn and_default_language(sql: &mut String) {
    sql.push_str(&format!(" AND sys_language_uid = {DEFAULT_LANGUAGE_UID}"));
}

fn and_restrictions(sql: &mut String, restrictions: &RestrictionSet) {
    if let Some(fragment) = restrictions.sql() {
        sql.push_str(&format!(" AND {fragment}"));
    }
}

/// Strip a leading `AND`/`OR` from a caller-supplied filter fragment so it
/// can be embedded into an already-open conjunction.
fn strip_logical_operator_prefix(clause: &str) -> String {
    LOGICAL_OPERATOR_PREFIX.replace(clause, "").into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strip_logical_operator_prefix() {
        assert_eq!(strip_logical_operator_prefix("AND no_search = 0"), "no_search = 0");
        assert_eq!(strip_logical_operator_prefix("or hidden = 0"), "hidden = 0");
        assert_eq!(
            strip_logical_operator_prefix("  AND OR and doktype = 1"),
            "doktype = 1"
        );
        assert_eq!(strip_logical_operator_prefix("no_search = 0"), "no_search = 0");
        // Identifiers merely starting with a keyword are left alone.
        assert_eq!(strip_logical_operator_prefix("android = 1"), "android = 1");
    }

    #[test]
    fn test_join_uids() {
        assert_eq!(join_uids(&[1, 22, 333]), "1,22,333");
        assert_eq!(join_uids(&[]), "");
    }

    #[test]
    fn test_validate_root_line_page_ids() {
        assert!(validate_root_line_page_ids(&[1, 2, 3]).is_ok());
        assert!(validate_root_line_page_ids(&[]).is_ok());

        let err = validate_root_line_page_ids(&[1, 0, 3]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = validate_root_line_page_ids(&[-7]).unwrap_err();
        assert!(err.to_string().contains("-7"));
    }

    #[test]
    fn test_mount_point_conditions_without_root_line() {
        let sql = mount_point_destination_conditions(42, &[]);
        assert_eq!(
            sql,
            "doktype = 7 AND no_search = 0 AND (mount_pid = 42 AND mount_pid_ol = 1)"
        );
    }

    #[test]
    fn test_mount_point_conditions_with_root_line() {
        let sql = mount_point_destination_conditions(42, &[2, 3]);
        assert!(sql.contains("OR mount_pid IN (2,3)"));
        assert!(sql.starts_with("doktype = 7 AND no_search = 0 AND"));
    }

    proptest! {
        #[test]
        fn test_stripped_clause_never_keeps_operator_prefix(clause in r"(?:AND |OR |and |or )*[a-z_]+ = [0-9]{1,4}") {
            let stripped = strip_logical_operator_prefix(&clause);
            let lowered = stripped.to_lowercase();
            prop_assert!(!lowered.starts_with("and "));
            prop_assert!(!lowered.starts_with("or "));
            // Stripping twice changes nothing further.
            prop_assert_eq!(strip_logical_operator_prefix(&stripped), stripped);
        }
    }
}
