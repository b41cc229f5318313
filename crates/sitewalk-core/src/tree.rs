//! Depth-limited page-tree listing.
//!
//! The walk itself runs inside the database engine as a recursive CTE, so
//! the repository never pages rows through application memory while
//! descending the tree.

use crate::Result;
use sqlx::sqlite::SqlitePool;
use tracing::debug;

/// List the uids of the subtree rooted at `root_page_id`.
///
/// The root uid comes first, descendants follow in discovery order. Each
/// visited row must satisfy `where_clause` (pass an empty string for no
/// filter); a root row failing the filter yields an empty list. The walk
/// descends at most `depth_limit` levels below the root.
///
/// `where_clause` is raw SQL evaluated against the `pages` row under
/// consideration. It is not validated here; malformed fragments surface as
/// database errors.
///
/// # Errors
///
/// Returns [`crate::Error::Database`] when the query fails.
pub async fn tree_list(
    pool: &SqlitePool,
    root_page_id: i64,
    depth_limit: u32,
    where_clause: &str,
) -> Result<Vec<i64>> {
    let filter = if where_clause.trim().is_empty() {
        String::new()
    } else {
        format!(" AND ({where_clause})")
    };

    let sql = format!(
        "WITH RECURSIVE subtree(uid, depth) AS ( \
            SELECT uid, 0 FROM pages WHERE uid = ?{filter} \
            UNION ALL \
            SELECT p.uid, s.depth + 1 FROM pages p \
            JOIN subtree s ON p.pid = s.uid \
            WHERE s.depth < ?{filter} \
        ) SELECT uid FROM subtree"
    );

    let uids: Vec<i64> = sqlx::query_scalar(&sql)
        .bind(root_page_id)
        .bind(i64::from(depth_limit))
        .fetch_all(pool)
        .await?;

    debug!(
        root_page_id,
        depth_limit,
        pages = uids.len(),
        "listed page subtree"
    );
    Ok(uids)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    async fn fixture() -> SqlitePool {
        let pool = connect_in_memory().await.unwrap();
        sqlx::query(
            "CREATE TABLE pages (uid INTEGER PRIMARY KEY, pid INTEGER NOT NULL, deleted INTEGER NOT NULL DEFAULT 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        for (uid, pid, deleted) in [
            (1, 0, 0),
            (2, 1, 0),
            (3, 1, 0),
            (4, 2, 0),
            (5, 2, 1),
            (6, 5, 0),
        ] {
            sqlx::query("INSERT INTO pages (uid, pid, deleted) VALUES (?, ?, ?)")
                .bind(uid)
                .bind(pid)
                .bind(deleted)
                .execute(&pool)
                .await
                .unwrap();
        }
        pool
    }

    #[tokio::test]
    async fn test_root_comes_first() {
        let pool = fixture().await;
        let uids = tree_list(&pool, 1, 9999, "").await.unwrap();
        assert_eq!(uids[0], 1);
    }

    #[tokio::test]
    async fn test_filter_prunes_branches() {
        let pool = fixture().await;
        // Page 5 is deleted, so 6 is unreachable through it.
        let mut uids = tree_list(&pool, 1, 9999, "deleted = 0").await.unwrap();
        uids.sort_unstable();
        assert_eq!(uids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let pool = fixture().await;
        let mut uids = tree_list(&pool, 1, 1, "").await.unwrap();
        uids.sort_unstable();
        assert_eq!(uids, vec![1, 2, 3]);

        let uids = tree_list(&pool, 1, 0, "").await.unwrap();
        assert_eq!(uids, vec![1]);
    }

    #[tokio::test]
    async fn test_missing_root_is_empty() {
        let pool = fixture().await;
        let uids = tree_list(&pool, 42, 9999, "").await.unwrap();
        assert!(uids.is_empty());
    }

    #[tokio::test]
    async fn test_root_failing_filter_is_empty() {
        let pool = fixture().await;
        let uids = tree_list(&pool, 5, 9999, "deleted = 0").await.unwrap();
        assert!(uids.is_empty());
    }
}
