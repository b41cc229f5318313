//! Row-visibility restrictions for `pages` queries.
//!
//! The hosting CMS soft-deletes rows and hides rows outside an editorial
//! visibility window instead of removing them. Queries opt into the
//! restrictions they need; a [`RestrictionSet`] renders the chosen
//! restrictions as a WHERE-clause conjunction.

use chrono::Utc;

/// A single row-visibility constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction {
    /// Exclude soft-deleted rows (`deleted = 0`).
    Deleted,
    /// Exclude rows hidden in the backend or outside their
    /// `starttime`/`endtime` window.
    BackendVisibility,
}

impl Restriction {
    fn sql_at(self, now: i64) -> String {
        match self {
            Self::Deleted => "deleted = 0".to_string(),
            Self::BackendVisibility => format!(
                "hidden = 0 AND starttime <= {now} AND (endtime = 0 OR endtime > {now})"
            ),
        }
    }
}

/// An ordered collection of restrictions applied to one query.
///
/// Mirrors per-query handling in the repository: most queries keep the
/// soft-delete restriction, some drop every restriction on purpose.
#[derive(Debug, Clone, Default)]
pub struct RestrictionSet {
    restrictions: Vec<Restriction>,
}

impl RestrictionSet {
    /// A set with no restrictions; renders no constraint at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            restrictions: Vec::new(),
        }
    }

    /// The CMS default container: only the soft-delete restriction.
    #[must_use]
    pub fn deleted_only() -> Self {
        Self {
            restrictions: vec![Restriction::Deleted],
        }
    }

    /// Add a restriction to the set.
    #[must_use]
    pub fn with(mut self, restriction: Restriction) -> Self {
        self.restrictions.push(restriction);
        self
    }

    /// Render the set as a WHERE-clause conjunction.
    ///
    /// Returns `None` when the set is empty so callers can skip the `AND`
    /// entirely. Visibility windows are evaluated against the current wall
    /// clock.
    #[must_use]
    pub fn sql(&self) -> Option<String> {
        self.sql_at(Utc::now().timestamp())
    }

    fn sql_at(&self, now: i64) -> Option<String> {
        if self.restrictions.is_empty() {
            return None;
        }
        Some(
            self.restrictions
                .iter()
                .map(|r| r.sql_at(now))
                .collect::<Vec<_>>()
                .join(" AND "),
        )
    }
}
