//! Domain models and request/response types

pub mod audit_log;
pub mod fine;
pub mod loan;
pub mod material;
pub mod reservation;
pub mod setting;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Normalized pagination and ordering parameters shared by all list endpoints.
///
/// `page` starts at 1, `limit` is clamped to 1..=100 and the sort column is
/// validated against a per-entity whitelist of (api name, column) pairs so
/// caller-supplied `sortBy` values never reach the SQL text unchecked.
#[derive(Debug, Clone)]
pub struct ListParams {
    pub page: i64,
    pub limit: i64,
    sort_column: String,
    descending: bool,
}

impl ListParams {
    pub fn new(
        page: Option<i64>,
        limit: Option<i64>,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
        sortable: &[(&str, &str)],
    ) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(10).clamp(1, 100);
        let sort_column = sort_by
            .and_then(|name| sortable.iter().find(|(api, _)| *api == name))
            .map(|(_, column)| (*column).to_string())
            .unwrap_or_else(|| "id".to_string());
        let descending = matches!(sort_order, Some("desc"));

        Self {
            page,
            limit,
            sort_column,
            descending,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// ORDER BY clause body, e.g. `due_date DESC`
    pub fn order_by(&self) -> String {
        format!(
            "{} {}",
            self.sort_column,
            if self.descending { "DESC" } else { "ASC" }
        )
    }
}

/// Total page count for a result set
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// Deserialize an optional field distinguishing "absent" from explicit null.
///
/// Used for nullable columns that can be cleared by an update request
/// (e.g. `blockedUntil`): outer `None` means "leave unchanged", `Some(None)`
/// means "set to NULL".
pub fn deserialize_explicit_null<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SORTABLE: &[(&str, &str)] = &[("id", "id"), ("dueDate", "due_date")];

    #[test]
    fn defaults_apply_when_params_absent() {
        let params = ListParams::new(None, None, None, None, SORTABLE);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 10);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.order_by(), "id ASC");
    }

    #[test]
    fn page_and_limit_are_clamped() {
        let params = ListParams::new(Some(0), Some(1000), None, None, SORTABLE);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 100);

        let params = ListParams::new(Some(-5), Some(0), None, None, SORTABLE);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 1);
    }

    #[test]
    fn offset_follows_page_and_limit() {
        let params = ListParams::new(Some(3), Some(25), None, None, SORTABLE);
        assert_eq!(params.offset(), 50);
    }

    #[test]
    fn sort_column_is_whitelisted() {
        let params = ListParams::new(None, None, Some("dueDate"), Some("desc"), SORTABLE);
        assert_eq!(params.order_by(), "due_date DESC");

        // Unknown columns fall back to id
        let params = ListParams::new(None, None, Some("1; DROP TABLE loans"), None, SORTABLE);
        assert_eq!(params.order_by(), "id ASC");
    }

    #[test]
    fn sort_order_defaults_to_ascending() {
        let params = ListParams::new(None, None, Some("id"), Some("sideways"), SORTABLE);
        assert_eq!(params.order_by(), "id ASC");
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(100, 10), 10);
    }
}
