//! List plumbing shared by every resource: page envelope, search and ordering.

use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};

use crate::error::AppError;

/// `page`, `search` and `ordering` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
}

impl ListParams {
    pub fn page_request(&self, page_size: i64) -> Result<PageRequest, AppError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::BadRequest("page must be >= 1".into()));
        }
        let offset = (page - 1)
            .checked_mul(page_size)
            .ok_or_else(|| AppError::BadRequest("page is out of range".into()))?;
        Ok(PageRequest {
            page,
            limit: page_size,
            offset,
        })
    }

    /// Trimmed search term, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<i64>,
    pub previous: Option<i64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: i64, req: PageRequest) -> Self {
        let next = (req.offset.saturating_add(req.limit) < count)
            .then_some(req.page.saturating_add(1));
        let previous = (req.page > 1).then_some(req.page - 1);
        Self {
            count,
            next,
            previous,
            results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Build an `ORDER BY` body from `"-created_at,name"`, allowing only `allowed` columns.
///
/// `id` is always appended so that equal sort keys page deterministically.
pub fn order_clause(
    ordering: Option<&str>,
    allowed: &[&str],
    default: &str,
) -> Result<String, AppError> {
    let raw = ordering.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(default);
    let mut parts = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (field, dir) = match item.strip_prefix('-') {
            Some(f) => (f, "DESC"),
            None => (item, "ASC"),
        };
        if !allowed.contains(&field) {
            return Err(AppError::BadRequest(format!(
                "cannot order by '{field}'"
            )));
        }
        parts.push(format!("{field} {dir}"));
    }
    parts.push("id ASC".into());
    Ok(parts.join(", "))
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// Append ` AND (a ILIKE $n OR b ILIKE $n ...)` for the given columns.
pub fn push_search(qb: &mut QueryBuilder<'_, Postgres>, columns: &[&str], term: Option<&str>) {
    let Some(term) = term else { return };
    let pattern = like_pattern(term);
    qb.push(" AND (");
    for (i, col) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(*col).push(" ILIKE ").push_bind(pattern.clone());
    }
    qb.push(")");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(page: i64) -> PageRequest {
        ListParams {
            page: Some(page),
            ..Default::default()
        }
        .page_request(20)
        .unwrap()
    }

    #[test]
    fn first_page_of_many_has_next_only() {
        let page = Page::new(vec![0; 20], 25, req(1));
        assert_eq!(page.next, Some(2));
        assert_eq!(page.previous, None);
    }

    #[test]
    fn last_page_has_previous_only() {
        let page = Page::new(vec![0; 5], 25, req(2));
        assert_eq!(page.next, None);
        assert_eq!(page.previous, Some(1));
    }

    #[test]
    fn exact_fit_has_no_next() {
        let page = Page::new(vec![0; 20], 20, req(1));
        assert_eq!(page.next, None);
    }

    #[test]
    fn huge_page_is_a_bad_request() {
        let params = ListParams {
            page: Some(i64::MAX),
            ..Default::default()
        };
        let err = params.page_request(20).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn last_representable_page_has_no_next() {
        let req = PageRequest {
            page: i64::MAX,
            limit: 20,
            offset: i64::MAX - 10,
        };
        let page = Page::new(Vec::<i32>::new(), 5, req);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, Some(i64::MAX - 1));
    }

    #[test]
    fn page_zero_is_rejected() {
        let params = ListParams {
            page: Some(0),
            ..Default::default()
        };
        assert!(params.page_request(20).is_err());
    }

    #[test]
    fn offset_follows_page() {
        assert_eq!(req(3).offset, 40);
    }

    #[test]
    fn ordering_parses_direction_and_appends_id() {
        let clause = order_clause(Some("-target_date,created_at"), &["target_date", "created_at"], "-created_at")
            .unwrap();
        assert_eq!(clause, "target_date DESC, created_at ASC, id ASC");
    }

    #[test]
    fn ordering_falls_back_to_default() {
        let clause = order_clause(None, &["name"], "name").unwrap();
        assert_eq!(clause, "name ASC, id ASC");
    }

    #[test]
    fn ordering_rejects_unknown_columns() {
        let err = order_clause(Some("password_hash"), &["name"], "name").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_a\\b"), "%50\\%\\_a\\\\b%");
    }

    #[test]
    fn blank_search_is_ignored() {
        let params = ListParams {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(params.search_term(), None);
    }
}
