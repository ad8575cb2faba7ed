//! Relay connections over LIMIT/OFFSET queries.
//!
//! Cursors are plain row offsets into the ordered result set, so a list
//! resolver only needs a `COUNT(*)` and a windowed fetch.

use std::future::Future;

use async_graphql::connection::{query, Connection, Edge};
use async_graphql::{Error, OutputType, Result};
use infra::pagination::LimitOffset;

use crate::gql::error::DbResultExt;

/// Largest page a single `first`/`last` may request. Also the page size
/// when neither is given.
pub const MAX_PAGE_SIZE: usize = 100;

/// The `[start, end)` slice of a result set selected by Relay arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

impl Window {
    /// `after`/`before` narrow the range first; `first` then keeps its head
    /// and `last` its tail.
    pub fn new(
        total: usize,
        after: Option<usize>,
        before: Option<usize>,
        first: Option<usize>,
        last: Option<usize>,
    ) -> Self {
        let mut start = after.map(|a| a.saturating_add(1)).unwrap_or(0).min(total);
        let mut end = before.unwrap_or(total).min(total).max(start);

        if let Some(first) = first {
            end = end.min(start.saturating_add(first));
        }
        if let Some(last) = last {
            start = start.max(end.saturating_sub(last));
        }

        Self { start, end }
    }

    pub fn page(&self) -> LimitOffset {
        LimitOffset::new((self.end - self.start) as i64, self.start as i64)
    }

    pub fn has_previous_page(&self) -> bool {
        self.start > 0
    }

    pub fn has_next_page(&self, total: usize) -> bool {
        self.end < total
    }
}

fn check_limit(arg: &str, value: Option<usize>) -> Result<Option<usize>> {
    match value {
        Some(n) if n > MAX_PAGE_SIZE => Err(Error::new(format!(
            "Requesting {n} records exceeds the `{arg}` limit of {MAX_PAGE_SIZE} records."
        ))),
        other => Ok(other),
    }
}

/// Resolve a Relay connection from a row count and a windowed fetch.
///
/// ```ignore
/// paginate(after, before, first, last,
///     address::count_countries(&state.db),
///     |page| address::list_countries(&state.db, page),
/// ).await
/// ```
pub async fn paginate<Node, Row, C, F, Fut>(
    after: Option<String>,
    before: Option<String>,
    first: Option<i32>,
    last: Option<i32>,
    count: C,
    fetch: F,
) -> Result<Connection<usize, Node>>
where
    Node: OutputType,
    Row: Into<Node>,
    C: Future<Output = sqlx::Result<i64>>,
    F: FnOnce(LimitOffset) -> Fut,
    Fut: Future<Output = sqlx::Result<Vec<Row>>>,
{
    query(
        after,
        before,
        first,
        last,
        |after: Option<usize>, before: Option<usize>, first: Option<usize>, last: Option<usize>| async move {
            let first = check_limit("first", first)?;
            let last = check_limit("last", last)?;
            let first = if first.is_none() && last.is_none() {
                Some(MAX_PAGE_SIZE)
            } else {
                first
            };

            let total = count.await.db_err()?.max(0) as usize;
            let window = Window::new(total, after, before, first, last);
            let rows = fetch(window.page()).await.db_err()?;

            let mut connection =
                Connection::new(window.has_previous_page(), window.has_next_page(total));
            connection.edges.extend(
                rows.into_iter()
                    .enumerate()
                    .map(|(i, row)| Edge::new(window.start + i, row.into())),
            );
            Ok::<_, Error>(connection)
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_defaults_to_everything() {
        let w = Window::new(10, None, None, None, None);
        assert_eq!(w, Window { start: 0, end: 10 });
        assert!(!w.has_previous_page());
        assert!(!w.has_next_page(10));
    }

    #[test]
    fn first_after_cursor() {
        let w = Window::new(10, Some(2), None, Some(3), None);
        assert_eq!(w, Window { start: 3, end: 6 });
        assert_eq!(w.page().limit, 3);
        assert_eq!(w.page().offset, 3);
        assert!(w.has_previous_page());
        assert!(w.has_next_page(10));
    }

    #[test]
    fn last_before_cursor() {
        let w = Window::new(10, None, Some(8), None, Some(2));
        assert_eq!(w, Window { start: 6, end: 8 });
    }

    #[test]
    fn cursors_past_the_end_yield_an_empty_page() {
        let w = Window::new(3, Some(7), None, Some(5), None);
        assert_eq!(w, Window { start: 3, end: 3 });
        assert_eq!(w.page().limit, 0);
        assert!(!w.has_next_page(3));
    }

    #[test]
    fn page_size_over_the_cap_is_rejected() {
        tokio_test::assert_ok!(check_limit("first", Some(MAX_PAGE_SIZE)));
        let err = tokio_test::assert_err!(check_limit("last", Some(101)));
        assert_eq!(
            err.message,
            "Requesting 101 records exceeds the `last` limit of 100 records."
        );
    }
}
