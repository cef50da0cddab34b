//! Listing engine shared by posts and projects.
//!
//! Raw list parameters are normalized into a [`ListQuery`] (never rejected),
//! a [`Listing`] describes the table being listed, and together they build the
//! filtered, sorted and paginated SQL. [`PageMeta`] carries the pagination
//! metadata returned alongside every listing.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};

use crate::models::PostStatus;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Upper bound for page sizes and featured limits.
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_FEATURED_LIMIT: u32 = 3;
/// Category sentinel meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All Categories";
/// SQLite collation used for title ordering, registered on every connection.
pub const TITLE_COLLATION: &str = "TITLE_ORDER";

/// Query string parameters of a list request, as sent by the client.
///
/// Built from the raw key/value pairs so that repeated or unknown keys never
/// reject a request: the last occurrence of a key wins.
#[derive(Debug, Default, Clone)]
pub struct ListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl FromIterator<(String, String)> for ListParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut params = ListParams::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut params.page,
                "pageSize" => &mut params.page_size,
                "search" => &mut params.search,
                "category" => &mut params.category,
                "status" => &mut params.status,
                "sortBy" => &mut params.sort_by,
                "sortOrder" => &mut params.sort_order,
                _ => continue,
            };
            *slot = Some(value);
        }
        params
    }
}

/// Query string parameters of a featured request.
#[derive(Debug, Default, Clone)]
pub struct FeaturedParams {
    pub limit: Option<String>,
}

impl FromIterator<(String, String)> for FeaturedParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let limit = pairs
            .into_iter()
            .filter(|(key, _)| key == "limit")
            .map(|(_, value)| value)
            .last();
        FeaturedParams { limit }
    }
}

impl FeaturedParams {
    pub fn limit(&self) -> u32 {
        parse_positive(self.limit.as_deref())
            .unwrap_or(DEFAULT_FEATURED_LIMIT)
            .min(MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Title,
    ReadTime,
    /// Unrecognized field: rows keep insertion order
    Unsorted,
}

impl SortField {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("date") => SortField::Date,
            Some("title") => SortField::Title,
            Some("readTime") | Some("read_time") => SortField::ReadTime,
            Some(_) => SortField::Unsorted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Normalized list criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<PostStatus>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            category: None,
            status: None,
            sort_by: SortField::Date,
            sort_order: SortOrder::Desc,
        }
    }
}

impl ListQuery {
    /// Normalize raw parameters; absent or malformed values fall back to defaults.
    pub fn from_params(params: &ListParams) -> Self {
        let page = parse_positive(params.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        let page_size = parse_positive(params.page_size.as_deref())
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);

        let search = non_blank(params.search.as_deref());
        let category = non_blank(params.category.as_deref()).filter(|c| !is_all_categories(c));
        let status = params.status.as_deref().and_then(PostStatus::parse);

        Self {
            page,
            page_size,
            search,
            category,
            status,
            sort_by: SortField::parse(params.sort_by.as_deref()),
            sort_order: SortOrder::parse(params.sort_order.as_deref()),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n >= 1)
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn is_all_categories(category: &str) -> bool {
    category.eq_ignore_ascii_case(ALL_CATEGORIES) || category.eq_ignore_ascii_case("all")
}

/// Pagination metadata returned with every listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub page_size: u32,
}

impl PageMeta {
    pub fn paged(query: &ListQuery, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(u64::from(query.page_size));
        Self {
            current_page: query.page,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
            total_count,
            page_size: query.page_size,
        }
    }

    /// Metadata for a featured listing: one page sized by the requested limit.
    pub fn featured(count: usize, limit: u32) -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_count: u64::try_from(count).unwrap_or(u64::MAX),
            page_size: limit,
        }
    }
}

/// Ordering behind the title collation: case-insensitive first, then a
/// case-sensitive tiebreak so the order is total.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Describes how one table is listed.
#[derive(Debug, Clone, Copy)]
pub struct Listing {
    pub table: &'static str,
    pub columns: &'static str,
    /// Lowercased column holding every searchable field, see [`search_text`]
    pub search_column: &'static str,
    pub date_column: &'static str,
    pub read_time_column: Option<&'static str>,
    /// Fixed predicate applied before any caller filter
    pub scope: Option<&'static str>,
    /// Whether the caller may narrow the listing by post status
    pub status_filter: bool,
}

impl Listing {
    /// `SELECT COUNT(*)` over the filtered rows.
    pub fn count_query(&self, query: &ListQuery) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", self.table));
        self.push_filters(&mut qb, query);
        qb
    }

    /// One page of the filtered rows, in the requested order.
    pub fn page_query(&self, query: &ListQuery) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM {}", self.columns, self.table));
        self.push_filters(&mut qb, query);
        self.push_order(&mut qb, query);
        qb.push(" LIMIT ")
            .push_bind(i64::from(query.page_size))
            .push(" OFFSET ")
            .push_bind(query.offset());
        qb
    }

    fn push_filters(&self, qb: &mut QueryBuilder<'static, Sqlite>, query: &ListQuery) {
        qb.push(" WHERE 1 = 1");

        if let Some(scope) = self.scope {
            qb.push(" AND ").push(scope);
        }

        if self.status_filter {
            if let Some(status) = query.status {
                qb.push(" AND status = ").push_bind(status.as_str());
            }
        }

        if let Some(term) = &query.search {
            qb.push(" AND ")
                .push(self.search_column)
                .push(" LIKE ")
                .push_bind(like_pattern(term))
                .push(" ESCAPE '\\'");
        }

        if let Some(category) = &query.category {
            qb.push(" AND category = ").push_bind(category.clone());
        }
    }

    fn push_order(&self, qb: &mut QueryBuilder<'static, Sqlite>, query: &ListQuery) {
        let direction = query.sort_order.as_sql();
        let key = match query.sort_by {
            SortField::Date => Some(self.date_column.to_string()),
            SortField::Title => Some(format!("title COLLATE {}", TITLE_COLLATION)),
            SortField::ReadTime => self.read_time_column.map(str::to_string),
            SortField::Unsorted => None,
        };

        match key {
            Some(key) => qb.push(format!(" ORDER BY {} {}, rowid ASC", key, direction)),
            None => qb.push(" ORDER BY rowid ASC"),
        };
    }
}

/// Searchable text of one row: every field lowercased with full Unicode
/// case folding, one field per line so a match never spans two fields.
pub fn search_text<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    fields
        .into_iter()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Substring pattern against a [`search_text`] column, with LIKE wildcards
/// escaped. The term is folded the same way the column is.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSTS: Listing = Listing {
        table: "posts",
        columns: "id, title",
        search_column: "search_text",
        date_column: "published_at",
        read_time_column: Some("read_time"),
        scope: Some("status = 'published'"),
        status_filter: false,
    };

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_repeated_keys_last_wins() {
        let q = ListQuery::from_params(&params(&[("page", "1"), ("page", "2"), ("page", "x")]));
        assert_eq!(q.page, 1);

        let q = ListQuery::from_params(&params(&[("page", "1"), ("page", "2")]));
        assert_eq!(q.page, 2);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let q = ListQuery::from_params(&params(&[("utm_source", "feed"), ("pageSize", "5")]));
        assert_eq!(q.page_size, 5);
    }

    #[test]
    fn test_featured_limit_from_pairs() {
        let pairs = vec![
            ("limit".to_string(), "7".to_string()),
            ("limit".to_string(), "4".to_string()),
        ];
        assert_eq!(pairs.into_iter().collect::<FeaturedParams>().limit(), 4);
        assert_eq!(FeaturedParams::default().limit(), DEFAULT_FEATURED_LIMIT);
    }

    #[test]
    fn test_defaults_when_absent() {
        assert_eq!(ListQuery::from_params(&ListParams::default()), ListQuery::default());
    }

    #[test]
    fn test_malformed_numbers_fall_back() {
        let q = ListQuery::from_params(&params(&[("page", "zero"), ("pageSize", "-5")]));
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, 10);

        let q = ListQuery::from_params(&params(&[("page", "0"), ("pageSize", "0")]));
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, 10);
    }

    #[test]
    fn test_page_size_is_capped() {
        let q = ListQuery::from_params(&params(&[("pageSize", "5000")]));
        assert_eq!(q.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_category_sentinel_and_blank_mean_no_filter() {
        for raw in ["All Categories", "all categories", "all", "   "] {
            let q = ListQuery::from_params(&params(&[("category", raw)]));
            assert_eq!(q.category, None, "{:?}", raw);
        }
        let q = ListQuery::from_params(&params(&[("category", " Rust ")]));
        assert_eq!(q.category.as_deref(), Some("Rust"));
    }

    #[test]
    fn test_sort_parsing() {
        let q = ListQuery::from_params(&params(&[("sortBy", "title"), ("sortOrder", "ASC")]));
        assert_eq!(q.sort_by, SortField::Title);
        assert_eq!(q.sort_order, SortOrder::Asc);

        let q = ListQuery::from_params(&params(&[("sortBy", "readTime"), ("sortOrder", "up")]));
        assert_eq!(q.sort_by, SortField::ReadTime);
        assert_eq!(q.sort_order, SortOrder::Desc);

        let q = ListQuery::from_params(&params(&[("sortBy", "popularity")]));
        assert_eq!(q.sort_by, SortField::Unsorted);
    }

    #[test]
    fn test_unknown_status_is_ignored() {
        let q = ListQuery::from_params(&params(&[("status", "archived")]));
        assert_eq!(q.status, None);
        let q = ListQuery::from_params(&params(&[("status", "draft")]));
        assert_eq!(q.status, Some(PostStatus::Draft));
    }

    #[test]
    fn test_offset() {
        let q = ListQuery::from_params(&params(&[("page", "3"), ("pageSize", "10")]));
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn test_page_meta_math() {
        let q = |page: u32, page_size: u32| ListQuery {
            page,
            page_size,
            ..ListQuery::default()
        };
        assert_eq!(PageMeta::paged(&q(2, 10), 25).total_pages, 3);
        assert_eq!(PageMeta::paged(&q(1, 10), 20).total_pages, 2);
        assert_eq!(PageMeta::paged(&q(1, 10), 0).total_pages, 0);

        let past_end = PageMeta::paged(&q(9, 10), 25);
        assert_eq!(past_end.current_page, 9);
        assert_eq!(past_end.total_pages, 3);
        assert_eq!(past_end.total_count, 25);
    }

    #[test]
    fn test_featured_meta_reports_limit() {
        let meta = PageMeta::featured(2, 5);
        assert_eq!(
            meta,
            PageMeta {
                current_page: 1,
                total_pages: 1,
                total_count: 2,
                page_size: 5
            }
        );
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Rust"), "%rust%");
        assert_eq!(like_pattern("100%_off\\"), "%100\\%\\_off\\\\%");
        assert_eq!(like_pattern("Über"), "%über%");
    }

    #[test]
    fn test_search_text_folds_unicode_per_field() {
        assert_eq!(
            search_text(["Über Rust", "<p>ÉTÉ</p>", "Tokio"]),
            "über rust\n<p>été</p>\ntokio"
        );
    }

    #[test]
    fn test_compare_titles() {
        assert_eq!(compare_titles("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_titles("Zebra", "alpha"), Ordering::Greater);
        assert_ne!(compare_titles("Rust", "rust"), Ordering::Equal);
        assert_eq!(compare_titles("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_page_query_sql_shape() {
        let q = ListQuery::from_params(&params(&[
            ("search", "tokio"),
            ("category", "Rust"),
            ("sortBy", "title"),
            ("sortOrder", "asc"),
        ]));
        let qb = POSTS.page_query(&q);
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT id, title FROM posts WHERE 1 = 1"));
        assert!(sql.contains("AND status = 'published'"));
        assert!(sql.contains("AND search_text LIKE ? ESCAPE '\\'"));
        assert!(sql.contains("AND category = ?"));
        assert!(sql.contains("ORDER BY title COLLATE TITLE_ORDER ASC, rowid ASC"));
        assert!(sql.ends_with("LIMIT ? OFFSET ?"));
    }

    #[test]
    fn test_unsorted_keeps_insertion_order() {
        let q = ListQuery::from_params(&params(&[("sortBy", "views")]));
        let qb = POSTS.page_query(&q);
        assert!(qb.sql().contains(" ORDER BY rowid ASC LIMIT"));
    }

    #[test]
    fn test_status_filter_only_when_enabled() {
        let q = ListQuery::from_params(&params(&[("status", "draft")]));
        assert!(!POSTS.count_query(&q).sql().contains("status = ?"));

        let admin = Listing {
            scope: None,
            status_filter: true,
            ..POSTS
        };
        assert!(admin.count_query(&q).sql().contains("AND status = ?"));
    }
}
