// src/query.rs

//! Query-string construction for the content backend.
//!
//! An [`ArticleQuery`] describes relation population, sort keys, exact-match
//! filters, an optional substring search and pagination. [`ArticleQuery::to_query_string`]
//! encodes it in the backend's bracket syntax:
//!
//! ```text
//! populate[]=cover&populate[]=author
//! sort[0]=publishedAt:desc
//! filters[slug][$eq]=hello
//! filters[category][slug][$eq]=rust
//! filters[$or][0][title][$containsi]=q&filters[$or][1][description][$containsi]=q&...
//! pagination[page]=1&pagination[pageSize]=20
//! ```
//!
//! Values are not validated beyond string coercion; callers sanitize input.

use std::fmt;

use url::form_urlencoded;

/// Fields matched by a substring search, each becoming one OR branch.
pub const SEARCH_FIELDS: [&str; 3] = ["title", "description", "content"];

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// One sort key, encoded as `field:direction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.direction.as_str())
    }
}

/// Which relations to expand in the response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Populate {
    /// Backend default (no relations).
    #[default]
    None,
    /// Expand every relation one level deep (`populate=*`).
    All,
    /// Expand the named relations, in order.
    Fields(Vec<String>),
}

/// Page selection. Unset fields fall back to the backend default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Structured request against a content collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleQuery {
    pub populate: Populate,
    pub sort: Vec<SortKey>,
    /// Field to exact-match value, in insertion order.
    pub filters: Vec<(String, String)>,
    pub search: Option<String>,
    pub pagination: PageRequest,
}

impl ArticleQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand the given relations (replaces any earlier populate setting).
    pub fn populate<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.populate = Populate::Fields(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Expand every relation.
    pub fn populate_all(mut self) -> Self {
        self.populate = Populate::All;
        self
    }

    /// Append a sort key; the first key has the highest priority.
    pub fn sort(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }

    /// Add an equality filter. Dotted names address relation fields.
    pub fn filter(mut self, field: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((field.into(), value.to_string()));
        self
    }

    /// Case-insensitive substring search across [`SEARCH_FIELDS`].
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.pagination.page = Some(page);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.pagination.page_size = Some(page_size);
        self
    }

    /// Ordered key/value pairs before URL encoding.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        match &self.populate {
            Populate::None => {}
            Populate::All => pairs.push(("populate".to_string(), "*".to_string())),
            Populate::Fields(fields) => {
                for field in fields {
                    pairs.push(("populate[]".to_string(), field.clone()));
                }
            }
        }

        for (i, key) in self.sort.iter().enumerate() {
            pairs.push((format!("sort[{i}]"), key.to_string()));
        }

        for (field, value) in &self.filters {
            pairs.push((format!("filters{}[$eq]", field_path(field)), value.clone()));
        }

        if let Some(text) = &self.search {
            for (i, field) in SEARCH_FIELDS.iter().enumerate() {
                pairs.push((
                    format!("filters[$or][{i}][{field}][$containsi]"),
                    text.clone(),
                ));
            }
        }

        if let Some(page) = self.pagination.page {
            pairs.push(("pagination[page]".to_string(), page.to_string()));
        }
        if let Some(size) = self.pagination.page_size {
            pairs.push(("pagination[pageSize]".to_string(), size.to_string()));
        }

        pairs
    }

    /// Form-urlencoded query string, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.to_pairs() {
            serializer.append_pair(&key, &value);
        }
        serializer.finish()
    }
}

/// `category.slug` -> `[category][slug]`.
fn field_path(field: &str) -> String {
    field
        .split('.')
        .filter(|part| !part.is_empty())
        .map(|part| format!("[{part}]"))
        .collect()
}
