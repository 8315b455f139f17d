//! Query-string builder for list endpoints.

use std::fmt;

use shopease_core::{PageRequest, Price};

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Sort direction for `sortBy` / `sortByPrice`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Filters, sort and page for a list request.
///
/// Filtering happens on the server. The same query with a higher page
/// returns the next slice of the same ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    search: Option<String>,
    category: Option<String>,
    min_price: Option<Price>,
    max_price: Option<Price>,
    sort_by: Option<String>,
    sort_by_price: Option<SortOrder>,
    order: Option<SortOrder>,
    page: PageRequest,
}

impl ListQuery {
    #[must_use]
    pub fn new(page: PageRequest) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// Free-text search. Blank input clears the filter.
    #[must_use]
    pub fn search(mut self, search: impl AsRef<str>) -> Self {
        let trimmed = search.as_ref().trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Category filter. `"All"` or blank clears the filter.
    #[must_use]
    pub fn category(mut self, category: impl AsRef<str>) -> Self {
        let trimmed = category.as_ref().trim();
        self.category =
            (!trimmed.is_empty() && trimmed != ALL_CATEGORIES).then(|| trimmed.to_string());
        self
    }

    #[must_use]
    pub const fn min_price(mut self, price: Price) -> Self {
        self.min_price = Some(price);
        self
    }

    #[must_use]
    pub const fn max_price(mut self, price: Price) -> Self {
        self.max_price = Some(price);
        self
    }

    /// Sort by a named field (`likes`, `postTime`, ...) in `order`.
    #[must_use]
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.order = Some(order);
        self
    }

    /// Sort the product browser by price.
    #[must_use]
    pub const fn sort_by_price(mut self, order: SortOrder) -> Self {
        self.sort_by_price = Some(order);
        self
    }

    #[must_use]
    pub const fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub const fn page(&self) -> PageRequest {
        self.page
    }

    /// Same filters, next page.
    #[must_use]
    pub fn next_page(&self) -> Self {
        self.clone().with_page(self.page.next())
    }

    /// Whether two queries select the same result set (page ignored).
    #[must_use]
    pub fn same_filters(&self, other: &Self) -> bool {
        self.search == other.search
            && self.category == other.category
            && self.min_price == other.min_price
            && self.max_price == other.max_price
            && self.sort_by == other.sort_by
            && self.sort_by_price == other.sort_by_price
            && self.order == other.order
    }

    /// Query-string pairs in the backend's parameter names.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(9);
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(min) = self.min_price {
            params.push(("minPrice", min.amount().to_string()));
        }
        if let Some(max) = self.max_price {
            params.push(("maxPrice", max.amount().to_string()));
        }
        if let Some(sort_by) = &self.sort_by {
            params.push(("sortBy", sort_by.clone()));
        }
        if let Some(order) = self.sort_by_price {
            params.push(("sortByPrice", order.to_string()));
        }
        if let Some(order) = self.order {
            params.push(("order", order.to_string()));
        }
        params.push(("page", self.page.page().to_string()));
        params.push(("limit", self.page.limit().to_string()));
        params
    }
}
