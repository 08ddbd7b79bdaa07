use serde::{Deserialize, Serialize};

/// Raw page/limit query parameters as sent by the client.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Page window translated to an offset against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
    pub skip: i64,
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Clamps page to >= 1 and limit to [1, 100]; defaults are page 1, limit 10.
pub fn parse_pagination(query: &PageQuery) -> PageWindow {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    PageWindow {
        page,
        limit,
        skip: (page - 1) * limit,
    }
}

impl PageMeta {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_params_absent() {
        let window = parse_pagination(&PageQuery::default());
        assert_eq!(window, PageWindow { page: 1, limit: 10, skip: 0 });
    }

    #[test]
    fn page_zero_clamps_to_one() {
        let window = parse_pagination(&PageQuery { page: Some(0), limit: None });
        assert_eq!(window.page, 1);
        assert_eq!(window.skip, 0);
    }

    #[test]
    fn negative_page_clamps_to_one() {
        let window = parse_pagination(&PageQuery { page: Some(-3), limit: Some(20) });
        assert_eq!(window.page, 1);
        assert_eq!(window.skip, 0);
    }

    #[test]
    fn limit_clamps_to_hundred() {
        let window = parse_pagination(&PageQuery { page: None, limit: Some(1000) });
        assert_eq!(window.limit, 100);
    }

    #[test]
    fn limit_zero_clamps_to_one() {
        let window = parse_pagination(&PageQuery { page: None, limit: Some(0) });
        assert_eq!(window.limit, 1);
    }

    #[test]
    fn skip_is_derived_from_page_and_limit() {
        let window = parse_pagination(&PageQuery { page: Some(3), limit: Some(25) });
        assert_eq!(window.skip, 50);
    }

    #[test]
    fn meta_rounds_total_pages_up() {
        let meta = PageMeta::new(25, 2, 10);
        assert_eq!(meta, PageMeta { page: 2, limit: 10, total: 25, total_pages: 3 });
    }

    #[test]
    fn meta_for_empty_result_has_zero_pages() {
        assert_eq!(PageMeta::new(0, 1, 10).total_pages, 0);
    }
}
