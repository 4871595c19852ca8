//! 可分享的地址参数
//!
//! 当前筛选与分页状态写入地址查询串（page, limit, query, genre, country, rating, years, age），
//! 重新打开地址时据此还原状态。

use url::form_urlencoded;

use crate::models::{validate_limit, AgeRating, FilterSelection, RatingRange, YearRange};

/// 默认单页条数
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// 地址中携带的浏览状态
#[derive(Debug, Clone, PartialEq)]
pub struct UrlState {
    pub page: u32,
    pub limit: u32,
    pub filters: FilterSelection,
}

impl Default for UrlState {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            filters: FilterSelection::default(),
        }
    }
}

impl UrlState {
    pub fn new(page: u32, limit: u32, filters: FilterSelection) -> Self {
        Self { page, limit, filters }
    }

    /// 生成查询串（不带前导 `?`），参数顺序固定
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("page", &self.page.to_string());
        serializer.append_pair("limit", &self.limit.to_string());

        let filters = &self.filters;
        if filters.has_text_query() {
            serializer.append_pair("query", filters.query());
        }
        for genre in filters.genres() {
            serializer.append_pair("genre", genre);
        }
        if let Some(country) = filters.country() {
            serializer.append_pair("country", country);
        }
        if let Some(rating) = filters.rating() {
            serializer.append_pair("rating", &rating.to_string());
        }
        if let Some(years) = filters.years() {
            serializer.append_pair("years", &years.to_string());
        }
        if let Some(age) = filters.age_rating() {
            serializer.append_pair("age", &age.to_string());
        }

        serializer.finish()
    }

    /// 解析查询串或完整地址
    ///
    /// 无法解析的参数被忽略（记录警告），不会让整个地址失效。
    /// 同时带有 `query` 和其它筛选参数时以 `query` 为准。
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let query = if input.contains("://") {
            match url::Url::parse(input) {
                Ok(url) => url.query().unwrap_or_default().to_string(),
                Err(e) => {
                    tracing::warn!("Ignoring unparsable url {}: {}", input, e);
                    String::new()
                }
            }
        } else {
            input.trim_start_matches('?').to_string()
        };

        let mut state = UrlState::default();
        let mut text_query: Option<String> = None;
        let mut genres: Vec<String> = Vec::new();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match &*key {
                "page" => match value.parse::<u32>() {
                    Ok(page) if page >= 1 => state.page = page,
                    _ => tracing::warn!("Ignoring invalid page parameter: {}", value),
                },
                "limit" => match value.parse::<u32>().ok().and_then(|l| validate_limit(l).ok()) {
                    Some(limit) => state.limit = limit,
                    None => tracing::warn!("Ignoring invalid limit parameter: {}", value),
                },
                "query" => text_query = Some(value.into_owned()),
                "genre" => genres.push(value.into_owned()),
                "country" => state.filters.set_country(Some(value.into_owned())),
                "rating" => match value.parse::<RatingRange>() {
                    Ok(range) => state.filters.set_rating(Some(range)),
                    Err(e) => tracing::warn!("Ignoring rating parameter: {}", e),
                },
                "years" => match value.parse::<YearRange>() {
                    Ok(range) => state.filters.set_years(Some(range)),
                    Err(e) => tracing::warn!("Ignoring years parameter: {}", e),
                },
                "age" => match value.parse::<AgeRating>() {
                    Ok(age) => state.filters.set_age_rating(Some(age)),
                    Err(e) => tracing::warn!("Ignoring age parameter: {}", e),
                },
                other => tracing::debug!("Ignoring unknown url parameter: {}", other),
            }
        }

        if !genres.is_empty() {
            state.filters.set_genres(genres);
        }
        if let Some(text) = text_query {
            state.filters.set_query(&text);
        }

        state
    }
}
