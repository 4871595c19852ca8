//! 请求路径与查询串构建
//!
//! 参数顺序固定，便于缓存键、日志和测试比对：
//! page, limit, ageRating, genres.name*, rating.imdb, countries.name, year*

use crate::models::{FilterField, FilterSelection};

/// 按筛选条件列出电影：`/movie?...`
pub fn movie_list_path(page: u32, limit: u32, filters: &FilterSelection) -> String {
    let mut query = format!("/movie?page={}&limit={}", page, limit);

    if let Some(age) = filters.age_rating() {
        query.push_str(&format!("&ageRating={}", age));
    }

    for genre in filters.genres() {
        query.push_str(&format!("&genres.name={}", urlencoding::encode(genre)));
    }

    if let Some(rating) = filters.rating() {
        query.push_str(&format!(
            "&rating.imdb={}",
            urlencoding::encode(&rating.to_string())
        ));
    }

    if let Some(country) = filters.country() {
        query.push_str(&format!("&countries.name={}", urlencoding::encode(country)));
    }

    // 年份区间展开为逐年参数
    if let Some(years) = filters.years() {
        for year in years.years() {
            query.push_str(&format!("&year={}", year));
        }
    }

    query
}

/// 按名称搜索：`/movie/search?page&limit&query`
pub fn movie_search_path(page: u32, limit: u32, name: &str) -> String {
    format!(
        "/movie/search?page={}&limit={}&query={}",
        page,
        limit,
        urlencoding::encode(name)
    )
}

pub fn movie_detail_path(id: u64) -> String {
    format!("/movie/{}", id)
}

pub fn studio_list_path(page: u32, limit: u32) -> String {
    format!("/studio?page={}&limit={}", page, limit)
}

pub fn possible_values_path(field: FilterField) -> String {
    format!("/movie/possible-values-by-field?field={}", field.as_str())
}
