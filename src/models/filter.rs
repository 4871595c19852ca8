use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// 单页条数上限（接口允许的最大 limit）
pub const MAX_PAGE_LIMIT: u32 = 250;

/// 评分的取值范围
pub const RATING_MIN: f32 = 0.0;
pub const RATING_MAX: f32 = 10.0;

/// 年份的取值范围（最早的电影到可预见的上映计划）
pub const YEAR_MIN: i32 = 1874;
pub const YEAR_MAX: i32 = 2100;

/// 筛选条件校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid rating range: {0}-{1} (must satisfy 0 <= min <= max <= 10)")]
    InvalidRatingRange(f32, f32),

    #[error("Invalid year range: {0}-{1} (must satisfy 1874 <= start <= end <= 2100)")]
    InvalidYearRange(i32, i32),

    #[error("Invalid page limit: {0} (must be between 1 and 250)")]
    InvalidLimit(u32),

    #[error("Cannot parse '{0}' as a range")]
    Unparsable(String),
}

/// 评分区间（闭区间，imdb 评分）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingRange {
    min: f32,
    max: f32,
}

impl RatingRange {
    pub fn new(min: f32, max: f32) -> Result<Self, FilterError> {
        let valid = min.is_finite()
            && max.is_finite()
            && (RATING_MIN..=RATING_MAX).contains(&min)
            && (RATING_MIN..=RATING_MAX).contains(&max)
            && min <= max;
        if !valid {
            return Err(FilterError::InvalidRatingRange(min, max));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }
}

impl fmt::Display for RatingRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

impl FromStr for RatingRange {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lo, hi) = split_range(s)?;
        let min = lo.parse::<f32>().map_err(|_| FilterError::Unparsable(s.to_string()))?;
        let max = hi.parse::<f32>().map_err(|_| FilterError::Unparsable(s.to_string()))?;
        Self::new(min, max)
    }
}

/// 年份区间（闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self, FilterError> {
        // 每个年份都会展开成一个查询参数，区间必须有界
        if start > end || start < YEAR_MIN || end > YEAR_MAX {
            return Err(FilterError::InvalidYearRange(start, end));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    /// 区间内的每一个年份，查询时逐个展开为 `year` 参数
    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.start..=self.end
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for YearRange {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // 单个年份视为 start == end
        if let Ok(year) = trimmed.parse::<i32>() {
            return Self::new(year, year);
        }
        let (lo, hi) = split_range(trimmed)?;
        let start = lo.parse::<i32>().map_err(|_| FilterError::Unparsable(s.to_string()))?;
        let end = hi.parse::<i32>().map_err(|_| FilterError::Unparsable(s.to_string()))?;
        Self::new(start, end)
    }
}

fn split_range(s: &str) -> Result<(&str, &str), FilterError> {
    s.trim()
        .split_once('-')
        .map(|(lo, hi)| (lo.trim(), hi.trim()))
        .filter(|(lo, hi)| !lo.is_empty() && !hi.is_empty())
        .ok_or_else(|| FilterError::Unparsable(s.to_string()))
}

/// 年龄分级（0, 6, 12, 16, 18 ...）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgeRating(pub u8);

impl fmt::Display for AgeRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AgeRating {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .trim_end_matches('+')
            .parse::<u8>()
            .map(AgeRating)
            .map_err(|_| FilterError::Unparsable(s.to_string()))
    }
}

/// 取数方式：按名称搜索，或按筛选条件列出
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchMode {
    Search(String),
    Filtered,
}

impl FetchMode {
    pub fn is_search(&self) -> bool {
        matches!(self, FetchMode::Search(_))
    }
}

/// 当前筛选条件
///
/// 文本搜索与其它所有维度互斥：设置非空搜索词会清空其它维度，
/// 设置任何其它维度都会清空搜索词。字段私有，只能通过下面的方法修改。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    query: String,
    genres: Vec<String>,
    country: Option<String>,
    age_rating: Option<AgeRating>,
    rating: Option<RatingRange>,
    years: Option<YearRange>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn age_rating(&self) -> Option<AgeRating> {
        self.age_rating
    }

    pub fn rating(&self) -> Option<RatingRange> {
        self.rating
    }

    pub fn years(&self) -> Option<YearRange> {
        self.years
    }

    pub fn has_text_query(&self) -> bool {
        !self.query.is_empty()
    }

    /// 是否有任意非文本维度生效
    pub fn has_dimensions(&self) -> bool {
        !self.genres.is_empty()
            || self.country.is_some()
            || self.age_rating.is_some()
            || self.rating.is_some()
            || self.years.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_text_query() && !self.has_dimensions()
    }

    pub fn mode(&self) -> FetchMode {
        if self.has_text_query() {
            FetchMode::Search(self.query.clone())
        } else {
            FetchMode::Filtered
        }
    }

    /// 空白搜索词视为未启用，不会清空其它维度
    pub fn set_query(&mut self, query: &str) {
        if query.trim().is_empty() {
            self.query.clear();
            return;
        }
        self.clear_dimensions();
        self.query = query.to_string();
    }

    /// 替换类型集合（去重、保持选择顺序）
    pub fn set_genres<I, S>(&mut self, genres: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.clear();
        let mut unique: Vec<String> = Vec::new();
        for genre in genres {
            let genre = genre.into();
            let genre = genre.trim();
            if !genre.is_empty() && !unique.iter().any(|g| g == genre) {
                unique.push(genre.to_string());
            }
        }
        self.genres = unique;
    }

    pub fn set_country(&mut self, country: Option<String>) {
        self.query.clear();
        self.country = country
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
    }

    pub fn set_age_rating(&mut self, age_rating: Option<AgeRating>) {
        self.query.clear();
        self.age_rating = age_rating;
    }

    pub fn set_rating(&mut self, rating: Option<RatingRange>) {
        self.query.clear();
        self.rating = rating;
    }

    pub fn set_years(&mut self, years: Option<YearRange>) {
        self.query.clear();
        self.years = years;
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.clear_dimensions();
    }

    fn clear_dimensions(&mut self) {
        self.genres.clear();
        self.country = None;
        self.age_rating = None;
        self.rating = None;
        self.years = None;
    }
}

/// 校验单页条数
pub fn validate_limit(limit: u32) -> Result<u32, FilterError> {
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(FilterError::InvalidLimit(limit));
    }
    Ok(limit)
}
