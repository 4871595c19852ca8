use serde::{Deserialize, Deserializer, Serialize};

/// 海报缺失或加载失败时使用的占位图
pub const PLACEHOLDER_POSTER: &str =
    "https://yastatic.net/s3/kinopoisk-frontend/common-static/img/projector-logo/placeholder.svg";

/// 容错解析 ID：字符串、负数、小数等非法值都视为缺失
///
/// 单条脏数据不应让整页解析失败，缺失 ID 的条目在渲染时被跳过。
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let id = value.as_u64();
    if id.is_none() && !value.is_null() {
        tracing::debug!("Ignoring malformed id: {}", value);
    }
    Ok(id)
}

/// 电影条目（列表、详情和收藏共用）
///
/// 字段命名与接口返回的 JSON 保持一致（camelCase），收藏持久化时也按同样格式写入。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    /// 服务端分配的 ID，个别脏数据可能缺失
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alternative_name: Option<String>,
    #[serde(default)]
    pub poster: Option<Poster>,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub genres: Vec<NamedItem>,
    #[serde(default)]
    pub countries: Vec<NamedItem>,
    #[serde(default)]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub similar_movies: Vec<SimilarMovie>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poster {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

/// 评分，来源为 imdb 与 kp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(default)]
    pub imdb: Option<f32>,
    #[serde(default)]
    pub kp: Option<f32>,
}

/// 只有名称的引用（类型、国家）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedItem {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub en_name: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
}

impl Person {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.en_name.as_deref())
            .unwrap_or("—")
    }
}

/// 相似电影引用
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarMovie {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster: Option<Poster>,
}

impl MovieSummary {
    /// 显示名称：优先使用主名称，其次别名
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.alternative_name.as_deref().filter(|n| !n.is_empty()))
            .unwrap_or("Untitled")
    }

    pub fn poster_url(&self) -> &str {
        self.poster
            .as_ref()
            .and_then(|p| p.url.as_deref())
            .filter(|u| !u.is_empty())
            .unwrap_or(PLACEHOLDER_POSTER)
    }

    pub fn imdb_rating(&self) -> Option<f32> {
        self.rating.as_ref().and_then(|r| r.imdb)
    }

    pub fn kp_rating(&self) -> Option<f32> {
        self.rating.as_ref().and_then(|r| r.kp)
    }

    /// ID 缺失的条目不参与渲染
    pub fn has_valid_id(&self) -> bool {
        self.id.is_some()
    }

    pub fn genre_names(&self) -> Vec<&str> {
        self.genres.iter().map(|g| g.name.as_str()).collect()
    }

    pub fn country_names(&self) -> Vec<&str> {
        self.countries.iter().map(|c| c.name.as_str()).collect()
    }

    /// 有海报的相似电影（详情页只展示这些）
    pub fn similar_with_posters(&self) -> impl Iterator<Item = (&SimilarMovie, &str)> {
        self.similar_movies.iter().filter_map(|m| {
            let url = m.poster.as_ref()?.url.as_deref()?;
            m.id?;
            Some((m, url))
        })
    }
}

/// 分页列表响应：`{ docs, pages }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoviePage {
    #[serde(default)]
    pub docs: Vec<MovieSummary>,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
}

/// 筛选项候选值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// 可以查询候选值的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Genres,
    Countries,
    ContentType,
}

impl FilterField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Genres => "genres.name",
            FilterField::Countries => "countries.name",
            FilterField::ContentType => "type",
        }
    }
}

impl std::fmt::Display for FilterField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 制片公司
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Studio {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub studio_type: Option<String>,
    #[serde(default)]
    pub sub_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudioPage {
    #[serde(default)]
    pub docs: Vec<Studio>,
    #[serde(default)]
    pub pages: u32,
}
