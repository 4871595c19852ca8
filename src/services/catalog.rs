//! 电影列表浏览核心
//!
//! 负责筛选条件、分页、无限滚动累积和地址同步：
//! - 任一筛选维度变化都会重置分页，并让之前发出的请求失效
//! - 每个请求都带有 `FetchTag`（代号 + 页码），返回时代号不匹配就丢弃
//! - 同一时间只允许一个“加载更多”请求
//!
//! `CatalogState` 是不含 IO 的状态机，`CatalogBrowser` 负责发请求、防抖和广播快照。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use super::debounce::Debouncer;
use super::history::SearchHistory;
use super::url_state::{UrlState, DEFAULT_PAGE_LIMIT};
use crate::external::{ApiError, CatalogApi};
use crate::models::{
    validate_limit, AgeRating, FetchMode, FilterError, FilterSelection, MoviePage, MovieSummary,
    RatingRange, YearRange,
};
use crate::storage::KeyValueStore;

/// 文本搜索的防抖窗口
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(1000);
/// 滚动触发的防抖窗口
pub const SCROLL_DEBOUNCE: Duration = Duration::from_millis(200);
/// 距离内容底部多少像素内视为“接近底部”
pub const SCROLL_PROXIMITY_PX: f64 = 200.0;

/// 请求标签：发出请求时的状态代号与页码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTag {
    pub generation: u64,
    pub page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// 重新拉取第一页并替换列表
    Reset,
    /// 拉取下一页并追加
    Append,
}

/// 一次待发出的请求
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub tag: FetchTag,
    pub kind: FetchKind,
    pub mode: FetchMode,
    pub limit: u32,
    pub filters: FilterSelection,
}

/// 一次取数的结果
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loaded { page: u32, received: usize },
    /// 返回时状态已变化，结果被丢弃
    Discarded,
    /// 被并发保护或“没有更多”拦下，没有发请求
    Skipped,
    Failed(ApiError),
}

impl FetchOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, FetchOutcome::Loaded { .. })
    }
}

/// 视口滚动位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

impl ScrollMetrics {
    pub fn is_near_bottom(&self) -> bool {
        self.scroll_top + self.client_height >= self.scroll_height - SCROLL_PROXIMITY_PX
    }
}

/// 分页与累积结果
#[derive(Debug, Clone)]
pub struct PaginationState {
    page: u32,
    limit: u32,
    total_pages: u32,
    accumulated: Vec<MovieSummary>,
    visible_len: usize,
    has_more: bool,
    is_loading: bool,
    is_loading_more: bool,
}

impl PaginationState {
    fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            total_pages: 0,
            accumulated: Vec::new(),
            visible_len: 0,
            has_more: true,
            is_loading: false,
            is_loading_more: false,
        }
    }
}

/// 浏览状态机（不做 IO）
#[derive(Debug, Clone)]
pub struct CatalogState {
    filters: FilterSelection,
    pagination: PaginationState,
    generation: u64,
    error: Option<ApiError>,
}

impl CatalogState {
    pub fn new(limit: u32) -> Self {
        Self {
            filters: FilterSelection::default(),
            pagination: PaginationState::new(limit),
            generation: 0,
            error: None,
        }
    }

    pub fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn page(&self) -> u32 {
        self.pagination.page
    }

    pub fn limit(&self) -> u32 {
        self.pagination.limit
    }

    pub fn total_pages(&self) -> u32 {
        self.pagination.total_pages
    }

    pub fn has_more(&self) -> bool {
        self.pagination.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.pagination.is_loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.pagination.is_loading_more
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn accumulated(&self) -> &[MovieSummary] {
        &self.pagination.accumulated
    }

    /// 可见窗口（累积列表的前缀），过滤掉没有 ID 的条目
    pub fn visible(&self) -> impl Iterator<Item = &MovieSummary> {
        self.pagination.accumulated[..self.pagination.visible_len]
            .iter()
            .filter(|m| m.has_valid_id())
    }

    /// 修改筛选条件并让当前周期失效
    pub fn update_filters(&mut self, apply: impl FnOnce(&mut FilterSelection)) {
        apply(&mut self.filters);
        self.invalidate();
    }

    pub fn replace_filters(&mut self, filters: FilterSelection) {
        self.filters = filters;
        self.invalidate();
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.pagination.limit = limit;
        self.invalidate();
    }

    /// 开启新周期：清空累积结果，之前发出的请求全部作废
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.error = None;
        let p = &mut self.pagination;
        p.page = 1;
        p.accumulated.clear();
        p.visible_len = 0;
        p.has_more = true;
        p.is_loading = true;
        p.is_loading_more = false;
    }

    /// 准备拉取第一页
    pub fn begin_reset(&mut self) -> FetchRequest {
        self.invalidate();
        self.request(FetchKind::Reset, 1)
    }

    /// 准备拉取下一页；正在加载、已到末尾或本周期已出错时返回 `None`
    pub fn begin_load_more(&mut self) -> Option<FetchRequest> {
        let p = &self.pagination;
        if p.is_loading || p.is_loading_more || !p.has_more || self.error.is_some() {
            return None;
        }
        let next_page = p.page + 1;
        self.pagination.is_loading_more = true;
        Some(self.request(FetchKind::Append, next_page))
    }

    fn request(&self, kind: FetchKind, page: u32) -> FetchRequest {
        FetchRequest {
            tag: FetchTag {
                generation: self.generation,
                page,
            },
            kind,
            mode: self.filters.mode(),
            limit: self.pagination.limit,
            filters: self.filters.clone(),
        }
    }

    /// 应用请求结果
    ///
    /// 代号不匹配的结果直接丢弃，不触碰任何字段（加载标志已由新周期重置）。
    pub fn complete(
        &mut self,
        request: &FetchRequest,
        result: Result<MoviePage, ApiError>,
    ) -> FetchOutcome {
        if request.tag.generation != self.generation {
            tracing::debug!(
                "Discarding stale page {} (generation {} != {})",
                request.tag.page,
                request.tag.generation,
                self.generation
            );
            return FetchOutcome::Discarded;
        }

        let p = &mut self.pagination;
        match request.kind {
            FetchKind::Reset => p.is_loading = false,
            FetchKind::Append => p.is_loading_more = false,
        }

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Fetching page {} failed: {}", request.tag.page, e);
                self.error = Some(e.clone());
                return FetchOutcome::Failed(e);
            }
        };

        let received = page.docs.len();
        match request.kind {
            FetchKind::Reset => {
                p.accumulated = page.docs;
                p.visible_len = received.min(p.limit as usize);
            }
            FetchKind::Append => {
                p.accumulated.extend(page.docs);
                p.visible_len = (p.visible_len + p.limit as usize).min(p.accumulated.len());
            }
        }
        p.page = request.tag.page;
        p.total_pages = page.pages;
        p.has_more = received > 0;
        self.error = None;

        tracing::debug!(
            "Loaded page {} ({} items, {} accumulated, {} pages total)",
            request.tag.page,
            received,
            p.accumulated.len(),
            p.total_pages
        );
        FetchOutcome::Loaded {
            page: request.tag.page,
            received,
        }
    }

    pub fn url_state(&self) -> UrlState {
        UrlState::new(self.pagination.page, self.pagination.limit, self.filters.clone())
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            filters: self.filters.clone(),
            mode: self.filters.mode(),
            page: self.pagination.page,
            limit: self.pagination.limit,
            total_pages: self.pagination.total_pages,
            accumulated_len: self.pagination.accumulated.len(),
            visible: self.visible().cloned().collect(),
            has_more: self.pagination.has_more,
            is_loading: self.pagination.is_loading,
            is_loading_more: self.pagination.is_loading_more,
            error: self.error.clone(),
            url_query: self.url_state().to_query_string(),
        }
    }
}

/// 提供给展示层的只读快照
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    pub filters: FilterSelection,
    pub mode: FetchMode,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub accumulated_len: usize,
    pub visible: Vec<MovieSummary>,
    pub has_more: bool,
    pub is_loading: bool,
    pub is_loading_more: bool,
    pub error: Option<ApiError>,
    pub url_query: String,
}

struct BrowserInner<A> {
    api: A,
    state: Mutex<CatalogState>,
    history: Mutex<SearchHistory>,
    updates: watch::Sender<CatalogSnapshot>,
}

impl<A: CatalogApi> BrowserInner<A> {
    fn state(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &CatalogState) {
        self.updates.send_replace(state.snapshot());
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut CatalogState) -> R) -> R {
        let mut state = self.state();
        let result = f(&mut state);
        self.publish(&state);
        result
    }

    async fn fetch_first_page(&self) -> FetchOutcome {
        let request = self.mutate(|state| state.begin_reset());
        self.run(request).await
    }

    async fn load_more(&self) -> FetchOutcome {
        match self.mutate(|state| state.begin_load_more()) {
            Some(request) => self.run(request).await,
            None => {
                tracing::debug!("Load more skipped");
                FetchOutcome::Skipped
            }
        }
    }

    async fn run(&self, request: FetchRequest) -> FetchOutcome {
        tracing::debug!(
            "Fetching page {} (limit {}, {:?}, generation {})",
            request.tag.page,
            request.limit,
            request.mode,
            request.tag.generation
        );
        let result = match &request.mode {
            FetchMode::Search(name) => {
                self.api
                    .search_movies(request.tag.page, request.limit, name)
                    .await
            }
            FetchMode::Filtered => {
                self.api
                    .list_movies(request.tag.page, request.limit, &request.filters)
                    .await
            }
        };
        self.mutate(|state| state.complete(&request, result))
    }
}

/// 浏览核心
///
/// 所有调用方（输入框、筛选项、滚动监听、地址还原）都通过这些方法下达指令，
/// 不直接修改共享状态。
pub struct CatalogBrowser<A> {
    inner: Arc<BrowserInner<A>>,
    search: Debouncer<()>,
    scroll: Debouncer<()>,
}

impl<A: CatalogApi + 'static> CatalogBrowser<A> {
    pub fn new(api: A, store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_limit(api, store, DEFAULT_PAGE_LIMIT)
    }

    pub fn with_limit(api: A, store: Arc<dyn KeyValueStore>, limit: u32) -> Self {
        let limit = validate_limit(limit).unwrap_or_else(|e| {
            tracing::warn!("{}, falling back to {}", e, DEFAULT_PAGE_LIMIT);
            DEFAULT_PAGE_LIMIT
        });
        let state = CatalogState::new(limit);
        let (updates, _) = watch::channel(state.snapshot());

        let inner = Arc::new(BrowserInner {
            api,
            state: Mutex::new(state),
            history: Mutex::new(SearchHistory::load(store)),
            updates,
        });

        let search_inner = inner.clone();
        let search = Debouncer::new(SEARCH_DEBOUNCE, move |()| {
            let inner = search_inner.clone();
            async move {
                inner.fetch_first_page().await;
            }
        });

        let scroll_inner = inner.clone();
        let scroll = Debouncer::new(SCROLL_DEBOUNCE, move |()| {
            let inner = scroll_inner.clone();
            async move {
                inner.load_more().await;
            }
        });

        Self {
            inner,
            search,
            scroll,
        }
    }

    /// 首次进入页面：按当前模式拉取第一页
    pub async fn refresh(&self) -> FetchOutcome {
        self.search.cancel();
        self.inner.fetch_first_page().await
    }

    /// 设置搜索词（防抖后按名称搜索）
    ///
    /// 非空搜索词会清空其它筛选维度，并记入搜索历史。
    pub fn set_text_query(&self, query: &str) {
        self.inner
            .mutate(|state| state.update_filters(|f| f.set_query(query)));

        let mut history = self.inner.history.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = history.record(query) {
            tracing::warn!("Failed to persist search history: {}", e);
        }
        drop(history);

        self.search.call(());
    }

    pub async fn set_genres(&self, genres: Vec<String>) -> FetchOutcome {
        self.change_filters(|f| f.set_genres(genres)).await
    }

    pub async fn set_country(&self, country: Option<String>) -> FetchOutcome {
        self.change_filters(|f| f.set_country(country)).await
    }

    pub async fn set_age_rating(&self, age_rating: Option<AgeRating>) -> FetchOutcome {
        self.change_filters(|f| f.set_age_rating(age_rating)).await
    }

    pub async fn set_rating_range(&self, rating: Option<RatingRange>) -> FetchOutcome {
        self.change_filters(|f| f.set_rating(rating)).await
    }

    pub async fn set_year_range(&self, years: Option<YearRange>) -> FetchOutcome {
        self.change_filters(|f| f.set_years(years)).await
    }

    /// 清空全部筛选条件
    pub async fn reset_filters(&self) -> FetchOutcome {
        self.change_filters(|f| f.clear()).await
    }

    /// 修改单页条数，按当前模式重新拉取
    pub async fn set_limit(&self, limit: u32) -> Result<FetchOutcome, FilterError> {
        let limit = validate_limit(limit)?;
        self.search.cancel();
        self.inner.mutate(|state| state.set_limit(limit));
        Ok(self.inner.fetch_first_page().await)
    }

    /// 非文本维度立即生效，不走防抖
    async fn change_filters(&self, apply: impl FnOnce(&mut FilterSelection)) -> FetchOutcome {
        self.search.cancel();
        self.inner.mutate(|state| state.update_filters(apply));
        self.inner.fetch_first_page().await
    }

    /// 加载下一页并追加
    pub async fn load_more(&self) -> FetchOutcome {
        self.inner.load_more().await
    }

    /// 滚动事件：接近底部时经防抖触发加载更多
    pub fn on_scroll(&self, metrics: ScrollMetrics) {
        if metrics.is_near_bottom() {
            self.on_scroll_near_bottom();
        }
    }

    pub fn on_scroll_near_bottom(&self) {
        self.scroll.call(());
    }

    /// 从地址还原状态，并补齐到地址中的页码
    pub async fn restore_from_url(&self, input: &str) -> FetchOutcome {
        let target = UrlState::parse(input);
        self.search.cancel();
        self.inner.mutate(|state| {
            state.set_limit(target.limit);
            state.replace_filters(target.filters.clone());
        });

        let mut outcome = self.inner.fetch_first_page().await;
        while outcome.is_loaded() {
            let (page, has_more, total_pages) = {
                let state = self.inner.state();
                (state.page(), state.has_more(), state.total_pages())
            };
            // 不超过服务端报告的总页数，地址里的页码不可信
            let past_last_page = total_pages > 0 && page >= total_pages;
            if page >= target.page || !has_more || past_last_page {
                break;
            }
            outcome = self.inner.load_more().await;
        }
        outcome
    }

    /// 离开页面：丢弃所有状态，回到默认值
    pub fn reset(&self) {
        self.search.cancel();
        self.scroll.cancel();
        self.inner.mutate(|state| {
            let limit = state.limit();
            let generation = state.generation();
            *state = CatalogState::new(limit);
            // 代号继续递增，保证离开前发出的请求被丢弃
            state.generation = generation + 1;
        });
    }

    pub fn url_query(&self) -> String {
        self.inner.state().url_state().to_query_string()
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        self.inner.state().snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.inner.updates.subscribe()
    }

    pub fn search_pending(&self) -> bool {
        self.search.is_pending()
    }

    /// 等待防抖中的调度和进行中的请求全部结束
    pub async fn wait_until_settled(&self) {
        let mut updates = self.subscribe();
        loop {
            {
                let snapshot = updates.borrow_and_update();
                let pending = self.search.is_pending() || self.scroll.is_pending();
                if !snapshot.is_loading && !snapshot.is_loading_more && !pending {
                    return;
                }
            }
            if updates.changed().await.is_err() {
                return;
            }
        }
    }

    pub fn api(&self) -> &A {
        &self.inner.api
    }

    pub fn search_history(&self) -> Vec<String> {
        self.inner
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries()
            .to_vec()
    }

    pub fn forget_search(&self, query: &str) -> bool {
        let mut history = self.inner.history.lock().unwrap_or_else(PoisonError::into_inner);
        history.remove(query).unwrap_or_else(|e| {
            tracing::warn!("Failed to persist search history: {}", e);
            false
        })
    }

    pub fn clear_search_history(&self) {
        let mut history = self.inner.history.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = history.clear() {
            tracing::warn!("Failed to clear search history: {}", e);
        }
    }
}
