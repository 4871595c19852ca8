// 浏览核心集成测试
//
// 用脚本化接口驱动 CatalogBrowser，验证防抖、分页重置、过期响应丢弃和并发保护

mod common;

use std::time::Duration;

use common::{browser, ids, movie_page, param, ScriptedApi};
use movie_catalog::external::ApiError;
use movie_catalog::models::{FetchMode, MoviePage, RatingRange, YearRange};
use movie_catalog::services::{FetchOutcome, ScrollMetrics};

const NETWORK: Duration = Duration::from_millis(100);

#[tokio::test(start_paused = true)]
async fn test_concurrent_load_more_issues_one_request() {
    let browser = browser(ScriptedApi::paged(5, NETWORK), 3);
    browser.refresh().await;

    let (first, second) = tokio::join!(browser.load_more(), browser.load_more());
    assert_eq!(first, FetchOutcome::Loaded { page: 2, received: 3 });
    assert_eq!(second, FetchOutcome::Skipped);

    let calls = browser.api().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(param(&calls[1], "page"), Some(2));
    assert_eq!(browser.snapshot().accumulated_len, 6);
}

#[tokio::test(start_paused = true)]
async fn test_filter_change_resets_pagination() {
    let browser = browser(ScriptedApi::paged(5, NETWORK), 3);
    browser.refresh().await;
    browser.load_more().await;
    browser.load_more().await;
    assert_eq!(browser.snapshot().page, 3);

    let outcome = browser.set_genres(vec!["Drama".to_string()]).await;
    assert_eq!(outcome, FetchOutcome::Loaded { page: 1, received: 3 });

    let snapshot = browser.snapshot();
    assert_eq!(snapshot.page, 1);
    assert_eq!(snapshot.accumulated_len, 3);
    assert_eq!(ids(&snapshot.visible), vec![0, 1, 2]);
    assert!(snapshot.has_more);
    assert!(!snapshot.is_loading);

    let calls = browser.api().calls();
    assert_eq!(calls.last().unwrap(), "/movie?page=1&limit=3&genres.name=Drama");
}

#[tokio::test(start_paused = true)]
async fn test_search_is_debounced_to_last_query() {
    let browser = browser(ScriptedApi::paged(2, NETWORK), 10);

    browser.set_text_query("matrix");
    tokio::time::sleep(Duration::from_millis(500)).await;
    browser.set_text_query("matrix2");
    assert!(browser.search_pending());
    assert!(browser.snapshot().is_loading);

    browser.wait_until_settled().await;

    assert_eq!(
        browser.api().calls(),
        vec!["/movie/search?page=1&limit=10&query=matrix2".to_string()]
    );
    let snapshot = browser.snapshot();
    assert_eq!(snapshot.mode, FetchMode::Search("matrix2".to_string()));
    assert_eq!(snapshot.accumulated_len, 10);
    assert_eq!(
        browser.search_history(),
        vec!["matrix2".to_string(), "matrix".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_search_does_not_fire_before_window() {
    let browser = browser(ScriptedApi::paged(2, NETWORK), 10);

    browser.set_text_query("alien");
    tokio::time::sleep(Duration::from_millis(900)).await;
    assert!(browser.api().calls().is_empty());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(browser.api().calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_genres_then_load_more_appends_page_two() {
    let browser = browser(ScriptedApi::paged(5, NETWORK), 4);

    browser.set_genres(vec!["Drama".to_string()]).await;
    browser.load_more().await;

    assert_eq!(
        browser.api().calls(),
        vec![
            "/movie?page=1&limit=4&genres.name=Drama".to_string(),
            "/movie?page=2&limit=4&genres.name=Drama".to_string(),
        ]
    );
    let snapshot = browser.snapshot();
    assert_eq!(ids(&snapshot.visible), (0..8).collect::<Vec<_>>());
    assert_eq!(snapshot.page, 2);
    assert_eq!(snapshot.url_query, "page=2&limit=4&genre=Drama");
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_discarded() {
    let api = ScriptedApi::new(|path| {
        if path.contains("Comedy") {
            (Duration::from_millis(500), Ok(movie_page(100..103, 1)))
        } else {
            (Duration::from_millis(50), Ok(movie_page(200..202, 1)))
        }
    });
    let browser = browser(api, 10);

    let (comedy, drama) = tokio::join!(browser.set_genres(vec!["Comedy".to_string()]), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        browser.set_genres(vec!["Drama".to_string()]).await
    });

    assert_eq!(comedy, FetchOutcome::Discarded);
    assert_eq!(drama, FetchOutcome::Loaded { page: 1, received: 2 });

    let snapshot = browser.snapshot();
    assert_eq!(ids(&snapshot.visible), vec![200, 201]);
    assert_eq!(snapshot.filters.genres(), ["Drama".to_string()]);
    assert!(!snapshot.is_loading);
}

#[tokio::test(start_paused = true)]
async fn test_failure_keeps_accumulated_results() {
    let api = ScriptedApi::new(|path| match param(path, "page") {
        Some(1) => (NETWORK, Ok(movie_page(0..3, 4))),
        _ => (NETWORK, Err(ApiError::Unavailable { attempts: 4 })),
    });
    let browser = browser(api, 3);
    browser.refresh().await;

    let outcome = browser.load_more().await;
    assert_eq!(outcome, FetchOutcome::Failed(ApiError::Unavailable { attempts: 4 }));

    let snapshot = browser.snapshot();
    assert_eq!(ids(&snapshot.visible), vec![0, 1, 2]);
    assert_eq!(snapshot.page, 1);
    assert!(!snapshot.is_loading_more);
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.error, Some(ApiError::Unavailable { attempts: 4 }));

    // 出错后不会自动重试，直到条件变化
    assert_eq!(browser.load_more().await, FetchOutcome::Skipped);
    assert_eq!(browser.api().calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_empty_page_stops_pagination() {
    let browser = browser(ScriptedApi::paged(1, NETWORK), 5);
    browser.refresh().await;

    let outcome = browser.load_more().await;
    assert_eq!(outcome, FetchOutcome::Loaded { page: 2, received: 0 });
    assert!(!browser.snapshot().has_more);

    assert_eq!(browser.load_more().await, FetchOutcome::Skipped);
    assert_eq!(browser.api().calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_empty_first_page() {
    let api = ScriptedApi::new(|_| (NETWORK, Ok(MoviePage::default())));
    let browser = browser(api, 5);
    browser.refresh().await;

    let snapshot = browser.snapshot();
    assert!(snapshot.visible.is_empty());
    assert_eq!(snapshot.total_pages, 0);
    assert!(!snapshot.has_more);
}

#[tokio::test(start_paused = true)]
async fn test_scroll_near_bottom_loads_once() {
    let browser = browser(ScriptedApi::paged(5, NETWORK), 3);
    browser.refresh().await;

    let far = ScrollMetrics { scroll_top: 0.0, client_height: 800.0, scroll_height: 3000.0 };
    browser.on_scroll(far);
    browser.wait_until_settled().await;
    assert_eq!(browser.api().calls().len(), 1);

    let near = ScrollMetrics { scroll_top: 2100.0, client_height: 800.0, scroll_height: 3000.0 };
    for _ in 0..3 {
        browser.on_scroll(near);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    browser.wait_until_settled().await;

    let calls = browser.api().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(param(&calls[1], "page"), Some(2));
    assert_eq!(browser.snapshot().accumulated_len, 6);
}

#[tokio::test(start_paused = true)]
async fn test_text_query_clears_other_dimensions() {
    let browser = browser(ScriptedApi::paged(2, NETWORK), 10);
    browser.set_genres(vec!["Drama".to_string()]).await;
    browser.set_rating_range(Some(RatingRange::new(7.0, 10.0).unwrap())).await;

    browser.set_text_query("alien");
    let snapshot = browser.snapshot();
    assert!(snapshot.filters.genres().is_empty());
    assert!(snapshot.filters.rating().is_none());
    assert!(snapshot.mode.is_search());
}

#[tokio::test(start_paused = true)]
async fn test_immediate_filter_cancels_pending_search() {
    let browser = browser(ScriptedApi::paged(2, NETWORK), 10);

    browser.set_text_query("alien");
    browser.set_year_range(Some(YearRange::new(1990, 1991).unwrap())).await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(
        browser.api().calls(),
        vec!["/movie?page=1&limit=10&year=1990&year=1991".to_string()]
    );
    assert_eq!(browser.snapshot().mode, FetchMode::Filtered);
    assert!(browser.snapshot().filters.query().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_restore_from_url_fetches_up_to_page() {
    let browser = browser(ScriptedApi::paged(5, NETWORK), 50);

    let outcome = browser
        .restore_from_url("http://localhost:3000/?page=3&limit=2&genre=Drama&age=16")
        .await;
    assert_eq!(outcome, FetchOutcome::Loaded { page: 3, received: 2 });

    let pages: Vec<_> = browser
        .api()
        .calls()
        .iter()
        .map(|c| param(c, "page").unwrap())
        .collect();
    assert_eq!(pages, vec![1, 2, 3]);

    let snapshot = browser.snapshot();
    assert_eq!(snapshot.accumulated_len, 6);
    assert_eq!(snapshot.limit, 2);
    assert_eq!(browser.url_query(), "page=3&limit=2&genre=Drama&age=16");
}

#[tokio::test(start_paused = true)]
async fn test_restore_stops_at_last_reported_page() {
    // 每页都有数据，但服务端只报告 3 页
    let api = ScriptedApi::new(|path| {
        let page = param(path, "page").unwrap_or(1) as u64;
        (NETWORK, Ok(movie_page(page * 10..page * 10 + 2, 3)))
    });
    let browser = browser(api, 2);

    let outcome = browser.restore_from_url("?page=4000000000&limit=2").await;
    assert_eq!(outcome, FetchOutcome::Loaded { page: 3, received: 2 });

    let pages: Vec<_> = browser
        .api()
        .calls()
        .iter()
        .map(|c| param(c, "page").unwrap())
        .collect();
    assert_eq!(pages, vec![1, 2, 3]);
    assert_eq!(browser.snapshot().accumulated_len, 6);
}

#[tokio::test(start_paused = true)]
async fn test_set_limit_validates_and_refetches() {
    let browser = browser(ScriptedApi::paged(5, NETWORK), 3);
    browser.refresh().await;
    browser.load_more().await;

    assert!(browser.set_limit(0).await.is_err());
    assert_eq!(browser.snapshot().page, 2);

    let outcome = browser.set_limit(10).await.unwrap();
    assert_eq!(outcome, FetchOutcome::Loaded { page: 1, received: 10 });
    assert_eq!(browser.api().calls().last().unwrap(), "/movie?page=1&limit=10");
    assert_eq!(browser.snapshot().accumulated_len, 10);
}

#[tokio::test(start_paused = true)]
async fn test_reset_filters() {
    let browser = browser(ScriptedApi::paged(5, NETWORK), 3);
    browser.set_country(Some("Франция".to_string())).await;
    assert!(!browser.snapshot().filters.is_empty());

    browser.reset_filters().await;
    assert!(browser.snapshot().filters.is_empty());
    assert_eq!(browser.api().calls().last().unwrap(), "/movie?page=1&limit=3");
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_updates() {
    let browser = browser(ScriptedApi::paged(5, NETWORK), 3);
    let mut updates = browser.subscribe();

    browser.refresh().await;
    assert!(updates.has_changed().unwrap());
    let snapshot = updates.borrow_and_update().clone();
    assert_eq!(snapshot.visible.len(), 3);
    assert!(!snapshot.is_loading);
}

#[tokio::test(start_paused = true)]
async fn test_reset_discards_in_flight_fetch() {
    let browser = browser(ScriptedApi::paged(5, NETWORK), 3);

    let (outcome, _) = tokio::join!(browser.refresh(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        browser.reset();
    });

    assert_eq!(outcome, FetchOutcome::Discarded);
    let snapshot = browser.snapshot();
    assert_eq!(snapshot.accumulated_len, 0);
    assert!(!snapshot.is_loading);
}
