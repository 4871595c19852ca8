pub mod auth;
pub mod catalog;
pub mod debounce;
pub mod favorites;
pub mod history;
pub mod url_state;

pub use auth::{AuthGate, AuthStatus};
pub use catalog::{
    CatalogBrowser, CatalogSnapshot, CatalogState, FetchKind, FetchOutcome, FetchRequest, FetchTag,
    ScrollMetrics, SCROLL_DEBOUNCE, SCROLL_PROXIMITY_PX, SEARCH_DEBOUNCE,
};
pub use debounce::Debouncer;
pub use favorites::FavoritesStore;
pub use history::{SearchHistory, MAX_HISTORY_ENTRIES};
pub use url_state::{UrlState, DEFAULT_PAGE_LIMIT};
