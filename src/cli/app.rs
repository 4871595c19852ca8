use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use super::command::{Command, HELP};
use super::render;
use crate::external::CatalogApi;
use crate::models::{FilterField, MovieSummary};
use crate::services::{AuthGate, CatalogBrowser, FavoritesStore, FetchOutcome};

/// 每页工作室条数
const STUDIOS_PAGE_LIMIT: u32 = 20;

/// 终端会话
pub struct App<A> {
    browser: CatalogBrowser<A>,
    favorites: FavoritesStore,
}

impl<A: CatalogApi + 'static> App<A> {
    pub fn new(browser: CatalogBrowser<A>, favorites: FavoritesStore) -> Self {
        Self { browser, favorites }
    }

    pub fn browser(&self) -> &CatalogBrowser<A> {
        &self.browser
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    fn list(&self) -> String {
        let favorites = &self.favorites;
        render::render_list(&self.browser.snapshot(), |id| favorites.is_favorite(id))
    }

    fn after_fetch(&self, outcome: FetchOutcome) -> String {
        tracing::debug!("Fetch outcome: {:?}", outcome);
        match outcome {
            FetchOutcome::Skipped => "Nothing more to load\n".to_string(),
            _ => self.list(),
        }
    }

    /// 执行一条命令并返回要输出的文本
    pub async fn execute(&mut self, command: Command) -> String {
        match command {
            Command::Search(query) => {
                self.browser.set_text_query(&query);
                self.browser.wait_until_settled().await;
                self.list()
            }
            Command::Genres(genres) => {
                let outcome = self.browser.set_genres(genres).await;
                self.after_fetch(outcome)
            }
            Command::Country(country) => {
                let outcome = self.browser.set_country(country).await;
                self.after_fetch(outcome)
            }
            Command::Age(age) => {
                let outcome = self.browser.set_age_rating(age).await;
                self.after_fetch(outcome)
            }
            Command::Rating(rating) => {
                let outcome = self.browser.set_rating_range(rating).await;
                self.after_fetch(outcome)
            }
            Command::Years(years) => {
                let outcome = self.browser.set_year_range(years).await;
                self.after_fetch(outcome)
            }
            Command::Limit(limit) => match self.browser.set_limit(limit).await {
                Ok(outcome) => self.after_fetch(outcome),
                Err(e) => format!("Error: {}\n", e),
            },
            Command::More => {
                let outcome = self.browser.load_more().await;
                self.after_fetch(outcome)
            }
            Command::Scroll => {
                self.browser.on_scroll_near_bottom();
                self.browser.wait_until_settled().await;
                self.list()
            }
            Command::Reset => {
                let outcome = self.browser.reset_filters().await;
                self.after_fetch(outcome)
            }
            Command::Refresh => {
                let outcome = self.browser.refresh().await;
                self.after_fetch(outcome)
            }
            Command::List => self.list(),
            Command::Url => format!("?{}\n", self.browser.url_query()),
            Command::Open(url) => {
                let outcome = self.browser.restore_from_url(&url).await;
                self.after_fetch(outcome)
            }
            Command::Show(id) => self.show(id, 1).await,
            Command::Cast { id, page } => self.show(id, page).await,
            Command::Favorite(id) => self.toggle_favorite(id).await,
            Command::Favorites => render::render_favorites(self.favorites.get_all()),
            Command::Unfavorite(id) => match self.favorites.remove(id) {
                Ok(true) => format!("Removed {} from favorites\n", id),
                Ok(false) => format!("{} is not a favorite\n", id),
                Err(e) => format!("Error: {}\n", e),
            },
            Command::ClearFavorites => match self.favorites.clear() {
                Ok(()) => "Favorites cleared\n".to_string(),
                Err(e) => format!("Error: {}\n", e),
            },
            Command::History => render::render_history(&self.browser.search_history()),
            Command::Forget(query) => {
                if self.browser.forget_search(&query) {
                    format!("Forgot \"{}\"\n", query)
                } else {
                    format!("\"{}\" is not in history\n", query)
                }
            }
            Command::ClearHistory => {
                self.browser.clear_search_history();
                "Search history cleared\n".to_string()
            }
            Command::Options => self.options().await,
            Command::Studios(page) => {
                match self.browser.api().studios(page, STUDIOS_PAGE_LIMIT).await {
                    Ok(studios) => render::render_studios(&studios, page),
                    Err(e) => format!("Error: {}\n", e),
                }
            }
            Command::Help => format!("{}\n", HELP),
            Command::Quit => String::new(),
        }
    }

    async fn fetch_movie(&self, id: u64) -> Result<MovieSummary, String> {
        self.browser
            .api()
            .movie_by_id(id)
            .await
            .map_err(|e| format!("Error: {}\n", e))
    }

    async fn show(&self, id: u64, page: usize) -> String {
        match self.fetch_movie(id).await {
            Ok(movie) => render::render_movie(&movie, page, self.favorites.is_favorite(id)),
            Err(message) => message,
        }
    }

    async fn toggle_favorite(&mut self, id: u64) -> String {
        let listed = self
            .browser
            .snapshot()
            .visible
            .into_iter()
            .find(|m| m.id == Some(id));
        let movie = match listed.or_else(|| self.favorites.get(id).cloned()) {
            Some(movie) => movie,
            None => match self.fetch_movie(id).await {
                Ok(movie) => movie,
                Err(message) => return message,
            },
        };

        match self.favorites.toggle(&movie) {
            Ok(true) => format!("Added \"{}\" to favorites\n", movie.display_name()),
            Ok(false) => format!("Removed \"{}\" from favorites\n", movie.display_name()),
            Err(e) => format!("Error: {}\n", e),
        }
    }

    async fn options(&self) -> String {
        let mut out = String::new();
        for (title, field) in [
            ("Genres", FilterField::Genres),
            ("Countries", FilterField::Countries),
            ("Types", FilterField::ContentType),
        ] {
            match self.browser.api().possible_values(field).await {
                Ok(options) => out.push_str(&render::render_options(title, &options)),
                Err(e) => out.push_str(&format!("{}: error: {}\n", title, e)),
            }
        }
        out
    }

    /// 读取命令直到 `quit` 或输入结束
    pub async fn run<R, W>(&mut self, lines: &mut Lines<R>, output: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let outcome = self.browser.refresh().await;
        output.write_all(self.after_fetch(outcome).as_bytes()).await?;

        loop {
            output.write_all(b"> ").await?;
            output.flush().await?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    output.write_all(format!("{}\n", e).as_bytes()).await?;
                    continue;
                }
            };
            if command == Command::Quit {
                break;
            }
            let text = self.execute(command).await;
            output.write_all(text.as_bytes()).await?;
        }

        self.browser.reset();
        output.flush().await
    }
}

/// 入口口令；输入结束前一直提示
pub async fn login<R, W>(
    gate: &mut AuthGate,
    lines: &mut Lines<R>,
    output: &mut W,
) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        output.write_all(b"Password: ").await?;
        output.flush().await?;
        let Some(line) = lines.next_line().await? else {
            return Ok(false);
        };
        if gate.login(line.trim_end_matches(['\r', '\n'])) {
            output.write_all(b"Welcome!\n").await?;
            return Ok(true);
        }
        output.write_all(b"Wrong password\n").await?;
    }
}
