//! 终端输出格式

use std::fmt::Write;

use crate::models::{FetchMode, FilterOption, MovieSummary, Person, StudioPage};
use crate::services::CatalogSnapshot;

/// 详情页每页展示的演员数
pub const CAST_PAGE_SIZE: usize = 10;

fn movie_line(movie: &MovieSummary, favorite: bool) -> String {
    let mut line = format!(
        "{}[{}] {}",
        if favorite { "★ " } else { "  " },
        movie.id.unwrap_or_default(),
        movie.display_name()
    );
    if let Some(year) = movie.year {
        let _ = write!(line, " ({})", year);
    }
    if let Some(imdb) = movie.imdb_rating() {
        let _ = write!(line, "  IMDb {:.1}", imdb);
    }
    line
}

/// 列表页
pub fn render_list(snapshot: &CatalogSnapshot, is_favorite: impl Fn(u64) -> bool) -> String {
    let mut out = String::new();
    let mode = match &snapshot.mode {
        FetchMode::Search(query) => format!("search \"{}\"", query),
        FetchMode::Filtered if snapshot.filters.is_empty() => "all movies".to_string(),
        FetchMode::Filtered => "filtered".to_string(),
    };
    let _ = writeln!(
        out,
        "== {} | page {}/{} | {} shown ==",
        mode,
        snapshot.page,
        snapshot.total_pages,
        snapshot.visible.len()
    );

    for movie in &snapshot.visible {
        let favorite = movie.id.map(&is_favorite).unwrap_or(false);
        let _ = writeln!(out, "{}", movie_line(movie, favorite));
    }

    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "Error: {}", error);
    } else if snapshot.is_loading || snapshot.is_loading_more {
        let _ = writeln!(out, "Loading...");
    } else if snapshot.visible.is_empty() {
        let _ = writeln!(out, "Nothing found");
    } else if !snapshot.has_more {
        let _ = writeln!(out, "-- end of results --");
    }
    out
}

/// 演员分页（从 1 开始）
pub fn cast_page(persons: &[Person], page: usize) -> &[Person] {
    let start = page.saturating_sub(1).saturating_mul(CAST_PAGE_SIZE);
    if start >= persons.len() {
        return &[];
    }
    let end = (start + CAST_PAGE_SIZE).min(persons.len());
    &persons[start..end]
}

pub fn cast_page_count(persons: &[Person]) -> usize {
    persons.len().div_ceil(CAST_PAGE_SIZE)
}

/// 详情页
pub fn render_movie(movie: &MovieSummary, page: usize, favorite: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", movie_line(movie, favorite));
    if let Some(alternative) = movie.alternative_name.as_deref().filter(|a| !a.is_empty()) {
        let _ = writeln!(out, "    {}", alternative);
    }
    let _ = writeln!(out, "Poster: {}", movie.poster_url());
    let _ = writeln!(
        out,
        "Rating: {}",
        movie
            .kp_rating()
            .map(|kp| format!("{}/10", kp))
            .unwrap_or_else(|| "n/a".to_string())
    );
    let _ = writeln!(out, "Year: {}", movie.year.map(|y| y.to_string()).unwrap_or_else(|| "unknown".to_string()));

    let genres = movie.genre_names();
    let _ = writeln!(out, "Genres: {}", if genres.is_empty() { "n/a".to_string() } else { genres.join(", ") });
    let countries = movie.country_names();
    if !countries.is_empty() {
        let _ = writeln!(out, "Countries: {}", countries.join(", "));
    }

    if let Some(description) = movie.description.as_deref().or(movie.short_description.as_deref()) {
        let _ = writeln!(out, "\n{}", description);
    }

    let _ = writeln!(out, "\nCast:");
    if movie.persons.is_empty() {
        let _ = writeln!(out, "  n/a");
    } else {
        for person in cast_page(&movie.persons, page) {
            match person.profession.as_deref() {
                Some(profession) => {
                    let _ = writeln!(out, "  {} ({})", person.display_name(), profession);
                }
                None => {
                    let _ = writeln!(out, "  {}", person.display_name());
                }
            }
        }
        let _ = writeln!(out, "  page {}/{}", page, cast_page_count(&movie.persons));
    }

    let similar: Vec<String> = movie
        .similar_with_posters()
        .map(|(m, _)| format!("[{}] {}", m.id.unwrap_or_default(), m.name.as_deref().unwrap_or("Untitled")))
        .collect();
    if !similar.is_empty() {
        let _ = writeln!(out, "\nSimilar: {}", similar.join(", "));
    }
    out
}

pub fn render_favorites(favorites: &[MovieSummary]) -> String {
    if favorites.is_empty() {
        return "No favorites yet\n".to_string();
    }
    let mut out = format!("== favorites ({}) ==\n", favorites.len());
    for movie in favorites {
        let _ = writeln!(out, "{}", movie_line(movie, true));
    }
    out
}

pub fn render_history(entries: &[String]) -> String {
    if entries.is_empty() {
        return "Search history is empty\n".to_string();
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{:>2}. {}\n", i + 1, q))
        .collect()
}

pub fn render_options(title: &str, options: &[FilterOption]) -> String {
    let names: Vec<&str> = options.iter().map(|o| o.name.as_str()).collect();
    format!("{} ({}): {}\n", title, names.len(), names.join(", "))
}

pub fn render_studios(studios: &StudioPage, page: u32) -> String {
    let mut out = format!("== studios | page {}/{} ==\n", page, studios.pages);
    for studio in &studios.docs {
        let _ = write!(out, "  {}", studio.title.as_deref().unwrap_or("Untitled"));
        if let Some(kind) = &studio.studio_type {
            let _ = write!(out, " ({})", kind);
        }
        out.push('\n');
    }
    out
}
