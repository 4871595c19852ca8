pub mod filter;
pub mod movie;

pub use filter::{
    validate_limit, AgeRating, FetchMode, FilterError, FilterSelection, RatingRange, YearRange,
    MAX_PAGE_LIMIT, YEAR_MAX, YEAR_MIN,
};
pub use movie::{
    FilterField, FilterOption, MoviePage, MovieSummary, NamedItem, Person, Poster, Rating,
    SimilarMovie, Studio, StudioPage, PLACEHOLDER_POSTER,
};
