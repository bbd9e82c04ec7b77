mod metric;
mod movie;
mod user;
mod watchlist;

pub use metric::{rank_metrics, SearchMetric};
pub use movie::{
    BrowsePage, CastMember, Credits, CrewMember, Genre, Movie, MovieDetail, MovieOverview,
    MoviePage, Video, VideoList, POSTER_BASE_URL,
};
pub use user::{OAuthProfile, Session, User};
pub use watchlist::{sort_entries, WatchlistEntry, WatchlistStats};
