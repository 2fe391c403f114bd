pub mod traits;
pub mod http;
pub mod parser;

pub use traits::FeedFetcher;
pub use http::HttpFetcher;
pub use parser::parse_feed;
