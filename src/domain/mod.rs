pub mod article;
pub mod request;
pub mod digest;

pub use article::{ArticleRecord, Source};
pub use request::{DigestRequest, MAX_ITEMS_CEILING};
pub use digest::{compact_title, Digest, MailBody};
