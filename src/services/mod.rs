pub mod aggregate_service;
pub mod authorize_service;
pub mod digest_service;
pub mod notification_service;
pub mod pipeline;

pub use aggregate_service::{Aggregate, AggregateService};
pub use authorize_service::{TokenFile, DEFAULT_TOKEN_FILE};
pub use digest_service::{dispatch_all, DigestService, DispatchOutcome, RunReport};
pub use notification_service::{GmailMailer, Mailer};
