pub mod crawler;
pub mod error;
pub mod expander;
pub mod http;
pub mod ledger;
pub mod result;
pub mod tracker;

pub use crawler::{Crawler, ProgressCallback};
pub use error::ExpandError;
pub use expander::{Expander, Expansion, FixtureExpander, NodeId};
pub use http::HttpExpander;
pub use ledger::VisitLedger;
pub use result::{CrawlFailure, CrawlOutcome, CrawlRecord};
pub use tracker::{CompletionTracker, TaskSlot};
