pub mod builder;
pub mod feed;
pub mod types;

pub use builder::{build_innings, InningsBuilder, InningsSnapshot, MatchModel};
pub use feed::{InningsFeed, MatchFeed};
pub use types::*;
