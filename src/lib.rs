// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod grade;
pub mod number;
pub mod random;
pub mod ranking;
pub mod record;
pub mod reflex;
pub mod runtime;
pub mod session;
pub mod store;
pub mod timer;
pub mod timing;

pub use grade::{grade, Grade};
pub use ranking::RankingGateway;
pub use record::{GameKind, GameRecord};
