pub mod cycle;
pub mod executor;
pub mod feedback;
pub mod performance;
pub mod portfolio;

pub use cycle::{CycleConfig, CycleOrchestrator, CycleReport};
pub use feedback::{Advisory, FeedbackController, FeedbackThresholds};
pub use portfolio::{TradeRejected, VirtualPortfolio};
