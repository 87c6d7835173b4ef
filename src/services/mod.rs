pub mod outline;
pub use outline::Outline;

pub mod scout;
pub use scout::{ScoutOutcome, ScoutService};

pub mod session;
pub use session::{Session, SessionStore};

pub mod workflows;
pub use workflows::{WorkflowError, WorkflowJob, Workflows};
