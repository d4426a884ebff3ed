pub mod commands;
pub mod controller;
pub mod state;

pub use commands::{lookup, parse_line, CommandAction, CommandEntry, COMMANDS};
pub use controller::{SessionEvent, SessionSnapshot, WorkflowController, WorkflowDeps};
pub use state::{reduce, Effect, Event, RequestId, Session, Transition, WorkflowState};
