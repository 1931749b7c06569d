pub mod dispatcher;

pub use dispatcher::{DispatchOutcome, Dispatcher, EventHandler};
