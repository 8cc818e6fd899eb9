pub mod channel;
pub mod worker;

pub use channel::{DiffOutcome, DiffRequest};
pub use worker::DiffWorker;
