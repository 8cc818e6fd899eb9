use crate::git::types::{ComparisonTarget, DiffResult};

#[derive(Debug, Clone)]
pub struct DiffRequest {
    pub generation: u64,
    pub target: ComparisonTarget,
}

#[derive(Debug)]
pub struct DiffOutcome {
    pub generation: u64,
    pub result: Result<DiffResult, String>,
}
