mod effects;
mod execution;

pub use effects::Effect;
pub use execution::{EngineStatus, PlanExecutionEngine};
