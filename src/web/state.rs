use std::sync::Arc;

use crate::analysis::{AggregationEngine, ReportLimits};
use crate::transcript::MessageRecord;

/// Read-only view of one analyzed transcript, shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<Vec<MessageRecord>>,
    pub engine: Arc<AggregationEngine>,
    pub limits: ReportLimits,
}

impl AppState {
    pub fn new(records: Vec<MessageRecord>, engine: AggregationEngine, limits: ReportLimits) -> Self {
        Self {
            records: Arc::new(records),
            engine: Arc::new(engine),
            limits,
        }
    }
}
