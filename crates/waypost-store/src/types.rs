//! Report log record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use waypost_core::{Fix, ReportType};

/// An admitted fix handed to the publisher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub recorded_at: DateTime<Utc>,
    pub report_type: ReportType,
    pub fix: Fix,
}

impl ReportRecord {
    pub fn new(fix: Fix, report_type: ReportType) -> Self {
        Self {
            recorded_at: Utc::now(),
            report_type,
            fix,
        }
    }
}
