//! Sheets stage (Live only). No spreadsheet source is wired into the
//! pipeline core, so this writes the canonical placeholder and never
//! calls out. Kept as a stage so the Live ordering and result slot stay
//! stable for callers that overlay a configured sheet source.

use async_trait::async_trait;

use crate::types::{ScheduleState, SheetsResult};

use super::{Stage, StageContext};

pub struct SheetsStage;

#[async_trait]
impl Stage for SheetsStage {
    fn name(&self) -> &'static str {
        "sheets"
    }

    async fn run(&self, state: &mut ScheduleState, _ctx: &StageContext) {
        state.sheets = Some(SheetsResult {
            summary: "No spreadsheet configured".to_string(),
            data_insights: Vec::new(),
            recommendations: Vec::new(),
            warnings: Vec::new(),
        });
    }
}
