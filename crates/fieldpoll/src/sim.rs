//! Runs one operation to completion over a scripted link.

use std::sync::Arc;

use fieldpoll_message::{Property, ScriptedLink};
use fieldpoll_op::{DeviceRecord, LinkDriver, MemoryDevice, OpState, Operation, RunSummary};
use serde::Serialize;

use crate::exit::{FAILURE, SUCCESS};

pub const REPORT_SCHEMA: &str =
    "https://schemas.3leaps.dev/fieldpoll/cli/v1/run-report.schema.json";

#[derive(Debug, Serialize)]
pub struct EventReport {
    pub event: &'static str,
    pub op_id: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub schema_id: &'static str,
    pub protocol: &'static str,
    pub operation: &'static str,
    pub description: String,
    pub op_id: String,
    pub device: String,
    pub drop: u16,
    pub state: OpState,
    pub success: bool,
    pub summary: RunSummary,
    /// Every frame written to the link, as hex.
    pub frames: Vec<String>,
    pub events: Vec<EventReport>,
    pub maint_text: Option<String>,
    pub error_text: Option<String>,
    /// Sequence running on the selected monitor afterwards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
}

impl RunReport {
    pub fn exit_code(&self) -> i32 {
        if self.success {
            SUCCESS
        } else {
            FAILURE
        }
    }
}

/// A link that times out `fail` times before behaving.
pub fn link(fail: usize) -> ScriptedLink {
    let mut link = ScriptedLink::new();
    link.push_timeouts(fail);
    link
}

/// Queue `op` on a fresh driver over `link` and poll until idle.
pub fn run<P: Property>(
    protocol: &'static str,
    device: &Arc<MemoryDevice>,
    op: Operation<P>,
    link: ScriptedLink,
) -> RunReport {
    let op = Arc::new(op);
    let mut driver = LinkDriver::new(link);
    driver.submit(Arc::clone(&op));
    let summary = driver.run_until_idle();
    let link = driver.into_link();

    RunReport {
        schema_id: REPORT_SCHEMA,
        protocol,
        operation: op.kind(),
        description: op.description().to_string(),
        op_id: op.id().to_string(),
        device: device.name().to_string(),
        drop: device.drop_address(),
        state: op.state(),
        success: op.state() == OpState::Succeeded,
        summary,
        frames: link.sent().iter().map(|f| hex(f)).collect(),
        events: device
            .events()
            .into_iter()
            .map(|e| EventReport {
                event: e.event.as_str(),
                op_id: e.op_id,
                text: e.text,
            })
            .collect(),
        maint_text: device.maint_text(),
        error_text: device.error_text(),
        sequence: None,
    }
}

pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
