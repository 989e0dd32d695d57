use serde::Serialize;

use crate::model::DepositId;

use super::steps::StepKind;

/// Transitions published by a [`DepositFlow`](super::DepositFlow).
///
/// Notifications (terminal output, toasts, logs) subscribe to these; the
/// transition logic itself never formats user messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum FlowEvent {
    StepStarted {
        step: StepKind,
    },
    StepCompleted {
        step: StepKind,
    },
    StepFailed {
        step: StepKind,
        message: String,
    },
    DepositIdCaptured {
        deposit_id: DepositId,
    },
    Completed {
        deposit_id: DepositId,
    },
    Closed,
}

/// Log every event at the matching level until the channel closes.
pub async fn log_events(mut rx: tokio::sync::broadcast::Receiver<FlowEvent>) {
    use tokio::sync::broadcast::error::RecvError;

    loop {
        match rx.recv().await {
            Ok(FlowEvent::StepFailed { step, message }) => {
                tracing::warn!(%step, %message, "deposit step failed");
            }
            Ok(event) => tracing::info!(?event, "deposit flow"),
            Err(RecvError::Lagged(n)) => tracing::warn!(skipped = n, "flow event log lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}
