//! Search-as-you-type debouncing.
//!
//! # Responsibility
//! - Collapse bursts of search input into one query per quiescence window.
//! - Suppress a query equal to the previously emitted one.
//!
//! # Invariants
//! - A value is emitted only after `window` elapses with no newer input.
//! - Closing the input flushes the pending value (if any), then closes output.
//! - Emitted values are never retracted; consumers decide what to do with
//!   overlapping results.

use log::trace;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Input handle of a running debounce task.
///
/// Dropping every handle closes the input side.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    input: UnboundedSender<String>,
}

impl SearchDebouncer {
    /// Spawns a debounce task on the current tokio runtime.
    ///
    /// Returns the input handle and the receiver of settled queries.
    pub fn spawn(window: Duration) -> (Self, UnboundedReceiver<String>) {
        let (input_tx, input_rx) = unbounded_channel();
        let (output_tx, output_rx) = unbounded_channel();
        tokio::spawn(debounce_loop(window, input_rx, output_tx));
        (Self { input: input_tx }, output_rx)
    }

    /// Feeds one raw input value. Returns `false` once the task has stopped.
    pub fn push(&self, value: impl Into<String>) -> bool {
        self.input.send(value.into()).is_ok()
    }
}

async fn debounce_loop(
    window: Duration,
    mut input: UnboundedReceiver<String>,
    output: UnboundedSender<String>,
) {
    let mut last_emitted: Option<String> = None;
    let mut pending: Option<String> = None;

    loop {
        let Some(value) = pending.take() else {
            match input.recv().await {
                Some(value) => pending = Some(value),
                None => break,
            }
            continue;
        };

        tokio::select! {
            next = input.recv() => match next {
                Some(newer) => pending = Some(newer),
                None => {
                    emit_distinct(&output, &mut last_emitted, value);
                    break;
                }
            },
            _ = tokio::time::sleep(window) => {
                if !emit_distinct(&output, &mut last_emitted, value) {
                    break;
                }
            }
        }
    }
}

/// Returns `false` when the output side is gone.
fn emit_distinct(
    output: &UnboundedSender<String>,
    last_emitted: &mut Option<String>,
    value: String,
) -> bool {
    if last_emitted.as_deref() == Some(value.as_str()) {
        trace!("event=search_debounce module=debounce status=skipped reason=duplicate");
        return true;
    }
    *last_emitted = Some(value.clone());
    output.send(value).is_ok()
}
