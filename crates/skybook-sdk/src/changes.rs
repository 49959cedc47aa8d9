//! Debounced, de-duplicated value streams.
//!
//! Used by the editor to settle bursts of form edits before tracing them.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Quiet period after the last edit before a form value is considered
/// settled.
pub const CHANGE_DEBOUNCE: Duration = Duration::from_millis(250);

/// Forward values from `input` once no newer value has arrived for
/// `period`, skipping any value equal to the previously forwarded one.
///
/// A value still pending when `input` closes is forwarded before the
/// output closes. The returned task ends when either side is dropped.
pub fn debounce_distinct<T>(
    mut input: mpsc::UnboundedReceiver<T>,
    period: Duration,
) -> (mpsc::UnboundedReceiver<T>, JoinHandle<()>)
where
    T: PartialEq + Clone + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(async move {
        let mut last: Option<T> = None;
        let mut pending: Option<T> = None;

        loop {
            match pending.take() {
                None => match input.recv().await {
                    Some(value) => pending = Some(value),
                    None => break,
                },
                Some(value) => match tokio::time::timeout(period, input.recv()).await {
                    Ok(Some(newer)) => pending = Some(newer),
                    Ok(None) => {
                        emit(&tx, &mut last, value);
                        break;
                    }
                    Err(_elapsed) => {
                        if !emit(&tx, &mut last, value) {
                            break;
                        }
                    }
                },
            }
        }
    });

    (rx, task)
}

/// Send `value` unless it equals the last one sent. Returns `false` once
/// the receiver is gone.
fn emit<T: PartialEq + Clone>(
    tx: &mpsc::UnboundedSender<T>,
    last: &mut Option<T>,
    value: T,
) -> bool {
    if last.as_ref() == Some(&value) {
        return true;
    }
    *last = Some(value.clone());
    tx.send(value).is_ok()
}
