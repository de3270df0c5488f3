// src/watch/debounce.rs

//! Debouncing raw change records into [`Mod`] batches.
//!
//! [`Debouncer`] is the pure buffer; [`run_debounce_loop`] is the async shell
//! that owns the lull timer and hands finished batches to the consumer.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::watch::change::{ChangeRecord, Mod};

/// Pending change buffer. Repeated paths coalesce to their latest kind.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Vec<ChangeRecord>,
    index: HashMap<String, usize>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ChangeRecord) {
        match self.index.get(&record.path) {
            Some(&i) => self.pending[i].kind = record.kind,
            None => {
                self.index.insert(record.path.clone(), self.pending.len());
                self.pending.push(record);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take everything buffered so far. `None` when nothing is pending.
    pub fn flush(&mut self) -> Option<Mod> {
        if self.pending.is_empty() {
            return None;
        }
        self.index.clear();
        Some(Mod::from_records(std::mem::take(&mut self.pending)))
    }
}

/// Buffer records from `raw_rx` and emit a batch on `mod_tx` once `lull`
/// passes without a new record.
///
/// The bounded `mod_tx` applies backpressure: a slow consumer stalls the
/// flush rather than losing changes. The loop ends when either channel
/// closes; anything still buffered at that point is discarded.
pub async fn run_debounce_loop(
    mut raw_rx: mpsc::UnboundedReceiver<ChangeRecord>,
    mod_tx: mpsc::Sender<Mod>,
    lull: Duration,
) {
    let mut debouncer = Debouncer::new();
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            record = raw_rx.recv() => match record {
                Some(record) => {
                    debouncer.push(record);
                    deadline = Some(Instant::now() + lull);
                }
                None => {
                    debug!(discarded = debouncer.len(), "raw change channel closed");
                    break;
                }
            },
            _ = lull_elapsed(deadline) => {
                deadline = None;
                if let Some(batch) = debouncer.flush() {
                    debug!(changes = batch.len(), "flushing change batch");
                    if mod_tx.send(batch).await.is_err() {
                        debug!("change batch receiver dropped");
                        break;
                    }
                }
            }
        }
    }
}

async fn lull_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
