//! Once-per-second focus countdown published on a watch channel.

use crate::domain::models::Task;
use crate::domain::monitor::{ClockReading, FocusStatus, focus_status};
use chrono::{Local, NaiveTime};
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const TICK_PERIOD: Duration = Duration::from_secs(1);

pub type NowProvider = Arc<dyn Fn() -> NaiveTime + Send + Sync>;
pub type SelectionSource = Arc<dyn Fn() -> Option<Task> + Send + Sync>;

pub fn local_clock() -> NowProvider {
    Arc::new(|| Local::now().time())
}

/// Background task recomputing the selected task's [`FocusStatus`].
///
/// [`spawn`](Self::spawn) hands back the first receiver. The loop ends once
/// every receiver is dropped, on [`shutdown`](Self::shutdown), or when the
/// ticker itself is dropped. The ticker does not count as a receiver.
pub struct FocusTicker {
    sender: Arc<watch::Sender<Option<FocusStatus>>>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl FocusTicker {
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        source: SelectionSource,
        now: NowProvider,
    ) -> (Self, watch::Receiver<Option<FocusStatus>>) {
        Self::spawn_with_period(source, now, TICK_PERIOD)
    }

    pub fn spawn_with_period(
        source: SelectionSource,
        now: NowProvider,
        period: Duration,
    ) -> (Self, watch::Receiver<Option<FocusStatus>>) {
        let (sender, receiver) = watch::channel(compute(&source, &now));
        let sender = Arc::new(sender);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let publisher = Arc::clone(&sender);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let status = compute(&source, &now);
                        publisher.send_if_modified(|current| {
                            if *current == status {
                                return false;
                            }
                            *current = status;
                            true
                        });
                    }
                    _ = publisher.closed() => break,
                    _ = &mut shutdown_rx => break,
                }
            }
            debug!("event=focus_ticker_stopped");
        });

        let ticker = Self {
            sender,
            shutdown: Some(shutdown_tx),
            handle,
        };
        (ticker, receiver)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<FocusStatus>> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> Option<FocusStatus> {
        self.sender.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        let _ = (&mut self.handle).await;
    }
}

fn compute(source: &SelectionSource, now: &NowProvider) -> Option<FocusStatus> {
    let selected = source();
    focus_status(selected.as_ref(), ClockReading::from_time(&now()))
}
