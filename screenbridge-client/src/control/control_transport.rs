use crate::config::{ControlConfig, MIN_FLUSH_INTERVAL};
use crate::control::{CursorOverlay, MoveThrottle};
use crate::link::ControlChannel;
use screenbridge_core::{ControlEvent, ControlMessage, Delivery};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

type EventQueue = Arc<Mutex<VecDeque<ControlEvent>>>;

/// Viewer-side pacing of control events over an unordered channel.
///
/// Coalescable events (`move`, `wheel`) wait in a queue drained by a periodic
/// flush into batches; immediate events (buttons, keys) are sent on their own
/// at once. Nothing is ever retransmitted.
pub struct ControlTransport {
    channel: Arc<dyn ControlChannel>,
    config: ControlConfig,
    queue: EventQueue,
    throttle: MoveThrottle,
    cursor: Arc<dyn CursorOverlay>,
    /// Cleared by `disable` so a flush already past its drain sends nothing.
    enabled: Arc<AtomicBool>,
    flush_task: Option<JoinHandle<()>>,
}

impl ControlTransport {
    pub fn new(
        channel: Arc<dyn ControlChannel>,
        config: ControlConfig,
        cursor: Arc<dyn CursorOverlay>,
    ) -> Self {
        Self {
            channel,
            throttle: MoveThrottle::new(config.move_interval),
            config,
            queue: Arc::new(Mutex::new(VecDeque::new())),
            cursor,
            enabled: Arc::new(AtomicBool::new(false)),
            flush_task: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.flush_task.is_some()
    }

    /// Starts the flush timer. Returns `false` if already enabled.
    pub fn enable(&mut self) -> bool {
        if self.is_enabled() {
            return false;
        }

        let queue = self.queue.clone();
        let channel = self.channel.clone();
        let enabled = self.enabled.clone();
        let period = self.config.flush_interval.max(MIN_FLUSH_INTERVAL);
        let max_batch = self.config.max_batch;
        let start = Instant::now() + period;

        self.enabled.store(true, Ordering::SeqCst);
        self.flush_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                flush(&queue, channel.as_ref(), max_batch, &enabled).await;
            }
        }));

        self.cursor.set_control_active(true);
        info!("Control enabled");
        true
    }

    /// Stops the flush timer, drops everything still queued and restores the
    /// local cursor. Returns `false` if already disabled.
    pub fn disable(&mut self) -> bool {
        let Some(task) = self.flush_task.take() else {
            return false;
        };
        self.enabled.store(false, Ordering::SeqCst);
        task.abort();

        let dropped = self.drain_queue();
        self.throttle.reset();
        self.cursor.set_control_active(false);
        info!(dropped, "Control disabled");
        true
    }

    /// Hands one captured event to the transport. Ignored while disabled.
    pub async fn capture(&mut self, event: ControlEvent) {
        if !self.is_enabled() {
            return;
        }

        match event.delivery() {
            Delivery::Coalesced => {
                if event.is_pointer_move() && !self.throttle.accept(Instant::now()) {
                    return;
                }
                self.lock_queue().push_back(event);
            }
            Delivery::Immediate => self.send_now(event).await,
        }
    }

    pub fn queued(&self) -> usize {
        self.lock_queue().len()
    }

    async fn send_now(&self, event: ControlEvent) {
        if !self.channel.is_open() {
            debug!("Control channel closed, dropping {:?}", event);
            return;
        }
        let text = match ControlMessage::single(event).to_json() {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to encode control event: {}", e);
                return;
            }
        };
        if let Err(e) = self.channel.send_text(text).await {
            debug!("Control event lost: {:#}", e);
        }
    }

    fn drain_queue(&self) -> usize {
        let mut queue = self.lock_queue();
        let dropped = queue.len();
        queue.clear();
        dropped
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<ControlEvent>> {
        lock(&self.queue)
    }
}

impl Drop for ControlTransport {
    fn drop(&mut self) {
        self.enabled.store(false, Ordering::SeqCst);
        if let Some(task) = self.flush_task.take() {
            task.abort();
        }
    }
}

fn lock(queue: &EventQueue) -> std::sync::MutexGuard<'_, VecDeque<ControlEvent>> {
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One flush tick: sends up to `max_batch` of the oldest queued events as a
/// batch. A closed channel leaves the queue untouched. A batch drained after
/// `enabled` was cleared is dropped.
async fn flush(
    queue: &EventQueue,
    channel: &dyn ControlChannel,
    max_batch: usize,
    enabled: &AtomicBool,
) {
    if !channel.is_open() {
        return;
    }

    let events: Vec<ControlEvent> = {
        let mut queue = lock(queue);
        let take = queue.len().min(max_batch);
        queue.drain(..take).collect()
    };
    if events.is_empty() {
        return;
    }

    let count = events.len();
    if !enabled.load(Ordering::SeqCst) {
        debug!(count, "Control disabled mid-flush, dropping batch");
        return;
    }
    let text = match ControlMessage::batch(events).to_json() {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to encode control batch: {}", e);
            return;
        }
    };
    if let Err(e) = channel.send_text(text).await {
        debug!(count, "Control batch lost: {:#}", e);
    }
}
