//! Persistent live-feed subscriber.
//!
//! The relay pushes one JSON-encoded event per line over a server-sent-events
//! channel, in mint order. A background worker holds the connection open,
//! merges every mint event into the resolution index the moment it arrives,
//! and fans all events out to attached observers. The worker is best-effort
//! by contract: it keeps the index warm, while delivery guarantees belong to
//! the snapshot-refresh fallback.
//!
//! Failure containment is per-message: a malformed frame is skipped, a
//! dropped stream triggers a reconnect after a fixed backoff, and nothing in
//! here ever propagates an error to the owner.

use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, warn};

use linkledger_resolver::LinkIndex;
use linkledger_types::{LedgerEvent, NormalizedKey};

use crate::relay::RelayClient;

/// Delay before re-dialing a dropped stream.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(5);

type Observers = Arc<Mutex<Vec<mpsc::Sender<LedgerEvent>>>>;

/// Handle to the background live-feed worker.
///
/// Owning the handle gives the host a clean shutdown path via
/// [`LiveFeed::close`]. Dropping it without closing leaves the worker running
/// for the life of the process, which is fine for hosts that never tear down.
pub struct LiveFeed {
    stop: Arc<AtomicBool>,
    observers: Observers,
    worker: Option<thread::JoinHandle<()>>,
}

impl LiveFeed {
    /// Spawn the subscriber against `{relay_endpoint}/stream`, merging mint
    /// events into `index` as they arrive.
    pub fn spawn(relay_endpoint: &str, index: Arc<LinkIndex>) -> Self {
        let stream_url = format!("{}/stream", relay_endpoint.trim_end_matches('/'));
        let stop = Arc::new(AtomicBool::new(false));
        let observers: Observers = Arc::new(Mutex::new(Vec::new()));

        let worker = {
            let stop = Arc::clone(&stop);
            let observers = Arc::clone(&observers);
            thread::spawn(move || run(stream_url, index, observers, stop))
        };

        Self {
            stop,
            observers,
            worker: Some(worker),
        }
    }

    /// Attach an observer. Every event decoded from the feed (all kinds, not
    /// just mints) is forwarded; disconnected observers are pruned.
    pub fn events(&self) -> mpsc::Receiver<LedgerEvent> {
        let (tx, rx) = mpsc::channel();
        self.observers.lock().push(tx);
        rx
    }

    /// Request shutdown. The worker observes the flag at the next frame or
    /// reconnect attempt; a read blocked on a quiet stream keeps the thread
    /// alive until then, so this does not join.
    pub fn close(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        drop(self.worker.take());
    }
}

fn run(stream_url: String, index: Arc<LinkIndex>, observers: Observers, stop: Arc<AtomicBool>) {
    // Connect timeout only: the stream itself stays open indefinitely, so an
    // overall request timeout would sever a healthy feed.
    let (_, connect_timeout) = RelayClient::default_timeouts();
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(connect_timeout)
        .build();

    while !stop.load(Ordering::Relaxed) {
        match agent
            .get(&stream_url)
            .set("Accept", "text/event-stream")
            .call()
        {
            Ok(response) => {
                debug!(url = %stream_url, "live feed connected");
                let reader = BufReader::new(response.into_reader());
                for line in reader.lines() {
                    if stop.load(Ordering::Relaxed) {
                        return;
                    }
                    match line {
                        Ok(line) => {
                            if let Some(event) = decode_frame(&line) {
                                deliver(&index, &observers, event);
                            }
                        }
                        Err(e) => {
                            warn!(kind = "live_feed", error = %e, "stream dropped; reconnecting");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(kind = "live_feed", error = %e, "stream connection failed");
            }
        }
        if stop.load(Ordering::Relaxed) {
            return;
        }
        thread::sleep(RECONNECT_BACKOFF);
    }
}

/// Decode one SSE line into an event.
///
/// Non-data lines (comments, `event:`/`id:` fields, keep-alive blanks) yield
/// `None` silently; a data line that fails to decode is logged and skipped —
/// a single malformed message is never fatal to the subscription.
fn decode_frame(line: &str) -> Option<LedgerEvent> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() {
        return None;
    }
    match serde_json::from_str(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(kind = "live_feed", error = %e, "skipping malformed event frame");
            None
        }
    }
}

fn deliver(index: &LinkIndex, observers: &Observers, event: LedgerEvent) {
    if let LedgerEvent::LinkPosted {
        link_id,
        subject,
        url,
        ..
    } = &event
    {
        let key = NormalizedKey::new(subject, url);
        if let Err(e) = index.insert(key, link_id.clone()) {
            error!(kind = "live_feed", error = %e, "conflicting mint event ignored");
        }
    }

    let mut observers = observers.lock();
    observers.retain(|tx| tx.send(event.clone()).is_ok());
}
