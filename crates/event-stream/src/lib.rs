//! Channel-backed publisher for patient lifecycle events.
//!
//! The request path hands an event to [`StreamPublisher::publish`], which is
//! a plain channel send and never blocks. A background forwarder task drains
//! the channel and delivers each event through an [`EventTransport`],
//! retrying a bounded number of times before dropping the event with an
//! error log. Delivery is therefore at-least-once toward the transport, and
//! its failures never reach the request that triggered the event.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use carelink_core::{EventPublisher, PatientCreatedEvent};

mod transport;

pub use transport::{EventTransport, HttpTransport, LogTransport, TransportError};

/// Delivery attempts per event before it is dropped.
const MAX_DELIVERY_ATTEMPTS: u32 = 3;

/// Pause between delivery attempts.
const RETRY_DELAY: Duration = Duration::from_millis(200);

/// An `EventPublisher` that forwards events to a message stream through a
/// spawned background task.
pub struct StreamPublisher {
    topic: String,
    tx: mpsc::UnboundedSender<PatientCreatedEvent>,
}

impl StreamPublisher {
    /// Spawns the forwarder task and returns the publisher feeding it.
    ///
    /// Must be called from within a tokio runtime. The forwarder runs until
    /// every `StreamPublisher` clone of the sender is dropped.
    pub fn spawn(topic: String, transport: Arc<dyn EventTransport>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(forward(topic.clone(), rx, transport));
        Self { topic, tx }
    }

    /// The stream topic events are delivered to.
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl EventPublisher for StreamPublisher {
    fn publish(&self, event: PatientCreatedEvent) {
        if self.tx.send(event).is_err() {
            // The forwarder is gone; the record is still authoritative.
            tracing::error!("patient event dropped: forwarder has shut down");
        }
    }
}

async fn forward(
    topic: String,
    mut rx: mpsc::UnboundedReceiver<PatientCreatedEvent>,
    transport: Arc<dyn EventTransport>,
) {
    while let Some(event) = rx.recv().await {
        deliver(&topic, &event, transport.as_ref()).await;
    }
    tracing::debug!(topic, "event forwarder stopped");
}

async fn deliver(topic: &str, event: &PatientCreatedEvent, transport: &dyn EventTransport) {
    let payload = match serde_json::to_value(event) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(patient_id = %event.patient_id, error = %e, "failed to encode patient event");
            return;
        }
    };

    for attempt in 1..=MAX_DELIVERY_ATTEMPTS {
        match transport.send(topic, &payload).await {
            Ok(()) => {
                tracing::debug!(patient_id = %event.patient_id, topic, attempt, "patient event delivered");
                return;
            }
            Err(e) => {
                tracing::warn!(
                    patient_id = %event.patient_id,
                    topic,
                    attempt,
                    error = %e,
                    "patient event delivery failed"
                );
                if attempt < MAX_DELIVERY_ATTEMPTS {
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }
    }

    tracing::error!(
        patient_id = %event.patient_id,
        topic,
        attempts = MAX_DELIVERY_ATTEMPTS,
        "patient event dropped after exhausting delivery attempts"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use carelink_core::PatientCreatedEvent;
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Mutex;
    use uuid::Uuid;

    fn event() -> PatientCreatedEvent {
        PatientCreatedEvent {
            patient_id: Uuid::new_v4(),
            name: "Sarah Williams".into(),
            email: "sarah@example.com".into(),
            timestamp: Utc::now(),
        }
    }

    /// Hands every delivered payload to the test over a channel.
    struct RelayTransport {
        tx: mpsc::UnboundedSender<(String, serde_json::Value)>,
    }

    #[async_trait]
    impl EventTransport for RelayTransport {
        async fn send(&self, topic: &str, payload: &serde_json::Value) -> Result<(), TransportError> {
            self.tx
                .send((topic.to_owned(), payload.clone()))
                .map_err(|_| TransportError::Closed)
        }
    }

    /// Fails the first `failures` sends, then relays like `RelayTransport`.
    struct FlakyTransport {
        failures: AtomicU32,
        tx: Mutex<mpsc::UnboundedSender<serde_json::Value>>,
    }

    #[async_trait]
    impl EventTransport for FlakyTransport {
        async fn send(
            &self,
            _topic: &str,
            payload: &serde_json::Value,
        ) -> Result<(), TransportError> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(TransportError::Http("stream gateway unavailable".into()));
            }
            let tx = self.tx.lock().await;
            tx.send(payload.clone()).map_err(|_| TransportError::Closed)
        }
    }

    #[tokio::test]
    async fn publish_delivers_event_to_the_transport() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let publisher =
            StreamPublisher::spawn("patient-lifecycle".into(), Arc::new(RelayTransport { tx }));

        let ev = event();
        publisher.publish(ev.clone());

        let (topic, payload) = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("delivery timed out")
            .expect("forwarder dropped");
        assert_eq!(topic, "patient-lifecycle");
        assert_eq!(
            payload.get("patient_id").and_then(|v| v.as_str()),
            Some(ev.patient_id.to_string().as_str())
        );
        assert_eq!(
            payload.get("email").and_then(|v| v.as_str()),
            Some("sarah@example.com")
        );
    }

    #[tokio::test]
    async fn events_are_delivered_in_publish_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let publisher =
            StreamPublisher::spawn("patient-lifecycle".into(), Arc::new(RelayTransport { tx }));

        let first = event();
        let second = event();
        publisher.publish(first.clone());
        publisher.publish(second.clone());

        for expected in [&first, &second] {
            let (_, payload) = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .expect("delivery timed out")
                .expect("forwarder dropped");
            assert_eq!(
                payload.get("patient_id").and_then(|v| v.as_str()),
                Some(expected.patient_id.to_string().as_str())
            );
        }
    }

    #[tokio::test]
    async fn delivery_retries_after_transient_failure() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let transport = Arc::new(FlakyTransport {
            failures: AtomicU32::new(1),
            tx: Mutex::new(tx),
        });
        let publisher = StreamPublisher::spawn("patient-lifecycle".into(), transport);

        publisher.publish(event());

        // First attempt fails; the retry lands after RETRY_DELAY.
        let payload = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("retry never delivered")
            .expect("forwarder dropped");
        assert!(payload.get("patient_id").is_some());
    }

    #[tokio::test]
    async fn publish_returns_immediately_when_delivery_cannot_succeed() {
        let (tx, rx) = mpsc::unbounded_channel();
        let publisher =
            StreamPublisher::spawn("patient-lifecycle".into(), Arc::new(RelayTransport { tx }));

        // Every transport send will fail from here on.
        drop(rx);

        let before = std::time::Instant::now();
        publisher.publish(event());
        assert!(before.elapsed() < Duration::from_millis(50));
    }
}
