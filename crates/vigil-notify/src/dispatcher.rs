//! Delayed, severity-routed notification dispatch.
//!
//! This module provides the [`NotificationDispatcher`]: a queue of
//! `{alert, channels, due_at}` entries drained by a background worker on a
//! fixed interval. Entries with no explicit channels get defaults by
//! severity; low-severity alerts route to no channels at all and are
//! dropped. Escalation entries re-check resolution state at due time.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use vigil_alerts::{Alert, AlertNotifier, AlertSeverity, AlertStatusView, EscalationRule};
use vigil_metrics::now_timestamp;

use crate::channels::{NotificationChannel, RecipientChannel};
use crate::error::{NotifyError, Result};

/// Registry of notification channels keyed by name.
///
/// Cloning shares the underlying table.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: Arc<RwLock<HashMap<String, Arc<dyn NotificationChannel>>>>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a channel under its own name, replacing any previous one.
    pub fn register(&self, channel: Arc<dyn NotificationChannel>) {
        let mut channels = self.channels.write();
        info!(channel = %channel.name(), "registered notification channel");
        channels.insert(channel.name().to_string(), channel);
    }

    /// Returns the channel registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn NotificationChannel>> {
        let channels = self.channels.read();
        channels.get(name).cloned()
    }

    /// Returns all registered channel names.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let channels = self.channels.read();
        channels.keys().cloned().collect()
    }

    /// Returns the number of registered channels.
    #[must_use]
    pub fn len(&self) -> usize {
        let channels = self.channels.read();
        channels.len()
    }

    /// Returns true if no channels are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Clone for ChannelRegistry {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
        }
    }
}

/// Returns the default channel names for a severity.
///
/// Low-severity alerts deliberately route nowhere.
#[must_use]
pub fn default_channels_for(severity: AlertSeverity) -> Vec<String> {
    match severity {
        AlertSeverity::Critical => vec![
            "email".to_string(),
            "slack".to_string(),
            "webhook".to_string(),
        ],
        AlertSeverity::High => vec!["email".to_string(), "slack".to_string()],
        AlertSeverity::Medium | AlertSeverity::Warning => vec!["slack".to_string()],
        AlertSeverity::Low => vec![],
    }
}

/// One pending delivery.
#[derive(Clone)]
struct QueueEntry {
    alert: Alert,
    channel_names: Vec<String>,
    /// Extra single-use channels (escalation recipients).
    adhoc: Vec<Arc<dyn NotificationChannel>>,
    /// Delivery is due once `now >= due_at` (epoch millis).
    due_at: i64,
    /// Drop the entry if the alert is resolved by the time it comes due.
    skip_if_resolved: bool,
}

/// Counts from one queue drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainOutcome {
    /// Entries whose due time had arrived.
    pub due: usize,
    /// Successful channel sends.
    pub sent: usize,
    /// Failed channel sends (unknown, disabled, or erroring channels).
    pub failed: usize,
    /// Escalation entries dropped because their alert was resolved.
    pub skipped_resolved: usize,
}

/// Delayed, severity-routed fan-out of alerts to notification channels.
///
/// Cloning shares the queue, registry, and counters.
pub struct NotificationDispatcher {
    registry: ChannelRegistry,
    queue: Arc<Mutex<VecDeque<QueueEntry>>>,
    status: Arc<RwLock<Option<Arc<dyn AlertStatusView>>>>,
    running: Arc<AtomicBool>,
    sent_total: Arc<AtomicU64>,
    failed_total: Arc<AtomicU64>,
}

impl NotificationDispatcher {
    /// Creates a new dispatcher over the given channel registry.
    #[must_use]
    pub fn new(registry: ChannelRegistry) -> Self {
        Self {
            registry,
            queue: Arc::new(Mutex::new(VecDeque::new())),
            status: Arc::new(RwLock::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            sent_total: Arc::new(AtomicU64::new(0)),
            failed_total: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the channel registry.
    #[must_use]
    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// Connects the alert-resolution view used by escalation entries.
    pub fn set_status_view(&self, status: Arc<dyn AlertStatusView>) {
        *self.status.write() = Some(status);
    }

    /// Returns the number of queued entries.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        let queue = self.queue.lock();
        queue.len()
    }

    /// Returns total successful sends since construction.
    #[must_use]
    pub fn sent_total(&self) -> u64 {
        self.sent_total.load(Ordering::Relaxed)
    }

    /// Returns total failed sends since construction.
    #[must_use]
    pub fn failed_total(&self) -> u64 {
        self.failed_total.load(Ordering::Relaxed)
    }

    /// Enqueues an alert for delivery.
    ///
    /// With `channels = None` the severity defaults apply; a low-severity
    /// alert then routes to no channels and is dropped without queueing.
    pub fn enqueue(&self, alert: Alert, channels: Option<Vec<String>>, delay: Duration) {
        let channel_names = channels.unwrap_or_else(|| default_channels_for(alert.severity));

        if channel_names.is_empty() {
            debug!(
                alert_id = %alert.id,
                severity = %alert.severity,
                "no channels for alert, dropping notification"
            );
            return;
        }

        let entry = QueueEntry {
            due_at: now_timestamp() + delay.as_millis() as i64,
            alert,
            channel_names,
            adhoc: Vec::new(),
            skip_if_resolved: false,
        };

        let mut queue = self.queue.lock();
        queue.push_back(entry);
    }

    /// Schedules delayed re-notification per the escalation rule's levels.
    ///
    /// Each level re-enqueues the alert at `delay_ms` after now, targeting
    /// the level's channels plus ad-hoc channels for any additional
    /// recipients. Entries are dropped at due time if the alert has been
    /// resolved.
    pub fn escalate(&self, alert: Alert, rule: &EscalationRule) {
        let mut queue = self.queue.lock();
        for level in &rule.levels {
            let adhoc: Vec<Arc<dyn NotificationChannel>> = level
                .additional_recipients
                .iter()
                .map(|r| Arc::new(RecipientChannel::new(r.clone())) as Arc<dyn NotificationChannel>)
                .collect();

            if level.channels.is_empty() && adhoc.is_empty() {
                continue;
            }

            let mut alert = alert.clone();
            if let Some(message) = &level.message {
                alert.message = message.clone();
            }

            info!(
                alert_id = %alert.id,
                escalation_id = %rule.id,
                level = level.level,
                delay_ms = level.delay_ms,
                "scheduled escalation"
            );

            queue.push_back(QueueEntry {
                due_at: now_timestamp() + level.delay_ms,
                alert,
                channel_names: level.channels.clone(),
                adhoc,
                skip_if_resolved: true,
            });
        }
    }

    /// Drains every due entry, sending to each of its channels.
    ///
    /// Per-channel failures are logged and counted but never retried here,
    /// and never raise a secondary alert. Entries that are not yet due stay
    /// queued in order.
    pub fn process_due(&self) -> DrainOutcome {
        let now = now_timestamp();
        let due: Vec<QueueEntry> = {
            let mut queue = self.queue.lock();
            let mut due = Vec::new();
            let mut rest = VecDeque::with_capacity(queue.len());
            for entry in queue.drain(..) {
                if entry.due_at <= now {
                    due.push(entry);
                } else {
                    rest.push_back(entry);
                }
            }
            *queue = rest;
            due
        };

        let mut outcome = DrainOutcome {
            due: due.len(),
            ..Default::default()
        };

        for entry in due {
            if entry.skip_if_resolved && self.alert_is_resolved(&entry.alert.id) {
                debug!(
                    alert_id = %entry.alert.id,
                    "alert resolved before escalation came due, dropping"
                );
                outcome.skipped_resolved += 1;
                continue;
            }

            for name in &entry.channel_names {
                match self.send_one(name, &entry.alert) {
                    Ok(()) => outcome.sent += 1,
                    Err(e) => {
                        warn!(
                            channel = %name,
                            alert_id = %entry.alert.id,
                            error = %e,
                            "notification delivery failed"
                        );
                        outcome.failed += 1;
                    }
                }
            }

            for channel in &entry.adhoc {
                match channel.send(&entry.alert) {
                    Ok(result) if result.success => outcome.sent += 1,
                    Ok(result) => {
                        warn!(
                            channel = %result.channel,
                            alert_id = %entry.alert.id,
                            message = ?result.message,
                            "escalation recipient delivery failed"
                        );
                        outcome.failed += 1;
                    }
                    Err(e) => {
                        warn!(
                            channel = %channel.name(),
                            alert_id = %entry.alert.id,
                            error = %e,
                            "escalation recipient delivery failed"
                        );
                        outcome.failed += 1;
                    }
                }
            }
        }

        self.sent_total
            .fetch_add(outcome.sent as u64, Ordering::Relaxed);
        self.failed_total
            .fetch_add(outcome.failed as u64, Ordering::Relaxed);
        outcome
    }

    /// Sends a synthetic low-severity alert directly through one channel.
    ///
    /// Bypasses the queue and severity routing; used to verify channel
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::ChannelNotFound`, `NotifyError::ChannelDisabled`,
    /// or the channel's own delivery error.
    pub fn test_channel(&self, name: &str) -> Result<bool> {
        let channel = self
            .registry
            .get(name)
            .ok_or_else(|| NotifyError::ChannelNotFound {
                name: name.to_string(),
            })?;

        if !channel.is_enabled() {
            return Err(NotifyError::ChannelDisabled {
                name: name.to_string(),
            });
        }

        let alert = Alert {
            id: uuid::Uuid::new_v4().to_string(),
            kind: "test".to_string(),
            severity: AlertSeverity::Low,
            title: format!("test notification for channel '{name}'"),
            message: "synthetic alert sent to verify channel configuration".to_string(),
            source: "alerting-test".to_string(),
            timestamp: now_timestamp(),
            resolved: false,
            resolved_at: None,
            metadata: HashMap::new(),
        };

        let result = channel.send(&alert)?;
        Ok(result.success)
    }

    fn send_one(&self, name: &str, alert: &Alert) -> Result<()> {
        let channel = self
            .registry
            .get(name)
            .ok_or_else(|| NotifyError::ChannelNotFound {
                name: name.to_string(),
            })?;

        if !channel.is_enabled() {
            return Err(NotifyError::ChannelDisabled {
                name: name.to_string(),
            });
        }

        let result = channel.send(alert)?;
        if result.success {
            Ok(())
        } else {
            Err(NotifyError::DeliveryFailed {
                channel: name.to_string(),
                reason: result.message.unwrap_or_else(|| "unknown".to_string()),
            })
        }
    }

    fn alert_is_resolved(&self, alert_id: &str) -> bool {
        let status = self.status.read();
        status.as_ref().is_some_and(|s| s.is_resolved(alert_id))
    }

    /// Starts the background worker draining the queue on an interval.
    ///
    /// Calling `start` while already running is a no-op (logged, not an
    /// error).
    pub fn start(&self, interval: Duration) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("notification dispatcher already running");
            return;
        }

        info!(
            interval_ms = interval.as_millis() as u64,
            "notification dispatcher started"
        );

        let dispatcher = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;

            while dispatcher.running.load(Ordering::SeqCst) {
                ticker.tick().await;
                if !dispatcher.running.load(Ordering::SeqCst) {
                    break;
                }
                dispatcher.process_due();
            }
        });
    }

    /// Stops the background worker. Idempotent.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("notification dispatcher stopped");
        }
    }

    /// Returns true if the background worker is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl AlertNotifier for NotificationDispatcher {
    fn enqueue(&self, alert: Alert, channels: Option<Vec<String>>, delay: Duration) {
        Self::enqueue(self, alert, channels, delay);
    }

    fn escalate(&self, alert: Alert, rule: &EscalationRule) {
        Self::escalate(self, alert, rule);
    }
}

impl Clone for NotificationDispatcher {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            queue: Arc::clone(&self.queue),
            status: Arc::clone(&self.status),
            running: Arc::clone(&self.running),
            sent_total: Arc::clone(&self.sent_total),
            failed_total: Arc::clone(&self.failed_total),
        }
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("queue_len", &self.queue_len())
            .field("channels", &self.registry.len())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::NotificationResult;
    use vigil_alerts::EscalationLevel;

    /// Channel that records every alert it is asked to send.
    #[derive(Debug)]
    struct RecordingChannel {
        name: String,
        enabled: bool,
        sent: Arc<Mutex<Vec<Alert>>>,
    }

    impl RecordingChannel {
        fn new(name: &str) -> (Self, Arc<Mutex<Vec<Alert>>>) {
            let sent = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    name: name.to_string(),
                    enabled: true,
                    sent: Arc::clone(&sent),
                },
                sent,
            )
        }

        fn disabled(name: &str) -> Self {
            Self {
                name: name.to_string(),
                enabled: false,
                sent: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl NotificationChannel for RecordingChannel {
        fn name(&self) -> &str {
            &self.name
        }

        fn send(&self, alert: &Alert) -> Result<NotificationResult> {
            self.sent.lock().push(alert.clone());
            Ok(NotificationResult::success(self.name.clone()))
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    /// Status view with a fixed set of resolved alert IDs.
    #[derive(Debug, Default)]
    struct FixedStatus(Mutex<Vec<String>>);

    impl AlertStatusView for FixedStatus {
        fn is_resolved(&self, alert_id: &str) -> bool {
            self.0.lock().iter().any(|id| id == alert_id)
        }
    }

    fn alert(severity: AlertSeverity) -> Alert {
        Alert {
            id: uuid::Uuid::new_v4().to_string(),
            kind: "test".to_string(),
            severity,
            title: "test alert".to_string(),
            message: "something happened".to_string(),
            source: "test".to_string(),
            timestamp: now_timestamp(),
            resolved: false,
            resolved_at: None,
            metadata: HashMap::new(),
        }
    }

    fn dispatcher_with_defaults() -> (
        NotificationDispatcher,
        Arc<Mutex<Vec<Alert>>>,
        Arc<Mutex<Vec<Alert>>>,
        Arc<Mutex<Vec<Alert>>>,
    ) {
        let registry = ChannelRegistry::new();
        let (email, email_sent) = RecordingChannel::new("email");
        let (slack, slack_sent) = RecordingChannel::new("slack");
        let (webhook, webhook_sent) = RecordingChannel::new("webhook");
        registry.register(Arc::new(email));
        registry.register(Arc::new(slack));
        registry.register(Arc::new(webhook));

        (
            NotificationDispatcher::new(registry),
            email_sent,
            slack_sent,
            webhook_sent,
        )
    }

    mod routing_tests {
        use super::*;

        #[test]
        fn critical_routes_to_email_slack_webhook() {
            let (dispatcher, email, slack, webhook) = dispatcher_with_defaults();

            dispatcher.enqueue(alert(AlertSeverity::Critical), None, Duration::ZERO);
            let outcome = dispatcher.process_due();

            assert_eq!(outcome.sent, 3);
            assert_eq!(email.lock().len(), 1);
            assert_eq!(slack.lock().len(), 1);
            assert_eq!(webhook.lock().len(), 1);
        }

        #[test]
        fn high_routes_to_email_and_slack() {
            let (dispatcher, email, slack, webhook) = dispatcher_with_defaults();

            dispatcher.enqueue(alert(AlertSeverity::High), None, Duration::ZERO);
            dispatcher.process_due();

            assert_eq!(email.lock().len(), 1);
            assert_eq!(slack.lock().len(), 1);
            assert!(webhook.lock().is_empty());
        }

        #[test]
        fn warning_and_medium_route_to_slack_only() {
            let (dispatcher, email, slack, _) = dispatcher_with_defaults();

            dispatcher.enqueue(alert(AlertSeverity::Warning), None, Duration::ZERO);
            dispatcher.enqueue(alert(AlertSeverity::Medium), None, Duration::ZERO);
            dispatcher.process_due();

            assert!(email.lock().is_empty());
            assert_eq!(slack.lock().len(), 2);
        }

        #[test]
        fn low_severity_is_dropped_without_sends() {
            let (dispatcher, email, slack, webhook) = dispatcher_with_defaults();

            dispatcher.enqueue(alert(AlertSeverity::Low), None, Duration::ZERO);

            // Never even queued
            assert_eq!(dispatcher.queue_len(), 0);
            let outcome = dispatcher.process_due();
            assert_eq!(outcome.sent, 0);
            assert!(email.lock().is_empty());
            assert!(slack.lock().is_empty());
            assert!(webhook.lock().is_empty());
        }

        #[test]
        fn explicit_channels_override_defaults() {
            let (dispatcher, email, slack, _) = dispatcher_with_defaults();

            dispatcher.enqueue(
                alert(AlertSeverity::Low),
                Some(vec!["slack".to_string()]),
                Duration::ZERO,
            );
            dispatcher.process_due();

            assert!(email.lock().is_empty());
            assert_eq!(slack.lock().len(), 1);
        }
    }

    mod queue_tests {
        use super::*;

        #[test]
        fn delayed_entry_stays_queued_until_due() {
            let (dispatcher, _, slack, _) = dispatcher_with_defaults();

            dispatcher.enqueue(
                alert(AlertSeverity::Warning),
                None,
                Duration::from_secs(60),
            );

            let outcome = dispatcher.process_due();
            assert_eq!(outcome.due, 0);
            assert_eq!(dispatcher.queue_len(), 1);
            assert!(slack.lock().is_empty());
        }

        #[test]
        fn due_entries_drain_in_fifo_order() {
            let (dispatcher, _, slack, _) = dispatcher_with_defaults();

            let first = alert(AlertSeverity::Warning);
            let second = alert(AlertSeverity::Warning);
            dispatcher.enqueue(first.clone(), None, Duration::ZERO);
            dispatcher.enqueue(second.clone(), None, Duration::ZERO);

            dispatcher.process_due();

            let sent = slack.lock();
            assert_eq!(sent.len(), 2);
            assert_eq!(sent[0].id, first.id);
            assert_eq!(sent[1].id, second.id);
        }

        #[test]
        fn unknown_channel_fails_closed_without_panic() {
            let registry = ChannelRegistry::new();
            let dispatcher = NotificationDispatcher::new(registry);

            dispatcher.enqueue(
                alert(AlertSeverity::High),
                Some(vec!["ghost".to_string()]),
                Duration::ZERO,
            );
            let outcome = dispatcher.process_due();

            assert_eq!(outcome.failed, 1);
            assert_eq!(outcome.sent, 0);
            assert_eq!(dispatcher.failed_total(), 1);
        }

        #[test]
        fn disabled_channel_fails_closed() {
            let registry = ChannelRegistry::new();
            registry.register(Arc::new(RecordingChannel::disabled("email")));
            let dispatcher = NotificationDispatcher::new(registry);

            dispatcher.enqueue(
                alert(AlertSeverity::High),
                Some(vec!["email".to_string()]),
                Duration::ZERO,
            );
            let outcome = dispatcher.process_due();

            assert_eq!(outcome.failed, 1);
        }

        #[test]
        fn one_failing_channel_does_not_block_others() {
            let registry = ChannelRegistry::new();
            let (slack, slack_sent) = RecordingChannel::new("slack");
            registry.register(Arc::new(slack));
            let dispatcher = NotificationDispatcher::new(registry);

            dispatcher.enqueue(
                alert(AlertSeverity::High),
                Some(vec!["ghost".to_string(), "slack".to_string()]),
                Duration::ZERO,
            );
            let outcome = dispatcher.process_due();

            assert_eq!(outcome.failed, 1);
            assert_eq!(outcome.sent, 1);
            assert_eq!(slack_sent.lock().len(), 1);
        }
    }

    mod escalation_tests {
        use super::*;

        fn escalation_rule(delay_ms: i64) -> EscalationRule {
            EscalationRule::new(vec![EscalationLevel {
                level: 1,
                delay_ms,
                channels: vec!["email".to_string()],
                additional_recipients: vec!["oncall@example.com".to_string()],
                message: Some("still unresolved".to_string()),
            }])
        }

        #[test]
        fn escalation_sends_to_level_channels_and_recipients() {
            let (dispatcher, email, _, _) = dispatcher_with_defaults();

            dispatcher.escalate(alert(AlertSeverity::Critical), &escalation_rule(0));
            let outcome = dispatcher.process_due();

            // email channel + one ad-hoc recipient channel
            assert_eq!(outcome.sent, 2);
            let sent = email.lock();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].message, "still unresolved");
        }

        #[test]
        fn escalation_waits_for_its_delay() {
            let (dispatcher, email, _, _) = dispatcher_with_defaults();

            dispatcher.escalate(alert(AlertSeverity::Critical), &escalation_rule(60_000));
            let outcome = dispatcher.process_due();

            assert_eq!(outcome.due, 0);
            assert!(email.lock().is_empty());
            assert_eq!(dispatcher.queue_len(), 1);
        }

        #[test]
        fn resolved_alert_is_not_escalated() {
            let (dispatcher, email, _, _) = dispatcher_with_defaults();
            let status = Arc::new(FixedStatus::default());
            dispatcher.set_status_view(status.clone());

            let escalated = alert(AlertSeverity::Critical);
            status.0.lock().push(escalated.id.clone());

            dispatcher.escalate(escalated, &escalation_rule(0));
            let outcome = dispatcher.process_due();

            assert_eq!(outcome.skipped_resolved, 1);
            assert_eq!(outcome.sent, 0);
            assert!(email.lock().is_empty());
        }

        #[test]
        fn multi_level_escalation_queues_every_level() {
            let (dispatcher, _, _, _) = dispatcher_with_defaults();

            let rule = EscalationRule::new(vec![
                EscalationLevel {
                    level: 1,
                    delay_ms: 60_000,
                    channels: vec!["slack".to_string()],
                    additional_recipients: vec![],
                    message: None,
                },
                EscalationLevel {
                    level: 2,
                    delay_ms: 300_000,
                    channels: vec!["email".to_string()],
                    additional_recipients: vec!["cto@example.com".to_string()],
                    message: None,
                },
            ]);

            dispatcher.escalate(alert(AlertSeverity::Critical), &rule);
            assert_eq!(dispatcher.queue_len(), 2);
        }
    }

    mod test_channel_tests {
        use super::*;

        #[test]
        fn test_channel_sends_synthetic_low_alert() {
            let registry = ChannelRegistry::new();
            let (slack, slack_sent) = RecordingChannel::new("slack");
            registry.register(Arc::new(slack));
            let dispatcher = NotificationDispatcher::new(registry);

            let success = dispatcher.test_channel("slack").unwrap();
            assert!(success);

            let sent = slack_sent.lock();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].severity, AlertSeverity::Low);
            assert_eq!(sent[0].kind, "test");
        }

        #[test]
        fn test_unknown_channel_fails() {
            let dispatcher = NotificationDispatcher::new(ChannelRegistry::new());
            assert!(matches!(
                dispatcher.test_channel("ghost"),
                Err(NotifyError::ChannelNotFound { .. })
            ));
        }

        #[test]
        fn test_disabled_channel_fails() {
            let registry = ChannelRegistry::new();
            registry.register(Arc::new(RecordingChannel::disabled("email")));
            let dispatcher = NotificationDispatcher::new(registry);

            assert!(matches!(
                dispatcher.test_channel("email"),
                Err(NotifyError::ChannelDisabled { .. })
            ));
        }
    }

    mod worker_tests {
        use super::*;

        #[tokio::test]
        async fn worker_drains_queue_periodically() {
            let (dispatcher, _, slack, _) = dispatcher_with_defaults();

            dispatcher.start(Duration::from_millis(20));
            dispatcher.enqueue(alert(AlertSeverity::Warning), None, Duration::ZERO);

            tokio::time::sleep(Duration::from_millis(100)).await;
            dispatcher.stop();

            assert_eq!(slack.lock().len(), 1);
            assert_eq!(dispatcher.queue_len(), 0);
        }

        #[tokio::test]
        async fn start_twice_is_a_noop() {
            let (dispatcher, _, _, _) = dispatcher_with_defaults();
            dispatcher.start(Duration::from_millis(50));
            dispatcher.start(Duration::from_millis(50));
            assert!(dispatcher.is_running());
            dispatcher.stop();
            dispatcher.stop();
            assert!(!dispatcher.is_running());
        }
    }
}
