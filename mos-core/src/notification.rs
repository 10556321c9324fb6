//! Deduplicating, auto-expiring on-screen notifications.
//!
//! Each record walks `Visible -> Fading -> Removed`, driven by [`NotificationQueue::tick`]
//! with a caller-supplied clock. A record has exactly one pending deadline,
//! so the shell needs a single timer handle per record.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationSize {
    #[default]
    Large,
    Small,
}

/// What the caller asks to show.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Records sharing an id collapse into one with a counter.
    pub id: Option<String>,
    pub header: String,
    pub icon: Option<String>,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub size: NotificationSize,
    /// Overrides the queue's display delay for this record.
    pub time_ms: Option<u64>,
}

impl NotificationConfig {
    pub fn new(
        kind: NotificationKind,
        header: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            header: header.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn error(header: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, header, description)
    }

    pub fn info(header: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, header, description)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_time(mut self, time_ms: u64) -> Self {
        self.time_ms = Some(time_ms);
        self
    }

    pub fn small(mut self) -> Self {
        self.size = NotificationSize::Small;
        self
    }
}

pub type NotificationKey = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Visible,
    Fading,
    Removed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRecord {
    key: NotificationKey,
    config: NotificationConfig,
    counter: u32,
    phase: Phase,
    deadline_ms: u64,
}

impl NotificationRecord {
    pub fn key(&self) -> NotificationKey {
        self.key
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    /// How many times this notification was raised.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// When the current phase ends.
    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }
}

/// State changes the view has to mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    Created(NotificationKey),
    Counted { key: NotificationKey, counter: u32 },
    Refreshed(NotificationKey),
    Fading(NotificationKey),
    Removed(NotificationKey),
}

impl QueueEvent {
    pub fn key(&self) -> NotificationKey {
        match self {
            QueueEvent::Created(key)
            | QueueEvent::Refreshed(key)
            | QueueEvent::Fading(key)
            | QueueEvent::Removed(key) => *key,
            QueueEvent::Counted { key, .. } => *key,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationQueue {
    // Newest first, matching display order.
    records: VecDeque<NotificationRecord>,
    next_key: NotificationKey,
    capacity: usize,
    delay_ms: u64,
    fade_ms: u64,
}

impl NotificationQueue {
    pub fn new(capacity: usize, delay_ms: u64, fade_ms: u64) -> Self {
        Self {
            records: VecDeque::new(),
            next_key: 1,
            capacity: capacity.max(1),
            delay_ms,
            fade_ms,
        }
    }

    pub fn from_config(config: &crate::config::DashboardConfig) -> Self {
        Self::new(
            config.notification_capacity,
            config.notification_delay_ms,
            config.notification_fade_ms,
        )
    }

    pub fn fade_ms(&self) -> u64 {
        self.fade_ms
    }

    fn delay_for(&self, config: &NotificationConfig) -> u64 {
        config.time_ms.unwrap_or(self.delay_ms)
    }

    /// Show `config`, or bump the counter of the live record sharing its id.
    pub fn add(&mut self, config: NotificationConfig, now_ms: u64) -> Vec<QueueEvent> {
        let delay = self.delay_for(&config);
        if let Some(id) = config.id.as_deref() {
            if let Some(rec) = self
                .records
                .iter_mut()
                .find(|r| r.config.id.as_deref() == Some(id))
            {
                rec.counter += 1;
                rec.phase = Phase::Visible;
                rec.deadline_ms = now_ms + delay;
                return vec![QueueEvent::Counted {
                    key: rec.key,
                    counter: rec.counter,
                }];
            }
        }

        let key = self.next_key;
        self.next_key += 1;
        self.records.push_front(NotificationRecord {
            key,
            config,
            counter: 1,
            phase: Phase::Visible,
            deadline_ms: now_ms + delay,
        });

        let mut events = vec![QueueEvent::Created(key)];
        while self.records.len() > self.capacity {
            if let Some(oldest) = self.records.pop_back() {
                events.push(QueueEvent::Removed(oldest.key));
            }
        }
        events
    }

    /// Hover or click: back to fully visible with a fresh delay.
    pub fn touch(&mut self, key: NotificationKey, now_ms: u64) -> Option<QueueEvent> {
        let default_delay = self.delay_ms;
        let rec = self.records.iter_mut().find(|r| r.key == key)?;
        rec.phase = Phase::Visible;
        rec.deadline_ms = now_ms + rec.config.time_ms.unwrap_or(default_delay);
        Some(QueueEvent::Refreshed(key))
    }

    /// Close one notification immediately.
    pub fn dismiss(&mut self, key: NotificationKey) -> Option<NotificationRecord> {
        let idx = self.records.iter().position(|r| r.key == key)?;
        let mut rec = self.records.remove(idx)?;
        rec.phase = Phase::Removed;
        Some(rec)
    }

    pub fn remove_all(&mut self) -> Vec<NotificationKey> {
        self.records.drain(..).map(|r| r.key).collect()
    }

    /// Advance every record whose deadline has passed.
    pub fn tick(&mut self, now_ms: u64) -> Vec<QueueEvent> {
        let fade = self.fade_ms;
        let mut events = Vec::new();
        for rec in self.records.iter_mut() {
            if rec.phase == Phase::Visible && now_ms >= rec.deadline_ms {
                rec.phase = Phase::Fading;
                rec.deadline_ms += fade;
                events.push(QueueEvent::Fading(rec.key));
            }
            if rec.phase == Phase::Fading && now_ms >= rec.deadline_ms {
                rec.phase = Phase::Removed;
                events.push(QueueEvent::Removed(rec.key));
            }
        }
        self.records.retain(|r| r.phase != Phase::Removed);
        events
    }

    /// Live records that `events` did not touch. Their timers still need a deadline
    /// after a tick, including a tick that came before the deadline.
    pub fn pending(&self, events: &[QueueEvent]) -> Vec<NotificationKey> {
        self.records
            .iter()
            .map(|r| r.key)
            .filter(|key| !events.iter().any(|ev| ev.key() == *key))
            .collect()
    }

    pub fn get(&self, key: NotificationKey) -> Option<&NotificationRecord> {
        self.records.iter().find(|r| r.key == key)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&NotificationRecord> {
        self.records
            .iter()
            .find(|r| r.config.id.as_deref() == Some(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.records.iter()
    }

    /// Earliest pending deadline across all records.
    pub fn next_deadline(&self) -> Option<u64> {
        self.records.iter().map(|r| r.deadline_ms).min()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
