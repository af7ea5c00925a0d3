//! Agent memory: a bounded event log and a relationship ledger.
//!
//! - **Events** live in a ring of fixed capacity. Appending to a full ring
//!   evicts the oldest entry, and entries older than the configured TTL are
//!   purged on every decay pass.
//! - **Relationships** map other agents to a score in `[-100, 100]`. Every
//!   score drifts toward zero at a constant rate and never overshoots it; a
//!   score that reaches zero is dropped from the ledger.
//!
//! Memory keeps its own clock, advanced by [`Memory::decay_memories`], so
//! event ages are measured in simulated seconds.

use std::collections::{BTreeMap, VecDeque};

use civitas_types::{AgentId, MemoryEvent, MemoryEventKind};

use crate::config::MemoryConfig;

/// Lowest possible relationship score.
pub const RELATIONSHIP_MIN: f64 = -100.0;

/// Highest possible relationship score.
pub const RELATIONSHIP_MAX: f64 = 100.0;

/// Event log plus relationship ledger for one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Memory {
    events: VecDeque<MemoryEvent>,
    capacity: usize,
    ttl: f64,
    relationships: BTreeMap<AgentId, f64>,
    decay_rate: f64,
    now: f64,
}

impl Memory {
    /// Create an empty memory whose clock starts at `now`.
    pub fn new(config: &MemoryConfig, now: f64) -> Self {
        let capacity = config.capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            ttl: config.event_ttl_seconds.max(0.0),
            relationships: BTreeMap::new(),
            decay_rate: config.relationship_decay_per_second.max(0.0),
            now: if now.is_finite() { now } else { 0.0 },
        }
    }

    // -------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------

    /// Append an event, evicting the oldest one if the log is full.
    pub fn remember_event(
        &mut self,
        kind: MemoryEventKind,
        subject: Option<AgentId>,
        payload: serde_json::Value,
        timestamp: f64,
    ) {
        while self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(MemoryEvent {
            kind,
            subject,
            payload,
            timestamp,
        });
    }

    /// Advance the memory clock by `dt`, purge expired events, and decay
    /// every relationship toward zero.
    pub fn decay_memories(&mut self, dt: f64) {
        if !dt.is_finite() || dt < 0.0 {
            return;
        }
        self.now += dt;
        let cutoff = self.now - self.ttl;
        self.events.retain(|e| e.timestamp >= cutoff);

        let step = self.decay_rate * dt;
        if step <= 0.0 {
            return;
        }
        for score in self.relationships.values_mut() {
            *score = if *score > 0.0 {
                (*score - step).max(0.0)
            } else {
                (*score + step).min(0.0)
            };
        }
        self.relationships.retain(|_, score| *score != 0.0);
    }

    /// Events in the log, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &MemoryEvent> {
        self.events.iter()
    }

    /// The most recent event of `kind`, if any.
    pub fn last_event(&self, kind: MemoryEventKind) -> Option<&MemoryEvent> {
        self.events.iter().rev().find(|e| e.kind == kind)
    }

    /// Number of events in the log.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Maximum number of events retained.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current memory clock in simulated seconds.
    pub const fn now(&self) -> f64 {
        self.now
    }

    // -------------------------------------------------------------------
    // Relationships
    // -------------------------------------------------------------------

    /// Score toward `other`, zero if unknown.
    pub fn relationship(&self, other: AgentId) -> f64 {
        self.relationships.get(&other).copied().unwrap_or(0.0)
    }

    /// Add `delta` to the score toward `other`, clamped to `[-100, 100]`.
    ///
    /// Only this agent's side is changed; the caller decides symmetry.
    /// Returns the new score.
    pub fn update_relationship(&mut self, other: AgentId, delta: f64) -> f64 {
        let current = self.relationship(other);
        if !delta.is_finite() {
            return current;
        }
        let next = (current + delta).clamp(RELATIONSHIP_MIN, RELATIONSHIP_MAX);
        if next == 0.0 {
            self.relationships.remove(&other);
        } else {
            self.relationships.insert(other, next);
        }
        next
    }

    /// Forget everything about `other`.
    pub fn forget(&mut self, other: AgentId) {
        self.relationships.remove(&other);
    }

    /// Every non-zero relationship, in id order.
    pub fn relationships(&self) -> impl Iterator<Item = (AgentId, f64)> + '_ {
        self.relationships.iter().map(|(&id, &score)| (id, score))
    }

    /// Number of relationships strictly above `threshold`.
    pub fn count_above(&self, threshold: f64) -> usize {
        self.relationships.values().filter(|&&s| s > threshold).count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn memory(capacity: usize, ttl: f64, decay: f64) -> Memory {
        Memory::new(
            &MemoryConfig {
                capacity,
                event_ttl_seconds: ttl,
                relationship_decay_per_second: decay,
            },
            0.0,
        )
    }

    #[test]
    fn ring_evicts_oldest() {
        let mut m = memory(3, 100.0, 0.0);
        for i in 0..5 {
            m.remember_event(MemoryEventKind::Arrived, None, json!({ "i": i }), f64::from(i));
        }
        assert_eq!(m.event_count(), 3);
        let kept: Vec<f64> = m.events().map(|e| e.timestamp).collect();
        assert_eq!(kept, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn events_older_than_ttl_are_purged() {
        let mut m = memory(10, 5.0, 0.0);
        m.remember_event(MemoryEventKind::Purchase, None, json!(null), 0.0);
        m.decay_memories(3.0);
        m.remember_event(MemoryEventKind::Arrived, None, json!(null), 3.0);
        m.decay_memories(3.0);
        assert_eq!(m.event_count(), 1);
        assert_eq!(m.events().next().unwrap().kind, MemoryEventKind::Arrived);
        assert!((m.now() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn relationships_clamp() {
        let mut m = memory(4, 10.0, 0.0);
        let other = AgentId::new();
        assert!((m.update_relationship(other, 250.0) - 100.0).abs() < 1e-12);
        assert!((m.update_relationship(other, -400.0) + 100.0).abs() < 1e-12);
        assert!((m.update_relationship(other, f64::NAN) + 100.0).abs() < 1e-12);
    }

    #[test]
    fn decay_moves_toward_zero_without_crossing() {
        let mut m = memory(4, 10.0, 1.0);
        let friend = AgentId::new();
        let rival = AgentId::new();
        m.update_relationship(friend, 2.5);
        m.update_relationship(rival, -2.5);
        m.decay_memories(1.0);
        assert!((m.relationship(friend) - 1.5).abs() < 1e-12);
        assert!((m.relationship(rival) + 1.5).abs() < 1e-12);
        m.decay_memories(10.0);
        assert!(m.relationship(friend).abs() < 1e-12);
        assert!(m.relationship(rival).abs() < 1e-12);
        assert_eq!(m.relationships().count(), 0);
    }

    #[test]
    fn decay_is_monotonic_in_magnitude() {
        let mut m = memory(4, 10.0, 0.3);
        let other = AgentId::new();
        m.update_relationship(other, -40.0);
        let mut last = m.relationship(other);
        for _ in 0..200 {
            m.decay_memories(1.0);
            let now = m.relationship(other);
            assert!(now <= 0.0);
            assert!(now.abs() <= last.abs());
            last = now;
        }
        assert!(last.abs() < 1e-12);
    }

    #[test]
    fn counts_friends_above_threshold() {
        let mut m = memory(4, 10.0, 0.0);
        m.update_relationship(AgentId::new(), 60.0);
        m.update_relationship(AgentId::new(), 50.0);
        m.update_relationship(AgentId::new(), -70.0);
        assert_eq!(m.count_above(50.0), 1);
        assert!(m.last_event(MemoryEventKind::Interaction).is_none());
    }
}
