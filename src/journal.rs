// 📜 Event Journal - every change is an event
//
// Append-only, in-memory. The store writes one event per affected entity
// so any state change can be traced back to the operation and actor that
// caused it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Domain,
    Evaluation,
    Sale,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Domain => "domain",
            EntityKind::Evaluation => "evaluation",
            EntityKind::Sale => "sale",
        }
    }
}

/// Audit trail entry
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: EntityKind,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type,
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Vec<Event>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events for one entity, oldest first
    pub fn events_for_entity(&self, entity_type: EntityKind, entity_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.entity_type == entity_type && e.entity_id == entity_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log() {
        let mut journal = Journal::new();

        journal.record(Event::new(
            "domain_created",
            EntityKind::Domain,
            "dom-1",
            serde_json::json!({"name": "exemple.com"}),
            "test_actor",
        ));
        journal.record(Event::new(
            "evaluation_created",
            EntityKind::Evaluation,
            "eval-1",
            serde_json::json!({"domain_id": "dom-1"}),
            "test_actor",
        ));

        let events = journal.events_for_entity(EntityKind::Domain, "dom-1");

        assert_eq!(journal.len(), 2);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "domain_created");
        assert_eq!(events[0].actor, "test_actor");
        assert_eq!(events[0].event_id.len(), 36);
    }
}
