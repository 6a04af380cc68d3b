use crate::event::{group_by_conversation, sort_chronologically, Event, SenderRole};

/// Ordered events sharing one conversation id.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: String,
    pub customer_name: Option<String>,
    pub events: Vec<Event>,
}

impl Conversation {
    pub fn from_events(id: String, mut events: Vec<Event>) -> Self {
        sort_chronologically(&mut events);
        let customer_name = events.first().and_then(|e| e.customer_name.clone());
        Self {
            id,
            customer_name,
            events,
        }
    }

    /// Groups events into conversations in first-appearance order.
    pub fn group(events: Vec<Event>) -> Vec<Conversation> {
        group_by_conversation(events)
            .into_iter()
            .filter_map(|rows| {
                let id = rows.first()?.conversation_id.clone();
                Some(Conversation::from_events(id, rows))
            })
            .collect()
    }

    /// True when every required role has at least one message whose sender
    /// label is exactly that role's name.
    pub fn has_roles(&self, required: &[SenderRole]) -> bool {
        required
            .iter()
            .all(|&role| self.events.iter().any(|e| e.sent_by(role)))
    }
}
