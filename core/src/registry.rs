//! Two-channel publish/subscribe registry for request outcomes.
//!
//! # Design
//! An explicit map from [`Channel`] to an ordered listener list. Listeners
//! run in descending priority, ties in subscription order. `publish`
//! snapshots the list before calling out, so a listener may subscribe or
//! unsubscribe without deadlocking the registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The named outcome channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Success,
    Error,
}

impl Channel {
    pub fn name(self) -> &'static str {
        match self {
            Channel::Success => "success",
            Channel::Error => "error",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(Uuid);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type Listener<R> = Arc<dyn Fn(&R) + Send + Sync>;

struct Entry<R> {
    id: ListenerId,
    priority: i32,
    listener: Listener<R>,
}

impl<R> Clone for Entry<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            priority: self.priority,
            listener: Arc::clone(&self.listener),
        }
    }
}

pub struct EventRegistry<R> {
    channels: RwLock<HashMap<Channel, Vec<Entry<R>>>>,
}

impl<R> Default for EventRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for EventRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("success", &self.listener_count(Channel::Success))
            .field("error", &self.listener_count(Channel::Error))
            .finish()
    }
}

impl<R> EventRegistry<R> {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    pub fn subscribe<F>(&self, channel: Channel, listener: F) -> ListenerId
    where
        F: Fn(&R) + Send + Sync + 'static,
    {
        self.subscribe_with_priority(channel, 0, listener)
    }

    /// Higher priorities run first.
    pub fn subscribe_with_priority<F>(&self, channel: Channel, priority: i32, listener: F) -> ListenerId
    where
        F: Fn(&R) + Send + Sync + 'static,
    {
        let id = ListenerId(Uuid::new_v4());
        let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        let entries = channels.entry(channel).or_default();
        // Insert after every entry of equal or higher priority.
        let at = entries
            .iter()
            .position(|e| e.priority < priority)
            .unwrap_or(entries.len());
        entries.insert(
            at,
            Entry {
                id,
                priority,
                listener: Arc::new(listener),
            },
        );
        id
    }

    /// Returns whether a listener was removed.
    pub fn unsubscribe(&self, channel: Channel, id: ListenerId) -> bool {
        let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        let Some(entries) = channels.get_mut(&channel) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }

    pub fn is_subscribed(&self, channel: Channel, id: ListenerId) -> bool {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        channels
            .get(&channel)
            .is_some_and(|entries| entries.iter().any(|e| e.id == id))
    }

    pub fn listener_count(&self, channel: Channel) -> usize {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        channels.get(&channel).map_or(0, Vec::len)
    }

    /// Call every listener on `channel` with `event`. Returns how many ran.
    pub fn publish(&self, channel: Channel, event: &R) -> usize {
        let snapshot: Vec<Entry<R>> = {
            let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
            channels.get(&channel).cloned().unwrap_or_default()
        };
        for entry in &snapshot {
            (entry.listener)(event);
        }
        snapshot.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&'static str) -> Box<dyn Fn(&String) + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let shared = Arc::clone(&log);
        let make = move |tag: &'static str| -> Box<dyn Fn(&String) + Send + Sync> {
            let log = Arc::clone(&shared);
            Box::new(move |event: &String| log.lock().unwrap().push(format!("{tag}:{event}")))
        };
        (log, make)
    }

    #[test]
    fn publish_reaches_only_the_named_channel() {
        let registry = EventRegistry::<String>::new();
        let (log, make) = recorder();
        registry.subscribe(Channel::Success, make("s"));
        registry.subscribe(Channel::Error, make("e"));

        assert_eq!(registry.publish(Channel::Error, &"boom".to_string()), 1);
        assert_eq!(*log.lock().unwrap(), vec!["e:boom"]);
    }

    #[test]
    fn listeners_run_by_priority_then_subscription_order() {
        let registry = EventRegistry::<String>::new();
        let (log, make) = recorder();
        registry.subscribe(Channel::Success, make("first"));
        registry.subscribe_with_priority(Channel::Success, 10, make("urgent"));
        registry.subscribe(Channel::Success, make("second"));
        registry.subscribe_with_priority(Channel::Success, -5, make("late"));

        registry.publish(Channel::Success, &"x".to_string());
        assert_eq!(
            *log.lock().unwrap(),
            vec!["urgent:x", "first:x", "second:x", "late:x"]
        );
    }

    #[test]
    fn unsubscribe_removes_listener() {
        let registry = EventRegistry::<String>::new();
        let (log, make) = recorder();
        let id = registry.subscribe(Channel::Success, make("s"));
        assert!(registry.is_subscribed(Channel::Success, id));
        assert!(!registry.is_subscribed(Channel::Error, id));

        assert!(registry.unsubscribe(Channel::Success, id));
        assert!(!registry.unsubscribe(Channel::Success, id));
        assert_eq!(registry.publish(Channel::Success, &"x".to_string()), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn publish_on_empty_channel_is_harmless() {
        let registry = EventRegistry::<String>::new();
        assert_eq!(registry.publish(Channel::Error, &"x".to_string()), 0);
        assert_eq!(registry.listener_count(Channel::Error), 0);
    }

    #[test]
    fn listener_may_subscribe_during_publish() {
        let registry = Arc::new(EventRegistry::<String>::new());
        let inner = Arc::clone(&registry);
        registry.subscribe(Channel::Success, move |_| {
            inner.subscribe(Channel::Success, |_| {});
        });

        assert_eq!(registry.publish(Channel::Success, &"x".to_string()), 1);
        assert_eq!(registry.listener_count(Channel::Success), 2);
    }

    #[test]
    fn channel_names() {
        assert_eq!(Channel::Success.to_string(), "success");
        assert_eq!(Channel::Error.to_string(), "error");
    }
}
