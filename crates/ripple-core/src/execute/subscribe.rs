//! Change subscriptions for the presentation layer.

use rustc_hash::FxHashMap;

use crate::value::Value;

use super::context::ExecutionContext;

/// Handle returned by `Kernel::subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Receives a name's new value after a cascade changed it.
pub trait Subscriber: Send + Sync {
    fn notify(&self, name: &str, value: &Value);
}

impl<F> Subscriber for F
where
    F: Fn(&str, &Value) + Send + Sync,
{
    fn notify(&self, name: &str, value: &Value) {
        self(name, value)
    }
}

/// Registered subscribers, keyed by name.
#[derive(Default)]
pub(crate) struct Subscriptions {
    next_id: u64,
    by_name: FxHashMap<String, Vec<(SubscriptionId, Box<dyn Subscriber>)>>,
}

impl Subscriptions {
    pub(crate) fn subscribe(&mut self, name: &str, subscriber: Box<dyn Subscriber>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.by_name
            .entry(name.to_string())
            .or_default()
            .push((id, subscriber));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for subscribers in self.by_name.values_mut() {
            if let Some(pos) = subscribers.iter().position(|(sid, _)| *sid == id) {
                subscribers.remove(pos);
                return true;
            }
        }
        false
    }

    /// Notify subscribers of each changed name, once per name.
    ///
    /// Names are visited in the order given; within a name, subscribers run
    /// in subscription order.
    pub(crate) fn notify(&self, changed: &[String], context: &ExecutionContext) -> usize {
        let mut delivered = 0;
        for name in changed {
            let Some(subscribers) = self.by_name.get(name) else {
                continue;
            };
            let Some(value) = context.get(name) else {
                continue;
            };
            for (_, subscriber) in subscribers {
                subscriber.notify(name, &value);
                delivered += 1;
            }
        }
        delivered
    }

    pub(crate) fn len(&self) -> usize {
        self.by_name.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, Box<dyn Subscriber>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let subscriber = Box::new(move |name: &str, value: &Value| {
            sink.lock().unwrap().push(format!("{name}={value}"));
        });
        (log, subscriber)
    }

    #[test]
    fn test_notify_changed_names_only() {
        let mut ctx = ExecutionContext::new();
        ctx.insert("a", Value::Int(1));
        ctx.insert("b", Value::Int(2));

        let mut subs = Subscriptions::default();
        let (log_a, sub_a) = recorder();
        let (log_b, sub_b) = recorder();
        subs.subscribe("a", sub_a);
        subs.subscribe("b", sub_b);

        let delivered = subs.notify(&["a".to_string()], &ctx);
        assert_eq!(delivered, 1);
        assert_eq!(*log_a.lock().unwrap(), ["a=1"]);
        assert!(log_b.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unsubscribe() {
        let mut ctx = ExecutionContext::new();
        ctx.insert("a", Value::Int(1));

        let mut subs = Subscriptions::default();
        let (log, sub) = recorder();
        let id = subs.subscribe("a", sub);
        assert_eq!(subs.len(), 1);

        assert!(subs.unsubscribe(id));
        assert!(!subs.unsubscribe(id));
        assert_eq!(subs.len(), 0);

        subs.notify(&["a".to_string()], &ctx);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut subs = Subscriptions::default();
        let (_, first) = recorder();
        let (_, second) = recorder();
        assert_ne!(subs.subscribe("a", first), subs.subscribe("a", second));
    }
}
