//! 组件间事件总线
//!
//! 按主题发布/订阅。订阅方持有 `Subscription`，其守卫释放时立即退订，
//! 之后发布的事件不会再送达

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// 事件主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// 股票行情列表发生变更
    AktienListModification,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::AktienListModification => write!(f, "aktienListModification"),
        }
    }
}

/// 列表变更原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListModification {
    Created(i64),
    Updated(i64),
    Deleted(i64),
}

/// 总线事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    AktienListModification(ListModification),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::AktienListModification(_) => Topic::AktienListModification,
        }
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: HashMap<Topic, Vec<(u64, UnboundedSender<Event>)>>,
}

impl Registry {
    fn remove(&mut self, topic: Topic, id: u64) {
        if let Some(list) = self.subscribers.get_mut(&topic) {
            list.retain(|(sid, _)| *sid != id);
            if list.is_empty() {
                self.subscribers.remove(&topic);
            }
        }
    }
}

/// 事件总线（可克隆句柄，共享同一注册表）
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅主题
    pub fn subscribe(&self, topic: Topic) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut registry = self.registry.lock();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.subscribers.entry(topic).or_default().push((id, sender));
        log::debug!("订阅主题 {} (#{})", topic, id);

        Subscription {
            guard: SubscriptionGuard {
                id,
                topic,
                registry: Arc::downgrade(&self.registry),
            },
            receiver,
        }
    }

    /// 发布事件，返回送达的订阅者数量
    pub fn publish(&self, event: Event) -> usize {
        let topic = event.topic();
        let mut registry = self.registry.lock();
        let Some(list) = registry.subscribers.get_mut(&topic) else {
            log::debug!("主题 {} 无订阅者", topic);
            return 0;
        };

        // 接收端已关闭的订阅顺带清理
        list.retain(|(_, sender)| sender.send(event.clone()).is_ok());
        let delivered = list.len();
        if list.is_empty() {
            registry.subscribers.remove(&topic);
        }
        log::debug!("发布 {:?} 到 {} 个订阅者", event, delivered);
        delivered
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.registry
            .lock()
            .subscribers
            .get(&topic)
            .map_or(0, Vec::len)
    }
}

/// 订阅守卫，释放时退订
pub struct SubscriptionGuard {
    id: u64,
    topic: Topic,
    registry: Weak<Mutex<Registry>>,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().remove(self.topic, self.id);
            log::debug!("退订主题 {} (#{})", self.topic, self.id);
        }
    }
}

/// 订阅句柄
pub struct Subscription {
    guard: SubscriptionGuard,
    receiver: UnboundedReceiver<Event>,
}

impl Subscription {
    /// 等待下一条事件，总线已释放时返回 `None`
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// 拆分为守卫和接收端，守卫与接收任务可分别持有
    pub fn into_parts(self) -> (SubscriptionGuard, UnboundedReceiver<Event>) {
        (self.guard, self.receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = EventBus::new();
        let mut subscription = bus.subscribe(Topic::AktienListModification);

        let event = Event::AktienListModification(ListModification::Deleted(3));
        assert_eq!(bus.publish(event.clone()), 1);
        assert_eq!(subscription.recv().await, Some(event));
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let first = bus.subscribe(Topic::AktienListModification);
        let second = bus.subscribe(Topic::AktienListModification);
        assert_eq!(bus.subscriber_count(Topic::AktienListModification), 2);

        drop(first);
        assert_eq!(bus.subscriber_count(Topic::AktienListModification), 1);
        assert_eq!(
            bus.publish(Event::AktienListModification(ListModification::Created(1))),
            1
        );

        drop(second);
        assert_eq!(
            bus.publish(Event::AktienListModification(ListModification::Created(2))),
            0
        );
    }

    #[test]
    fn test_guard_alone_controls_registration() {
        let bus = EventBus::new();
        let (guard, _receiver) = bus.subscribe(Topic::AktienListModification).into_parts();
        assert_eq!(bus.subscriber_count(Topic::AktienListModification), 1);

        drop(guard);
        assert_eq!(bus.subscriber_count(Topic::AktienListModification), 0);
    }

    #[test]
    fn test_topic_name() {
        assert_eq!(Topic::AktienListModification.to_string(), "aktienListModification");
    }
}
