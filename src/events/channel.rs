use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use log::trace;

pub type Callback<T> = Rc<dyn Fn(&T)>;
pub type SubscriptionId = u64;

pub struct EventEmitter<T: std::fmt::Debug> {
    channel: Channel<T>,
}

impl<T: std::fmt::Debug> Clone for EventEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
        }
    }
}

pub struct EventObserver<T: std::fmt::Debug> {
    channel: Channel<T>,
}

impl<T: std::fmt::Debug> Clone for EventObserver<T> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
        }
    }
}

/// Handle returned by [`EventObserver::subscribe_with_handle`]; dropping it keeps the
/// subscription alive, calling [`Unsubscriber::unsubscribe`] removes it.
pub struct Unsubscriber<T: std::fmt::Debug> {
    channel: Channel<T>,
    id: SubscriptionId,
}

impl<T: std::fmt::Debug> Unsubscriber<T> {
    pub fn unsubscribe(self) -> bool {
        self.channel.unsubscribe(self.id)
    }
}

pub struct Channel<T: std::fmt::Debug> {
    // ordered so listeners run in subscription order
    listeners: Rc<RefCell<BTreeMap<SubscriptionId, Callback<T>>>>,
    next_id: Rc<RefCell<SubscriptionId>>,
}

impl<T: std::fmt::Debug> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
            next_id: Rc::clone(&self.next_id),
        }
    }
}

impl<T: std::fmt::Debug> Channel<T> {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventEmitter<T>, EventObserver<T>) {
        let channel = Channel {
            listeners: Rc::new(RefCell::new(BTreeMap::new())),
            next_id: Rc::new(RefCell::new(0)),
        };
        (
            EventEmitter {
                channel: channel.clone(),
            },
            EventObserver { channel },
        )
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + 'static,
    {
        let id = {
            let mut next_id = self.next_id.borrow_mut();
            let id = *next_id;
            *next_id += 1;
            id
        };
        self.listeners.borrow_mut().insert(id, Rc::new(callback));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.borrow_mut().remove(&id).is_some()
    }

    pub fn emit(&self, data: &T) {
        // snapshot the listeners so a callback may subscribe or unsubscribe
        let listeners: Vec<Callback<T>> = self.listeners.borrow().values().cloned().collect();
        trace!(target: "events", "Emitting event to {} listeners: {:?}", listeners.len(), data);
        for listener in listeners {
            listener(data);
        }
    }

    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

impl<T: std::fmt::Debug> EventEmitter<T> {
    pub fn emit(&self, data: T) {
        self.channel.emit(&data);
    }
}

impl<T: std::fmt::Debug> EventObserver<T> {
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) + 'static,
    {
        self.channel.subscribe(callback)
    }

    pub fn subscribe_with_handle<F>(&self, callback: F) -> Unsubscriber<T>
    where
        F: Fn(&T) + 'static,
    {
        let id = self.channel.subscribe(callback);
        Unsubscriber {
            channel: self.channel.clone(),
            id,
        }
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.channel.unsubscribe(id)
    }

    pub fn clear(&self) {
        self.channel.clear();
    }
}
