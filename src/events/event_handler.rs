use std::cell::RefCell;
use std::rc::Rc;

use super::{EventObserver, Unsubscriber};

/// A projection that folds a stream of events into local state.
pub trait EventHandler<T> {
    fn handle_event(&mut self, event: &T);
}

/// Subscribes `handler` to `observer`, returning the handle that detaches it again.
pub fn attach_handler<T, H>(observer: &EventObserver<T>, handler: &Rc<RefCell<H>>) -> Unsubscriber<T>
where
    T: std::fmt::Debug + 'static,
    H: EventHandler<T> + 'static,
{
    let handler = Rc::clone(handler);
    observer.subscribe_with_handle(move |event| handler.borrow_mut().handle_event(event))
}
