//! Single-consumer event queue between input handlers and the session that
//! owns the simulation state.
//!
//! Handlers push from wherever the platform delivers events; the owner drains
//! the queue at the start of its tick, so every mutation happens on the owner's
//! thread in arrival order.

use std::sync::mpsc;

pub struct EventSender<T> {
    tx: mpsc::Sender<T>,
}

pub struct EventReceiver<T> {
    rx: mpsc::Receiver<T>,
}

pub fn channel<T>() -> (EventSender<T>, EventReceiver<T>) {
    let (tx, rx) = mpsc::channel();
    (EventSender { tx }, EventReceiver { rx })
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> EventSender<T> {
    /// Queues `event`. Returns it back once the receiving side has been torn down.
    pub fn send(&self, event: T) -> Result<(), T> {
        self.tx.send(event).map_err(|mpsc::SendError(event)| event)
    }
}

impl<T> EventReceiver<T> {
    /// Takes everything queued so far without blocking.
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::channel;

    #[test]
    fn drain_preserves_arrival_order() {
        let (tx, rx) = channel();
        let other = tx.clone();
        tx.send(1).unwrap();
        other.send(2).unwrap();
        tx.send(3).unwrap();

        assert_eq!(rx.drain(), vec![1, 2, 3]);
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn send_after_receiver_drop_hands_event_back() {
        let (tx, rx) = channel();
        drop(rx);
        assert_eq!(tx.send("click"), Err("click"));
    }
}
