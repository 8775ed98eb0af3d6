//! Message ports connecting the host page and the embedded menu surface.

use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

/// One end of an entangled pair. Delivery is FIFO between the two ends.
#[derive(Debug)]
pub struct MessagePort {
    outgoing: UnboundedSender<Value>,
    incoming: UnboundedReceiver<Value>,
}

/// Builds two connected ports: whatever one posts, the other receives.
pub fn entangled() -> (MessagePort, MessagePort) {
    let (a_tx, a_rx) = mpsc::unbounded_channel();
    let (b_tx, b_rx) = mpsc::unbounded_channel();
    (
        MessagePort {
            outgoing: a_tx,
            incoming: b_rx,
        },
        MessagePort {
            outgoing: b_tx,
            incoming: a_rx,
        },
    )
}

impl MessagePort {
    /// Posts without waiting. A closed peer silently drops the message.
    pub fn post(&self, message: Value) -> bool {
        match self.outgoing.send(message) {
            Ok(()) => true,
            Err(_) => {
                trace!("peer port closed; message dropped");
                false
            }
        }
    }

    /// Everything queued so far, oldest first.
    pub fn drain(&mut self) -> Vec<Value> {
        let mut messages = Vec::new();
        while let Ok(message) = self.incoming.try_recv() {
            messages.push(message);
        }
        messages
    }

    pub async fn recv(&mut self) -> Option<Value> {
        self.incoming.recv().await
    }
}
