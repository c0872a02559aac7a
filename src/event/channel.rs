use flume::{Receiver, Sender};

use super::events::Command;

pub const DEFAULT_CAPACITY: usize = 10;

/// Producer side of the command queue. Cloneable; the queue closes once every
/// sender is dropped.
#[derive(Clone)]
pub struct CommandSender {
    tx: Sender<Command>,
}

/// Consumer side of the command queue. Owned by the playback controller.
pub struct CommandReceiver {
    rx: Receiver<Command>,
}

#[derive(Debug, thiserror::Error)]
#[error("playback controller is gone")]
pub struct ChannelClosed(pub Command);

/// Bounded FIFO between command producers and the playback controller.
/// Enqueueing into a full channel waits for the consumer; nothing is dropped.
pub fn channel(capacity: usize) -> (CommandSender, CommandReceiver) {
    let (tx, rx) = flume::bounded(capacity);

    (CommandSender { tx }, CommandReceiver { rx })
}

impl CommandSender {
    pub async fn enqueue(&self, command: Command) -> Result<(), ChannelClosed> {
        self.tx
            .send_async(command)
            .await
            .map_err(|e| ChannelClosed(e.into_inner()))
    }
}

impl CommandReceiver {
    /// Waits for the next command. `None` once all producers are gone and the
    /// queue is drained.
    pub async fn dequeue(&self) -> Option<Command> {
        self.rx.recv_async().await.ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;
    use crate::event::events::CommandKind;

    #[tokio::test]
    async fn delivers_in_enqueue_order() {
        let (tx, rx) = channel(DEFAULT_CAPACITY);
        let kinds = [
            CommandKind::Play,
            CommandKind::Pause,
            CommandKind::Resume,
            CommandKind::Next,
            CommandKind::Stop,
        ];

        for kind in kinds {
            tx.enqueue(Command::bare(kind)).await.unwrap();
        }
        drop(tx);

        let mut received = Vec::new();
        while let Some(cmd) = rx.dequeue().await {
            received.push(cmd.kind());
        }

        assert_eq!(received, kinds);
    }

    #[tokio::test]
    async fn full_channel_blocks_until_dequeue() {
        let (tx, rx) = channel(1);
        tx.enqueue(Command::bare(CommandKind::Play)).await.unwrap();
        assert_eq!(rx.len(), 1);

        let blocked = timeout(
            Duration::from_millis(50),
            tx.enqueue(Command::bare(CommandKind::Stop)),
        )
        .await;
        assert!(blocked.is_err(), "enqueue into a full channel must wait");

        let producer = {
            let tx = tx.clone();
            tokio::spawn(async move {
                tx.enqueue(Command::bare(CommandKind::Info)).await
            })
        };

        assert_eq!(rx.dequeue().await.unwrap().kind(), CommandKind::Play);
        producer.await.unwrap().unwrap();
        assert_eq!(rx.dequeue().await.unwrap().kind(), CommandKind::Info);
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn enqueue_fails_once_consumer_is_dropped() {
        let (tx, rx) = channel(2);
        drop(rx);

        let err = tx.enqueue(Command::bare(CommandKind::Info)).await.unwrap_err();
        assert_eq!(err.0.kind(), CommandKind::Info);
    }
}
