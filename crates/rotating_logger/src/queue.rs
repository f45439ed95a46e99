use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError};

enum QueueCommand {
    Line(String),
    Flush(Sender<()>),
    Shutdown,
}

/// What the writer gets back from [`RecordReceiver::pop_blocking`].
pub enum QueueEvent {
    Line(String),
    /// Every line pushed before the barrier has already been handed out.
    /// The writer acknowledges once those lines are on disk.
    Flush(Sender<()>),
    EndOfStream,
}

/// Producer side of the record queue. Unbounded: pushing never waits on the writer.
pub struct RecordQueue {
    sender: Sender<QueueCommand>,
}

/// Consumer side, owned by the single writer thread.
pub struct RecordReceiver {
    receiver: Receiver<QueueCommand>,
    draining: bool,
}

pub fn record_queue() -> (RecordQueue, RecordReceiver) {
    let (sender, receiver) = unbounded();
    (
        RecordQueue { sender },
        RecordReceiver {
            receiver,
            draining: false,
        },
    )
}

impl RecordQueue {
    /// Returns `false` when the consumer is gone and the line was discarded.
    pub fn push(&self, line: String) -> bool {
        self.sender.send(QueueCommand::Line(line)).is_ok()
    }

    /// Switches the consumer to draining: it empties the queue, then reports end of stream.
    pub fn shutdown(&self) {
        let _ = self.sender.send(QueueCommand::Shutdown);
    }

    /// Queues a barrier behind everything pushed so far. The returned receiver
    /// yields once the writer has reached it, or disconnects if the writer stops first.
    pub fn flush_barrier(&self) -> Option<Receiver<()>> {
        let (ack_tx, ack_rx) = bounded(1);
        self.sender.send(QueueCommand::Flush(ack_tx)).ok()?;
        Some(ack_rx)
    }
}

impl RecordReceiver {
    /// Blocks until a record is available. After shutdown has been requested
    /// it no longer blocks and reports [`QueueEvent::EndOfStream`] once empty.
    pub fn pop_blocking(&mut self) -> QueueEvent {
        loop {
            let command = if self.draining {
                match self.receiver.try_recv() {
                    Ok(command) => command,
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {
                        return QueueEvent::EndOfStream
                    }
                }
            } else {
                match self.receiver.recv() {
                    Ok(command) => command,
                    Err(_) => return QueueEvent::EndOfStream,
                }
            };

            match command {
                QueueCommand::Line(line) => return QueueEvent::Line(line),
                QueueCommand::Flush(ack) => return QueueEvent::Flush(ack),
                QueueCommand::Shutdown => self.draining = true,
            }
        }
    }

    pub fn is_draining(&self) -> bool {
        self.draining
    }
}
