// ============================================================================
// Async Book Runner
// Tokio task variant of the book loop
// ============================================================================

use crate::domain::Order;
use crate::engine::Book;
use crate::errors::{BookError, BookResult};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Inbound side of an async book, bounded or not per configuration
#[derive(Debug, Clone)]
pub enum AsyncOrderSender {
    Bounded(mpsc::Sender<Order>),
    Unbounded(mpsc::UnboundedSender<Order>),
}

impl AsyncOrderSender {
    pub async fn send(&self, order: Order) -> BookResult<()> {
        match self {
            AsyncOrderSender::Bounded(tx) => {
                tx.send(order).await.map_err(|_| BookError::Disconnected)
            },
            AsyncOrderSender::Unbounded(tx) => {
                tx.send(order).map_err(|_| BookError::Disconnected)
            },
        }
    }
}

enum AsyncOrderReceiver {
    Bounded(mpsc::Receiver<Order>),
    Unbounded(mpsc::UnboundedReceiver<Order>),
}

impl AsyncOrderReceiver {
    async fn recv(&mut self) -> Option<Order> {
        match self {
            AsyncOrderReceiver::Bounded(rx) => rx.recv().await,
            AsyncOrderReceiver::Unbounded(rx) => rx.recv().await,
        }
    }
}

/// Same contract as [`run`](crate::engine::run) on tokio channels.
/// A zero outbound capacity is treated as one, the smallest tokio allows.
async fn run_async(
    mut book: Book,
    mut inbound: AsyncOrderReceiver,
    outbound: mpsc::Sender<Order>,
) -> Book {
    let mut consumer_gone = false;

    info!(book = %book.config().name, "async book loop started");

    while let Some(order) = inbound.recv().await {
        let Some(published) = book.submit(order).into_published() else {
            continue;
        };

        if consumer_gone {
            continue;
        }

        for order in published {
            if outbound.send(order).await.is_err() {
                warn!(book = %book.config().name, "outbound stream closed, results dropped");
                consumer_gone = true;
                break;
            }
        }
    }

    info!(
        book = %book.config().name,
        transactions = book.transactions().len(),
        "async book loop stopped"
    );
    book
}

/// A book running as a tokio task
pub struct AsyncBookHandle {
    sender: AsyncOrderSender,
    published: mpsc::Receiver<Order>,
    task: JoinHandle<Book>,
}

impl AsyncBookHandle {
    /// Spawn `book` on the current tokio runtime
    pub fn spawn(book: Book) -> BookResult<Self> {
        let config = book.config();
        config.validate()?;

        let (sender, inbound) = match config.inbound_capacity {
            Some(capacity) => {
                let (tx, rx) = mpsc::channel(capacity);
                (AsyncOrderSender::Bounded(tx), AsyncOrderReceiver::Bounded(rx))
            },
            None => {
                let (tx, rx) = mpsc::unbounded_channel();
                (AsyncOrderSender::Unbounded(tx), AsyncOrderReceiver::Unbounded(rx))
            },
        };
        let (outbound, published) = mpsc::channel(config.outbound_capacity.max(1));

        let task = tokio::spawn(run_async(book, inbound, outbound));

        Ok(Self {
            sender,
            published,
            task,
        })
    }

    pub async fn submit(&self, order: Order) -> BookResult<()> {
        self.sender.send(order).await
    }

    pub fn sender(&self) -> AsyncOrderSender {
        self.sender.clone()
    }

    /// Next published order; `None` once the book has stopped
    pub async fn next_published(&mut self) -> Option<Order> {
        self.published.recv().await
    }

    /// Close the inbound stream, drain published orders and return the book
    pub async fn shutdown(self) -> BookResult<(Book, Vec<Order>)> {
        let Self {
            sender,
            mut published,
            task,
        } = self;

        drop(sender);
        let mut remaining = Vec::new();
        while let Some(order) = published.recv().await {
            remaining.push(order);
        }
        let book = task.await.map_err(|_| BookError::WorkerPanicked)?;

        Ok((book, remaining))
    }
}
