//! Message-passing group with no shared mutable state.
//!
//! Ranks are connected by a full mesh of point-to-point channels, one per
//! ordered pair, so messages between two ranks arrive in the order they were
//! sent. Collectives are built from those links the way a message-passing
//! runtime would build them: the root sends to every peer and each peer
//! receives from the root. Each worker owns only the data it was sent.
//!
//! A rank that returns, aborts or panics drops its senders, and every peer
//! waiting on it sees [`CommError::Disconnected`].

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::trace;

use crate::barrier::BarrierWaitResult;
use crate::error::CommError;
use crate::group::{check_root, Group};

/// Rank that collects barrier tokens.
const COORDINATOR: usize = 0;

#[derive(Debug)]
enum Message<T> {
    Rows(Vec<T>),
    Pivot(Vec<T>),
    Token,
}

impl<T> Message<T> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Rows(_) => "rows",
            Self::Pivot(_) => "pivot",
            Self::Token => "token",
        }
    }
}

/// One worker's endpoint in a message-passing group.
#[derive(Debug)]
pub struct ChannelGroup<T> {
    rank: usize,
    size: usize,
    /// `outbox[peer]` sends to `peer`; `None` for this rank and after abort.
    outbox: Vec<Option<Sender<Message<T>>>>,
    /// `inbox[peer]` receives from `peer`; `None` for this rank.
    inbox: Vec<Option<Receiver<Message<T>>>>,
}

/// Creates one endpoint per rank, fully connected.
#[must_use]
pub fn channel_groups<T>(size: usize) -> Vec<ChannelGroup<T>> {
    let mut outboxes: Vec<Vec<Option<Sender<Message<T>>>>> =
        (0..size).map(|_| (0..size).map(|_| None).collect()).collect();
    let mut inboxes: Vec<Vec<Option<Receiver<Message<T>>>>> =
        (0..size).map(|_| (0..size).map(|_| None).collect()).collect();

    for from in 0..size {
        for to in (0..size).filter(|&to| to != from) {
            let (tx, rx) = unbounded();
            outboxes[from][to] = Some(tx);
            inboxes[to][from] = Some(rx);
        }
    }

    outboxes
        .into_iter()
        .zip(inboxes)
        .enumerate()
        .map(|(rank, (outbox, inbox))| ChannelGroup {
            rank,
            size,
            outbox,
            inbox,
        })
        .collect()
}

impl<T> ChannelGroup<T> {
    fn send(&self, to: usize, message: Message<T>) -> Result<(), CommError> {
        let tx = self.outbox[to]
            .as_ref()
            .ok_or(CommError::Disconnected { peer: to })?;
        tx.send(message)
            .map_err(|_| CommError::Disconnected { peer: to })
    }

    fn recv(&self, from: usize) -> Result<Message<T>, CommError> {
        let rx = self.inbox[from]
            .as_ref()
            .ok_or(CommError::Disconnected { peer: from })?;
        rx.recv().map_err(|_| CommError::Disconnected { peer: from })
    }

    fn recv_rows(&self, from: usize) -> Result<Vec<T>, CommError> {
        match self.recv(from)? {
            Message::Rows(rows) => Ok(rows),
            other => Err(unexpected(from, "rows", &other)),
        }
    }

    fn recv_token(&self, from: usize) -> Result<(), CommError> {
        match self.recv(from)? {
            Message::Token => Ok(()),
            other => Err(unexpected(from, "token", &other)),
        }
    }

    fn peers(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.size).filter(move |&peer| peer != self.rank)
    }
}

fn unexpected<T>(peer: usize, expected: &'static str, received: &Message<T>) -> CommError {
    CommError::Protocol {
        peer,
        expected,
        received: received.kind(),
    }
}

impl<T: Clone + Send> Group<T> for ChannelGroup<T> {
    const SYNC_EACH_STEP: bool = false;

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn scatter(&mut self, root: usize, chunks: Option<Vec<Vec<T>>>) -> Result<Vec<T>, CommError> {
        check_root(root, self.size)?;
        if self.rank != root {
            return self.recv_rows(root);
        }

        let chunks = chunks.unwrap_or_default();
        if chunks.len() != self.size {
            return Err(CommError::BufferCount {
                supplied: chunks.len(),
                size: self.size,
            });
        }
        let mut local = Vec::new();
        for (to, chunk) in chunks.into_iter().enumerate() {
            if to == self.rank {
                local = chunk;
            } else {
                self.send(to, Message::Rows(chunk))?;
            }
        }
        trace!(rank = self.rank, "scatter sent");
        Ok(local)
    }

    fn broadcast(&mut self, root: usize, buffer: &mut [T]) -> Result<(), CommError> {
        check_root(root, self.size)?;
        if self.rank == root {
            for peer in self.peers() {
                self.send(peer, Message::Pivot(buffer.to_vec()))?;
            }
            return Ok(());
        }

        match self.recv(root)? {
            Message::Pivot(values) if values.len() == buffer.len() => {
                buffer.clone_from_slice(&values);
                Ok(())
            }
            Message::Pivot(values) => Err(CommError::LengthMismatch {
                expected: buffer.len(),
                actual: values.len(),
            }),
            other => Err(unexpected(root, "pivot", &other)),
        }
    }

    fn gather(&mut self, root: usize, local: Vec<T>) -> Result<Option<Vec<Vec<T>>>, CommError> {
        check_root(root, self.size)?;
        if self.rank != root {
            self.send(root, Message::Rows(local))?;
            return Ok(None);
        }

        let mut local = Some(local);
        let mut chunks = Vec::with_capacity(self.size);
        for from in 0..self.size {
            if from == self.rank {
                chunks.push(local.take().unwrap_or_default());
            } else {
                chunks.push(self.recv_rows(from)?);
            }
        }
        trace!(rank = self.rank, "gather complete");
        Ok(Some(chunks))
    }

    fn barrier(&mut self) -> Result<BarrierWaitResult, CommError> {
        if self.rank == COORDINATOR {
            for peer in self.peers() {
                self.recv_token(peer)?;
            }
            for peer in self.peers() {
                self.send(peer, Message::Token)?;
            }
            Ok(BarrierWaitResult::new(true))
        } else {
            self.send(COORDINATOR, Message::Token)?;
            self.recv_token(COORDINATOR)?;
            Ok(BarrierWaitResult::new(false))
        }
    }

    fn abort(&mut self) {
        trace!(rank = self.rank, "aborting channel group");
        for tx in &mut self.outbox {
            *tx = None;
        }
    }
}
