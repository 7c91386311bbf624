//! Thin façade over intra-process (threads) or inter-process (MPI) message passing.
//!
//! Messages are *contiguous byte slices* (no zero-copy guarantees).
//! Point-to-point handles are **waitable**. `ThreadComm` sends complete
//! immediately and receives block only in `wait`; `MpiComm` blocks inside
//! `isend`/`irecv` themselves (see its `Communicator` impl). The collectives
//! (`broadcast_bytes`, `all_gather_bytes`, `all_reduce_*`) block until every
//! rank of the world has issued the matching call.
//!
//! The collectives have default implementations written in terms of
//! `isend`/`irecv`. Messages between one `(src, dst, tag)` triple are delivered
//! in FIFO order, and each collective kind uses its own [`CommTag`], so a
//! sequence of collectives issued in the same order on every rank never
//! mixes payloads. The MPI backend overrides all of them with native calls.

use std::collections::VecDeque;
use std::sync::{Arc, Barrier};

use bytes::Bytes;
use dashmap::DashMap;

use crate::coloring_error::ColoringError;

/// Message tag newtype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CommTag(pub u16);

impl CommTag {
    pub const BROADCAST: CommTag = CommTag(0xB0C0);
    pub const ALL_GATHER: CommTag = CommTag(0xA11C);
    pub const REDUCE: CommTag = CommTag(0x5E0D);

    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

/// Anything that can be waited on.
pub trait Wait {
    /// Wait for completion and return the received data (if any).
    fn wait(self) -> Option<Vec<u8>>;
}

impl Wait for () {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

/// Message passing plus the four collectives the coloring protocol relies on.
pub trait Communicator {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    /// Post a receive of at most `buf.len()` bytes; longer messages are truncated.
    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle;

    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    fn barrier(&self) {}

    /// Copy `buf` from `root` into `buf` on every other rank.
    fn broadcast_bytes(&self, root: usize, buf: &mut [u8]) -> Result<(), ColoringError> {
        check_root(root, self.size())?;
        let tag = CommTag::BROADCAST.as_u16();
        if self.rank() == root {
            let payload: &[u8] = buf;
            let sends: Vec<_> = peers(self.rank(), self.size())
                .map(|p| self.isend(p, tag, payload))
                .collect();
            for s in sends {
                let _ = s.wait();
            }
            return Ok(());
        }
        let expected = buf.len();
        let raw = self
            .irecv(root, tag, buf)
            .wait()
            .ok_or_else(|| missing(root, "broadcast payload"))?;
        if raw.len() != expected {
            return Err(ColoringError::BufferSizeMismatch {
                neighbor: root,
                expected,
                got: raw.len(),
            });
        }
        buf.copy_from_slice(&raw);
        Ok(())
    }

    /// Variable-length all-gather: rank `r` contributes `counts[r]` bytes and
    /// every rank receives the concatenation in rank order.
    ///
    /// # Errors
    /// `counts.len() != size` and `local.len() != counts[rank]` are caller
    /// errors and are reported before anything is sent. No collective agreement
    /// takes place for them, so peers of a failing rank stay blocked: callers
    /// must derive `local` and `counts` from state every rank shares (as
    /// [`all_gather_varcount`](crate::algs::collective::all_gather_varcount)
    /// does from the [`VertexPartition`](crate::algs::partition::VertexPartition)).
    /// Transport failures surface as `CommError` or `BufferSizeMismatch`.
    fn all_gather_bytes(&self, local: &[u8], counts: &[usize]) -> Result<Vec<u8>, ColoringError> {
        let (me, size) = (self.rank(), self.size());
        if counts.len() != size {
            return Err(ColoringError::InvalidRank {
                rank: me,
                size: counts.len(),
            });
        }
        if local.len() != counts[me] {
            return Err(ColoringError::BufferSizeMismatch {
                neighbor: me,
                expected: counts[me],
                got: local.len(),
            });
        }
        let displs = displacements(counts);
        let mut out = vec![0u8; counts.iter().sum()];
        out[displs[me]..displs[me] + counts[me]].copy_from_slice(local);

        let tag = CommTag::ALL_GATHER.as_u16();
        let sends: Vec<_> = peers(me, size).map(|p| self.isend(p, tag, local)).collect();
        for peer in peers(me, size) {
            let slot = &mut out[displs[peer]..displs[peer] + counts[peer]];
            let raw = self
                .irecv(peer, tag, slot)
                .wait()
                .ok_or_else(|| missing(peer, "all-gather block"))?;
            if raw.len() != slot.len() {
                return Err(ColoringError::BufferSizeMismatch {
                    neighbor: peer,
                    expected: slot.len(),
                    got: raw.len(),
                });
            }
            slot.copy_from_slice(&raw);
        }
        for s in sends {
            let _ = s.wait();
        }
        Ok(out)
    }

    /// Logical OR of `local` across all ranks.
    fn all_reduce_or(&self, local: bool) -> Result<bool, ColoringError> {
        let words = self.reduce_words(local as u64)?;
        Ok(words.into_iter().any(|w| w != 0))
    }

    /// Sum of `local` across all ranks.
    fn all_reduce_sum(&self, local: u64) -> Result<u64, ColoringError> {
        let words = self.reduce_words(local)?;
        Ok(words.into_iter().fold(0u64, u64::wrapping_add))
    }

    /// Every rank's `u64` contribution, in rank order.
    #[doc(hidden)]
    fn reduce_words(&self, local: u64) -> Result<Vec<u64>, ColoringError> {
        let (me, size) = (self.rank(), self.size());
        let mut words = vec![0u64; size];
        words[me] = local;
        let tag = CommTag::REDUCE.as_u16();
        let bytes = local.to_le_bytes();
        let sends: Vec<_> = peers(me, size).map(|p| self.isend(p, tag, &bytes)).collect();
        for peer in peers(me, size) {
            let mut buf = [0u8; 8];
            let raw = self
                .irecv(peer, tag, &mut buf)
                .wait()
                .ok_or_else(|| missing(peer, "reduce word"))?;
            if raw.len() != buf.len() {
                return Err(ColoringError::BufferSizeMismatch {
                    neighbor: peer,
                    expected: buf.len(),
                    got: raw.len(),
                });
            }
            buf.copy_from_slice(&raw);
            words[peer] = u64::from_le_bytes(buf);
        }
        for s in sends {
            let _ = s.wait();
        }
        Ok(words)
    }
}

/// Exclusive prefix sums of `counts`.
pub fn displacements(counts: &[usize]) -> Vec<usize> {
    counts
        .iter()
        .scan(0usize, |acc, &c| {
            let start = *acc;
            *acc += c;
            Some(start)
        })
        .collect()
}

#[inline]
fn peers(me: usize, size: usize) -> impl Iterator<Item = usize> {
    (0..size).filter(move |&p| p != me)
}

fn check_root(root: usize, size: usize) -> Result<(), ColoringError> {
    if root < size {
        Ok(())
    } else {
        Err(ColoringError::InvalidRank { rank: root, size })
    }
}

fn missing(peer: usize, what: &str) -> ColoringError {
    ColoringError::CommError {
        neighbor: peer,
        source: format!("no {what} received (wait returned None)").into(),
    }
}

/// Compile-time no-op comm: a world of one rank.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn isend(&self, _peer: usize, _tag: u16, _buf: &[u8]) {}
    fn irecv(&self, _peer: usize, _tag: u16, _buf: &mut [u8]) {}

    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
}

// --- ThreadComm: intra-process / one OS thread per rank ---
type Key = (usize, usize, u16); // (src, dst, tag)
type Mailbox = DashMap<Key, VecDeque<Bytes>>;

/// One rank of an in-process world. Ranks share a mailbox and a barrier;
/// create a whole world at once with [`ThreadComm::world`] and move one handle
/// into each thread.
#[derive(Clone, Debug)]
pub struct ThreadComm {
    rank: usize,
    size: usize,
    mailbox: Arc<Mailbox>,
    gate: Arc<Barrier>,
}

impl ThreadComm {
    /// Handles for ranks `0..size`, all attached to the same fresh mailbox.
    pub fn world(size: usize) -> Vec<ThreadComm> {
        let mailbox = Arc::new(Mailbox::new());
        let gate = Arc::new(Barrier::new(size.max(1)));
        (0..size)
            .map(|rank| ThreadComm {
                rank,
                size,
                mailbox: Arc::clone(&mailbox),
                gate: Arc::clone(&gate),
            })
            .collect()
    }
}

/// Receive handle that polls the shared mailbox on `wait`.
pub struct LocalHandle {
    mailbox: Arc<Mailbox>,
    key: Key,
    len: usize,
}

impl Wait for LocalHandle {
    fn wait(self) -> Option<Vec<u8>> {
        loop {
            let popped = self
                .mailbox
                .get_mut(&self.key)
                .and_then(|mut queue| queue.pop_front());
            if let Some(bytes) = popped {
                let take = bytes.len().min(self.len);
                return Some(bytes[..take].to_vec());
            }
            std::thread::yield_now();
        }
    }
}

impl Communicator for ThreadComm {
    type SendHandle = ();
    type RecvHandle = LocalHandle;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle {
        let key = (self.rank, peer, tag);
        self.mailbox
            .entry(key)
            .or_default()
            .push_back(Bytes::copy_from_slice(buf));
    }

    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle {
        LocalHandle {
            mailbox: Arc::clone(&self.mailbox),
            key: (peer, self.rank, tag),
            len: buf.len(),
        }
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) {
        self.gate.wait();
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::*;
    use mpi::Count;
    use mpi::collective::SystemOperation;
    use mpi::datatype::PartitionMut;
    use mpi::environment::Universe;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::*;

    /// World communicator of an MPI job. Owns the `Universe`, so MPI is
    /// finalized when this value is dropped.
    pub struct MpiComm {
        _universe: Universe,
        pub world: SimpleCommunicator,
        pub rank: usize,
        pub size: usize,
    }

    impl MpiComm {
        pub fn new() -> Result<Self, ColoringError> {
            let universe = mpi::initialize().ok_or(ColoringError::MpiInit)?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Ok(Self {
                _universe: universe,
                world,
                rank,
                size,
            })
        }
    }

    /// Receive completed inside `irecv`; `wait` only hands the data over.
    pub struct MpiHandle(Option<Vec<u8>>);

    impl Wait for MpiHandle {
        fn wait(self) -> Option<Vec<u8>> {
            self.0
        }
    }

    /// Point-to-point calls are blocking here: `isend` is a standard-mode send
    /// and `irecv` receives before returning. Pair them send-first on one side
    /// and receive-first on the other. Every collective, `reduce_words`
    /// included, is a native MPI call and never goes through them.
    impl Communicator for MpiComm {
        type SendHandle = ();
        type RecvHandle = MpiHandle;

        fn isend(&self, peer: usize, tag: u16, buf: &[u8]) {
            self.world
                .process_at_rank(peer as i32)
                .send_with_tag(buf, tag as i32);
        }

        fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> MpiHandle {
            let (mut data, _status) = self
                .world
                .process_at_rank(peer as i32)
                .receive_vec_with_tag::<u8>(tag as i32);
            data.truncate(buf.len());
            MpiHandle(Some(data))
        }

        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn barrier(&self) {
            self.world.barrier();
        }

        fn broadcast_bytes(&self, root: usize, buf: &mut [u8]) -> Result<(), ColoringError> {
            check_root(root, self.size)?;
            self.world.process_at_rank(root as i32).broadcast_into(buf);
            Ok(())
        }

        fn all_gather_bytes(&self, local: &[u8], counts: &[usize]) -> Result<Vec<u8>, ColoringError> {
            if counts.len() != self.size {
                return Err(ColoringError::InvalidRank {
                    rank: self.rank,
                    size: counts.len(),
                });
            }
            let mpi_counts: Vec<Count> = counts.iter().map(|&c| c as Count).collect();
            let mpi_displs: Vec<Count> = displacements(counts).into_iter().map(|d| d as Count).collect();
            let mut out = vec![0u8; counts.iter().sum()];
            {
                let mut partition = PartitionMut::new(&mut out[..], mpi_counts, &mpi_displs[..]);
                self.world.all_gather_varcount_into(local, &mut partition);
            }
            Ok(out)
        }

        fn all_reduce_or(&self, local: bool) -> Result<bool, ColoringError> {
            let mut global = 0u32;
            self.world
                .all_reduce_into(&(local as u32), &mut global, SystemOperation::max());
            Ok(global != 0)
        }

        fn all_reduce_sum(&self, local: u64) -> Result<u64, ColoringError> {
            let mut global = 0u64;
            self.world
                .all_reduce_into(&local, &mut global, SystemOperation::sum());
            Ok(global)
        }

        fn reduce_words(&self, local: u64) -> Result<Vec<u64>, ColoringError> {
            let mut words = vec![0u64; self.size];
            self.world.all_gather_into(&local, &mut words[..]);
            Ok(words)
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;
