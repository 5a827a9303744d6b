//! Double-buffered receive hand-off between the UART transport and the
//! line framer.
//!
//! Each of the two slots is owned by exactly one party at a time. Ownership
//! is carried by move-only tokens:
//!
//! - [`RxGrant`]: the transport may write into the slot
//! - [`RxReady`]: the slot holds `len` received bytes for the framer
//!
//! ```text
//!   Free ──request_next_buffer──► Transport ──complete──► Framer ──release──► Free
//! ```
//!
//! The framer asks for the next slot before releasing the one it scans, so
//! the transport never waits on the framer.

/// Receive buffer size in bytes
pub const RX_BUFFER_LEN: usize = 128;

/// Current owner of a receive slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotOwner {
    /// Available for the next request
    Free,
    /// Lent to the transport, being filled
    Transport,
    /// Filled, being scanned by the framer
    Framer,
}

/// Transport's exclusive claim on one slot
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxGrant {
    slot: usize,
}

impl RxGrant {
    /// Slot index (0 or 1)
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// A completed slot handed to the framer
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxReady {
    slot: usize,
    len: usize,
}

impl RxReady {
    /// Slot index (0 or 1)
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Number of valid bytes reported by the transport
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the transport completed without data
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Two receive slots with explicit ownership
pub struct RxBuffers<const N: usize = RX_BUFFER_LEN> {
    slots: [[u8; N]; 2],
    owners: [SlotOwner; 2],
    next: usize,
}

impl<const N: usize> Default for RxBuffers<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RxBuffers<N> {
    /// Create both slots free
    pub const fn new() -> Self {
        Self {
            slots: [[0; N]; 2],
            owners: [SlotOwner::Free; 2],
            next: 0,
        }
    }

    /// Lend a free slot to the transport
    ///
    /// Slots are handed out alternately. Returns `None` when neither slot is
    /// free, which means a token was lost and reception cannot continue.
    pub fn request_next_buffer(&mut self) -> Option<RxGrant> {
        for i in 0..2 {
            let slot = (self.next + i) % 2;
            if self.owners[slot] == SlotOwner::Free {
                self.owners[slot] = SlotOwner::Transport;
                self.next = (slot + 1) % 2;
                return Some(RxGrant { slot });
            }
        }
        None
    }

    /// Writable storage of a granted slot
    pub fn transport_buf(&mut self, grant: &RxGrant) -> &mut [u8; N] {
        debug_assert_eq!(self.owners[grant.slot], SlotOwner::Transport);
        &mut self.slots[grant.slot]
    }

    /// Transport finished writing `len` bytes into the slot
    ///
    /// `len` is clamped to the slot size.
    pub fn complete(&mut self, grant: RxGrant, len: usize) -> RxReady {
        self.owners[grant.slot] = SlotOwner::Framer;
        RxReady {
            slot: grant.slot,
            len: len.min(N),
        }
    }

    /// Valid bytes of a completed slot
    pub fn received(&self, ready: &RxReady) -> &[u8] {
        debug_assert_eq!(self.owners[ready.slot], SlotOwner::Framer);
        &self.slots[ready.slot][..ready.len]
    }

    /// Framer is done with the slot
    pub fn release(&mut self, ready: RxReady) {
        self.owners[ready.slot] = SlotOwner::Free;
    }

    /// Owner of slot `slot` (0 or 1)
    pub fn owner(&self, slot: usize) -> SlotOwner {
        self.owners[slot % 2]
    }
}
