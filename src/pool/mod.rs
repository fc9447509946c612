// Purpose: bounded voice ownership - hand out, reclaim, recycle
// Voices are created lazily up to `max_size` and never beyond it

use std::collections::VecDeque;

use tracing::debug;

use crate::voice::{Voice, VoiceFactory, VoiceHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Idle,  // Owned by the pool, queued for reuse
    InUse, // Handed out, addressed by the current generation
}

struct Slot<V> {
    voice: Option<V>, // None once discarded or cleared
    generation: u32,
    state: SlotState,
}

/// Result of a successful [`VoicePool::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkout {
    pub handle: VoiceHandle,
    /// Set when an in-use but silent voice was recycled. The old handle is
    /// stale from this point and must be dropped by whoever tracked it.
    pub evicted: Option<VoiceHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub total_created: usize,
    pub idle: usize,
    pub in_use: usize,
    pub max_size: usize,
}

/// Bounded collection of reusable host voices.
///
/// Invariant: `idle + in_use == total_created <= max_size`, and a slot is
/// never both queued idle and handed out.
pub struct VoicePool<F: VoiceFactory> {
    factory: F,
    slots: Vec<Slot<F::Voice>>,
    idle: VecDeque<usize>, // FIFO reuse order
    order: Vec<usize>,     // live slots in creation order
    max_size: usize,
}

impl<F: VoiceFactory> VoicePool<F> {
    pub fn new(factory: F, max_size: usize) -> Self {
        Self {
            factory,
            slots: Vec::with_capacity(max_size),
            idle: VecDeque::with_capacity(max_size),
            order: Vec::with_capacity(max_size),
            max_size,
        }
    }

    /// Eagerly create up to `count` idle voices, bounded by remaining capacity.
    ///
    /// Returns how many voices were created.
    pub fn prewarm(&mut self, count: usize) -> usize {
        let count = count.min(self.max_size - self.total_created());
        for _ in 0..count {
            let index = self.create();
            self.idle.push_back(index);
        }
        debug!(created = count, total = self.total_created(), "prewarmed voice pool");
        count
    }

    /// Hand out a voice, recycling the oldest silent one when at capacity.
    pub fn get(&mut self) -> Option<Checkout> {
        self.get_recycling(|_, voice| !voice.is_playing())
    }

    /// Like [`get`](Self::get), with the caller deciding which in-use voices
    /// may be recycled once the pool is full.
    ///
    /// Order of preference:
    /// 1. the longest-idle voice
    /// 2. a freshly created voice, while below `max_size`
    /// 3. the first in-use voice (creation order) accepted by `can_recycle`
    pub fn get_recycling<P>(&mut self, mut can_recycle: P) -> Option<Checkout>
    where
        P: FnMut(VoiceHandle, &F::Voice) -> bool,
    {
        if let Some(index) = self.idle.pop_front() {
            self.slots[index].state = SlotState::InUse;
            return Some(Checkout {
                handle: self.handle_at(index),
                evicted: None,
            });
        }

        if self.total_created() < self.max_size {
            let index = self.create();
            self.slots[index].state = SlotState::InUse;
            return Some(Checkout {
                handle: self.handle_at(index),
                evicted: None,
            });
        }

        let slots = &self.slots;
        let victim = self.order.iter().copied().find(|&index| {
            let slot = &slots[index];
            slot.state == SlotState::InUse
                && slot.voice.as_ref().is_some_and(|voice| {
                    voice.is_valid()
                        && can_recycle(VoiceHandle::new(index as u32, slot.generation), voice)
                })
        });

        let Some(index) = victim else {
            debug!(max = self.max_size, "voice pool exhausted, every voice is busy");
            return None;
        };

        let evicted = self.handle_at(index);
        let slot = &mut self.slots[index];
        slot.generation = slot.generation.wrapping_add(1);
        if let Some(voice) = slot.voice.as_mut() {
            voice.reset();
        }
        let handle = self.handle_at(index);
        debug!(%evicted, %handle, "recycled inactive voice");

        Some(Checkout {
            handle,
            evicted: Some(evicted),
        })
    }

    /// Reset a handed-out voice and queue it for reuse.
    ///
    /// Returns false (and does nothing) for stale handles and voices that are
    /// already idle, so returning twice is harmless.
    pub fn return_voice(&mut self, handle: VoiceHandle) -> bool {
        if self.slot_in_use(handle).is_none() {
            return false;
        }

        let index = handle.index();
        let slot = &mut self.slots[index];
        slot.state = SlotState::Idle;
        slot.generation = slot.generation.wrapping_add(1);
        if let Some(voice) = slot.voice.as_mut() {
            voice.reset();
        }
        self.idle.push_back(index);
        true
    }

    /// Drop a handed-out voice whose host resource is gone, freeing capacity.
    pub fn discard(&mut self, handle: VoiceHandle) -> bool {
        if self.slot_in_use(handle).is_none() {
            return false;
        }

        let index = handle.index();
        self.vacate(index);
        debug!(%handle, "discarded invalid voice");
        true
    }

    /// Destroy every idle voice.
    ///
    /// Voices that are currently handed out stay owned and counted.
    pub fn clear(&mut self) {
        let cleared = self.idle.len();
        while let Some(index) = self.idle.pop_front() {
            self.vacate(index);
        }
        debug!(cleared, remaining = self.total_created(), "cleared idle voices");
    }

    pub fn voice(&self, handle: VoiceHandle) -> Option<&F::Voice> {
        self.slot_in_use(handle).and_then(|slot| slot.voice.as_ref())
    }

    pub fn voice_mut(&mut self, handle: VoiceHandle) -> Option<&mut F::Voice> {
        self.slot_in_use(handle)?;
        self.slots[handle.index()].voice.as_mut()
    }

    /// True while `handle` addresses a handed-out voice.
    pub fn contains(&self, handle: VoiceHandle) -> bool {
        self.slot_in_use(handle).is_some()
    }

    /// Handed-out voices with their current handles, in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (VoiceHandle, &mut F::Voice)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let handle = VoiceHandle::new(index as u32, slot.generation);
            match (slot.state, slot.voice.as_mut()) {
                (SlotState::InUse, Some(voice)) => Some((handle, voice)),
                _ => None,
            }
        })
    }

    /// Every live voice, idle or not. For hosts that drive their voices.
    pub fn voices_mut(&mut self) -> impl Iterator<Item = &mut F::Voice> + '_ {
        self.slots.iter_mut().filter_map(|slot| slot.voice.as_mut())
    }

    pub fn total_created(&self) -> usize {
        self.order.len()
    }

    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    pub fn in_use_count(&self) -> usize {
        self.total_created() - self.idle_count()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total_created: self.total_created(),
            idle: self.idle_count(),
            in_use: self.in_use_count(),
            max_size: self.max_size,
        }
    }

    fn create(&mut self) -> usize {
        let voice = self.factory.create_voice();

        let index = match self.slots.iter().position(|slot| slot.voice.is_none()) {
            Some(index) => {
                self.slots[index].voice = Some(voice);
                self.slots[index].state = SlotState::Idle;
                index
            }
            None => {
                self.slots.push(Slot {
                    voice: Some(voice),
                    generation: 0,
                    state: SlotState::Idle,
                });
                self.slots.len() - 1
            }
        };

        self.order.push(index);
        debug!(index, total = self.total_created(), "created pooled voice");
        index
    }

    fn vacate(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        slot.voice = None;
        slot.state = SlotState::Idle;
        slot.generation = slot.generation.wrapping_add(1);
        self.order.retain(|&i| i != index);
    }

    fn handle_at(&self, index: usize) -> VoiceHandle {
        VoiceHandle::new(index as u32, self.slots[index].generation)
    }

    fn slot_in_use(&self, handle: VoiceHandle) -> Option<&Slot<F::Voice>> {
        self.slots.get(handle.index()).filter(|slot| {
            slot.state == SlotState::InUse
                && slot.generation == handle.generation()
                && slot.voice.is_some()
        })
    }
}
