use crate::{
    mixer::{Category, VoiceMix},
    voice::VoiceHandle,
};

/// Coordinator-side record of one voice assigned to in-progress playback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveVoice {
    pub handle: VoiceHandle,
    pub category: Category,
    pub mix: VoiceMix,
    pub looping: bool,
    /// Paused by a category pause; exempt from completion sweeps.
    pub paused: bool,
}

/// Per-category ordered lists of active voices.
///
/// A handle appears in at most one list. Iteration is category order, then
/// insertion order, which is the order completions are processed in.
#[derive(Debug, Default)]
pub struct ActiveSources {
    lists: [Vec<ActiveVoice>; Category::COUNT],
}

impl ActiveSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: ActiveVoice) {
        debug_assert!(!self.contains(entry.handle), "voice tracked twice");
        self.lists[entry.category.index()].push(entry);
    }

    pub fn remove(&mut self, handle: VoiceHandle) -> Option<ActiveVoice> {
        self.lists.iter_mut().find_map(|list| {
            list.iter()
                .position(|e| e.handle == handle)
                .map(|i| list.remove(i))
        })
    }

    pub fn get(&self, handle: VoiceHandle) -> Option<&ActiveVoice> {
        self.iter().find(|e| e.handle == handle)
    }

    pub fn get_mut(&mut self, handle: VoiceHandle) -> Option<&mut ActiveVoice> {
        self.lists
            .iter_mut()
            .flat_map(|list| list.iter_mut())
            .find(|e| e.handle == handle)
    }

    pub fn contains(&self, handle: VoiceHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn is_paused(&self, handle: VoiceHandle) -> bool {
        self.get(handle).is_some_and(|e| e.paused)
    }

    pub fn list(&self, category: Category) -> &[ActiveVoice] {
        &self.lists[category.index()]
    }

    pub fn list_mut(&mut self, category: Category) -> &mut [ActiveVoice] {
        &mut self.lists[category.index()]
    }

    /// Remove and return every entry of `category`, in insertion order.
    pub fn take(&mut self, category: Category) -> Vec<ActiveVoice> {
        std::mem::take(&mut self.lists[category.index()])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveVoice> + '_ {
        self.lists.iter().flat_map(|list| list.iter())
    }

    pub fn len(&self, category: Category) -> usize {
        self.lists[category.index()].len()
    }

    pub fn total_len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }
}
