/// Per-pair results of a forward-looking estimator, indexed by the pair's
/// first source frame.
///
/// The last slot can never be produced (there is no frame after it), so it is
/// filled from the slot before by [`MaskSequence::patch_trailing`].
#[derive(Clone, Debug)]
pub struct MaskSequence<T> {
    entries: Vec<Option<T>>,
}

impl<T: Clone> MaskSequence<T> {
    pub fn new(len: usize) -> Self {
        Self {
            entries: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, index: usize, value: T) {
        if let Some(slot) = self.entries.get_mut(index) {
            *slot = Some(value);
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).and_then(Option::as_ref)
    }

    /// Drop every entry before `index`.
    pub fn release_before(&mut self, index: usize) {
        for slot in self.entries.iter_mut().take(index) {
            *slot = None;
        }
    }

    /// Replace an undefined last entry with a copy of the previous one.
    ///
    /// Returns true when the slot was patched.
    pub fn patch_trailing(&mut self) -> bool {
        let n = self.entries.len();
        if n < 2 || self.entries[n - 1].is_some() {
            return false;
        }
        match self.entries[n - 2].clone() {
            Some(previous) => {
                self.entries[n - 1] = Some(previous);
                true
            }
            None => false,
        }
    }
}
