/// Longest pending text worth keeping; voice utterances are short, and
/// anything older than this can no longer merge anyway.
const DEFAULT_MAX_LEN: usize = 1024;

/// Accumulates raw transcribed fragments into one working string.
///
/// Purely a string store: no normalization, no interpretation. The caller
/// decides when to re-interpret the whole buffer versus a single fragment
/// and when to clear. The buffer is bounded: once the content exceeds the
/// cap, the oldest fragments are evicted from the front.
#[derive(Debug)]
pub struct FragmentBuffer {
    pending: String,
    max_len: usize,
}

impl FragmentBuffer {
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LEN)
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            pending: String::new(),
            max_len,
        }
    }

    /// Appends a fragment, joining with a single space. Evicts from the
    /// front when the cap is exceeded.
    pub fn push(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.pending.is_empty() {
            self.pending.push(' ');
        }
        self.pending.push_str(text);
        self.evict_front();
    }

    pub fn current(&self) -> &str {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    fn evict_front(&mut self) {
        if self.pending.len() <= self.max_len {
            return;
        }
        let mut cut = self.pending.len() - self.max_len;
        while cut < self.pending.len() && !self.pending.is_char_boundary(cut) {
            cut += 1;
        }
        // Cut at the next word boundary where one exists so the front of
        // the buffer stays a whole fragment.
        if let Some(space) = self.pending[cut..].find(' ') {
            cut += space + 1;
        }
        self.pending.drain(..cut);
    }
}

impl Default for FragmentBuffer {
    fn default() -> Self {
        Self::new()
    }
}
