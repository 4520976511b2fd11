/*!
 * Key normalisation and collision-safe allocation within a sheet.
 */

use std::collections::HashSet;

/// Fallback key for texts that slug to nothing
pub const FALLBACK_KEY: &str = "text";

/// Normalise a proposed key to `[a-z0-9_]+`
///
/// Letters are lowercased, every run of other characters becomes a single
/// `_`, and leading/trailing underscores are trimmed.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_KEY.to_string()
    } else {
        slug
    }
}

/// Hands out keys that are unique within one sheet
///
/// Seeded with the sheet's existing keys. Every allocated key is reserved
/// immediately, so later candidates in the same batch cannot take it.
#[derive(Debug, Default)]
pub struct KeyAllocator {
    taken: HashSet<String>,
}

impl KeyAllocator {
    /// Create an allocator over the keys already used in the sheet
    pub fn new(existing: impl IntoIterator<Item = String>) -> Self {
        Self {
            taken: existing.into_iter().collect(),
        }
    }

    /// Reserve `candidate` (slugged), appending `_1`, `_2`, … until it is free
    pub fn allocate(&mut self, candidate: &str) -> String {
        let base = slugify(candidate);
        let mut key = base.clone();
        let mut suffix = 0usize;

        while self.taken.contains(&key) {
            suffix += 1;
            key = format!("{}_{}", base, suffix);
        }

        self.taken.insert(key.clone());
        key
    }
}
