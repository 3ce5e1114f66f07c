use pt_types::{PriceEntry, UNKNOWN_MINT};
use std::collections::HashMap;

/// Latest accepted price per mint. Entries are only ever replaced, never
/// removed, for the life of the process.
#[derive(Default)]
pub struct PriceStore {
    entries: HashMap<String, PriceEntry>,
}

impl PriceStore {
    pub fn new() -> PriceStore {
        PriceStore::default()
    }

    /// Applies the acceptance policy and overwrites the entry on success.
    /// Rejection is the expected outcome for events without a usable pool
    /// price (e.g. the very first trade of a token, before reserves are
    /// populated) and is not an error.
    pub fn update(&mut self, mint: &str, price: f64) -> bool {
        if mint.is_empty() || mint == UNKNOWN_MINT || price <= 0.0 {
            return false;
        }

        self.entries
            .insert(mint.to_string(), PriceEntry::buy_price(mint, price));
        true
    }

    pub fn entries(&self) -> &HashMap<String, PriceEntry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
