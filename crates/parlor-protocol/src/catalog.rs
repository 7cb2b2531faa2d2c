//! The card catalog: categories and card names.
//!
//! A catalog is built once (from the settings file on the server, from
//! a decoded rules frame on a client) and is immutable afterwards. It
//! owns the mapping between card IDs and names, and the per-category
//! ID spans every suggestion and solve attempt is validated against.

use std::ops::Range;

use crate::types::{CardId, WireLimits};

/// Longest permitted card name, in bytes (the wire length prefix is
/// one byte and the legacy format treats it as signed).
pub const MAX_NAME_LEN: usize = 127;

/// Most cards a catalog may hold (card IDs are `u16` with `0xFFFF`
/// reserved as a sentinel and the sign bit unused by legacy clients).
pub const MAX_TOTAL_CARDS: usize = 32767;

/// Errors detected while constructing a catalog.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// A catalog must partition cards into at least one category.
    #[error("catalog has no categories")]
    NoCategories,

    /// Every category must contribute at least one card.
    #[error("category {0} has no cards")]
    EmptyCategory(usize),

    /// A card name exceeds the one-byte length prefix's range.
    #[error("card name {name:?} too long ({len} bytes, max {MAX_NAME_LEN})")]
    NameTooLong { name: String, len: usize },

    /// Card names may not contain embedded NUL bytes.
    #[error("card name {0:?} contains a NUL byte")]
    NameContainsNul(String),

    /// Total card count exceeds the wire's `u16` budget.
    #[error("too many cards: {0} (max {MAX_TOTAL_CARDS})")]
    TooManyCards(usize),

    /// Category count exceeds the wire's one-byte field.
    #[error("too many categories: {0} (max 255)")]
    TooManyCategories(usize),

    /// Removing one solution card per category must leave a non-empty
    /// deck, or there is nothing to deal.
    #[error("not enough cards to form a deck: {cards} card(s) across {categories} categories")]
    NoDeck { cards: usize, categories: usize },
}

/// An ordered, immutable list of categories, each an ordered list of
/// card names.
///
/// Card IDs are assigned by concatenating categories in order: the
/// first card of the first category is ID 0, and category `i` covers
/// the contiguous span returned by [`category_span`](Self::category_span).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<Vec<String>>,
    /// First card ID of each category, plus the total as a final entry.
    bases: Vec<u16>,
}

impl Catalog {
    /// Builds a catalog, validating every invariant the wire format
    /// and the dealer depend on.
    pub fn new(categories: Vec<Vec<String>>) -> Result<Self, CatalogError> {
        if categories.is_empty() {
            return Err(CatalogError::NoCategories);
        }
        if categories.len() > u8::MAX as usize {
            return Err(CatalogError::TooManyCategories(categories.len()));
        }

        let mut total: usize = 0;
        for (i, cards) in categories.iter().enumerate() {
            if cards.is_empty() {
                return Err(CatalogError::EmptyCategory(i));
            }
            for name in cards {
                if name.len() > MAX_NAME_LEN {
                    return Err(CatalogError::NameTooLong {
                        name: name.clone(),
                        len: name.len(),
                    });
                }
                if name.as_bytes().contains(&0) {
                    return Err(CatalogError::NameContainsNul(name.clone()));
                }
            }
            total += cards.len();
        }

        if total > MAX_TOTAL_CARDS {
            return Err(CatalogError::TooManyCards(total));
        }
        // One card per category goes into the solution; the rest form
        // the deck, which must not be empty.
        if total <= categories.len() {
            return Err(CatalogError::NoDeck {
                cards: total,
                categories: categories.len(),
            });
        }

        let mut bases = Vec::with_capacity(categories.len() + 1);
        let mut base: u16 = 0;
        for cards in &categories {
            bases.push(base);
            base += cards.len() as u16;
        }
        bases.push(base);

        Ok(Self { categories, bases })
    }

    /// Number of categories.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Total number of cards across all categories.
    pub fn total_cards(&self) -> u16 {
        *self.bases.last().expect("bases always has a final total entry")
    }

    /// Number of cards in category `i`.
    pub fn category_len(&self, i: usize) -> u16 {
        self.categories[i].len() as u16
    }

    /// The contiguous card-ID span of category `i`.
    pub fn category_span(&self, i: usize) -> Range<u16> {
        self.bases[i]..self.bases[i + 1]
    }

    /// Whether `card` is a valid ID in this catalog.
    pub fn contains(&self, card: CardId) -> bool {
        card.0 < self.total_cards()
    }

    /// The category a card belongs to, if the ID is valid.
    pub fn category_of(&self, card: CardId) -> Option<usize> {
        if !self.contains(card) {
            return None;
        }
        // bases is sorted; find the last base <= card.
        match self.bases.binary_search(&card.0) {
            Ok(i) if i < self.categories.len() => Some(i),
            Ok(i) => Some(i - 1),
            Err(i) => Some(i - 1),
        }
    }

    /// The ID of the `idx`-th card in category `cat`.
    pub fn card_id(&self, cat: usize, idx: u16) -> CardId {
        debug_assert!(idx < self.category_len(cat));
        CardId(self.bases[cat] + idx)
    }

    /// The display name of a card, if the ID is valid.
    pub fn card_name(&self, card: CardId) -> Option<&str> {
        let cat = self.category_of(card)?;
        let idx = (card.0 - self.bases[cat]) as usize;
        Some(&self.categories[cat][idx])
    }

    /// Card names of category `i`, in ID order.
    pub fn category_names(&self, i: usize) -> &[String] {
        &self.categories[i]
    }

    /// Iterates over all card names in ID order.
    pub fn card_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().flatten().map(String::as_str)
    }

    /// The bounds a decoder validates incoming IDs against.
    pub fn limits(&self) -> WireLimits {
        WireLimits {
            categories: self.categories.len() as u8,
            total_cards: self.total_cards(),
        }
    }
}
