//! Page cursor and object-key derivation.
//!
//! Pages are 1-based and keyed by a shared prefix:
//! `{prefix}page-{n}.png` for the rendered image and `{prefix}page-{n}.txt`
//! for the extracted text.

/// Current page position plus the key prefix shared by all page assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    prefix: String,
    index: u32,
}

impl PageCursor {
    /// Page indices start at 1; there is no page 0.
    pub const FIRST_PAGE: u32 = 1;

    /// Creates a cursor positioned on the first page.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            index: Self::FIRST_PAGE,
        }
    }

    /// Current page index (1-based).
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Key prefix shared by all page assets.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Moves to an explicit page index, clamped to the floor.
    pub fn seek(&mut self, index: u32) -> u32 {
        self.index = index.max(Self::FIRST_PAGE);
        self.index
    }

    /// Moves forward one page and returns the new index.
    ///
    /// There is no upper bound; paging past the last page simply yields
    /// missing assets, which the viewer renders as placeholders.
    pub fn advance(&mut self) -> u32 {
        self.index += 1;
        self.index
    }

    /// Moves back one page, returning `None` when already on the floor.
    pub fn retreat(&mut self) -> Option<u32> {
        if self.index <= Self::FIRST_PAGE {
            return None;
        }
        self.index -= 1;
        Some(self.index)
    }

    /// Object key of the current page's rendered image.
    pub fn image_key(&self) -> String {
        format!("{}page-{}.png", self.prefix, self.index)
    }

    /// Object key of the current page's extracted text.
    pub fn text_key(&self) -> String {
        format!("{}page-{}.txt", self.prefix, self.index)
    }
}
