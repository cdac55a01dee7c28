//! Identifier allocation for relationships, media parts and drawings.
//!
//! One counter serves a whole render pass. It starts above every numeric
//! suffix already used by a relationship id (`rId7` → 7) or drawing id in the
//! package, and only moves forward, so identifiers never repeat within a pass
//! and never collide with pre-existing ones.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// The counter has no identifiers left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("identifier space exhausted")]
pub struct Exhausted;

/// Identifiers reserved for one embedded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation(u32);

impl Allocation {
    /// Raw counter value.
    #[must_use]
    pub fn number(self) -> u32 {
        self.0
    }

    /// Relationship id (`rId{n}`).
    #[must_use]
    pub fn rel_id(self) -> String {
        format!("rId{}", self.0)
    }

    /// Media file name (`image_rp{n}.{ext}`).
    #[must_use]
    pub fn media_name(self, extension: &str) -> String {
        format!("image_rp{}.{extension}", self.0)
    }

    /// Drawing object id for `wp:docPr`.
    #[must_use]
    pub fn drawing_id(self) -> u32 {
        self.0
    }
}

/// Monotonic identifier counter scoped to one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: Option<u32>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: Some(1) }
    }
}

impl IdAllocator {
    /// Create a counter starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counter seeded above the numeric suffixes of `ids`.
    #[must_use]
    pub fn seeded<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut allocator = Self::new();
        for id in ids {
            allocator.observe_id(id);
        }
        allocator
    }

    /// Make sure future allocations stay above the suffix of `id`.
    ///
    /// Identifiers without a trailing number are ignored.
    pub fn observe_id(&mut self, id: &str) {
        if let Some(n) = numeric_suffix(id) {
            self.observe(n);
        }
    }

    /// Make sure future allocations stay above `n`.
    pub fn observe(&mut self, n: u32) {
        if let Some(next) = self.next
            && n >= next
        {
            self.next = n.checked_add(1);
        }
    }

    /// Reserve the next identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Exhausted`] once `u32::MAX` has been handed out.
    pub fn allocate(&mut self) -> Result<Allocation, Exhausted> {
        let n = self.next.ok_or(Exhausted)?;
        self.next = n.checked_add(1);
        Ok(Allocation(n))
    }

    /// Value the next allocation would return, if any.
    #[must_use]
    pub fn peek(&self) -> Option<u32> {
        self.next
    }
}

/// Trailing decimal number of an identifier (`rId12` → 12).
fn numeric_suffix(id: &str) -> Option<u32> {
    let digits = id.len() - id.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    id[id.len() - digits..].parse().ok()
}

/// Ids of all `wp:docPr` drawing elements in a part.
///
/// Unparsable XML yields the ids found before the error.
#[must_use]
pub fn drawing_ids(xml: &str) -> Vec<u32> {
    let mut reader = Reader::from_str(xml);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) if e.local_name().as_ref() == b"docPr" => {
                let id: Option<u32> = e
                    .attributes()
                    .flatten()
                    .find(|a| a.key.as_ref() == b"id")
                    .and_then(|a| std::str::from_utf8(&a.value).ok()?.trim().parse().ok());
                ids.extend(id);
            }
            Ok(Event::Eof) | Err(_) => break,
            Ok(_) => {}
        }
    }
    ids
}
