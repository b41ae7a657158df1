use serde::{Deserialize, Serialize};

use cardbox_types::ComponentHash;

use crate::canonical::{CanonicalForm, ComponentKind};
use crate::error::{StoreError, StoreResult};

use super::HashCell;

/// Citation record attached to a card.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cite {
    /// Source name (author or publication).
    pub author: String,
    /// Free-form date string, e.g. `"2010"`.
    pub date: String,
    /// Descriptor: qualifications, title, URL.
    pub info: String,
}

impl Cite {
    pub fn new(author: impl Into<String>, date: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            date: date.into(),
            info: info.into(),
        }
    }
}

/// What an overlay marks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Underline,
    Highlight,
}

impl OverlayKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Underline => "underline",
            Self::Highlight => "highlight",
        }
    }
}

/// Half-open character range `start..end` into the card text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Build a span; the bounds are swapped if given in reverse.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Named set of spans marking emphasis candidates in the card text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Overlay {
    pub kind: OverlayKind,
    pub name: String,
    pub spans: Vec<Span>,
}

impl Overlay {
    pub fn new(kind: OverlayKind, name: impl Into<String>, spans: Vec<Span>) -> Self {
        Self {
            kind,
            name: name.into(),
            spans,
        }
    }

    pub fn underline(name: impl Into<String>, spans: Vec<Span>) -> Self {
        Self::new(OverlayKind::Underline, name, spans)
    }

    pub fn highlight(name: impl Into<String>, spans: Vec<Span>) -> Self {
        Self::new(OverlayKind::Highlight, name, spans)
    }
}

/// Serialized payload of a card (`values[0]` of its canonical form).
#[derive(Serialize, Deserialize)]
struct CardRecord {
    cite: Cite,
    text: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    tag_index: usize,
    #[serde(default)]
    overlays: Vec<Overlay>,
    #[serde(default)]
    preferred_underline: usize,
    #[serde(default)]
    preferred_highlight: usize,
}

/// Citation-bearing component.
///
/// The content hash covers the cite, the text, the tags and the overlay
/// definitions. The selected tag and the preferred overlay of each kind are
/// view state: changing them never changes the card's identity.
#[derive(Clone, Debug, Default)]
pub struct Card {
    cite: Cite,
    text: String,
    tags: Vec<String>,
    tag_index: usize,
    overlays: Vec<Overlay>,
    preferred_underline: usize,
    preferred_highlight: usize,
    hash: HashCell,
}

impl Card {
    pub fn new(cite: Cite, text: impl Into<String>) -> Self {
        Self {
            cite,
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn cite(&self) -> &Cite {
        &self.cite
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn set_cite(&mut self, cite: Cite) {
        self.cite = cite;
        self.hash.invalidate();
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.hash.invalidate();
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.push(tag.into());
        self.hash.invalidate();
    }

    /// Builder-style [`Card::add_tag`].
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.add_tag(tag);
        self
    }

    pub fn add_overlay(&mut self, overlay: Overlay) {
        self.overlays.push(overlay);
        self.hash.invalidate();
    }

    /// Builder-style [`Card::add_overlay`].
    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.add_overlay(overlay);
        self
    }

    /// Remove the overlay at `index` in [`Card::overlays`].
    pub fn remove_overlay(&mut self, index: usize) -> Option<Overlay> {
        if index >= self.overlays.len() {
            return None;
        }
        let removed = self.overlays.remove(index);
        self.hash.invalidate();
        Some(removed)
    }

    /// The currently selected tag, if any.
    pub fn selected_tag(&self) -> Option<&str> {
        self.tags.get(self.tag_index).map(String::as_str)
    }

    pub fn tag_index(&self) -> usize {
        self.tag_index
    }

    pub fn set_tag_index(&mut self, index: usize) {
        self.tag_index = index;
    }

    /// Overlays of one kind, in definition order.
    pub fn overlays_of(&self, kind: OverlayKind) -> impl Iterator<Item = &Overlay> {
        self.overlays.iter().filter(move |o| o.kind == kind)
    }

    /// Preferred index among the overlays of `kind`.
    pub fn preferred_index(&self, kind: OverlayKind) -> usize {
        match kind {
            OverlayKind::Underline => self.preferred_underline,
            OverlayKind::Highlight => self.preferred_highlight,
        }
    }

    pub fn set_preferred_index(&mut self, kind: OverlayKind, index: usize) {
        match kind {
            OverlayKind::Underline => self.preferred_underline = index,
            OverlayKind::Highlight => self.preferred_highlight = index,
        }
    }

    /// The preferred overlay of `kind`, if the preferred index is in range.
    pub fn preferred_overlay(&self, kind: OverlayKind) -> Option<&Overlay> {
        self.overlays_of(kind).nth(self.preferred_index(kind))
    }

    /// Selected tag if there is one, otherwise `"<author> <date>"`.
    pub fn label(&self) -> String {
        match self.selected_tag() {
            Some(tag) => tag.to_string(),
            None => format!("{} {}", self.cite.author, self.cite.date),
        }
    }

    pub fn content_hash(&self) -> ComponentHash {
        self.hash.get_or_compute(|| {
            let mut builder = ComponentKind::Card.hasher().builder();
            builder
                .field(self.cite.author.as_bytes())
                .field(self.cite.date.as_bytes())
                .field(self.cite.info.as_bytes())
                .field(self.text.as_bytes())
                .count(self.tags.len());
            for tag in &self.tags {
                builder.field(tag.as_bytes());
            }
            builder.count(self.overlays.len());
            for overlay in &self.overlays {
                builder
                    .field(overlay.kind.tag().as_bytes())
                    .field(overlay.name.as_bytes())
                    .count(overlay.spans.len());
                for span in &overlay.spans {
                    builder.count(span.start).count(span.end);
                }
            }
            builder.finish()
        })
    }

    pub fn to_canonical_form(&self) -> StoreResult<CanonicalForm> {
        let record = CardRecord {
            cite: self.cite.clone(),
            text: self.text.clone(),
            tags: self.tags.clone(),
            tag_index: self.tag_index,
            overlays: self.overlays.clone(),
            preferred_underline: self.preferred_underline,
            preferred_highlight: self.preferred_highlight,
        };
        let json =
            serde_json::to_string(&record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(CanonicalForm::leaf(json))
    }

    pub fn from_canonical_form(form: &CanonicalForm) -> StoreResult<Self> {
        if !form.is_leaf() {
            return Err(StoreError::decode("card form must not carry children"));
        }
        let record: CardRecord = serde_json::from_str(form.own_value()?)
            .map_err(|e| StoreError::decode(format!("malformed card payload: {e}")))?;
        Ok(Self {
            cite: record.cite,
            text: record.text,
            tags: record.tags,
            tag_index: record.tag_index,
            overlays: record.overlays,
            preferred_underline: record.preferred_underline,
            preferred_highlight: record.preferred_highlight,
            hash: HashCell::default(),
        })
    }
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.cite == other.cite
            && self.text == other.text
            && self.tags == other.tags
            && self.tag_index == other.tag_index
            && self.overlays == other.overlays
            && self.preferred_underline == other.preferred_underline
            && self.preferred_highlight == other.preferred_highlight
    }
}

impl Eq for Card {}
