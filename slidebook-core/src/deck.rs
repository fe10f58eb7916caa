//! Slide decks - the immutable page sequence a viewer presents.

use serde::{Deserialize, Serialize};

use crate::{SlideError, SlideResult};

/// Opaque handle to a slide image (URL, path or any adapter-defined key).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Create a new image reference.
    #[must_use]
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// The locator string the adapter resolves.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single exported slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// Zero-based position in the deck.
    pub index: usize,
    /// Image to display for this slide.
    pub image: ImageRef,
    /// Accessible description.
    pub alt_text: String,
}

impl Slide {
    /// One-based number shown to the reader.
    #[must_use]
    pub fn display_number(&self) -> usize {
        self.index + 1
    }
}

/// One entry of the asset manifest produced by the export pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Zero-based slide index.
    pub index: usize,
    /// Where the exported image lives.
    pub image_locator: String,
    /// Accessible description.
    #[serde(default)]
    pub alt_text: String,
}

/// An ordered, non-empty, immutable sequence of slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deck {
    slides: Vec<Slide>,
}

impl Deck {
    /// Build a deck from slides already in order.
    ///
    /// # Errors
    ///
    /// Returns [`SlideError::EmptyDeck`] if `slides` is empty and
    /// [`SlideError::ManifestOrder`] if an index does not match its position.
    pub fn new(slides: Vec<Slide>) -> SlideResult<Self> {
        if slides.is_empty() {
            return Err(SlideError::EmptyDeck);
        }
        for (expected, slide) in slides.iter().enumerate() {
            if slide.index != expected {
                return Err(SlideError::ManifestOrder {
                    expected,
                    found: slide.index,
                });
            }
        }
        Ok(Self { slides })
    }

    /// Build a deck from manifest entries.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Deck::new`].
    pub fn from_manifest(entries: Vec<ManifestEntry>) -> SlideResult<Self> {
        let slides = entries
            .into_iter()
            .map(|entry| Slide {
                index: entry.index,
                image: ImageRef::new(entry.image_locator),
                alt_text: entry.alt_text,
            })
            .collect();
        Self::new(slides)
    }

    /// Parse a JSON manifest (`[{ "index", "imageLocator", "altText" }]`).
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the deck is invalid.
    pub fn from_manifest_json(json: &str) -> SlideResult<Self> {
        let entries: Vec<ManifestEntry> = serde_json::from_str(json)?;
        Self::from_manifest(entries)
    }

    /// Convenience constructor for numbered exports (`{prefix}{n}{suffix}`, 1-based).
    ///
    /// # Errors
    ///
    /// Returns [`SlideError::EmptyDeck`] if `count` is zero.
    pub fn numbered(count: usize, prefix: &str, suffix: &str) -> SlideResult<Self> {
        let slides = (0..count)
            .map(|index| Slide {
                index,
                image: ImageRef::new(format!("{prefix}{}{suffix}", index + 1)),
                alt_text: format!("Slide {}", index + 1),
            })
            .collect();
        Self::new(slides)
    }

    /// Number of slides (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Always `false`; present for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Get a slide by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    /// Iterate over all slides in order.
    pub fn slides(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter()
    }

    /// Whether `index` addresses a slide.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        index < self.slides.len()
    }
}
