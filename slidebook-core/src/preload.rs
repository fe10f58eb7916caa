//! Look-ahead image materialization.
//!
//! After every committed page change the coordinator asks a [`SlideLoader`]
//! for the neighbouring slides. Requests are fire-and-forget: failures are
//! logged and counted, never surfaced to navigation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::deck::{Deck, Slide};
use crate::SlideResult;

/// Something that can start materializing a slide image.
///
/// Implementations should return quickly; actual decoding may continue in
/// the background on platforms that support it.
pub trait SlideLoader {
    /// Begin loading `slide`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be issued.
    fn request(&mut self, slide: &Slide) -> SlideResult<()>;
}

/// Counters for preload activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadStats {
    /// Requests issued.
    pub requested: usize,
    /// Requests the loader rejected.
    pub failed: usize,
}

/// Slides worth warming up around `page`, in request order.
///
/// Next, previous and the one after next, each only if inside the deck.
#[must_use]
pub fn preload_window(page: usize, len: usize) -> Vec<usize> {
    [page.checked_add(1), page.checked_sub(1), page.checked_add(2)]
        .into_iter()
        .flatten()
        .filter(|index| *index < len)
        .collect()
}

/// Issues each slide's preload at most once.
#[derive(Debug, Clone, Default)]
pub struct PreloadCoordinator {
    requested: BTreeSet<usize>,
    stats: PreloadStats,
}

impl PreloadCoordinator {
    /// Create a coordinator that has requested nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the window around `page` that has not been requested yet.
    ///
    /// Returns the indices newly requested.
    pub fn on_page<L: SlideLoader + ?Sized>(
        &mut self,
        page: usize,
        deck: &Deck,
        loader: &mut L,
    ) -> Vec<usize> {
        let mut issued = Vec::new();
        for index in preload_window(page, deck.len()) {
            if !self.requested.insert(index) {
                continue;
            }
            let Some(slide) = deck.get(index) else {
                continue;
            };
            self.stats.requested += 1;
            issued.push(index);
            match loader.request(slide) {
                Ok(()) => tracing::debug!(index, image = %slide.image, "preload requested"),
                Err(e) => {
                    self.stats.failed += 1;
                    tracing::warn!(index, error = %e, "preload failed");
                }
            }
        }
        issued
    }

    /// Whether `index` has already been requested.
    #[must_use]
    pub fn is_requested(&self, index: usize) -> bool {
        self.requested.contains(&index)
    }

    /// Activity counters.
    #[must_use]
    pub fn stats(&self) -> PreloadStats {
        self.stats
    }
}

/// A loader that accepts every request and does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLoader;

impl SlideLoader for NoopLoader {
    fn request(&mut self, _slide: &Slide) -> SlideResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SlideError;

    #[derive(Default)]
    struct RecordingLoader {
        seen: Vec<usize>,
        fail_on: Option<usize>,
    }

    impl SlideLoader for RecordingLoader {
        fn request(&mut self, slide: &Slide) -> SlideResult<()> {
            self.seen.push(slide.index);
            if self.fail_on == Some(slide.index) {
                return Err(SlideError::Preload {
                    index: slide.index,
                    reason: "offline".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_window_clipped_to_deck() {
        assert_eq!(preload_window(0, 12), vec![1, 2]);
        assert_eq!(preload_window(5, 12), vec![6, 4, 7]);
        assert_eq!(preload_window(11, 12), vec![10]);
        assert!(preload_window(0, 1).is_empty());
    }

    #[test]
    fn test_requests_are_not_repeated() {
        let deck = Deck::numbered(6, "slides/", ".png").expect("deck");
        let mut loader = RecordingLoader::default();
        let mut coordinator = PreloadCoordinator::new();

        assert_eq!(coordinator.on_page(0, &deck, &mut loader), vec![1, 2]);
        assert_eq!(coordinator.on_page(1, &deck, &mut loader), vec![0, 3]);
        assert!(coordinator.on_page(0, &deck, &mut loader).is_empty());
        assert_eq!(loader.seen, vec![1, 2, 0, 3]);
        assert_eq!(coordinator.stats().requested, 4);
    }

    #[test]
    fn test_failures_are_counted_not_retried() {
        let deck = Deck::numbered(4, "slides/", ".png").expect("deck");
        let mut loader = RecordingLoader {
            fail_on: Some(2),
            ..RecordingLoader::default()
        };
        let mut coordinator = PreloadCoordinator::new();

        coordinator.on_page(0, &deck, &mut loader);
        coordinator.on_page(1, &deck, &mut loader);

        assert_eq!(
            coordinator.stats(),
            PreloadStats {
                requested: 4,
                failed: 1
            }
        );
        assert!(coordinator.is_requested(2));
        assert_eq!(loader.seen.iter().filter(|i| **i == 2).count(), 1);
    }
}
