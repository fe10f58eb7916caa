//! Preloading against the local filesystem.

use std::path::PathBuf;

use slidebook_core::{Slide, SlideError, SlideLoader, SlideResult};

/// Checks that slide images exist on disk.
///
/// Remote locators (`http://`, `https://`, `data:`) are accepted as-is;
/// anything else is resolved against the asset root.
#[derive(Debug, Clone)]
pub struct FileLoader {
    root: PathBuf,
    checked: Vec<usize>,
}

impl FileLoader {
    /// Resolve relative locators against `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            checked: Vec::new(),
        }
    }

    /// Slides requested so far, in request order.
    #[must_use]
    pub fn checked(&self) -> &[usize] {
        &self.checked
    }

    fn is_remote(locator: &str) -> bool {
        ["http://", "https://", "data:"]
            .iter()
            .any(|scheme| locator.starts_with(scheme))
    }
}

impl SlideLoader for FileLoader {
    fn request(&mut self, slide: &Slide) -> SlideResult<()> {
        self.checked.push(slide.index);
        let locator = slide.image.as_str();
        if Self::is_remote(locator) {
            return Ok(());
        }
        let path = self.root.join(locator);
        if path.is_file() {
            Ok(())
        } else {
            Err(SlideError::Preload {
                index: slide.index,
                reason: format!("{} not found", path.display()),
            })
        }
    }
}
