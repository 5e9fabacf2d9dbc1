//! Preview surface that writes each composed document to an `.html` file,
//! so a native session can be inspected in any browser.

use std::fs;
use std::path::{Path, PathBuf};

use crate::preview::{PreviewSurface, RenderError};

#[derive(Debug, Clone)]
pub struct FileSurface {
    path: PathBuf,
    placeholder_visible: bool,
}

impl FileSurface {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            placeholder_visible: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn placeholder_visible(&self) -> bool {
        self.placeholder_visible
    }
}

impl PreviewSurface for FileSurface {
    fn set_document(&mut self, document: String) -> Result<(), RenderError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("html.tmp");
        fs::write(&temp_path, document)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    fn hide_placeholder(&mut self) {
        self.placeholder_visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_document_and_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = FileSurface::new(dir.path().join("out").join("preview.html"));
        surface.set_document("<p>1</p>".to_owned()).unwrap();
        surface.set_document("<p>2</p>".to_owned()).unwrap();
        surface.hide_placeholder();
        assert_eq!(fs::read_to_string(surface.path()).unwrap(), "<p>2</p>");
        assert!(!surface.placeholder_visible());
    }

    #[test]
    fn unwritable_target_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should go
        let mut surface = FileSurface::new(dir.path());
        assert!(surface.set_document("<p></p>".to_owned()).is_err());
    }
}
