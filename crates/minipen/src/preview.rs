//! Preview renderer and the rendering-surface port.
//!
//! The surface is an isolation boundary: it only ever receives an owned
//! document string and has no handle back into controller state.

use thiserror::Error;

/// Sandboxed rendering context (an inline-document iframe in the browser).
pub trait PreviewSurface {
    /// Replaces the whole surface content with `document`.
    fn set_document(&mut self, document: String) -> Result<(), RenderError>;
    /// Makes the placeholder overlay invisible and non-interactive.
    fn hide_placeholder(&mut self);
}

impl<P: PreviewSurface + ?Sized> PreviewSurface for Box<P> {
    fn set_document(&mut self, document: String) -> Result<(), RenderError> {
        (**self).set_document(document)
    }

    fn hide_placeholder(&mut self) {
        (**self).hide_placeholder()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RenderError {
    message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for RenderError {
    fn from(error: std::io::Error) -> Self {
        RenderError::new(error.to_string())
    }
}

/// Pushes composed documents into a surface. Fire-and-forget: there is no
/// "render complete" signal beyond the assignment succeeding.
#[derive(Debug)]
pub struct PreviewRenderer<P> {
    surface: P,
    renders: u64,
}

impl<P: PreviewSurface> PreviewRenderer<P> {
    pub fn new(surface: P) -> Self {
        Self {
            surface,
            renders: 0,
        }
    }

    pub fn render(&mut self, document: String) -> Result<(), RenderError> {
        self.surface.set_document(document)?;
        self.surface.hide_placeholder();
        self.renders += 1;
        log::debug!("Preview render #{} assigned", self.renders);
        Ok(())
    }

    /// Successful renders so far.
    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn surface(&self) -> &P {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut P {
        &mut self.surface
    }
}

/// Surface that keeps every assigned document. Used by tests and by the CLI's
/// headless sessions.
#[derive(Debug)]
pub struct RecordingSurface {
    documents: Vec<String>,
    placeholder_visible: bool,
    fail_next: Option<String>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            placeholder_visible: true,
            fail_next: None,
        }
    }

    /// Makes the next `set_document` fail with `message`.
    pub fn fail_next(&mut self, message: impl Into<String>) {
        self.fail_next = Some(message.into());
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn last_document(&self) -> Option<&str> {
        self.documents.last().map(String::as_str)
    }

    pub fn placeholder_visible(&self) -> bool {
        self.placeholder_visible
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewSurface for RecordingSurface {
    fn set_document(&mut self, document: String) -> Result<(), RenderError> {
        if let Some(message) = self.fail_next.take() {
            return Err(RenderError::new(message));
        }
        self.documents.push(document);
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
    fn render_assigns_document_and_hides_placeholder() {
        let mut renderer = PreviewRenderer::new(RecordingSurface::new());
        assert!(renderer.surface().placeholder_visible());
        renderer.render("<p>one</p>".to_owned()).unwrap();
        renderer.render("<p>two</p>".to_owned()).unwrap();
        assert_eq!(renderer.surface().documents().len(), 2);
        assert_eq!(renderer.surface().last_document(), Some("<p>two</p>"));
        assert!(!renderer.surface().placeholder_visible());
        assert_eq!(renderer.renders(), 2);
    }

    #[test]
    fn failed_assignment_keeps_placeholder() {
        let mut renderer = PreviewRenderer::new(RecordingSurface::new());
        renderer.surface_mut().fail_next("surface detached");
        let error = renderer.render("<p></p>".to_owned()).unwrap_err();
        assert_eq!(error.message(), "surface detached");
        assert_eq!(error.to_string(), "surface detached");
        assert!(renderer.surface().placeholder_visible());
        assert!(renderer.surface().documents().is_empty());
        assert_eq!(renderer.renders(), 0);
    }
}
