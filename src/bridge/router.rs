//! Operation dispatch shared by the host and page channels.
//!
//! | Operation | Handler | Result |
//! |-----------|---------|--------|
//! | `GET_ANNOTATED_HTML` | [`Bridge::annotated_html`] | `{annotatedHTML: [...]}` |
//! | `HIGHLIGHT_ELEMENT` | [`Bridge::highlight_element`] | `{success}` |
//! | `REMOVE_HIGHLIGHT` | [`Bridge::remove_highlight`] | `{success}` |
//! | `SETUP_CLICK_LISTENER` | [`Bridge::setup_click_listener`] | `{success}` |
//!
//! Failures never escape the router. They are logged and reported as an
//! empty list or `success: false`.

// ============================================================================
// Imports
// ============================================================================

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::annotation::AnnotatedElement;
use crate::error::{Error, Result};
use crate::identifiers::ListenerId;
use crate::protocol::{Operation, OperationKind, OperationResult};

use super::Bridge;

// ============================================================================
// Dispatch
// ============================================================================

impl Bridge {
    /// Executes one operation. Never fails.
    pub async fn execute(&self, operation: Operation) -> OperationResult {
        match self.execute_now(&operation) {
            Some(result) => result,
            None => OperationResult::Annotated(self.annotated_html().await),
        }
    }

    /// Executes a synchronous operation in place.
    ///
    /// Returns `None` for operations that must be awaited.
    pub(crate) fn execute_now(&self, operation: &Operation) -> Option<OperationResult> {
        let kind = operation.kind();
        let result = match operation {
            Operation::GetAnnotatedHtml => return None,
            Operation::HighlightElement { element } => self.highlight_element(element.as_ref()),
            Operation::RemoveHighlight => {
                self.remove_highlight();
                Ok(())
            }
            Operation::SetupClickListener { element_id } => {
                self.setup_click_listener(element_id.as_ref()).map(|_| ())
            }
        };
        Some(status(kind, result))
    }
}

// ============================================================================
// Operations
// ============================================================================

impl Bridge {
    /// Runs the annotation service over the document.
    ///
    /// Returns an empty list when no service is loaded or it fails.
    pub async fn annotated_html(&self) -> Vec<AnnotatedElement> {
        let Some(annotator) = &self.inner.annotator else {
            error!(error = %Error::unavailable("annotation service"), "Cannot annotate page");
            return Vec::new();
        };

        let document = self.inner.document.as_ref();
        match AssertUnwindSafe(annotator.create_annotated_html(document))
            .catch_unwind()
            .await
        {
            Ok(Ok(elements)) => {
                debug!(count = elements.len(), "Annotated HTML created");
                elements
            }
            Ok(Err(e)) => {
                error!(error = %e, "Error creating annotated HTML");
                Vec::new()
            }
            Err(_) => {
                error!("Annotation service panicked");
                Vec::new()
            }
        }
    }

    /// Highlights the element referenced by `element` (`{id: "..."}`).
    ///
    /// Any previous highlight and click capture are torn down first.
    ///
    /// # Errors
    ///
    /// - [`Error::Unavailable`] if no annotation service is loaded
    /// - [`Error::Malformed`] if the reference is unusable
    /// - [`Error::NotFound`] if no node carries the id
    /// - [`Error::Internal`] if the document rejects the marker
    pub fn highlight_element(&self, element: Option<&Value>) -> Result<()> {
        let inner = &*self.inner;
        inner.interaction.lock().highlight(
            inner.document.as_ref(),
            &inner.config,
            element,
            inner.annotator.is_some(),
        )
    }

    /// Clears the highlight and disarms click capture. Idempotent.
    pub fn remove_highlight(&self) {
        let inner = &*self.inner;
        inner
            .interaction
            .lock()
            .remove_highlight(inner.document.as_ref());
        debug!("Highlight removed");
    }

    /// Arms a one-shot click capture for `element_id`.
    ///
    /// # Errors
    ///
    /// - [`Error::Malformed`] if `element_id` is not a non-empty string
    /// - [`Error::Internal`] if the listener cannot be registered
    pub fn setup_click_listener(&self, element_id: Option<&Value>) -> Result<ListenerId> {
        let inner = &*self.inner;
        inner
            .interaction
            .lock()
            .setup_click_listener(inner.document.as_ref(), element_id)
    }
}

/// Folds an operation outcome into `{success}`, logging the failure.
fn status(kind: OperationKind, result: Result<()>) -> OperationResult {
    match result {
        Ok(()) => OperationResult::Status(true),
        Err(e) if e.is_not_found() || e.is_malformed() => {
            warn!(operation = kind.tag(), error = %e, "Operation rejected");
            OperationResult::Status(false)
        }
        Err(e) => {
            error!(operation = kind.tag(), error = %e, "Operation failed");
            OperationResult::Status(false)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
