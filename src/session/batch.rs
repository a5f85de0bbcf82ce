use crate::element::ElementSpec;
use crate::error::Result;
use crate::Session;

/// Elements connected together by [`Session::connect_batch`].
///
/// A batch only holds the elements its own call connected. Elements that
/// were already connected, by another batch or a plain
/// [`Session::connect`], stay with their owner.
///
/// Call [`release`](ElementBatch::release) to disconnect them. A batch that
/// is dropped without being released disconnects its elements on a
/// background task of the current runtime.
pub struct ElementBatch {
    session: Session,
    elements: Vec<ElementSpec>,
}

impl ElementBatch {
    pub(super) fn new(session: Session, elements: Vec<ElementSpec>) -> Self {
        Self { session, elements }
    }

    pub fn elements(&self) -> &[ElementSpec] {
        &self.elements
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.name.as_str())
    }

    /// Disconnect every element of the batch in connection order. All
    /// elements are attempted; the first failure is returned.
    pub async fn release(mut self) -> Result<()> {
        let elements = std::mem::take(&mut self.elements);
        disconnect_all(&self.session, &elements).await
    }
}

impl Drop for ElementBatch {
    fn drop(&mut self) {
        if self.elements.is_empty() {
            return;
        }

        let session = self.session.clone();
        let elements = std::mem::take(&mut self.elements);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                log::debug!("Releasing {} elements of a dropped batch", elements.len());
                handle.spawn(async move {
                    disconnect_all(&session, &elements).await.ok();
                });
            }
            Err(_) => log::warn!(
                "Batch dropped outside of a runtime, {} elements stay connected",
                elements.len()
            ),
        }
    }
}

async fn disconnect_all(session: &Session, elements: &[ElementSpec]) -> Result<()> {
    let mut first_error = None;

    for element in elements {
        if let Err(e) = session.disconnect(&element.name).await {
            log::warn!("Could not disconnect {}: {}", element.name, e);
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
