//! Content fingerprints for change detection.
//!
//! The fingerprint covers every field of a [`DesignDocument`] except its
//! timestamp, serialized in declaration order, so two captures of the same
//! design compare equal no matter when they were taken.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::background::BackgroundDescriptor;
use crate::document::DesignDocument;
use crate::element::{Element, ElementId};
use crate::product::ProductDescriptor;

/// 128-bit content fingerprint built from two independent FNV-1a lanes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentHash {
    /// High lane.
    pub hi: u64,
    /// Low lane.
    pub lo: u64,
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Borrowed view of a document without its timestamp.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HashedFields<'a> {
    version: &'a str,
    product: &'a ProductDescriptor,
    elements: &'a [Element],
    background: Option<&'a BackgroundDescriptor>,
    selected_element_id: Option<&'a ElementId>,
    locked_elements: &'a BTreeSet<ElementId>,
    hidden_elements: &'a BTreeSet<ElementId>,
}

/// Canonical bytes hashed for `document`.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn canonical_bytes(document: &DesignDocument) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&HashedFields {
        version: &document.version,
        product: &document.product,
        elements: &document.elements,
        background: document.background.as_ref(),
        selected_element_id: document.selected_element_id.as_ref(),
        locked_elements: &document.locked_elements,
        hidden_elements: &document.hidden_elements,
    })
}

/// Fingerprint a document, ignoring its timestamp.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn content_hash(document: &DesignDocument) -> Result<ContentHash, serde_json::Error> {
    let bytes = canonical_bytes(document)?;
    let mut a = Fnv1a64::new(0xcbf2_9ce4_8422_2325);
    let mut b = Fnv1a64::new(0x9ae1_6a3b_2f90_404f);
    a.write(&bytes);
    b.write(&bytes);
    Ok(ContentHash {
        hi: a.finish(),
        lo: b.finish(),
    })
}

struct Fnv1a64 {
    state: u64,
}

impl Fnv1a64 {
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.state ^= u64::from(*byte);
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }

    fn finish(&self) -> u64 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> DesignDocument {
        let mut doc = DesignDocument::empty(ProductDescriptor::default());
        doc.elements.push(Element::text("Hello", 10.0, 10.0));
        doc
    }

    #[test]
    fn test_timestamp_is_ignored() {
        let a = document();
        let mut b = a.clone();
        b.timestamp += 60_000;
        assert_eq!(
            content_hash(&a).expect("hash"),
            content_hash(&b).expect("hash")
        );
    }

    #[test]
    fn test_content_change_changes_hash() {
        let a = document();
        let mut b = a.clone();
        b.elements[0].rotation = 15.0;
        assert_ne!(
            content_hash(&a).expect("hash"),
            content_hash(&b).expect("hash")
        );
    }

    #[test]
    fn test_order_sensitive() {
        let mut a = document();
        a.elements.push(Element::image("x.png"));
        let mut b = a.clone();
        b.elements.swap(0, 1);
        assert_ne!(
            content_hash(&a).expect("hash"),
            content_hash(&b).expect("hash")
        );
    }

    #[test]
    fn test_canonical_bytes_omit_timestamp() {
        let bytes = canonical_bytes(&document()).expect("bytes");
        let text = String::from_utf8(bytes).expect("utf8");
        assert!(!text.contains("timestamp"));
        assert!(text.starts_with("{\"version\":"));
    }

    #[test]
    fn test_display_is_32_hex_chars() {
        let hash = content_hash(&document()).expect("hash");
        assert_eq!(hash.to_string().len(), 32);
    }
}
