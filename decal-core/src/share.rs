//! Shareable link codec.
//!
//! A design travels in a single query parameter as URL-safe base64 of its
//! JSON form. The encoding is obfuscation only; anything decoded here is
//! validated like any other untrusted document.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use url::Url;

use crate::document::DesignDocument;
use crate::{DesignError, DesignResult};

/// Query parameter carrying the encoded design.
pub const SHARE_PARAM: &str = "design";

/// Encode a document as a URL-safe base64 payload without padding.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn encode_payload(document: &DesignDocument) -> DesignResult<String> {
    let json = document.to_json()?;
    Ok(URL_SAFE_NO_PAD.encode(json.as_bytes()))
}

/// Decode a payload into a validated document.
///
/// # Errors
///
/// Returns [`DesignError::Decode`] if the payload is not base64 or not UTF-8,
/// and the document errors of [`DesignDocument::from_json`] otherwise.
pub fn try_decode_payload(raw: &str) -> DesignResult<DesignDocument> {
    let bytes = decode_base64(raw.trim())
        .ok_or_else(|| DesignError::Decode("payload is not base64".to_string()))?;
    let json = String::from_utf8(bytes)
        .map_err(|e| DesignError::Decode(format!("payload is not UTF-8: {e}")))?;
    let parsed = DesignDocument::from_json(&json)?;
    Ok(parsed.document)
}

/// Decode a payload, logging and discarding any failure.
#[must_use]
pub fn decode_payload(raw: &str) -> Option<DesignDocument> {
    match try_decode_payload(raw) {
        Ok(document) => Some(document),
        Err(e) => {
            tracing::warn!(error = %e, "Rejected shared design payload");
            None
        }
    }
}

/// Accept URL-safe and standard alphabets, padded or not.
fn decode_base64(raw: &str) -> Option<Vec<u8>> {
    [&URL_SAFE_NO_PAD, &URL_SAFE, &STANDARD, &STANDARD_NO_PAD]
        .into_iter()
        .find_map(|engine| engine.decode(raw).ok())
}

/// Build `<base_url>?<param>=<payload>`, replacing any existing `param`.
///
/// # Errors
///
/// Returns [`DesignError::InvalidOperation`] if `base_url` is not a URL.
pub fn compose_link(base_url: &str, param: &str, payload: &str) -> DesignResult<String> {
    let mut url = Url::parse(base_url)
        .map_err(|e| DesignError::InvalidOperation(format!("invalid share base URL: {e}")))?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != param)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (key, value) in &kept {
            query.append_pair(key, value);
        }
        query.append_pair(param, payload);
    }
    Ok(url.into())
}

/// Extract the value of `param` from a link.
///
/// # Errors
///
/// Returns [`DesignError::Decode`] if the link is not a URL or lacks the
/// parameter.
pub fn extract_param(link: &str, param: &str) -> DesignResult<String> {
    let url = Url::parse(link).map_err(|e| DesignError::Decode(format!("invalid link: {e}")))?;
    url.query_pairs()
        .find(|(key, _)| key == param)
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| DesignError::Decode(format!("link has no '{param}' parameter")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::fingerprint::content_hash;
    use crate::product::ProductDescriptor;

    fn document() -> DesignDocument {
        let mut doc = DesignDocument::empty(ProductDescriptor::new("bandit", "23oz", 400, 300));
        doc.elements.push(Element::text("Hello?&=+/", 12.0, 34.0));
        doc.elements.push(Element::emoji("🎉"));
        doc
    }

    #[test]
    fn test_payload_round_trip() {
        let doc = document();
        let payload = encode_payload(&doc).expect("encode");

        assert!(!payload.contains('='));
        assert!(!payload.contains('+'));
        assert!(!payload.contains('/'));

        let decoded = decode_payload(&payload).expect("decode");
        assert_eq!(decoded, doc);
        assert_eq!(
            content_hash(&decoded).expect("hash"),
            content_hash(&doc).expect("hash")
        );
    }

    #[test]
    fn test_standard_alphabet_accepted() {
        let doc = document();
        let payload = STANDARD.encode(doc.to_json().expect("json"));
        assert_eq!(decode_payload(&payload), Some(doc));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(decode_payload("!!!not base64!!!").is_none());
        assert!(decode_payload(&URL_SAFE_NO_PAD.encode([0xff, 0xfe])).is_none());
        assert!(decode_payload(&URL_SAFE_NO_PAD.encode("{\"version\":\"2.0\"}")).is_none());
        assert!(matches!(
            try_decode_payload("@@@"),
            Err(DesignError::Decode(_))
        ));
    }

    #[test]
    fn test_compose_and_extract_link() {
        let link = compose_link("https://shop.example.com/editor?ref=mail&design=old", SHARE_PARAM, "abc-_")
            .expect("compose");
        assert_eq!(link, "https://shop.example.com/editor?ref=mail&design=abc-_");
        assert_eq!(extract_param(&link, SHARE_PARAM).expect("extract"), "abc-_");
    }

    #[test]
    fn test_extract_missing_param() {
        assert!(extract_param("https://example.com/?other=1", SHARE_PARAM).is_err());
        assert!(extract_param("not a url", SHARE_PARAM).is_err());
        assert!(compose_link("not a url", SHARE_PARAM, "x").is_err());
    }
}
