//! Structural validation for untrusted design documents.
//!
//! Documents arrive from durable storage, share links and user files. Every
//! one of them is checked here before it is allowed near the live stores.
//! Unknown fields are tolerated everywhere so newer documents still load.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::background::BackgroundType;
use crate::document::DesignDocument;
use crate::element::ElementType;

/// Validation error types. `path` is a JSON-pointer-like location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is absent.
    #[error("{path}: missing field")]
    Missing {
        /// Location of the field.
        path: String,
    },
    /// A field has the wrong JSON type.
    #[error("{path}: expected {expected}")]
    WrongType {
        /// Location of the field.
        path: String,
        /// Expected JSON type.
        expected: &'static str,
    },
    /// A tag field holds an unknown variant.
    #[error("{path}: unknown variant {value:?}")]
    UnknownVariant {
        /// Location of the field.
        path: String,
        /// Offending value.
        value: String,
    },
}

/// Validate a candidate document.
///
/// # Errors
///
/// Returns the first structural problem found.
pub fn validate(candidate: &Value) -> Result<(), ValidationError> {
    let root = expect_object(candidate, "")?;

    expect_string(root, "", "version")?;
    expect_number(root, "", "timestamp")?;
    validate_product(field(root, "", "product")?)?;

    let elements = field(root, "", "elements")?
        .as_array()
        .ok_or_else(|| wrong_type("/elements", "array"))?;
    for (index, element) in elements.iter().enumerate() {
        validate_element(element, &format!("/elements/{index}"))?;
    }

    match field(root, "", "background")? {
        Value::Null => {}
        background => validate_background(background)?,
    }

    match field(root, "", "selectedElementId")? {
        Value::Null | Value::String(_) => {}
        _ => return Err(wrong_type("/selectedElementId", "string or null")),
    }

    expect_string_array(root, "lockedElements")?;
    expect_string_array(root, "hiddenElements")?;

    Ok(())
}

/// Validate a candidate, reporting failures through the log.
#[must_use]
pub fn is_valid(candidate: &Value) -> bool {
    match validate(candidate) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid design document");
            false
        }
    }
}

/// Validate a typed document by checking its serialized form.
///
/// # Errors
///
/// Returns the first structural problem found, or a type error if the
/// document cannot be serialized at all.
pub fn validate_document(document: &DesignDocument) -> Result<(), ValidationError> {
    let value = serde_json::to_value(document).map_err(|_| wrong_type("", "serializable document"))?;
    validate(&value)
}

fn validate_product(product: &Value) -> Result<(), ValidationError> {
    let product = expect_object(product, "/product")?;
    expect_string(product, "/product", "type")?;
    expect_string(product, "/product", "size")?;
    for key in ["width", "height"] {
        let value = field(product, "/product", key)?;
        let positive = value
            .as_u64()
            .is_some_and(|n| n > 0 && u32::try_from(n).is_ok());
        if !positive {
            return Err(wrong_type(&format!("/product/{key}"), "positive integer"));
        }
    }
    Ok(())
}

fn validate_element(element: &Value, path: &str) -> Result<(), ValidationError> {
    let element = expect_object(element, path)?;
    expect_string(element, path, "id")?;

    let tag = expect_string(element, path, "type")?;
    if ElementType::from_tag(tag).is_none() {
        return Err(ValidationError::UnknownVariant {
            path: format!("{path}/type"),
            value: tag.to_string(),
        });
    }

    let position_path = format!("{path}/position");
    let position = expect_object(field(element, path, "position")?, &position_path)?;
    expect_number(position, &position_path, "x")?;
    expect_number(position, &position_path, "y")?;

    expect_number(element, path, "scale")?;
    expect_number(element, path, "rotation")?;
    Ok(())
}

fn validate_background(background: &Value) -> Result<(), ValidationError> {
    let background = expect_object(background, "/background")?;
    let tag = expect_string(background, "/background", "type")?;
    if BackgroundType::from_tag(tag).is_none() {
        return Err(ValidationError::UnknownVariant {
            path: "/background/type".to_string(),
            value: tag.to_string(),
        });
    }
    expect_number(background, "/background", "opacity")?;
    Ok(())
}

fn field<'a>(object: &'a Map<String, Value>, path: &str, key: &str) -> Result<&'a Value, ValidationError> {
    object.get(key).ok_or_else(|| ValidationError::Missing {
        path: format!("{path}/{key}"),
    })
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ValidationError> {
    value.as_object().ok_or_else(|| wrong_type(path, "object"))
}

fn expect_string<'a>(object: &'a Map<String, Value>, path: &str, key: &str) -> Result<&'a str, ValidationError> {
    field(object, path, key)?
        .as_str()
        .ok_or_else(|| wrong_type(&format!("{path}/{key}"), "string"))
}

fn expect_number(object: &Map<String, Value>, path: &str, key: &str) -> Result<f64, ValidationError> {
    field(object, path, key)?
        .as_f64()
        .ok_or_else(|| wrong_type(&format!("{path}/{key}"), "number"))
}

fn expect_string_array(object: &Map<String, Value>, key: &str) -> Result<(), ValidationError> {
    let path = format!("/{key}");
    let items = field(object, "", key)?
        .as_array()
        .ok_or_else(|| wrong_type(&path, "array"))?;
    for (index, item) in items.iter().enumerate() {
        if !item.is_string() {
            return Err(wrong_type(&format!("{path}/{index}"), "string"));
        }
    }
    Ok(())
}

fn wrong_type(path: &str, expected: &'static str) -> ValidationError {
    ValidationError::WrongType {
        path: if path.is_empty() { "/".to_string() } else { path.to_string() },
        expected,
    }
}
