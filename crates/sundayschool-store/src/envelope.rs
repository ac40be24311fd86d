//! Caller-facing result wrapper.
//!
//! The UI bridge turns every store call into `{ success, data }` or
//! `{ success: false, error, kind }` before handing it to the renderer.

use serde::Serialize;

use crate::error::{ErrorKind, Result, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            kind: None,
        }
    }

    pub fn err(error: &StoreError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            kind: Some(error.kind()),
        }
    }
}

impl<T> From<Result<T>> for Envelope<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_shape() {
        let envelope = Envelope::from(Ok::<_, StoreError>(7_i64));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "success": true, "data": 7 })
        );
    }

    #[test]
    fn error_shape() {
        let envelope: Envelope<i64> =
            Err(StoreError::Validation("Student name is required".into())).into();
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "success": false,
                "error": "Student name is required",
                "kind": "validation"
            })
        );

        let envelope: Envelope<()> = Envelope::err(&StoreError::NotFound { entity: "Photo" });
        assert_eq!(
            serde_json::to_value(&envelope).unwrap()["kind"],
            json!("notFound")
        );
    }
}
