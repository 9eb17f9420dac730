//! Meta-method parameter extraction.
//!
//! Meta methods take positional params. Extraction is lenient about
//! trailing elements (callers may append extras) but strict about the
//! documented positions: a shape mismatch answers `-32602` instead of
//! being coerced into an empty request.

use capstan_types::RpcError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extracts the single leading param.
pub(crate) fn one<T: DeserializeOwned>(params: &Value, expected: &str) -> Result<T, RpcError> {
    let first = params
        .as_array()
        .and_then(|array| array.first())
        .ok_or_else(|| RpcError::invalid_params(format!("expected params [{expected}]")))?;
    serde_json::from_value(first.clone())
        .map_err(|err| RpcError::invalid_params(format!("invalid {expected}: {err}")))
}

/// Extracts the two leading params.
pub(crate) fn two<A: DeserializeOwned, B: DeserializeOwned>(
    params: &Value,
    expected: &str,
) -> Result<(A, B), RpcError> {
    let array = params
        .as_array()
        .filter(|array| array.len() >= 2)
        .ok_or_else(|| RpcError::invalid_params(format!("expected params [{expected}]")))?;
    let a = serde_json::from_value(array[0].clone())
        .map_err(|err| RpcError::invalid_params(format!("invalid {expected}: {err}")))?;
    let b = serde_json::from_value(array[1].clone())
        .map_err(|err| RpcError::invalid_params(format!("invalid {expected}: {err}")))?;
    Ok((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use capstan_types::{DomainId, INVALID_PARAMS_CODE};
    use serde_json::json;

    #[test]
    fn one_extracts_leading_param() {
        let value: serde_json::Map<String, Value> =
            one(&json!([{"write": {}}]), "requested permissions").expect("valid params");
        assert!(value.contains_key("write"));
    }

    #[test]
    fn one_rejects_missing_params() {
        let err = one::<Value>(&json!([]), "requested permissions").unwrap_err();
        assert_eq!(err.code, INVALID_PARAMS_CODE);

        let err = one::<Value>(&Value::Null, "requested permissions").unwrap_err();
        assert_eq!(err.code, INVALID_PARAMS_CODE);
    }

    #[test]
    fn two_extracts_leading_pair() {
        let (domain, methods): (DomainId, Vec<String>) =
            two(&json!(["siteB", ["write"]]), "domain, permissions").expect("valid params");
        assert_eq!(domain.as_str(), "siteB");
        assert_eq!(methods, ["write"]);
    }

    #[test]
    fn two_rejects_short_params() {
        let err =
            two::<DomainId, Vec<String>>(&json!(["siteB"]), "domain, permissions").unwrap_err();
        assert_eq!(err.code, INVALID_PARAMS_CODE);
    }

    #[test]
    fn two_rejects_reserved_domain() {
        // The sentinel cannot be smuggled in as a grantee.
        let err = two::<DomainId, Vec<String>>(&json!(["user", ["write"]]), "domain, permissions")
            .unwrap_err();
        assert_eq!(err.code, INVALID_PARAMS_CODE);
    }

    #[test]
    fn trailing_extras_are_tolerated() {
        let (domain, _methods): (DomainId, Vec<String>) =
            two(&json!(["siteB", ["write"], "extra"]), "domain, permissions")
                .expect("extras ignored");
        assert_eq!(domain.as_str(), "siteB");
    }
}
