//! Small helpers shared by the tool handlers and agent operations

use ethers::types::{Address, U256};
use ethers::utils::{format_units, parse_ether};
use serde::de::DeserializeOwned;
use serde_json::{from_value, Value};

use crate::agent::error::OperationError;
use crate::mcp::protocol::{error_codes, Response};

/// Extract a required argument from a tool's `arguments` object
pub fn get_required_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    req_id: &Value,
) -> Result<T, Response> {
    from_value(args.get(key).cloned().unwrap_or(Value::Null)).map_err(|_| {
        Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Missing or invalid required argument: '{}'", key),
        )
    })
}

/// Like [`get_required_arg`], but absent or `null` values yield `None`.
pub fn get_optional_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    req_id: &Value,
) -> Result<Option<T>, Response> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => get_required_arg(args, key, req_id).map(Some),
    }
}

/// Numeric arguments arrive as JSON numbers from some clients and as strings
/// from others; both are accepted.
pub fn get_numeric_arg(args: &Value, key: &str, req_id: &Value) -> Result<String, Response> {
    match args.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Missing or invalid required argument: '{}'", key),
        )),
    }
}

/// Same as [`get_numeric_arg`] for integer ids such as hub ids and chain ids.
pub fn get_u64_arg(args: &Value, key: &str, req_id: &Value) -> Result<u64, Response> {
    get_numeric_arg(args, key, req_id)?.parse::<u64>().map_err(|_| {
        Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Argument '{}' must be a non-negative integer", key),
        )
    })
}

pub fn parse_address(raw: &str) -> Result<Address, OperationError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|_| OperationError::InvalidArgument(format!("Invalid address: {}", raw)))
}

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

/// Scales a decimal FHE amount to 18-decimal base units.
pub fn parse_amount(raw: &str) -> Result<U256, OperationError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('-') {
        return Err(OperationError::InvalidArgument(format!(
            "Amount must be positive: {}",
            raw
        )));
    }
    let amount = parse_ether(trimmed)
        .map_err(|e| OperationError::InvalidArgument(format!("Invalid amount '{}': {}", raw, e)))?;
    if amount.is_zero() {
        return Err(OperationError::InvalidArgument(
            "Amount must be greater than zero".to_string(),
        ));
    }
    Ok(amount)
}

/// `value` formatted with `decimals`, without trailing zeros.
pub fn format_token_units(value: U256, decimals: u32) -> Result<String, OperationError> {
    let formatted = format_units(value, decimals)
        .map_err(|e| OperationError::Resolution(format!("Cannot format token amount: {}", e)))?;
    Ok(trim_fraction(&formatted))
}

/// 18-decimal FHE amount as display text, e.g. `"1.5 FHE"`.
pub fn format_fhe(value: U256) -> String {
    let formatted = format_token_units(value, 18).unwrap_or_else(|_| value.to_string());
    format!("{} FHE", formatted)
}

fn trim_fraction(formatted: &str) -> String {
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, fraction)
            }
        }
        None => formatted.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn amounts_scale_to_wei() {
        assert_eq!(parse_amount("5").unwrap(), U256::exp10(18) * 5);
        assert_eq!(parse_amount(" 0.5 ").unwrap(), U256::exp10(17) * 5);
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("0").is_err());
    }

    #[test]
    fn fhe_amounts_drop_trailing_zeros() {
        assert_eq!(format_fhe(U256::exp10(18) * 5), "5 FHE");
        assert_eq!(format_fhe(U256::exp10(17) * 15), "1.5 FHE");
        assert_eq!(format_fhe(U256::zero()), "0 FHE");
        assert_eq!(format_token_units(U256::from(1_234_500u64), 6).unwrap(), "1.2345");
    }

    #[test]
    fn numeric_args_accept_strings_and_numbers() {
        let id = json!(1);
        let args = json!({ "amount": "2.5", "hubId": 7, "bad": "x" });
        assert_eq!(get_numeric_arg(&args, "amount", &id).unwrap(), "2.5");
        assert_eq!(get_u64_arg(&args, "hubId", &id).unwrap(), 7);
        assert!(get_u64_arg(&args, "bad", &id).is_err());
        assert!(get_numeric_arg(&args, "missing", &id).is_err());
    }

    #[test]
    fn optional_args() {
        let id = json!(1);
        let args = json!({ "needSign": true, "name": null });
        assert_eq!(get_optional_arg::<bool>(&args, "needSign", &id).unwrap(), Some(true));
        assert_eq!(get_optional_arg::<String>(&args, "name", &id).unwrap(), None);
        assert!(get_optional_arg::<bool>(&json!({ "needSign": "yes" }), "needSign", &id).is_err());
    }
}
