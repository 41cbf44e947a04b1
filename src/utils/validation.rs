use crate::utils::error::{HaasError, Result};
use std::collections::HashSet;
use std::net::SocketAddr;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_socket_addr(field_name: &str, addr: &str) -> Result<SocketAddr> {
    if addr.trim().is_empty() {
        return Err(HaasError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: addr.to_string(),
            reason: "Address cannot be empty".to_string(),
        });
    }

    addr.parse::<SocketAddr>()
        .map_err(|e| HaasError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: addr.to_string(),
            reason: format!("Invalid socket address: {}", e),
        })
}

/// CORS origins must be `scheme://host[:port]` with no path.
pub fn validate_origin(field_name: &str, origin: &str) -> Result<()> {
    let rest = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"));

    match rest {
        Some(host) if !host.is_empty() && !host.contains('/') => Ok(()),
        Some(_) => Err(HaasError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: origin.to_string(),
            reason: "Origin must not be empty or contain a path".to_string(),
        }),
        None => Err(HaasError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: origin.to_string(),
            reason: "Origin must start with http:// or https://".to_string(),
        }),
    }
}

pub fn validate_unique_ids<'a, I>(field_name: &str, ids: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(HaasError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: id.to_string(),
                reason: "Duplicate id".to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| HaasError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(HaasError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Request-side counterpart of [`validate_non_empty_string`].
pub fn require_non_blank(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(HaasError::InvalidRequest {
            field: field_name.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(HaasError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_socket_addr() {
        assert!(validate_socket_addr("server.bind_addr", "127.0.0.1:5000").is_ok());
        assert!(validate_socket_addr("server.bind_addr", "[::1]:8080").is_ok());
        assert!(validate_socket_addr("server.bind_addr", "").is_err());
        assert!(validate_socket_addr("server.bind_addr", "localhost").is_err());
    }

    #[test]
    fn test_validate_origin() {
        assert!(validate_origin("server.allowed_origins", "http://localhost:5173").is_ok());
        assert!(validate_origin("server.allowed_origins", "https://haas.example.com").is_ok());
        assert!(validate_origin("server.allowed_origins", "localhost:5173").is_err());
        assert!(validate_origin("server.allowed_origins", "http://").is_err());
        assert!(validate_origin("server.allowed_origins", "http://a.com/path").is_err());
    }

    #[test]
    fn test_validate_unique_ids() {
        assert!(validate_unique_ids("hardware_sets", ["HWSet1", "HWSet2"]).is_ok());
        assert!(validate_unique_ids("hardware_sets", ["HWSet1", "HWSet1"]).is_err());
    }

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("inviteUser", "u2").is_ok());
        let err = require_non_blank("inviteUser", "   ").unwrap_err();
        assert!(matches!(err, HaasError::InvalidRequest { .. }));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("total_capacity", 10, 0, 1_000_000).is_ok());
        assert!(validate_range("total_capacity", -1, 0, 1_000_000).is_err());
    }
}
