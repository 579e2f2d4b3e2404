use axum::Json;
use axum::extract::rejection::JsonRejection;

use tukang_types::api::RegisterRequest;
use tukang_types::models::Role;

use crate::error::{AppError, FieldErrors};

/// A registration that passed every field rule.
#[derive(Debug, Clone)]
pub struct Registration {
    pub phone_number: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    pub store: Option<StoreRegistration>,
}

#[derive(Debug, Clone)]
pub struct StoreRegistration {
    pub store_name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub working_hours: Option<String>,
}

/// E.164: a `+`, a non-zero leading digit, at most 15 digits overall.
pub fn is_e164(phone: &str) -> bool {
    let Some(digits) = phone.strip_prefix('+') else {
        return false;
    };
    (2..=15).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0')
}

fn check_len(errors: &mut FieldErrors, field: &'static str, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    if len < min {
        errors.insert(field, format!("min={min}"));
    } else if len > max {
        errors.insert(field, format!("max={max}"));
    }
}

/// Check a registration body. All failing fields are reported at once.
pub fn validate_registration(req: RegisterRequest) -> Result<Registration, AppError> {
    let mut errors = FieldErrors::new();

    if req.phone_number.is_empty() {
        errors.insert("phone_number", "required".into());
    } else if !is_e164(&req.phone_number) {
        errors.insert("phone_number", "e164".into());
    }
    check_len(&mut errors, "name", req.name.trim(), 2, 50);
    if req.password.chars().count() < 8 {
        errors.insert("password", "min=8".into());
    }

    let role = match req.role.parse::<Role>() {
        Ok(role) => Some(role),
        Err(_) => {
            errors.insert("role", "oneof=tukang store".into());
            None
        }
    };

    if let Some(store_name) = &req.store_name {
        check_len(&mut errors, "store_name", store_name.trim(), 2, 255);
    }
    if let Some(address) = &req.address {
        check_len(&mut errors, "address", address.trim(), 2, 500);
    }
    if let Some(hours) = &req.working_hours {
        check_len(&mut errors, "working_hours", hours.trim(), 5, 100);
    }
    if let Some(lat) = req.latitude {
        if !(-90.0..=90.0).contains(&lat) {
            errors.insert("latitude", "range=-90..90".into());
        }
    }
    if let Some(lng) = req.longitude {
        if !(-180.0..=180.0).contains(&lng) {
            errors.insert("longitude", "range=-180..180".into());
        }
    }

    if role == Some(Role::Store) {
        for (field, present) in [
            ("store_name", req.store_name.is_some()),
            ("address", req.address.is_some()),
            ("latitude", req.latitude.is_some()),
            ("longitude", req.longitude.is_some()),
        ] {
            if !present {
                errors.insert(field, "required_for_store".into());
            }
        }
    }

    let role = match role {
        Some(role) if errors.is_empty() => role,
        _ => return Err(AppError::InvalidFields(errors)),
    };

    let store = match (role, req.store_name, req.address, req.latitude, req.longitude) {
        (Role::Store, Some(store_name), Some(address), Some(latitude), Some(longitude)) => {
            Some(StoreRegistration {
                store_name: store_name.trim().to_string(),
                address: address.trim().to_string(),
                latitude,
                longitude,
                working_hours: req.working_hours.map(|h| h.trim().to_string()),
            })
        }
        _ => None,
    };

    Ok(Registration {
        phone_number: req.phone_number,
        name: req.name.trim().to_string(),
        password: req.password,
        role,
        store,
    })
}

/// Parse a positive integer id from a path segment.
pub fn parse_id(raw: &str, what: &'static str) -> Result<i64, AppError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::Validation(format!("invalid {what} ID"))),
    }
}

/// Unwrap a JSON body, turning a rejection into an enveloped 400.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Parse an optional `true`/`false` query flag.
pub fn parse_flag(raw: Option<&str>, name: &str) -> Result<Option<bool>, AppError> {
    match raw {
        None | Some("") => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(_) => Err(AppError::Validation(format!("invalid {name}; must be true or false"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: &str) -> RegisterRequest {
        RegisterRequest {
            phone_number: "+6281234567890".into(),
            name: "Slamet Riyadi".into(),
            password: "rahasia123".into(),
            role: role.into(),
            store_name: None,
            address: None,
            latitude: None,
            longitude: None,
            working_hours: None,
        }
    }

    fn field_errors(err: AppError) -> FieldErrors {
        match err {
            AppError::InvalidFields(fields) => fields,
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn e164_rules() {
        assert!(is_e164("+6281234567890"));
        assert!(is_e164("+14155552671"));
        assert!(!is_e164("081234567890"));
        assert!(!is_e164("+0812345"));
        assert!(!is_e164("+62-812"));
        assert!(!is_e164("+1234567890123456"));
    }

    #[test]
    fn tukang_registration_passes() {
        let reg = validate_registration(request("tukang")).unwrap();
        assert_eq!(reg.role, Role::Tukang);
        assert!(reg.store.is_none());
    }

    #[test]
    fn store_registration_requires_store_fields() {
        let fields = field_errors(validate_registration(request("store")).unwrap_err());
        assert_eq!(fields.get("store_name").map(String::as_str), Some("required_for_store"));
        assert!(fields.contains_key("address"));
        assert!(fields.contains_key("latitude"));
        assert!(fields.contains_key("longitude"));
    }

    #[test]
    fn store_registration_carries_store() {
        let mut req = request("store");
        req.store_name = Some("Bengkel Jaya".into());
        req.address = Some("Jl. Merdeka 1".into());
        req.latitude = Some(-7.968437);
        req.longitude = Some(112.596530);
        req.working_hours = Some("08:00-17:00".into());

        let reg = validate_registration(req).unwrap();
        let store = reg.store.unwrap();
        assert_eq!(store.store_name, "Bengkel Jaya");
        assert_eq!(store.working_hours.as_deref(), Some("08:00-17:00"));
    }

    #[test]
    fn every_bad_field_is_reported() {
        let mut req = request("admin");
        req.phone_number = "0812".into();
        req.name = "A".into();
        req.password = "short".into();

        let fields = field_errors(validate_registration(req).unwrap_err());
        assert_eq!(fields.get("phone_number").map(String::as_str), Some("e164"));
        assert_eq!(fields.get("name").map(String::as_str), Some("min=2"));
        assert_eq!(fields.get("password").map(String::as_str), Some("min=8"));
        assert_eq!(fields.get("role").map(String::as_str), Some("oneof=tukang store"));
    }

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(parse_id("12", "store").unwrap(), 12);
        assert!(parse_id("0", "store").is_err());
        assert!(parse_id("abc", "store").is_err());
    }

    #[test]
    fn flags_accept_only_booleans() {
        assert_eq!(parse_flag(None, "isHiring").unwrap(), None);
        assert_eq!(parse_flag(Some("true"), "isHiring").unwrap(), Some(true));
        assert_eq!(parse_flag(Some("false"), "isHiring").unwrap(), Some(false));
        assert!(parse_flag(Some("yes"), "isHiring").is_err());
    }
}
