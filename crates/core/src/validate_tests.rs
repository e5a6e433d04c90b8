use super::*;
use serde_json::json;

fn valid_event() -> CloudEvent {
    CloudEvent::new("e-1", "https://orders", "order.placed")
}

#[test]
fn well_formed_event_passes() {
    assert!(validate(&valid_event()).is_ok());
}

#[test]
fn missing_required_attributes_are_all_reported() {
    let mut event = valid_event();
    event.id = String::new();
    event.event_type = String::new();
    let err = validate(&event).unwrap_err();
    let attrs: Vec<&str> = err.violations.iter().map(|v| v.attribute.as_str()).collect();
    assert_eq!(attrs, vec!["id", "type"]);
}

#[test]
fn malformed_source_is_rejected() {
    let mut event = valid_event();
    event.source = "https://a b".to_string();
    let err = validate(&event).unwrap_err();
    assert_eq!(err.violations[0].attribute, "source");
}

#[test]
fn wrong_spec_version_is_rejected() {
    let mut event = valid_event();
    event.specversion = "0.3".to_string();
    let err = validate(&event).unwrap_err();
    assert_eq!(err.violations[0].attribute, "specversion");
    assert!(err.to_string().contains("specversion"));
}

#[test]
fn malformed_dataschema_is_rejected() {
    let mut event = valid_event();
    event.dataschema = Some(String::new());
    let err = validate(&event).unwrap_err();
    assert_eq!(err.violations[0].attribute, "dataschema");
}

#[test]
fn illegal_extension_name_is_rejected() {
    let mut event = valid_event();
    event.extensions.insert("Trace-Id".to_string(), json!("abc"));
    let err = validate(&event).unwrap_err();
    assert!(err.violations.iter().any(|v| v.attribute == "Trace-Id"));
}

#[test]
fn non_scalar_extension_value_is_rejected() {
    let event = valid_event().with_extension("meta", json!({"nested": true}));
    let err = validate(&event).unwrap_err();
    assert_eq!(err.violations[0].problem, "extension values must be scalar");
}

#[test]
fn scalar_extension_values_pass() {
    let event = valid_event()
        .with_extension("partition", 4)
        .with_extension("sampled", true)
        .with_extension("traceid", "abc");
    assert!(validate(&event).is_ok());
}
