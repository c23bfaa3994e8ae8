use super::*;
use serde_json::json;

#[test]
fn hex_round_trips_lowercase() {
    let c = Rgb8::parse("#FF8000").unwrap();
    assert_eq!(c, Rgb8::new(255, 128, 0));
    assert_eq!(c.to_hex(), "#ff8000");
    assert_eq!(Rgb8::parse("#0f0").unwrap(), Rgb8::new(0, 255, 0));
    assert_eq!(Rgb8::parse("#0000ff80").unwrap(), Rgb8::new(0, 0, 255));
}

#[test]
fn functional_notations() {
    assert_eq!(Rgb8::parse("rgb(10, 20, 30)").unwrap(), Rgb8::new(10, 20, 30));
    assert_eq!(Rgb8::parse("rgba(10 20 30 / 0.5)").unwrap(), Rgb8::new(10, 20, 30));
    assert_eq!(Rgb8::parse("hsl(0, 100%, 50%)").unwrap(), Rgb8::new(255, 0, 0));
    assert!(Rgb8::parse("papayawhip").is_err());
    assert!(Rgb8::parse("#12345").is_err());
}

#[test]
fn strict_hex_accepts_only_six_digits() {
    assert_eq!(Rgb8::from_hex6("#102030"), Some(Rgb8::new(16, 32, 48)));
    assert_eq!(Rgb8::from_hex6("#abc"), None);
    assert_eq!(Rgb8::from_hex6("red"), None);
    assert_eq!(Rgb8::new(0, 3, 255).to_hex(), "#0003ff");
}

#[test]
fn deserializes_string_object_and_array() {
    let c: Rgb8 = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Rgb8::new(255, 0, 0));

    let c: Rgb8 = serde_json::from_value(json!({"r": 0.0, "g": 1.0, "b": 0.0})).unwrap();
    assert_eq!(c, Rgb8::new(0, 255, 0));

    let c: Rgb8 = serde_json::from_value(json!([0.0, 0.0, 1.0, 0.5])).unwrap();
    assert_eq!(c, Rgb8::new(0, 0, 255));

    assert!(serde_json::from_value::<Rgb8>(json!([1.0])).is_err());
}
