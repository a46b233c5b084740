use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_typed_id_from_uuid() {
    let uuid = Uuid::new_v4();
    let id = LineItemId::from_uuid(uuid);
    assert_eq!(id.into_inner(), uuid);
}

#[test]
fn test_typed_id_default_is_unique() {
    assert_ne!(PurchaseOrderId::default(), PurchaseOrderId::default());
}

#[test]
fn test_typed_id_display_and_parse() {
    let uuid = Uuid::new_v4();
    let id = ActualId::from_uuid(uuid);
    assert_eq!(id.to_string(), uuid.to_string());
    assert_eq!(ActualId::from_str(&uuid.to_string()).unwrap(), id);
    assert!(ActualId::from_str("not-a-uuid").is_err());
}

#[test]
fn test_typed_id_serializes_transparently() {
    let uuid = Uuid::new_v4();
    let json = serde_json::to_string(&TowerId::from_uuid(uuid)).unwrap();
    assert_eq!(json, format!("\"{uuid}\""));
}
