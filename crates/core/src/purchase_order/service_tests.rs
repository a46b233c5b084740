use super::*;
use crate::audit::AuditAction;
use crate::testing::InMemoryStore;
use budgetrack_shared::types::{CurrencyCode, MAX_AMOUNT};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn create_input(po_number: &str) -> CreatePurchaseOrder {
    CreatePurchaseOrder {
        po_number: po_number.to_string(),
        po_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        vendor: "Acme Corp".to_string(),
        currency: CurrencyCode::parse("USD").unwrap(),
        po_value: dec!(1000),
        exchange_rate: Some(dec!(80)),
        pr_number: Some("PR-77".to_string()),
        pr_date: None,
        pr_value: None,
        linked_line_items: Vec::new(),
    }
}

fn link(line_item_id: LineItemId, amount: Decimal) -> PoLineItemLink {
    PoLineItemLink {
        line_item_id,
        allocated_amount: amount,
    }
}

fn service() -> (Arc<InMemoryStore>, PurchaseOrderService<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::default());
    (Arc::clone(&store), PurchaseOrderService::new(store))
}

#[tokio::test]
async fn test_create_derives_common_value_and_lac() {
    let (store, service) = service();

    let po = service.create(create_input("PO-1"), UserId::new()).await.unwrap();

    assert_eq!(po.common_currency_value, dec!(80000));
    assert_eq!(po.value_in_lac, dec!(0.8));
    assert_eq!(po.status, PoStatus::Draft);

    let audit = store.audit_entries();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, AuditAction::Create);
    assert_eq!(audit[0].entity_id, po.id.into_inner());
    assert_eq!(audit[0].diff["poNumber"], "PO-1");
}

#[tokio::test]
async fn test_create_defaults_exchange_rate_to_one() {
    let (_, service) = service();
    let input = CreatePurchaseOrder {
        exchange_rate: None,
        po_value: dec!(250000),
        ..create_input("PO-1")
    };

    let po = service.create(input, UserId::new()).await.unwrap();

    assert_eq!(po.exchange_rate, Decimal::ONE);
    assert_eq!(po.common_currency_value, dec!(250000));
    assert_eq!(po.value_in_lac, dec!(2.5));
}

#[tokio::test]
async fn test_create_duplicate_po_number_conflicts() {
    let (_, service) = service();
    service.create(create_input("PO-1"), UserId::new()).await.unwrap();

    let err = service
        .create(create_input("PO-1"), UserId::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PurchaseOrderError::DuplicatePoNumber(_)));
}

#[tokio::test]
async fn test_create_validation() {
    let (store, service) = service();
    let item = store.add_line_item("LI-1");

    let cases = vec![
        CreatePurchaseOrder { po_number: "  ".to_string(), ..create_input("x") },
        CreatePurchaseOrder { vendor: String::new(), ..create_input("PO-2") },
        CreatePurchaseOrder { po_value: dec!(-1), ..create_input("PO-3") },
        CreatePurchaseOrder { exchange_rate: Some(Decimal::ZERO), ..create_input("PO-4") },
        CreatePurchaseOrder {
            linked_line_items: vec![link(item.id, dec!(-5))],
            ..create_input("PO-5")
        },
    ];

    for input in cases {
        let err = service.create(input, UserId::new()).await.unwrap_err();
        assert!(matches!(err, PurchaseOrderError::Validation(_)), "{err}");
    }
    assert!(store.audit_entries().is_empty());
}

#[tokio::test]
async fn test_create_rejects_duplicate_and_unknown_links() {
    let (store, service) = service();
    let item = store.add_line_item("LI-1");

    let duplicate = CreatePurchaseOrder {
        linked_line_items: vec![link(item.id, dec!(1)), link(item.id, dec!(2))],
        ..create_input("PO-1")
    };
    assert!(matches!(
        service.create(duplicate, UserId::new()).await,
        Err(PurchaseOrderError::DuplicateLineItem(_))
    ));

    let unknown = CreatePurchaseOrder {
        linked_line_items: vec![link(LineItemId::new(), dec!(1))],
        ..create_input("PO-1")
    };
    assert!(matches!(
        service.create(unknown, UserId::new()).await,
        Err(PurchaseOrderError::UnknownLineItems(_))
    ));
}

#[tokio::test]
async fn test_update_rederives_from_stored_rate() {
    let (_, service) = service();
    let po = service.create(create_input("PO-1"), UserId::new()).await.unwrap();

    let update = UpdatePurchaseOrder {
        po_value: Some(dec!(2000)),
        ..UpdatePurchaseOrder::default()
    };
    let updated = service.update(po.id, update, UserId::new()).await.unwrap();

    assert_eq!(updated.exchange_rate, dec!(80));
    assert_eq!(updated.common_currency_value, dec!(160000));
    assert_eq!(updated.value_in_lac, dec!(1.6));
}

#[tokio::test]
async fn test_update_replaces_links_and_records_payload() {
    let (store, service) = service();
    let a = store.add_line_item("LI-A");
    let b = store.add_line_item("LI-B");
    let c = store.add_line_item("LI-C");
    let po = service
        .create(
            CreatePurchaseOrder {
                linked_line_items: vec![link(a.id, dec!(100)), link(b.id, dec!(200))],
                ..create_input("PO-1")
            },
            UserId::new(),
        )
        .await
        .unwrap();

    let update = UpdatePurchaseOrder {
        linked_line_items: Some(vec![link(c.id, dec!(300))]),
        ..UpdatePurchaseOrder::default()
    };
    let updated = service.update(po.id, update, UserId::new()).await.unwrap();

    assert_eq!(updated.linked_line_items, vec![link(c.id, dec!(300))]);
    assert_eq!(service.get(po.id).await.unwrap().linked_line_items, vec![link(c.id, dec!(300))]);

    let audit = store.audit_entries();
    assert_eq!(audit.len(), 2);
    assert_eq!(audit[1].action, AuditAction::Update);
    let payload = audit[1].diff.as_object().unwrap();
    assert_eq!(payload.len(), 1);
    assert!(payload.contains_key("linkedLineItems"));
}

#[tokio::test]
async fn test_update_without_links_keeps_existing_links() {
    let (store, service) = service();
    let a = store.add_line_item("LI-A");
    let po = service
        .create(
            CreatePurchaseOrder {
                linked_line_items: vec![link(a.id, dec!(100))],
                ..create_input("PO-1")
            },
            UserId::new(),
        )
        .await
        .unwrap();

    let update = UpdatePurchaseOrder {
        status: Some(PoStatus::Approved),
        ..UpdatePurchaseOrder::default()
    };
    let updated = service.update(po.id, update, UserId::new()).await.unwrap();

    assert_eq!(updated.status, PoStatus::Approved);
    assert_eq!(updated.linked_line_items, vec![link(a.id, dec!(100))]);
}

#[tokio::test]
async fn test_create_rejects_converted_value_beyond_column_range() {
    let (store, service) = service();
    let input = CreatePurchaseOrder {
        po_value: MAX_AMOUNT,
        exchange_rate: Some(dec!(2)),
        ..create_input("PO-1")
    };

    let err = service.create(input, UserId::new()).await.unwrap_err();

    assert!(matches!(err, PurchaseOrderError::Validation(_)));
    assert!(store.purchase_orders().is_empty());
    assert!(store.audit_entries().is_empty());

    let huge = CreatePurchaseOrder {
        po_value: Decimal::MAX,
        exchange_rate: Some(dec!(2)),
        ..create_input("PO-2")
    };
    assert!(matches!(
        service.create(huge, UserId::new()).await,
        Err(PurchaseOrderError::Validation(_))
    ));
}

#[tokio::test]
async fn test_update_rejects_value_that_overflows_at_stored_rate() {
    let (store, service) = service();
    let po = service.create(create_input("PO-1"), UserId::new()).await.unwrap();

    let update = UpdatePurchaseOrder {
        po_value: Some(MAX_AMOUNT),
        ..UpdatePurchaseOrder::default()
    };
    let err = service.update(po.id, update, UserId::new()).await.unwrap_err();

    assert!(matches!(err, PurchaseOrderError::Validation(_)));
    assert_eq!(service.get(po.id).await.unwrap().po_value, dec!(1000));
    assert_eq!(store.audit_entries().len(), 1);
}

#[tokio::test]
async fn test_failed_link_write_leaves_no_po_and_no_audit() {
    let (store, service) = service();
    let item = store.add_line_item("LI-1");
    store.fail_writes_at(1);
    let input = CreatePurchaseOrder {
        linked_line_items: vec![link(item.id, dec!(100))],
        ..create_input("PO-1")
    };

    let err = service.create(input, UserId::new()).await.unwrap_err();

    assert!(matches!(err, PurchaseOrderError::Repository(_)));
    assert!(store.purchase_orders().is_empty());
    assert!(store.audit_entries().is_empty());
}

#[tokio::test]
async fn test_failed_link_replacement_keeps_previous_po_and_audit() {
    let (store, service) = service();
    let a = store.add_line_item("LI-A");
    let b = store.add_line_item("LI-B");
    let po = service
        .create(
            CreatePurchaseOrder {
                linked_line_items: vec![link(a.id, dec!(100))],
                ..create_input("PO-1")
            },
            UserId::new(),
        )
        .await
        .unwrap();
    store.fail_writes_at(1);

    let update = UpdatePurchaseOrder {
        status: Some(PoStatus::Approved),
        linked_line_items: Some(vec![link(b.id, dec!(300))]),
        ..UpdatePurchaseOrder::default()
    };
    let err = service.update(po.id, update, UserId::new()).await.unwrap_err();

    assert!(matches!(err, PurchaseOrderError::Repository(_)));
    let stored = service.get(po.id).await.unwrap();
    assert_eq!(stored.status, PoStatus::Draft);
    assert_eq!(stored.linked_line_items, vec![link(a.id, dec!(100))]);
    assert_eq!(store.audit_entries().len(), 1);
}

#[tokio::test]
async fn test_update_missing_po_is_not_found() {
    let (store, service) = service();
    let err = service
        .update(PurchaseOrderId::new(), UpdatePurchaseOrder::default(), UserId::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PurchaseOrderError::NotFound(_)));
    assert!(store.audit_entries().is_empty());
}

#[tokio::test]
async fn test_list_filters_and_orders_newest_first() {
    let (_, service) = service();
    let user = UserId::new();
    service.create(create_input("PO-100"), user).await.unwrap();
    service
        .create(
            CreatePurchaseOrder { pr_number: Some("PR-900".to_string()), ..create_input("PO-200") },
            user,
        )
        .await
        .unwrap();
    service
        .create(CreatePurchaseOrder { vendor: "Globex".to_string(), ..create_input("PO-300") }, user)
        .await
        .unwrap();

    let all = service
        .list(&PurchaseOrderFilter::default(), &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.data[0].po_number, "PO-300");

    let by_pr = PurchaseOrderFilter { search: Some("PR-9".to_string()), ..Default::default() };
    let page = service.list(&by_pr, &PageRequest::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.data[0].po_number, "PO-200");

    let case_sensitive = PurchaseOrderFilter { search: Some("po-".to_string()), ..Default::default() };
    assert_eq!(service.list(&case_sensitive, &PageRequest::default()).await.unwrap().total, 0);

    let by_vendor = PurchaseOrderFilter { vendor: Some("Globex".to_string()), ..Default::default() };
    assert_eq!(service.list(&by_vendor, &PageRequest::default()).await.unwrap().total, 1);

    let paged = service
        .list(&PurchaseOrderFilter::default(), &PageRequest::new(2, 2))
        .await
        .unwrap();
    assert_eq!(paged.data.len(), 1);
    assert_eq!(paged.data[0].po_number, "PO-100");
}
