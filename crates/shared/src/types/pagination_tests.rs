use super::*;
use rstest::rstest;

#[test]
fn test_page_request_default() {
    let request = PageRequest::default();
    assert_eq!(request.page, 1);
    assert_eq!(request.limit, 20);
}

#[rstest]
#[case(1, 20, 0)]
#[case(2, 20, 20)]
#[case(3, 50, 100)]
#[case(0, 10, 0)]
fn test_page_request_offset(#[case] page: u32, #[case] limit: u32, #[case] expected: u64) {
    let request = PageRequest { page, limit };
    assert_eq!(request.offset(), expected);
}

#[test]
fn test_page_request_limit_is_clamped() {
    assert_eq!(PageRequest::new(1, 500).limit(), 100);
    assert_eq!(PageRequest::new(1, 0).limit(), 1);
    assert_eq!(PageRequest::new(0, 10).page, 1);
}

#[test]
fn test_page_response_new() {
    let data = vec![1, 2, 3];
    let response = PageResponse::new(data.clone(), &PageRequest::new(1, 10), 3);

    assert_eq!(response.data, data);
    assert_eq!(response.page, 1);
    assert_eq!(response.limit, 10);
    assert_eq!(response.total, 3);
    assert_eq!(response.total_pages(), 1);
}

#[test]
fn test_page_response_pagination() {
    // 25 items, 10 per page -> 3 pages
    let response: PageResponse<i32> = PageResponse::new(vec![], &PageRequest::new(1, 10), 25);
    assert_eq!(response.total_pages(), 3);
}

#[test]
fn test_page_response_empty() {
    let response: PageResponse<i32> = PageResponse::new(vec![], &PageRequest::new(1, 10), 0);
    assert_eq!(response.total_pages(), 1);
}

#[test]
fn test_page_response_serializes_flat() {
    let response = PageResponse::new(vec!["a"], &PageRequest::new(2, 5), 6);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"data": ["a"], "total": 6, "page": 2, "limit": 5})
    );
}
