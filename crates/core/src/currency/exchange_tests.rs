use super::*;
use proptest::prelude::*;
use rust_decimal_macros::dec;

fn code(s: &str) -> CurrencyCode {
    CurrencyCode::parse(s).unwrap()
}

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Duration::days(offset)
}

#[test]
fn test_validate_accepts_positive_rate() {
    let rate = ExchangeRate::new(code("USD"), code("INR"), dec!(83.2), day(0));
    assert!(rate.validate().is_ok());
}

#[test]
fn test_select_latest_ignores_other_pairs() {
    let rates = vec![
        ExchangeRate::new(code("USD"), code("EUR"), dec!(0.9), day(10)),
        ExchangeRate::new(code("USD"), code("INR"), dec!(83), day(5)),
    ];

    let chosen = select_latest(&rates, &code("USD"), &code("INR"), day(20)).unwrap();
    assert_eq!(chosen.rate, dec!(83));
}

proptest! {
    /// The chosen rate is the latest one on or before the reference date.
    #[test]
    fn prop_select_latest_never_picks_future_rate(
        offsets in proptest::collection::vec(0i64..365, 1..20),
        reference in 0i64..365,
    ) {
        let rates: Vec<ExchangeRate> = offsets
            .iter()
            .enumerate()
            .map(|(i, o)| ExchangeRate::new(code("USD"), code("INR"), Decimal::from(i + 1), day(*o)))
            .collect();

        let chosen = select_latest(&rates, &code("USD"), &code("INR"), day(reference));
        let best = offsets.iter().copied().filter(|o| *o <= reference).max();

        match (chosen, best) {
            (Some(rate), Some(best)) => {
                prop_assert!(rate.effective_date <= day(reference));
                prop_assert_eq!(rate.effective_date, day(best));
            }
            (None, None) => {}
            _ => prop_assert!(false, "selection disagrees with brute force"),
        }
    }
}
