//! Currency rate repository.

use chrono::NaiveDate;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;

use budgetrack_core::currency::{CurrencyError, ExchangeRate, RateStore};
use budgetrack_shared::types::CurrencyCode;

use super::now;
use crate::entities::currency_rates;

/// Currency rate repository.
#[derive(Debug, Clone)]
pub struct CurrencyRateRepository {
    db: DatabaseConnection,
}

impl CurrencyRateRepository {
    /// Creates a new currency rate repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl RateStore for CurrencyRateRepository {
    async fn latest_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        as_of: NaiveDate,
    ) -> Result<Option<ExchangeRate>, CurrencyError> {
        let model = currency_rates::Entity::find()
            .filter(currency_rates::Column::FromCurrency.eq(from.as_str()))
            .filter(currency_rates::Column::ToCurrency.eq(to.as_str()))
            .filter(currency_rates::Column::EffectiveDate.lte(as_of))
            .order_by_desc(currency_rates::Column::EffectiveDate)
            .one(&self.db)
            .await
            .map_err(|e| CurrencyError::repository(e.to_string()))?;

        model.map(to_exchange_rate).transpose()
    }

    async fn upsert_rate(&self, rate: ExchangeRate) -> Result<ExchangeRate, CurrencyError> {
        let timestamp = now();
        let model = currency_rates::ActiveModel {
            id: Set(Uuid::now_v7()),
            from_currency: Set(rate.from_currency.as_str().to_string()),
            to_currency: Set(rate.to_currency.as_str().to_string()),
            effective_date: Set(rate.effective_date),
            rate: Set(rate.rate),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
        };

        currency_rates::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    currency_rates::Column::FromCurrency,
                    currency_rates::Column::ToCurrency,
                    currency_rates::Column::EffectiveDate,
                ])
                .update_columns([currency_rates::Column::Rate, currency_rates::Column::UpdatedAt])
                .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| CurrencyError::repository(e.to_string()))?;

        info!(
            from = %rate.from_currency.as_str(),
            to = %rate.to_currency.as_str(),
            effective_date = %rate.effective_date,
            rate = %rate.rate,
            "Exchange rate stored"
        );
        Ok(rate)
    }
}

fn to_exchange_rate(model: currency_rates::Model) -> Result<ExchangeRate, CurrencyError> {
    let from = CurrencyCode::parse(&model.from_currency).map_err(CurrencyError::repository)?;
    let to = CurrencyCode::parse(&model.to_currency).map_err(CurrencyError::repository)?;
    Ok(ExchangeRate::new(from, to, model.rate, model.effective_date))
}
