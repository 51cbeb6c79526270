//! Rate suggestion service
//!
//! Assembles historical rate observations from documents on similar
//! projects and delegates the statistics to the shared rate engine.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use shared::{
    confidence_level, median_quantity, rate_recommendation, round2, weighted_average_rate,
    RateObservation, RateSource, RateSuggestion,
};

/// Observation caps per source, most reliable sources sampled last
const BOQ_SAMPLE_LIMIT: i64 = 100;
const VALUATION_SAMPLE_LIMIT: i64 = 50;
const FINAL_ACCOUNT_SAMPLE_LIMIT: i64 = 30;

/// Service for intelligent rate defaults
#[derive(Clone)]
pub struct RateSuggestionService {
    db: PgPool,
}

/// Query parameters for a rate suggestion
#[derive(Debug, Deserialize)]
pub struct RateSuggestionQuery {
    pub item_code: String,
    pub location: Option<String>,
    pub project_type: Option<String>,
}

impl RateSuggestionService {
    /// Create a new RateSuggestionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Suggested defaults for an item based on historical data from
    /// similar projects
    pub async fn intelligent_defaults(
        &self,
        query: RateSuggestionQuery,
    ) -> AppResult<RateSuggestion> {
        let similar_projects = self
            .find_similar_projects(query.location.as_deref(), query.project_type.as_deref())
            .await?;

        let observations = self
            .historical_rates(&query.item_code, &similar_projects)
            .await?;

        if observations.is_empty() {
            let standard_rate = self.standard_rate(&query.item_code).await?;
            return Ok(RateSuggestion::fallback(standard_rate));
        }

        let suggested_rate = weighted_average_rate(&observations);
        let typical_quantity = self
            .typical_quantity(&query.item_code, &similar_projects)
            .await?;
        let rates: Vec<Decimal> = observations.iter().map(|o| o.rate).collect();
        let confidence = confidence_level(&rates);
        let market_rate = self.current_market_rate(&query.item_code).await?;

        Ok(RateSuggestion {
            suggested_rate,
            market_rate,
            typical_quantity,
            confidence_level: confidence,
            confidence_samples: observations.len(),
            recommendation: rate_recommendation(suggested_rate, market_rate, confidence),
        })
    }

    /// Recent projects of comparable location and type. Only completed or
    /// ongoing projects from the last three years are considered relevant.
    async fn find_similar_projects(
        &self,
        location: Option<&str>,
        project_type: Option<&str>,
    ) -> AppResult<Vec<Uuid>> {
        let cutoff = Utc::now() - Duration::days(3 * 365);

        let rows = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM projects
            WHERE status IN ('completed', 'ongoing')
              AND created_at > $1
              AND ($2::text IS NULL OR location ILIKE '%' || $2 || '%')
              AND ($3::text IS NULL OR project_type = $3)
            ORDER BY created_at DESC
            LIMIT 10
            "#,
        )
        .bind(cutoff)
        .bind(location)
        .bind(project_type)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Rate observations for the item across BoQs, valuations and final
    /// accounts of the similar projects
    async fn historical_rates(
        &self,
        item_code: &str,
        projects: &[Uuid],
    ) -> AppResult<Vec<RateObservation>> {
        if projects.is_empty() {
            return Ok(Vec::new());
        }

        let mut observations = Vec::new();

        let boq_rates = sqlx::query_as::<_, (Decimal, chrono::DateTime<Utc>)>(
            r#"
            SELECT bi.rate, b.created_at
            FROM boq_items bi
            INNER JOIN boqs b ON b.id = bi.boq_id
            WHERE bi.item_code = $1 AND b.project_id = ANY($2) AND bi.rate > 0
            ORDER BY b.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(item_code)
        .bind(projects)
        .bind(BOQ_SAMPLE_LIMIT)
        .fetch_all(&self.db)
        .await?;
        observations.extend(boq_rates.into_iter().map(|(rate, created_at)| {
            observation(rate, RateSource::Boq, created_at.date_naive())
        }));

        let valuation_rates = sqlx::query_as::<_, (Decimal, chrono::DateTime<Utc>)>(
            r#"
            SELECT vi.rate, v.created_at
            FROM valuation_items vi
            INNER JOIN valuations v ON v.id = vi.valuation_id
            WHERE vi.item_code = $1 AND v.project_id = ANY($2) AND vi.rate > 0
            ORDER BY v.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(item_code)
        .bind(projects)
        .bind(VALUATION_SAMPLE_LIMIT)
        .fetch_all(&self.db)
        .await?;
        observations.extend(valuation_rates.into_iter().map(|(rate, created_at)| {
            observation(rate, RateSource::Valuation, created_at.date_naive())
        }));

        let final_rates = sqlx::query_as::<_, (Decimal, chrono::DateTime<Utc>)>(
            r#"
            SELECT fi.final_rate, fa.created_at
            FROM final_account_items fi
            INNER JOIN final_accounts fa ON fa.id = fi.final_account_id
            WHERE fi.item_code = $1 AND fa.project_id = ANY($2) AND fi.final_rate > 0
            ORDER BY fa.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(item_code)
        .bind(projects)
        .bind(FINAL_ACCOUNT_SAMPLE_LIMIT)
        .fetch_all(&self.db)
        .await?;
        observations.extend(final_rates.into_iter().map(|(rate, created_at)| {
            observation(rate, RateSource::FinalAccount, created_at.date_naive())
        }));

        Ok(observations)
    }

    /// Median quantity for the item across BoQs of the similar projects
    async fn typical_quantity(&self, item_code: &str, projects: &[Uuid]) -> AppResult<Decimal> {
        if projects.is_empty() {
            return Ok(Decimal::ZERO);
        }

        let quantities = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT bi.quantity
            FROM boq_items bi
            INNER JOIN boqs b ON b.id = bi.boq_id
            WHERE bi.item_code = $1 AND b.project_id = ANY($2) AND bi.quantity > 0
            "#,
        )
        .bind(item_code)
        .bind(projects)
        .fetch_all(&self.db)
        .await?;

        Ok(median_quantity(&quantities))
    }

    /// Market rate from tender quotes of the last 30 days, falling back to
    /// the item's standard rate
    async fn current_market_rate(&self, item_code: &str) -> AppResult<Decimal> {
        let cutoff = Utc::now() - Duration::days(30);

        let recent = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT qi.unit_rate
            FROM tender_quote_items qi
            INNER JOIN tender_quotes q ON q.id = qi.tender_quote_id
            WHERE qi.item_code = $1 AND q.created_at >= $2 AND qi.unit_rate > 0
            ORDER BY q.created_at DESC
            LIMIT 5
            "#,
        )
        .bind(item_code)
        .bind(cutoff)
        .fetch_all(&self.db)
        .await?;

        if !recent.is_empty() {
            let sum: Decimal = recent.iter().sum();
            return Ok(round2(sum / Decimal::from(recent.len() as u64)));
        }

        self.standard_rate(item_code).await
    }

    async fn standard_rate(&self, item_code: &str) -> AppResult<Decimal> {
        let rate = sqlx::query_scalar::<_, Decimal>(
            "SELECT standard_rate FROM construction_items WHERE item_code = $1",
        )
        .bind(item_code)
        .fetch_optional(&self.db)
        .await?;

        Ok(rate.unwrap_or_default())
    }
}

fn observation(rate: Decimal, source: RateSource, observed_on: NaiveDate) -> RateObservation {
    RateObservation {
        rate,
        source,
        observed_on,
    }
}
