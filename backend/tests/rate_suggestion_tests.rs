//! Tests for the rate suggestion engine

use chrono::NaiveDate;
use rust_decimal::Decimal;

use shared::{
    confidence_level, median_quantity, rate_recommendation, weighted_average_rate,
    RateObservation, RateSource, RateSuggestion,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn observed(rate: &str, source: RateSource, date: (i32, u32, u32)) -> RateObservation {
    RateObservation {
        rate: dec(rate),
        source,
        observed_on: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
    }
}

mod weighted_average {
    use super::*;

    #[test]
    fn empty_observations_average_to_zero() {
        assert_eq!(weighted_average_rate(&[]), Decimal::ZERO);
    }

    #[test]
    fn single_observation_is_its_own_average() {
        let observations = vec![observed("125", RateSource::Boq, (2025, 6, 1))];
        assert_eq!(weighted_average_rate(&observations), dec("125.00"));
    }

    #[test]
    fn identical_rates_average_to_themselves() {
        let observations = vec![
            observed("100", RateSource::Boq, (2025, 6, 1)),
            observed("100", RateSource::Valuation, (2025, 5, 1)),
            observed("100", RateSource::FinalAccount, (2025, 4, 1)),
        ];
        assert_eq!(weighted_average_rate(&observations), dec("100.00"));
    }

    #[test]
    fn recent_observations_carry_more_weight() {
        // Most recent first after sorting: 120 decays least
        let observations = vec![
            observed("80", RateSource::Boq, (2024, 1, 1)),
            observed("120", RateSource::Boq, (2025, 6, 1)),
        ];
        let average = weighted_average_rate(&observations);

        // Plain mean is 100; time decay pulls toward the newer rate
        assert!(average > dec("100"));
        assert!(average < dec("120"));
    }

    #[test]
    fn agreed_sources_outweigh_estimates() {
        // Same date: the final-account rate (weight 1.5) dominates the
        // BoQ estimate (weight 1.0)
        let observations = vec![
            observed("100", RateSource::Boq, (2025, 6, 1)),
            observed("200", RateSource::FinalAccount, (2025, 6, 1)),
        ];
        let average = weighted_average_rate(&observations);

        assert!(average > dec("150"));
    }
}

mod typical_quantity {
    use super::*;

    #[test]
    fn odd_count_takes_the_middle() {
        let quantities = vec![dec("5"), dec("1"), dec("9")];
        assert_eq!(median_quantity(&quantities), dec("5"));
    }

    #[test]
    fn even_count_averages_the_middle_pair() {
        let quantities = vec![dec("1"), dec("3"), dec("5"), dec("9")];
        assert_eq!(median_quantity(&quantities), dec("4.00"));
    }

    #[test]
    fn empty_list_is_zero() {
        assert_eq!(median_quantity(&[]), Decimal::ZERO);
    }
}

mod confidence {
    use super::*;

    #[test]
    fn fewer_than_two_samples_scores_zero() {
        assert_eq!(confidence_level(&[]), Decimal::ZERO);
        assert_eq!(confidence_level(&[dec("100")]), Decimal::ZERO);
    }

    #[test]
    fn consistent_rates_score_high() {
        let rates = vec![dec("100"), dec("100"), dec("100"), dec("100")];
        let confidence = confidence_level(&rates);

        // Zero variation plus the sample bonus
        assert!(confidence >= dec("100"));
    }

    #[test]
    fn scattered_rates_score_lower_than_consistent_ones() {
        let consistent = vec![dec("100"), dec("101"), dec("99"), dec("100")];
        let scattered = vec![dec("10"), dec("500"), dec("90"), dec("240")];

        assert!(confidence_level(&scattered) < confidence_level(&consistent));
    }

    #[test]
    fn confidence_never_exceeds_one_hundred() {
        let rates: Vec<Decimal> = std::iter::repeat(dec("55")).take(30).collect();
        assert!(confidence_level(&rates) <= dec("100"));
    }
}

mod recommendations {
    use super::*;

    #[test]
    fn low_confidence_asks_for_verification() {
        let text = rate_recommendation(dec("100"), dec("100"), dec("20"));
        assert!(text.contains("Low confidence"));
    }

    #[test]
    fn large_market_gap_flags_investigation() {
        let text = rate_recommendation(dec("100"), dec("130"), dec("80"));
        assert!(text.contains("Significant difference"));
    }

    #[test]
    fn moderate_market_gap_suggests_adjustment() {
        let text = rate_recommendation(dec("100"), dec("115"), dec("80"));
        assert!(text.contains("Moderate difference"));
    }

    #[test]
    fn close_market_alignment_is_reported() {
        let text = rate_recommendation(dec("100"), dec("105"), dec("80"));
        assert!(text.contains("aligns well"));
    }
}

mod fallback {
    use super::*;

    #[test]
    fn standard_rate_fallback() {
        let suggestion = RateSuggestion::fallback(dec("85"));
        assert_eq!(suggestion.suggested_rate, dec("85"));
        assert_eq!(suggestion.market_rate, dec("85"));
        assert_eq!(suggestion.typical_quantity, Decimal::ONE);
        assert_eq!(suggestion.confidence_samples, 0);
    }

    #[test]
    fn no_data_fallback() {
        let suggestion = RateSuggestion::fallback(Decimal::ZERO);
        assert_eq!(suggestion.suggested_rate, Decimal::ZERO);
        assert_eq!(suggestion.confidence_level, Decimal::ZERO);
        assert!(suggestion.recommendation.contains("manual entry"));
    }
}
