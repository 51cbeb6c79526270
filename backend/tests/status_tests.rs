//! Tests for the submission flag and status derivation

use shared::{derive_status, ApprovalStatus, DocStatus, DocumentStatus};

mod flag_mapping {
    use super::*;

    #[test]
    fn database_representation_round_trips() {
        for status in [DocStatus::Draft, DocStatus::Submitted, DocStatus::Cancelled] {
            assert_eq!(DocStatus::from_i16(status.as_i16()), Some(status));
        }
    }

    #[test]
    fn unknown_flag_values_are_rejected() {
        assert_eq!(DocStatus::from_i16(3), None);
        assert_eq!(DocStatus::from_i16(-1), None);
    }

    #[test]
    fn flag_zero_is_draft() {
        assert_eq!(DocStatus::from_i16(0), Some(DocStatus::Draft));
        assert!(DocStatus::Draft.is_draft());
    }

    #[test]
    fn flag_one_is_submitted() {
        assert_eq!(DocStatus::from_i16(1), Some(DocStatus::Submitted));
        assert!(DocStatus::Submitted.is_submitted());
    }

    #[test]
    fn flag_two_is_cancelled() {
        assert_eq!(DocStatus::from_i16(2), Some(DocStatus::Cancelled));
        assert!(DocStatus::Cancelled.is_cancelled());
    }
}

mod derivation {
    use super::*;

    #[test]
    fn draft_maps_to_draft() {
        assert_eq!(derive_status(DocStatus::Draft, None), DocumentStatus::Draft);
        assert_eq!(
            derive_status(DocStatus::Draft, Some(ApprovalStatus::Approved)),
            DocumentStatus::Draft
        );
    }

    #[test]
    fn submitted_without_approval_concept_maps_to_submitted() {
        assert_eq!(
            derive_status(DocStatus::Submitted, None),
            DocumentStatus::Submitted
        );
    }

    #[test]
    fn submitted_with_pending_approval_maps_to_submitted() {
        assert_eq!(
            derive_status(DocStatus::Submitted, Some(ApprovalStatus::Pending)),
            DocumentStatus::Submitted
        );
    }

    #[test]
    fn submitted_with_decision_maps_to_decision() {
        assert_eq!(
            derive_status(DocStatus::Submitted, Some(ApprovalStatus::Approved)),
            DocumentStatus::Approved
        );
        assert_eq!(
            derive_status(DocStatus::Submitted, Some(ApprovalStatus::Rejected)),
            DocumentStatus::Rejected
        );
    }

    #[test]
    fn cancelled_is_terminal_regardless_of_approval() {
        // An approval decision can never resurrect a cancelled document
        assert_eq!(
            derive_status(DocStatus::Cancelled, None),
            DocumentStatus::Cancelled
        );
        assert_eq!(
            derive_status(DocStatus::Cancelled, Some(ApprovalStatus::Approved)),
            DocumentStatus::Cancelled
        );
        assert_eq!(
            derive_status(DocStatus::Cancelled, Some(ApprovalStatus::Rejected)),
            DocumentStatus::Cancelled
        );
    }

    #[test]
    fn only_draft_documents_may_submit_and_only_submitted_may_cancel() {
        // The lifecycle guards used by every document service
        assert!(DocStatus::Draft.is_draft());
        assert!(!DocStatus::Submitted.is_draft());
        assert!(!DocStatus::Cancelled.is_draft());

        assert!(!DocStatus::Draft.is_submitted());
        assert!(DocStatus::Submitted.is_submitted());
        assert!(!DocStatus::Cancelled.is_submitted());
    }
}

mod labels {
    use super::*;

    #[test]
    fn status_labels_round_trip() {
        for status in [
            DocumentStatus::Draft,
            DocumentStatus::Submitted,
            DocumentStatus::Approved,
            DocumentStatus::Rejected,
            DocumentStatus::Cancelled,
            DocumentStatus::UnderReview,
            DocumentStatus::Agreed,
            DocumentStatus::Published,
            DocumentStatus::Awarded,
        ] {
            assert_eq!(DocumentStatus::from_str(status.as_str()), Some(status));
        }
    }
}
