//! Analysis payload returned by the remote statement analyzer.
//!
//! Aggregates (totals, top items, cumulative series, categories) are computed
//! upstream. These types only carry them; nothing here re-sorts or re-sums.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whole response of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub files_processed: usize,
    pub results: Vec<PerDocumentSummary>,
    /// Free-form status line, e.g. "Analysis complete"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Analysis of a single submitted statement.
///
/// The service always sends every list, empty or not. A body missing one
/// is rejected rather than read as an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerDocumentSummary {
    pub file_name: String,
    pub transaction_count: usize,
    pub total_debits: f64,
    pub total_credits: f64,
    /// Sorted descending by amount upstream
    pub top_expenses: Vec<LedgerItem>,
    /// Sorted descending by amount upstream
    pub top_revenues: Vec<LedgerItem>,
    /// Running totals ordered by date
    pub chart_data: Vec<ChartPoint>,
    pub spending_by_category: Vec<Category>,
}

/// A single expense or revenue line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerItem {
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
}

/// Cumulative debits/credits as of `date`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub debits: f64,
    pub credits: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "category")]
    pub name: String,
    pub total_amount: f64,
    pub transaction_count: usize,
    pub top_merchants: Vec<Merchant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub name: String,
    pub amount: f64,
}

/// Reasons a structurally decodable payload is still rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadError {
    #[error("analysis result contains no documents")]
    Empty,

    #[error("files_processed is {declared} but {actual} results were returned")]
    CountMismatch { declared: usize, actual: usize },

    #[error("{field} must be a finite, non-negative amount (got {value})")]
    InvalidAmount { field: String, value: f64 },
}

impl AnalysisResult {
    /// Check the invariants the presenter relies on.
    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.results.is_empty() {
            return Err(PayloadError::Empty);
        }
        if self.files_processed != self.results.len() {
            return Err(PayloadError::CountMismatch {
                declared: self.files_processed,
                actual: self.results.len(),
            });
        }
        for (i, doc) in self.results.iter().enumerate() {
            doc.validate(i)?;
        }
        Ok(())
    }

    /// The summary that gets displayed. Only the first document is shown.
    pub fn primary(&self) -> Option<&PerDocumentSummary> {
        self.results.first()
    }
}

impl PerDocumentSummary {
    fn validate(&self, idx: usize) -> Result<(), PayloadError> {
        let at = |field: &str| format!("results[{idx}].{field}");

        check_amount(&at("total_debits"), self.total_debits)?;
        check_amount(&at("total_credits"), self.total_credits)?;

        for (i, item) in self.top_expenses.iter().enumerate() {
            check_amount(&at(&format!("top_expenses[{i}].amount")), item.amount)?;
        }
        for (i, item) in self.top_revenues.iter().enumerate() {
            check_amount(&at(&format!("top_revenues[{i}].amount")), item.amount)?;
        }
        for (i, p) in self.chart_data.iter().enumerate() {
            check_amount(&at(&format!("chart_data[{i}].debits")), p.debits)?;
            check_amount(&at(&format!("chart_data[{i}].credits")), p.credits)?;
        }
        for (i, c) in self.spending_by_category.iter().enumerate() {
            check_amount(
                &at(&format!("spending_by_category[{i}].total_amount")),
                c.total_amount,
            )?;
            for (j, m) in c.top_merchants.iter().enumerate() {
                check_amount(
                    &at(&format!("spending_by_category[{i}].top_merchants[{j}].amount")),
                    m.amount,
                )?;
            }
        }
        Ok(())
    }
}

fn check_amount(field: &str, value: f64) -> Result<(), PayloadError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PayloadError::InvalidAmount {
            field: field.to_string(),
            value,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn summary(name: &str, debits: f64, credits: f64) -> PerDocumentSummary {
        PerDocumentSummary {
            file_name: name.to_string(),
            transaction_count: 42,
            total_debits: debits,
            total_credits: credits,
            top_expenses: vec![
                LedgerItem {
                    description: "Miete Juli".to_string(),
                    amount: 950.0,
                    date: date(2024, 7, 1),
                },
                LedgerItem {
                    description: "Kartenzahlung REWE Markt GmbH".to_string(),
                    amount: 84.12,
                    date: date(2024, 7, 3),
                },
            ],
            top_revenues: vec![LedgerItem {
                description: "Gehalt ACME GmbH".to_string(),
                amount: 3200.0,
                date: date(2024, 7, 28),
            }],
            chart_data: vec![
                ChartPoint {
                    date: date(2024, 7, 1),
                    debits: 950.0,
                    credits: 0.0,
                },
                ChartPoint {
                    date: date(2024, 7, 3),
                    debits: 1034.12,
                    credits: 0.0,
                },
                ChartPoint {
                    date: date(2024, 7, 28),
                    debits: 1034.12,
                    credits: 3200.0,
                },
            ],
            spending_by_category: vec![
                Category {
                    name: "Direct Debit (SEPA Lastschrift)".to_string(),
                    total_amount: 950.0,
                    transaction_count: 1,
                    top_merchants: vec![Merchant {
                        name: "Hausverwaltung".to_string(),
                        amount: 950.0,
                    }],
                },
                Category {
                    name: "Card Payments (Kartenzahlung)".to_string(),
                    total_amount: 84.12,
                    transaction_count: 2,
                    top_merchants: vec![
                        Merchant {
                            name: "REWE".to_string(),
                            amount: 60.0,
                        },
                        Merchant {
                            name: "DM".to_string(),
                            amount: 24.12,
                        },
                    ],
                },
            ],
        }
    }

    pub fn result_with(docs: Vec<PerDocumentSummary>) -> AnalysisResult {
        AnalysisResult {
            files_processed: docs.len(),
            results: docs,
            message: Some("Analysis complete".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::fixtures::*;

    #[test]
    fn test_decode_service_payload() {
        let body = r#"{
            "message": "Analysis complete",
            "files_processed": 1,
            "results": [{
                "file_name": "juli.pdf",
                "transaction_count": 3,
                "total_debits": 1034.12,
                "total_credits": 3200.0,
                "top_expenses": [{"description": "Miete", "amount": 950.0, "date": "2024-07-01"}],
                "top_revenues": [],
                "chart_data": [{"date": "2024-07-01", "debits": 950.0, "credits": 0.0}],
                "spending_by_category": [{
                    "category": "Other Transactions",
                    "total_amount": 950.0,
                    "transaction_count": 1,
                    "top_merchants": [{"name": "Miete", "amount": 950.0}]
                }]
            }]
        }"#;

        let parsed: AnalysisResult = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.files_processed, 1);
        assert_eq!(parsed.message.as_deref(), Some("Analysis complete"));

        let doc = parsed.primary().unwrap();
        assert_eq!(doc.top_expenses[0].date, date(2024, 7, 1));
        assert_eq!(doc.spending_by_category[0].name, "Other Transactions");
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_bad_date_fails_to_decode() {
        let body = r#"{"files_processed": 1, "results": [{
            "file_name": "a.pdf", "transaction_count": 1,
            "total_debits": 1.0, "total_credits": 0.0,
            "top_expenses": [{"description": "x", "amount": 1.0, "date": "01.07."}],
            "top_revenues": [], "chart_data": [], "spending_by_category": []
        }]}"#;
        let err = serde_json::from_str::<AnalysisResult>(body).unwrap_err();
        assert!(err.to_string().contains("01.07."), "{err}");
    }

    #[test]
    fn test_missing_list_fails_to_decode() {
        let body = r#"{"files_processed": 1, "results": [{
            "file_name": "a.pdf", "transaction_count": 1,
            "total_debits": 1.0, "total_credits": 0.0,
            "top_expenses": [], "top_revenues": [], "spending_by_category": []
        }]}"#;
        let err = serde_json::from_str::<AnalysisResult>(body).unwrap_err();
        assert!(err.to_string().contains("missing field `chart_data`"), "{err}");

        let no_merchants = r#"{"files_processed": 1, "results": [{
            "file_name": "a.pdf", "transaction_count": 1,
            "total_debits": 1.0, "total_credits": 0.0,
            "top_expenses": [], "top_revenues": [], "chart_data": [],
            "spending_by_category": [
                {"category": "Other", "total_amount": 1.0, "transaction_count": 1}
            ]
        }]}"#;
        assert!(serde_json::from_str::<AnalysisResult>(no_merchants).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_amount() {
        let mut doc = summary("a.pdf", 10.0, 5.0);
        doc.top_revenues[0].amount = -3.0;
        let err = result_with(vec![doc]).validate().unwrap_err();
        match err {
            PayloadError::InvalidAmount { field, value } => {
                assert_eq!(field, "results[0].top_revenues[0].amount");
                assert_eq!(value, -3.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_nan_total() {
        let doc = summary("a.pdf", f64::NAN, 5.0);
        assert!(matches!(
            result_with(vec![doc]).validate(),
            Err(PayloadError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_validate_count_mismatch_and_empty() {
        let mut r = result_with(vec![summary("a.pdf", 1.0, 1.0)]);
        r.files_processed = 3;
        assert_eq!(
            r.validate(),
            Err(PayloadError::CountMismatch {
                declared: 3,
                actual: 1
            })
        );

        assert_eq!(result_with(vec![]).validate(), Err(PayloadError::Empty));
    }
}
