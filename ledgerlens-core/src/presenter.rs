//! Display shaping for an analysis result.
//!
//! Everything here borrows the result and derives strings and series from it.
//! Upstream order is kept as-is; nothing is re-sorted or re-aggregated.

use std::borrow::Cow;
use std::iter::FusedIterator;
use std::slice;

use chrono::NaiveDate;

use crate::model::{AnalysisResult, ChartPoint, LedgerItem, PerDocumentSummary};
use crate::money::{CurrencyFormat, to_cents};

/// Descriptions longer than this many characters are shortened for display.
pub const LABEL_MAX_CHARS: usize = 50;
pub const ELLIPSIS: &str = "...";

/// Shorten `text` to `LABEL_MAX_CHARS` characters plus an ellipsis.
pub fn truncate_label(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(LABEL_MAX_CHARS) {
        None => Cow::Borrowed(text),
        Some((cut, _)) => Cow::Owned(format!("{}{}", &text[..cut], ELLIPSIS)),
    }
}

/// Totals card for the displayed document.
#[derive(Debug, Clone, PartialEq)]
pub struct Headline<'a> {
    pub file_name: &'a str,
    pub transaction_count: usize,
    pub total_debits: String,
    pub total_credits: String,
    pub net: String,
    pub net_is_negative: bool,
}

/// A numbered expense or revenue row.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerLine<'a> {
    pub rank: usize,
    pub label: Cow<'a, str>,
    pub date: NaiveDate,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryView<'a> {
    pub name: &'a str,
    pub total: String,
    pub transaction_count: usize,
    pub merchants: Vec<MerchantLine<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MerchantLine<'a> {
    pub rank: usize,
    pub name: &'a str,
    pub amount: String,
}

/// Derives display data from the first document of a result.
#[derive(Debug, Clone, Copy)]
pub struct Presenter<'a> {
    result: &'a AnalysisResult,
    doc: &'a PerDocumentSummary,
    format: &'a CurrencyFormat,
}

impl<'a> Presenter<'a> {
    /// `None` if the result carries no documents.
    pub fn new(result: &'a AnalysisResult, format: &'a CurrencyFormat) -> Option<Self> {
        let doc = result.primary()?;
        if result.results.len() > 1 {
            tracing::debug!(
                hidden = result.results.len() - 1,
                "only the first document summary is displayed"
            );
        }
        Some(Self {
            result,
            doc,
            format,
        })
    }

    pub fn document(&self) -> &'a PerDocumentSummary {
        self.doc
    }

    pub fn files_processed(&self) -> usize {
        self.result.files_processed
    }

    /// Summaries that were returned but are not displayed.
    pub fn hidden_documents(&self) -> usize {
        self.result.results.len().saturating_sub(1)
    }

    pub fn net_balance(&self) -> f64 {
        self.doc.total_credits - self.doc.total_debits
    }

    pub fn money(&self, amount: f64) -> String {
        self.format.format(amount)
    }

    pub fn headline(&self) -> Headline<'a> {
        let net = self.net_balance();
        Headline {
            file_name: &self.doc.file_name,
            transaction_count: self.doc.transaction_count,
            total_debits: self.money(self.doc.total_debits),
            total_credits: self.money(self.doc.total_credits),
            net: self.money(net),
            net_is_negative: to_cents(net) < 0,
        }
    }

    pub fn top_expenses(&self) -> Vec<LedgerLine<'a>> {
        self.ledger_lines(&self.doc.top_expenses)
    }

    pub fn top_revenues(&self) -> Vec<LedgerLine<'a>> {
        self.ledger_lines(&self.doc.top_revenues)
    }

    fn ledger_lines(&self, items: &'a [LedgerItem]) -> Vec<LedgerLine<'a>> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| LedgerLine {
                rank: i + 1,
                label: truncate_label(&item.description),
                date: item.date,
                amount: self.money(item.amount),
            })
            .collect()
    }

    pub fn categories(&self) -> Vec<CategoryView<'a>> {
        self.doc
            .spending_by_category
            .iter()
            .map(|c| CategoryView {
                name: &c.name,
                total: self.money(c.total_amount),
                transaction_count: c.transaction_count,
                merchants: c
                    .top_merchants
                    .iter()
                    .enumerate()
                    .map(|(i, m)| MerchantLine {
                        rank: i + 1,
                        name: &m.name,
                        amount: self.money(m.amount),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Cumulative points for the time-series chart, in upstream order.
    ///
    /// Each call starts a fresh pass over the same data.
    pub fn chart_series(&self) -> ChartSeries<'a> {
        ChartSeries {
            inner: self.doc.chart_data.iter(),
        }
    }
}

/// Lazy, single-pass iterator over chart points.
#[derive(Debug, Clone)]
pub struct ChartSeries<'a> {
    inner: slice::Iter<'a, ChartPoint>,
}

impl Iterator for ChartSeries<'_> {
    type Item = ChartPoint;

    fn next(&mut self) -> Option<ChartPoint> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ChartSeries<'_> {}

impl FusedIterator for ChartSeries<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{date, result_with, summary};
    use crate::money::Locale;

    #[test]
    fn test_truncate_boundary() {
        let exact = "a".repeat(50);
        assert_eq!(truncate_label(&exact), exact.as_str());
        assert!(matches!(truncate_label(&exact), Cow::Borrowed(_)));

        let long = "b".repeat(51);
        assert_eq!(truncate_label(&long), format!("{}...", "b".repeat(50)));

        assert_eq!(truncate_label(""), "");
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let umlauts = "Ü".repeat(60);
        let shown = truncate_label(&umlauts);
        assert_eq!(shown.chars().count(), 53);
        assert!(shown.starts_with(&"Ü".repeat(50)));
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_net_balance_sign() {
        let fmt = CurrencyFormat::default();

        let positive = result_with(vec![summary("a.pdf", 1034.12, 3200.0)]);
        let p = Presenter::new(&positive, &fmt).unwrap();
        assert_eq!(p.net_balance(), 3200.0 - 1034.12);
        assert_eq!(p.headline().net, "€2.165,88");
        assert!(!p.headline().net_is_negative);

        let negative = result_with(vec![summary("b.pdf", 500.25, 100.0)]);
        let p = Presenter::new(&negative, &fmt).unwrap();
        assert_eq!(p.net_balance(), 100.0 - 500.25);
        assert_eq!(p.headline().net, "€-400,25");
        assert!(p.headline().net_is_negative);
    }

    #[test]
    fn test_net_rounding_to_zero_is_not_negative() {
        let fmt = CurrencyFormat::default();
        let r = result_with(vec![summary("a.pdf", 10.004, 10.0)]);
        let p = Presenter::new(&r, &fmt).unwrap();
        assert!(p.net_balance() < 0.0);
        let h = p.headline();
        assert_eq!(h.net, "€0,00");
        assert!(!h.net_is_negative);
    }

    #[test]
    fn test_headline_uses_locale() {
        let fmt = CurrencyFormat::for_locale(Locale::EnUs);
        let r = result_with(vec![summary("juli.pdf", 1034.12, 3200.0)]);
        let h = Presenter::new(&r, &fmt).unwrap().headline();
        assert_eq!(h.file_name, "juli.pdf");
        assert_eq!(h.transaction_count, 42);
        assert_eq!(h.total_debits, "$1,034.12");
        assert_eq!(h.total_credits, "$3,200.00");
    }

    #[test]
    fn test_only_first_document_is_shown() {
        let fmt = CurrencyFormat::default();
        let r = result_with(vec![
            summary("first.pdf", 1.0, 2.0),
            summary("second.pdf", 3.0, 4.0),
            summary("third.pdf", 5.0, 6.0),
        ]);
        let p = Presenter::new(&r, &fmt).unwrap();
        assert_eq!(p.document().file_name, "first.pdf");
        assert_eq!(p.hidden_documents(), 2);
        assert_eq!(p.files_processed(), 3);
    }

    #[test]
    fn test_lines_keep_order_and_number_from_one() {
        let fmt = CurrencyFormat::default();
        let mut doc = summary("a.pdf", 1.0, 1.0);
        doc.top_expenses[1].description = "x".repeat(70);
        let r = result_with(vec![doc]);
        let p = Presenter::new(&r, &fmt).unwrap();

        let lines = p.top_expenses();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].rank, 1);
        assert_eq!(lines[0].label, "Miete Juli");
        assert_eq!(lines[0].amount, "€950,00");
        assert_eq!(lines[1].rank, 2);
        assert_eq!(lines[1].label.chars().count(), 53);

        // source untouched
        assert_eq!(r.results[0].top_expenses[1].description.len(), 70);
    }

    #[test]
    fn test_categories_and_merchants_in_given_order() {
        let fmt = CurrencyFormat::default();
        let r = result_with(vec![summary("a.pdf", 1.0, 1.0)]);
        let cats = Presenter::new(&r, &fmt).unwrap().categories();

        assert_eq!(cats[0].name, "Direct Debit (SEPA Lastschrift)");
        assert_eq!(cats[1].name, "Card Payments (Kartenzahlung)");
        assert_eq!(cats[1].transaction_count, 2);
        let merchants: Vec<(usize, &str)> =
            cats[1].merchants.iter().map(|m| (m.rank, m.name)).collect();
        assert_eq!(merchants, vec![(1, "REWE"), (2, "DM")]);
        assert_eq!(cats[1].merchants[1].amount, "€24,12");
    }

    #[test]
    fn test_chart_series_is_fresh_each_call() {
        let fmt = CurrencyFormat::default();
        let r = result_with(vec![summary("a.pdf", 1.0, 1.0)]);
        let p = Presenter::new(&r, &fmt).unwrap();

        let mut first = p.chart_series();
        assert_eq!(first.len(), 3);
        assert_eq!(first.next().map(|pt| pt.date), Some(date(2024, 7, 1)));
        let rest: Vec<_> = first.collect();
        assert_eq!(rest.len(), 2);

        let again: Vec<_> = p.chart_series().collect();
        assert_eq!(again, r.results[0].chart_data);
        assert_eq!(again[2].credits, 3200.0);
    }

    #[test]
    fn test_empty_result_has_no_presenter() {
        let fmt = CurrencyFormat::default();
        let r = result_with(vec![]);
        assert!(Presenter::new(&r, &fmt).is_none());
    }
}
