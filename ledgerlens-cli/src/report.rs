//! Plain-text rendering of an analysis for the `analyze` command.

use std::fmt::Write;

use ledgerlens_core::{LedgerLine, Presenter};

/// Chart points to list before eliding the middle of the series.
const CHART_PREVIEW: usize = 6;

pub fn render(p: &Presenter<'_>) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_report(&mut out, p);
    out
}

fn write_report(out: &mut String, p: &Presenter<'_>) -> std::fmt::Result {
    let h = p.headline();
    writeln!(out, "Statement: {}", h.file_name)?;
    writeln!(out, "Transactions: {}", h.transaction_count)?;
    writeln!(out, "Total debits:  {}", h.total_debits)?;
    writeln!(out, "Total credits: {}", h.total_credits)?;
    let marker = if h.net_is_negative { " (deficit)" } else { "" };
    writeln!(out, "Net balance:   {}{marker}", h.net)?;

    let categories = p.categories();
    if !categories.is_empty() {
        writeln!(out)?;
        writeln!(out, "Spending by category")?;
        for c in &categories {
            writeln!(
                out,
                "  {}  {} ({} transactions)",
                c.name, c.total, c.transaction_count
            )?;
            for m in &c.merchants {
                writeln!(out, "    {}. {}  {}", m.rank, m.name, m.amount)?;
            }
        }
    }

    write_ledger(out, "Top expenses", &p.top_expenses())?;
    write_ledger(out, "Top revenues", &p.top_revenues())?;

    let points = p.chart_series();
    let total = points.len();
    if total > 0 {
        writeln!(out)?;
        writeln!(out, "Balance over time ({total} points)")?;
        for (i, pt) in points.enumerate() {
            if total > CHART_PREVIEW && i == CHART_PREVIEW / 2 {
                writeln!(out, "  ...")?;
            }
            if total > CHART_PREVIEW && i >= CHART_PREVIEW / 2 && i < total - CHART_PREVIEW / 2 {
                continue;
            }
            writeln!(
                out,
                "  {}  debits {}  credits {}",
                pt.date,
                p.money(pt.debits),
                p.money(pt.credits)
            )?;
        }
    }

    let hidden = p.hidden_documents();
    if hidden > 0 {
        writeln!(out)?;
        writeln!(
            out,
            "{} files processed; showing the first statement only ({hidden} not shown).",
            p.files_processed()
        )?;
    }
    Ok(())
}

fn write_ledger(out: &mut String, title: &str, lines: &[LedgerLine<'_>]) -> std::fmt::Result {
    if lines.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{title}")?;
    for l in lines {
        writeln!(out, "  {}. {}  {}  {}", l.rank, l.label, l.date, l.amount)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlens_core::{AnalysisResult, CurrencyFormat};

    const ONE_DOC: &str = r#"{
        "files_processed": 1,
        "results": [{
            "file_name": "juli.pdf",
            "transaction_count": 3,
            "total_debits": 1034.12,
            "total_credits": 3200.0,
            "top_expenses": [
                {"description": "Miete Juli", "amount": 950.0, "date": "2024-07-01"},
                {"description": "Kartenzahlung REWE Markt GmbH Filiale 4711 Berlin Prenzlauer Berg",
                 "amount": 84.12, "date": "2024-07-03"}
            ],
            "top_revenues": [
                {"description": "Gehalt ACME GmbH", "amount": 3200.0, "date": "2024-07-28"}
            ],
            "chart_data": [
                {"date": "2024-07-01", "debits": 950.0, "credits": 0.0}
            ],
            "spending_by_category": [{
                "category": "Card Payments (Kartenzahlung)",
                "total_amount": 84.12,
                "transaction_count": 1,
                "top_merchants": [{"name": "REWE", "amount": 84.12}]
            }]
        }]
    }"#;

    #[test]
    fn test_render_single_document() {
        let result: AnalysisResult = serde_json::from_str(ONE_DOC).unwrap();
        let fmt = CurrencyFormat::default();
        let p = Presenter::new(&result, &fmt).unwrap();
        let text = render(&p);

        assert!(text.contains("Statement: juli.pdf"));
        assert!(text.contains("Net balance:   €2.165,88\n"));
        assert!(text.contains("  Card Payments (Kartenzahlung)  €84,12 (1 transactions)"));
        assert!(text.contains("    1. REWE  €84,12"));
        assert!(text.contains("  1. Miete Juli  2024-07-01  €950,00"));
        assert!(
            text.contains("  2. Kartenzahlung REWE Markt GmbH Filiale 4711 Berlin ...  2024-07-03")
        );
        assert!(text.contains("Balance over time (1 points)"));
        assert!(!text.contains("not shown"));
    }

    #[test]
    fn test_render_elides_long_series_and_notes_hidden() {
        let mut result: AnalysisResult = serde_json::from_str(ONE_DOC).unwrap();
        let first = result.results[0].clone();
        let base = first.chart_data[0];
        result.results[0].chart_data = (0..10)
            .map(|i| ledgerlens_core::ChartPoint {
                date: base.date + chrono::Days::new(i),
                ..base
            })
            .collect();
        result.results.push(first);
        result.files_processed = 2;

        let fmt = CurrencyFormat::default();
        let p = Presenter::new(&result, &fmt).unwrap();
        let text = render(&p);

        assert!(text.contains("Balance over time (10 points)"));
        assert!(text.contains("  ...\n"));
        assert!(text.contains("2024-07-01"));
        assert!(text.contains("2024-07-10"));
        assert!(!text.contains("2024-07-05"));
        assert!(
            text.contains("2 files processed; showing the first statement only (1 not shown).")
        );
    }
}
