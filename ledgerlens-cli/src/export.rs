use anyhow::{Context, Result};
use ledgerlens_core::Presenter;
use serde::Serialize;
use std::io;
use std::path::Path;

/// One CSV row per chart point. Amounts are raw numbers, not locale strings.
#[derive(Debug, Serialize)]
struct ChartRow {
    date: String,
    debits: f64,
    credits: f64,
    net: f64,
}

pub fn write_chart_csv<W: io::Write>(p: &Presenter<'_>, w: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(w);
    let mut rows = 0;
    for pt in p.chart_series() {
        wtr.serialize(ChartRow {
            date: pt.date.format("%Y-%m-%d").to_string(),
            debits: pt.debits,
            credits: pt.credits,
            net: pt.credits - pt.debits,
        })?;
        rows += 1;
    }
    wtr.flush()?;
    Ok(rows)
}

pub fn export_chart_csv(p: &Presenter<'_>, path: &Path) -> Result<usize> {
    let f = std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    let rows = write_chart_csv(p, f).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), rows, "exported chart series");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlens_core::{AnalysisResult, CurrencyFormat};

    const BODY: &str = r#"{"files_processed": 1, "results": [{
        "file_name": "a.pdf", "transaction_count": 2,
        "total_debits": 40.0, "total_credits": 100.0,
        "chart_data": [
            {"date": "2024-05-02", "debits": 40.0, "credits": 0.0},
            {"date": "2024-05-30", "debits": 40.0, "credits": 100.0}
        ],
        "top_expenses": [], "top_revenues": [], "spending_by_category": []
    }]}"#;

    #[test]
    fn test_chart_csv_rows() {
        let result: AnalysisResult = serde_json::from_str(BODY).unwrap();
        let fmt = CurrencyFormat::default();
        let p = Presenter::new(&result, &fmt).unwrap();

        let mut buf = Vec::new();
        let rows = write_chart_csv(&p, &mut buf).unwrap();
        assert_eq!(rows, 2);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "date,debits,credits,net\n2024-05-02,40.0,0.0,-40.0\n2024-05-30,40.0,100.0,60.0\n"
        );
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.csv");
        let result: AnalysisResult = serde_json::from_str(BODY).unwrap();
        let fmt = CurrencyFormat::default();
        let p = Presenter::new(&result, &fmt).unwrap();

        assert_eq!(export_chart_csv(&p, &path).unwrap(), 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("date,debits,credits,net\n"));
    }
}
