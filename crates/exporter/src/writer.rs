use crate::error::ExportError;
use analytics::{BenchmarkReport, EquityCurve, KpiReport, RollingMetrics};
use chrono::NaiveDate;
use core_types::{EquityPoint, TradeRecord, TradeType};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const KPIS_FILE: &str = "kpis.csv";
pub const BENCHMARK_KPIS_FILE: &str = "benchmark_kpis.csv";
pub const STRATEGY_CURVE_FILE: &str = "equity_strategy.csv";
pub const TRADES_FILE: &str = "trades.csv";

/// The file name for a benchmark's daily curve, e.g. `equity_btc.csv`.
pub fn benchmark_curve_file(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("equity_{}.csv", slug)
}

/// One row of the per-trade results table.
#[derive(Serialize)]
struct TradeRow<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    trade_type: &'a TradeType,
    stop_loss_pct: Decimal,
    date: NaiveDate,
    return_pct: Decimal,
    risk_adj_return_pct: Decimal,
    variation_index: Decimal,
    #[serde(rename = "return")]
    trade_return: f64,
    equity: f64,
    high_water_mark: f64,
    drawdown: f64,
    rolling_volatility: Option<f64>,
    rolling_sharpe: Option<f64>,
    rolling_min_drawdown: Option<f64>,
}

/// Writes the result tables of a run into one output directory.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    dir: PathBuf,
}

impl CsvExporter {
    /// Creates the output directory if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| ExportError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Saves the strategy KPI set as a single-row table.
    pub fn save_kpis(&self, report: &KpiReport) -> Result<PathBuf, ExportError> {
        self.write_rows(KPIS_FILE, std::iter::once(report))
    }

    /// Saves the comparison table, one row per asset in the given order.
    pub fn save_benchmark_kpis(&self, rows: &[BenchmarkReport]) -> Result<PathBuf, ExportError> {
        self.write_rows(BENCHMARK_KPIS_FILE, rows.iter())
    }

    /// Saves a `date,equity` curve under `file_name`.
    pub fn save_equity_curve(
        &self,
        file_name: &str,
        points: &[EquityPoint],
    ) -> Result<PathBuf, ExportError> {
        self.write_rows(file_name, points.iter())
    }

    /// Saves the per-trade table: the input columns followed by the
    /// equity, drawdown and rolling statistics at each trade.
    pub fn save_trade_results(
        &self,
        trades: &[TradeRecord],
        curve: &EquityCurve,
        rolling: &RollingMetrics,
    ) -> Result<PathBuf, ExportError> {
        if trades.len() != curve.len() || trades.len() != rolling.len() {
            return Err(ExportError::Inconsistent(format!(
                "{} trades, {} curve points, {} rolling points",
                trades.len(),
                curve.len(),
                rolling.len()
            )));
        }

        let returns = curve.returns();
        let rows = trades.iter().enumerate().map(|(i, trade)| TradeRow {
            id: &trade.id,
            trade_type: &trade.trade_type,
            stop_loss_pct: trade.stop_loss_pct,
            date: trade.date,
            return_pct: trade.return_pct,
            risk_adj_return_pct: trade.risk_adj_return_pct,
            variation_index: trade.variation_index,
            trade_return: returns[i],
            equity: curve.equity()[i],
            high_water_mark: curve.high_water_mark()[i],
            drawdown: curve.drawdown()[i],
            rolling_volatility: rolling.volatility[i],
            rolling_sharpe: rolling.sharpe[i],
            rolling_min_drawdown: rolling.min_drawdown[i],
        });
        self.write_rows(TRADES_FILE, rows)
    }

    fn write_rows<I, T>(&self, file_name: &str, rows: I) -> Result<PathBuf, ExportError>
    where
        I: IntoIterator<Item = T>,
        T: Serialize,
    {
        let path = self.dir.join(file_name);
        let mut writer = csv::Writer::from_path(&path)?;
        let mut count = 0usize;
        for row in rows {
            writer.serialize(row)?;
            count += 1;
        }
        writer.flush().map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), rows = count, "Table written.");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::AnalyticsEngine;
    use rust_decimal_macros::dec;

    fn trades() -> Vec<TradeRecord> {
        [(1, dec!(2), dec!(1.02)), (2, dec!(-5), dec!(0.95)), (3, dec!(10), dec!(1.10))]
            .into_iter()
            .map(|(d, pct, factor)| TradeRecord {
                id: format!("T{d}"),
                trade_type: if d == 2 { TradeType::Short } else { TradeType::Long },
                stop_loss_pct: dec!(1.5),
                date: NaiveDate::from_ymd_opt(2023, 1, d).unwrap(),
                return_pct: pct * dec!(2),
                risk_adj_return_pct: pct,
                variation_index: factor,
            })
            .collect()
    }

    fn read(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn creates_the_output_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(tmp.path().join("nested/out")).unwrap();
        assert!(exporter.dir().is_dir());
    }

    #[test]
    fn kpis_are_a_single_row_with_empty_undefined_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(tmp.path()).unwrap();

        let mut report = KpiReport::new();
        report.total_trades = 3;
        let lines = read(&exporter.save_kpis(&report).unwrap());

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("total_trades,winning_trades,"));
        assert!(lines[0].contains("profit_factor"));
        assert!(lines[0].contains("mc_prob_loss"));
        assert!(lines[1].starts_with("3,0,"));
        assert!(lines[1].contains(",,"));
    }

    #[test]
    fn benchmark_rows_keep_their_order() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(tmp.path()).unwrap();

        let mut strategy = KpiReport::new();
        strategy.total_return = 0.5;
        let rows = vec![
            BenchmarkReport::from_strategy("Strategy", &strategy),
            BenchmarkReport::from_strategy("BTC", &KpiReport::new()),
        ];
        let lines = read(&exporter.save_benchmark_kpis(&rows).unwrap());

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("name,total_return,cagr"));
        assert!(lines[1].starts_with("Strategy,0.5,"));
        assert!(lines[2].starts_with("BTC,"));
    }

    #[test]
    fn equity_curve_has_date_and_equity_columns() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(tmp.path()).unwrap();
        let points = vec![EquityPoint {
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            equity: 1.0,
        }];

        let path = exporter
            .save_equity_curve(&benchmark_curve_file("BTC"), &points)
            .unwrap();
        assert!(path.ends_with("equity_btc.csv"));
        assert_eq!(read(&path), vec!["date,equity", "2023-01-01,1.0"]);
    }

    #[test]
    fn trade_table_extends_the_input_columns() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(tmp.path()).unwrap();
        let trades = trades();
        let curve = EquityCurve::from_trades(&trades).unwrap();
        let rolling = AnalyticsEngine::default().rolling(&curve).unwrap();

        let lines = read(&exporter.save_trade_results(&trades, &curve, &rolling).unwrap());
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "id,type,stop_loss_pct,date,return_pct,risk_adj_return_pct,variation_index,\
             return,equity,high_water_mark,drawdown,rolling_volatility,rolling_sharpe,\
             rolling_min_drawdown"
        );
        assert!(lines[2].starts_with("T2,short,1.5,2023-01-02,-10,-5,0.95,"));
        assert!(lines[3].ends_with(",,,"));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(tmp.path()).unwrap();
        let trades = trades();
        let curve = EquityCurve::from_factors(&[1.01]).unwrap();
        let rolling = AnalyticsEngine::default().rolling(&curve).unwrap();

        assert!(matches!(
            exporter.save_trade_results(&trades, &curve, &rolling),
            Err(ExportError::Inconsistent(_))
        ));
    }
}
