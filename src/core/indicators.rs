//! Technical indicators overlaid on a NAV series.
//!
//! Every function returns one value per input point, `None` while the
//! indicator is still warming up:
//! - SMA(n): mean of the trailing n values, defined from point n-1
//! - EMA(n): alpha = 2/(n+1), seeded with the first value, defined from point n-1
//! - RSI(n): Wilder smoothing (alpha = 1/n) of gains and losses, the first
//!   delta counting as zero, defined from point n-1; 100 when there are no losses
//! - MACD(fast, slow, signal): EMA(fast) - EMA(slow), with the signal line an
//!   EMA of the defined part of the MACD line

use crate::core::error::NavError;
use crate::core::series::NavSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        out.push((i + 1 >= window).then(|| sum / window as f64));
    }
    out
}

pub fn ema(values: &[f64], span: usize) -> Vec<Option<f64>> {
    if span == 0 {
        return vec![None; values.len()];
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    smooth(values, alpha)
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i + 1 >= span).then_some(v))
        .collect()
}

pub fn rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || values.is_empty() {
        return vec![None; values.len()];
    }

    let mut gains = Vec::with_capacity(values.len());
    let mut losses = Vec::with_capacity(values.len());
    gains.push(0.0);
    losses.push(0.0);
    for pair in values.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let alpha = 1.0 / period as f64;
    let avg_gain = smooth(&gains, alpha);
    let avg_loss = smooth(&losses, alpha);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .enumerate()
        .map(|(i, (gain, loss))| {
            (i + 1 >= period).then(|| {
                if *loss == 0.0 {
                    100.0
                } else {
                    100.0 - 100.0 / (1.0 + gain / loss)
                }
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
}

pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);
    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let mut signal_line = vec![None; values.len()];
    if let Some(offset) = line.iter().position(Option::is_some) {
        let defined: Vec<f64> = line[offset..].iter().flatten().copied().collect();
        for (i, value) in ema(&defined, signal).into_iter().enumerate() {
            signal_line[offset + i] = value;
        }
    }

    Macd {
        line,
        signal: signal_line,
    }
}

/// Exponential smoothing seeded with the first value.
fn smooth(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut previous: Option<f64> = None;
    for value in values {
        let next = match previous {
            Some(prev) => alpha * value + (1.0 - alpha) * prev,
            None => *value,
        };
        out.push(next);
        previous = Some(next);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub sma_windows: Vec<usize>,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        IndicatorParams {
            sma_windows: vec![50, 100, 200],
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<(), NavError> {
        if let Some(window) = self.sma_windows.iter().find(|w| **w == 0) {
            return Err(NavError::invalid(format!(
                "SMA window must be positive, got {window}"
            )));
        }
        for (label, value) in [
            ("RSI period", self.rsi_period),
            ("MACD fast span", self.macd_fast),
            ("MACD slow span", self.macd_slow),
            ("MACD signal span", self.macd_signal),
        ] {
            if value == 0 {
                return Err(NavError::invalid(format!("{label} must be positive")));
            }
        }
        if self.macd_fast >= self.macd_slow {
            return Err(NavError::invalid(format!(
                "MACD fast span {} must be shorter than slow span {}",
                self.macd_fast, self.macd_slow
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmaSeries {
    pub window: usize,
    pub values: Vec<Option<f64>>,
}

/// A NAV series with every indicator aligned to its dates.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    pub dates: Vec<NaiveDate>,
    pub nav: Vec<f64>,
    pub sma: Vec<SmaSeries>,
    pub rsi: Vec<Option<f64>>,
    pub macd: Macd,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

pub fn compute(series: &NavSeries, params: &IndicatorParams) -> Result<IndicatorFrame, NavError> {
    params.validate()?;
    let nav = series.values();

    Ok(IndicatorFrame {
        dates: series.points.iter().map(|p| p.date).collect(),
        sma: params
            .sma_windows
            .iter()
            .map(|&window| SmaSeries {
                window,
                values: sma(&nav, window),
            })
            .collect(),
        rsi: rsi(&nav, params.rsi_period),
        macd: macd(&nav, params.macd_fast, params.macd_slow, params.macd_signal),
        nav,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::series::NavPoint;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value should be defined");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_sma_warm_up_and_values() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(out[..2], [None, None]);
        assert_close(out[2], 2.0);
        assert_close(out[3], 3.0);
        assert_close(out[4], 4.0);

        assert_eq!(sma(&[1.0, 2.0], 3), vec![None, None]);
        assert_eq!(sma(&[7.0], 1), vec![Some(7.0)]);
    }

    #[test]
    fn test_ema_seeded_with_first_value() {
        let out = ema(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(out[..2], [None, None]);
        assert_close(out[2], 2.25);
        assert_close(out[3], 3.125);
        assert_close(out[4], 4.0625);
    }

    #[test]
    fn test_rsi_small_period() {
        let out = rsi(&[1.0, 2.0, 1.0], 2);
        assert_eq!(out[0], None);
        assert_close(out[1], 100.0);
        assert_close(out[2], 100.0 - 100.0 / 1.5);
    }

    #[test]
    fn test_rsi_bounds_for_monotonic_series() {
        let rising: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let falling: Vec<f64> = rising.iter().rev().copied().collect();

        let up = rsi(&rising, 14);
        assert!(up[..13].iter().all(Option::is_none));
        assert!(up[13..].iter().all(|v| *v == Some(100.0)));

        let down = rsi(&falling, 14);
        assert!(down[13..].iter().all(|v| *v == Some(0.0)));
    }

    #[test]
    fn test_macd_warm_up() {
        let values: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let out = macd(&values, 12, 26, 9);

        assert!(out.line[..25].iter().all(Option::is_none));
        assert!(out.line[25..].iter().all(|v| v.is_some_and(|v| v > 0.0)));
        assert!(out.signal[..33].iter().all(Option::is_none));
        assert!(out.signal[33..].iter().all(Option::is_some));
    }

    #[test]
    fn test_macd_flat_series_is_zero() {
        let out = macd(&[50.0; 40], 12, 26, 9);
        assert_close(out.line[39], 0.0);
        assert_close(out.signal[39], 0.0);
    }

    #[test]
    fn test_macd_short_series_is_undefined() {
        let out = macd(&[1.0, 2.0, 3.0], 12, 26, 9);
        assert!(out.line.iter().all(Option::is_none));
        assert!(out.signal.iter().all(Option::is_none));
    }

    #[test]
    fn test_compute_aligns_with_series() {
        let series = NavSeries {
            name: "ABC One".to_string(),
            points: (1..=31)
                .map(|d| NavPoint {
                    date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
                    nav: d as f64,
                })
                .collect(),
        };
        let params = IndicatorParams {
            sma_windows: vec![5, 10],
            ..IndicatorParams::default()
        };

        let frame = compute(&series, &params).unwrap();
        assert_eq!(frame.len(), 31);
        assert_eq!(frame.sma.len(), 2);
        assert_eq!(frame.sma[0].window, 5);
        assert_close(frame.sma[0].values[4], 3.0);
        assert_eq!(frame.rsi.len(), 31);
        assert_eq!(frame.macd.line.len(), 31);
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let series = NavSeries {
            name: "ABC One".to_string(),
            points: Vec::new(),
        };
        for params in [
            IndicatorParams {
                sma_windows: vec![20, 0],
                ..IndicatorParams::default()
            },
            IndicatorParams {
                rsi_period: 0,
                ..IndicatorParams::default()
            },
            IndicatorParams {
                macd_fast: 26,
                macd_slow: 12,
                ..IndicatorParams::default()
            },
        ] {
            assert!(matches!(
                compute(&series, &params),
                Err(NavError::InvalidParameter(_))
            ));
        }
    }
}
