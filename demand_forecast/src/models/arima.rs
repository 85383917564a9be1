//! Autoregressive family: ARIMA(p,d,q) by conditional least squares
//!
//! Estimation is two-stage (Hannan-Rissanen): a long autoregression first
//! recovers innovation estimates, then the AR and MA coefficients are fit
//! jointly by ordinary least squares on lagged values and lagged
//! innovations. Forecast intervals come from the psi-weight cumulative
//! variance at the 80% level. The whole path is deterministic: identical
//! inputs give identical forecasts.

use crate::error::{ForecastError, Result};
use crate::models::ForecastOutput;

/// Standard normal quantile for the 80% central interval (z at 0.9)
const Z_80: f64 = 1.281_551_565_544_600_4;

/// Pivot threshold below which the normal equations are treated as singular
const SINGULAR_EPS: f64 = 1e-10;

/// ARIMA model specification (untrained)
#[derive(Debug, Clone)]
pub struct ArimaModel {
    p: usize,
    d: usize,
    q: usize,
}

impl ArimaModel {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Minimum observations before any estimation is attempted
    pub fn min_observations(&self) -> usize {
        self.p + self.d + self.q + 2
    }

    /// Fit the model on an ordered value sequence.
    ///
    /// Fails with `FittingFailed` when the series is too short for the
    /// regression stages or the normal equations are ill-conditioned; the
    /// caller owns any order-downgrade policy.
    pub fn fit(&self, values: &[f64]) -> Result<TrainedArima> {
        let (p, d, q) = (self.p, self.d, self.q);
        if values.len() < self.min_observations() {
            return Err(ForecastError::FittingFailed(format!(
                "Insufficient data for ARIMA({},{},{}): {} observations, need at least {}",
                p,
                d,
                q,
                values.len(),
                self.min_observations()
            )));
        }

        // Heads of each differencing level, needed to re-integrate forecasts
        let mut heads = Vec::with_capacity(d);
        let mut w = values.to_vec();
        for _ in 0..d {
            let last = *w.last().ok_or_else(|| {
                ForecastError::FittingFailed("Series exhausted by differencing".to_string())
            })?;
            heads.push(last);
            w = w.windows(2).map(|pair| pair[1] - pair[0]).collect();
        }
        let n_w = w.len();

        // A constant is identified only for undifferenced series, matching
        // the usual ARIMA convention of no drift when d > 0
        let with_intercept = d == 0;

        // Stage 1: long autoregression to estimate innovations
        let m = (p + q).max(1) + 2;
        if n_w < m + m + 2 {
            return Err(ForecastError::FittingFailed(format!(
                "Series too short for ARIMA({},{},{}) innovation stage ({} differenced points)",
                p, d, q, n_w
            )));
        }
        let mut rows = Vec::with_capacity(n_w - m);
        let mut ys = Vec::with_capacity(n_w - m);
        for t in m..n_w {
            let mut row: Vec<f64> = (1..=m).map(|lag| w[t - lag]).collect();
            if with_intercept {
                row.push(1.0);
            }
            rows.push(row);
            ys.push(w[t]);
        }
        let long_ar = solve_least_squares(&rows, &ys)?;

        let mut innovations = vec![0.0; n_w];
        for t in m..n_w {
            let mut pred: f64 = (1..=m).map(|lag| long_ar[lag - 1] * w[t - lag]).sum();
            if with_intercept {
                pred += long_ar[m];
            }
            innovations[t] = w[t] - pred;
        }

        // Stage 2: joint AR/MA regression on lagged values and innovations
        let t0 = p.max(m + q);
        let k = p + q + usize::from(with_intercept);
        if n_w < t0 + k + 2 {
            return Err(ForecastError::FittingFailed(format!(
                "Series too short for ARIMA({},{},{}) coefficient stage",
                p, d, q
            )));
        }
        let mut rows = Vec::with_capacity(n_w - t0);
        let mut ys = Vec::with_capacity(n_w - t0);
        for t in t0..n_w {
            let mut row: Vec<f64> = (1..=p).map(|lag| w[t - lag]).collect();
            row.extend((1..=q).map(|lag| innovations[t - lag]));
            if with_intercept {
                row.push(1.0);
            }
            rows.push(row);
            ys.push(w[t]);
        }
        let coeffs = solve_least_squares(&rows, &ys)?;

        let phi = coeffs[..p].to_vec();
        let theta = coeffs[p..p + q].to_vec();
        let intercept = if with_intercept { coeffs[p + q] } else { 0.0 };

        // Refresh residuals under the fitted ARMA and estimate sigma^2
        let mut resid = innovations;
        let mut sum_sq = 0.0;
        for t in t0..n_w {
            let mut pred = intercept;
            for (i, coeff) in phi.iter().enumerate() {
                pred += coeff * w[t - i - 1];
            }
            for (j, coeff) in theta.iter().enumerate() {
                pred += coeff * resid[t - j - 1];
            }
            resid[t] = w[t] - pred;
            sum_sq += resid[t] * resid[t];
        }
        let dof = (n_w - t0).saturating_sub(k).max(1);
        let sigma2 = sum_sq / dof as f64;

        if !sigma2.is_finite()
            || phi.iter().chain(theta.iter()).any(|c| !c.is_finite())
            || !intercept.is_finite()
        {
            return Err(ForecastError::FittingFailed(format!(
                "ARIMA({},{},{}) estimation produced non-finite coefficients",
                p, d, q
            )));
        }

        Ok(TrainedArima {
            p,
            d,
            q,
            phi,
            theta,
            intercept,
            sigma2,
            diffed: w,
            resid,
            heads,
        })
    }
}

/// Fitted ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArima {
    p: usize,
    d: usize,
    q: usize,
    phi: Vec<f64>,
    theta: Vec<f64>,
    intercept: f64,
    sigma2: f64,
    /// d-times differenced training series
    diffed: Vec<f64>,
    /// In-sample innovations aligned with `diffed`
    resid: Vec<f64>,
    /// Last value of the series at each differencing level, outermost first
    heads: Vec<f64>,
}

impl TrainedArima {
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// Forecast `horizon` steps ahead with 80% interval bounds
    pub fn forecast(&self, horizon: usize) -> Result<ForecastOutput> {
        let n_w = self.diffed.len();
        let mut w_fore = Vec::with_capacity(horizon);

        for step in 0..horizon {
            let mut pred = self.intercept;
            for (i, coeff) in self.phi.iter().enumerate() {
                let lag = i + 1;
                let value = if step >= lag {
                    w_fore[step - lag]
                } else {
                    self.diffed[n_w - (lag - step)]
                };
                pred += coeff * value;
            }
            for (j, coeff) in self.theta.iter().enumerate() {
                let lag = j + 1;
                // Future innovations have expectation zero
                if step < lag {
                    pred += coeff * self.resid[n_w - (lag - step)];
                }
            }
            w_fore.push(pred);
        }

        // Undo the differencing, innermost level last
        let mut point = w_fore;
        for level in (0..self.d).rev() {
            let mut running = self.heads[level];
            for value in point.iter_mut() {
                running += *value;
                *value = running;
            }
        }

        // Psi weights of the ARMA part, then integrated d times, drive the
        // cumulative forecast variance
        let mut psi = vec![0.0; horizon.max(1)];
        psi[0] = 1.0;
        for j in 1..psi.len() {
            let mut acc = if j <= self.q { self.theta[j - 1] } else { 0.0 };
            for i in 1..=self.p.min(j) {
                acc += self.phi[i - 1] * psi[j - i];
            }
            psi[j] = acc;
        }
        for _ in 0..self.d {
            for j in 1..psi.len() {
                psi[j] += psi[j - 1];
            }
        }

        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        let mut cumulative = 0.0;
        for (step, &value) in point.iter().enumerate() {
            cumulative += psi[step] * psi[step];
            let half = Z_80 * (self.sigma2 * cumulative).sqrt();
            lower.push(value - half);
            upper.push(value + half);
        }

        ForecastOutput::new(point, lower, upper)
    }
}

/// Solve an ordinary least squares problem via the normal equations.
///
/// Gaussian elimination with partial pivoting; a vanishing pivot signals an
/// ill-conditioned regressor matrix and fails the fit.
fn solve_least_squares(rows: &[Vec<f64>], ys: &[f64]) -> Result<Vec<f64>> {
    let k = rows.first().map(|r| r.len()).unwrap_or(0);
    if k == 0 || rows.len() < k {
        return Err(ForecastError::FittingFailed(
            "Not enough regression rows for least squares".to_string(),
        ));
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &y) in rows.iter().zip(ys.iter()) {
        for i in 0..k {
            xty[i] += row[i] * y;
            for j in 0..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    for col in 0..k {
        let pivot_row = (col..k)
            .max_by(|&a, &b| {
                xtx[a][col]
                    .abs()
                    .partial_cmp(&xtx[b][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if xtx[pivot_row][col].abs() < SINGULAR_EPS {
            return Err(ForecastError::FittingFailed(
                "Ill-conditioned series: singular normal equations".to_string(),
            ));
        }
        xtx.swap(col, pivot_row);
        xty.swap(col, pivot_row);

        for row in col + 1..k {
            let factor = xtx[row][col] / xtx[col][col];
            for j in col..k {
                xtx[row][j] -= factor * xtx[col][j];
            }
            xty[row] -= factor * xty[col];
        }
    }

    let mut solution = vec![0.0; k];
    for row in (0..k).rev() {
        let mut acc = xty[row];
        for j in row + 1..k {
            acc -= xtx[row][j] * solution[j];
        }
        solution[row] = acc / xtx[row][row];
    }

    Ok(solution)
}
