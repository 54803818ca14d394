use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::model::{CitySubset, Field, WeatherRecord};
use crate::error::AnalysisError;

/// Default share of rows held out for evaluation.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
/// Default shuffle seed, shared by every city.
pub const DEFAULT_SEED: u64 = 42;

// ---------------------------------------------------------------------------
// Split configuration
// ---------------------------------------------------------------------------

/// How a city subset is partitioned into training and test rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitConfig {
    /// Fraction of rows in the test partition, in `(0, 1)`.
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
        }
    }
}

impl SplitConfig {
    /// Test partition size for `n` rows: the fraction rounded up.
    pub fn test_len(&self, n: usize) -> usize {
        ((self.test_fraction * n as f64).ceil() as usize).min(n)
    }
}

/// Row indices of the two partitions, both in shuffled order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Seeded shuffle of `0..n`; the first `test_len(n)` indices form the test set.
pub fn train_test_split(n: usize, config: &SplitConfig) -> Split {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(config.test_len(n));
    Split {
        train,
        test: indices,
    }
}

// ---------------------------------------------------------------------------
// LinearModel – intercept + one coefficient per predictor
// ---------------------------------------------------------------------------

/// Ordinary least-squares fit of temperature on [`Field::PREDICTORS`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    /// Aligned with [`Field::PREDICTORS`].
    pub coefficients: [f64; 3],
}

impl LinearModel {
    /// Fit on the given rows. Centering on the means puts the intercept
    /// outside the solve; SVD gives the minimum-norm answer when the
    /// predictors are collinear or there are fewer rows than predictors.
    pub fn fit(rows: &[&WeatherRecord]) -> Result<Self, AnalysisError> {
        let n = rows.len();
        if n == 0 {
            return Err(AnalysisError::InsufficientData { needed: 1, got: 0 });
        }

        let x_means = Field::PREDICTORS.map(|f| mean(rows.iter().map(|r| f.value_of(r))));
        let y_mean = mean(rows.iter().map(|r| r.temperature_celsius));

        let x = DMatrix::from_fn(n, 3, |i, j| {
            Field::PREDICTORS[j].value_of(rows[i]) - x_means[j]
        });
        let y = DVector::from_iterator(n, rows.iter().map(|r| r.temperature_celsius - y_mean));

        let svd = x.svd(true, true);
        let cutoff = f64::EPSILON * n.max(3) as f64 * svd.singular_values.max();
        let beta = svd.solve(&y, cutoff).map_err(|reason| {
            log::warn!("Least-squares solve failed: {reason}");
            AnalysisError::InsufficientData { needed: 2, got: n }
        })?;

        let coefficients = [beta[0], beta[1], beta[2]];
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(x_means.iter())
                .map(|(b, m)| b * m)
                .sum::<f64>();

        Ok(LinearModel {
            intercept,
            coefficients,
        })
    }

    /// Predicted temperature for one record.
    pub fn predict(&self, record: &WeatherRecord) -> f64 {
        self.intercept
            + Field::PREDICTORS
                .iter()
                .zip(self.coefficients.iter())
                .map(|(f, b)| b * f.value_of(record))
                .sum::<f64>()
    }
}

// ---------------------------------------------------------------------------
// RegressionResult
// ---------------------------------------------------------------------------

/// Error metrics on the held-out partition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitMetrics {
    pub mae: f64,
    pub rmse: f64,
    /// `None` when the test actuals have no variance.
    pub r2: Option<f64>,
}

/// Outcome of fitting one city subset.
///
/// `actual[i]` and `predicted[i]` describe the same test record. An empty
/// result (no model, no predictions) means the subset was too small to split;
/// `skipped` then says why.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegressionResult {
    pub model: Option<LinearModel>,
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
    pub train_len: usize,
    pub metrics: Option<FitMetrics>,
    pub skipped: Option<AnalysisError>,
}

impl RegressionResult {
    fn insufficient(needed: usize, got: usize) -> Self {
        RegressionResult {
            skipped: Some(AnalysisError::InsufficientData { needed, got }),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.predicted.is_empty()
    }

    /// `(actual, predicted)` pairs for plotting.
    pub fn pairs(&self) -> Vec<[f64; 2]> {
        self.actual
            .iter()
            .zip(self.predicted.iter())
            .map(|(&a, &p)| [a, p])
            .collect()
    }
}

/// Split `subset`, fit on the training rows and predict the test rows.
pub fn analyze(subset: &CitySubset<'_>, config: &SplitConfig) -> RegressionResult {
    let n = subset.len();
    let split = train_test_split(n, config);

    if split.train.is_empty() || split.test.is_empty() {
        log::warn!(
            "{}: {n} rows cannot be split into train/test partitions",
            subset.city
        );
        return RegressionResult::insufficient(2, n);
    }

    let train: Vec<&WeatherRecord> = split.train.iter().map(|&i| subset.records[i]).collect();
    let test: Vec<&WeatherRecord> = split.test.iter().map(|&i| subset.records[i]).collect();

    let model = match LinearModel::fit(&train) {
        Ok(model) => model,
        Err(err) => {
            return RegressionResult {
                skipped: Some(err),
                ..Default::default()
            };
        }
    };

    let actual: Vec<f64> = test.iter().map(|r| r.temperature_celsius).collect();
    let predicted: Vec<f64> = test.iter().map(|r| model.predict(r)).collect();
    let metrics = fit_metrics(&actual, &predicted);

    log::debug!(
        "{}: fitted on {} rows, intercept {:.3}, coefficients {:?}",
        subset.city,
        train.len(),
        model.intercept,
        model.coefficients
    );

    RegressionResult {
        model: Some(model),
        actual,
        predicted,
        train_len: train.len(),
        metrics,
        skipped: None,
    }
}

fn fit_metrics(actual: &[f64], predicted: &[f64]) -> Option<FitMetrics> {
    if actual.is_empty() {
        return None;
    }
    let n = actual.len() as f64;
    let residuals: Vec<f64> = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| a - p)
        .collect();

    let mae = residuals.iter().map(|r| r.abs()).sum::<f64>() / n;
    let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
    let rmse = (ss_res / n).sqrt();

    let y_mean = mean(actual.iter().copied());
    let ss_tot: f64 = actual.iter().map(|a| (a - y_mean).powi(2)).sum();
    let r2 = (actual.len() >= 2 && ss_tot > 0.0).then(|| 1.0 - ss_res / ss_tot);

    Some(FitMetrics { mae, rmse, r2 })
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

#[cfg(test)]
mod tests {
    use assertables::*;

    use super::*;
    use crate::data::model::fixtures::record;

    /// Records whose temperature is an exact linear function of the predictors.
    fn linear_records(n: usize) -> Vec<WeatherRecord> {
        (0..n)
            .map(|i| {
                let mut r = record("Delhi", i as i64, 0.0);
                r.humidity = 30.0 + (i * 7 % 23) as f64;
                r.wind_kph = 4.0 + (i * 3 % 11) as f64;
                r.pressure_mb = 995.0 + (i * 5 % 17) as f64;
                r.temperature_celsius =
                    12.0 - 0.25 * r.humidity + 0.5 * r.wind_kph + 0.02 * r.pressure_mb;
                r
            })
            .collect()
    }

    fn subset<'a>(records: &'a [WeatherRecord]) -> CitySubset<'a> {
        CitySubset {
            city: "Delhi".to_string(),
            records: records.iter().collect(),
        }
    }

    #[test]
    fn split_sizes_follow_the_fraction() {
        let config = SplitConfig::default();
        for (n, expected_test) in [(50, 10), (10, 2), (11, 3), (4, 1), (1, 1), (0, 0)] {
            let split = train_test_split(n, &config);
            assert_eq!(split.test.len(), expected_test, "n = {n}");
            assert_eq!(split.train.len() + split.test.len(), n);
        }
    }

    #[test]
    fn split_is_a_seeded_permutation() {
        let config = SplitConfig::default();
        let a = train_test_split(40, &config);
        let b = train_test_split(40, &config);
        assert_eq!(a, b);

        let mut all: Vec<usize> = a.train.iter().chain(a.test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..40).collect::<Vec<_>>());

        let other = train_test_split(40, &SplitConfig { seed: 7, ..config });
        assert_ne!(a, other);
    }

    #[test]
    fn recovers_exact_linear_relationship() {
        let records = linear_records(60);
        let result = analyze(&subset(&records), &SplitConfig::default());

        let model = result.model.as_ref().unwrap();
        assert_in_delta!(model.coefficients[0], -0.25, 1e-6);
        assert_in_delta!(model.coefficients[1], 0.5, 1e-6);
        assert_in_delta!(model.coefficients[2], 0.02, 1e-6);
        assert_in_delta!(model.intercept, 12.0, 1e-3);

        for [actual, predicted] in result.pairs() {
            assert_in_delta!(actual, predicted, 1e-6);
        }
        let metrics = result.metrics.unwrap();
        assert_lt!(metrics.rmse, 1e-6);
        assert_in_delta!(metrics.r2.unwrap(), 1.0, 1e-9);
    }

    #[test]
    fn predictions_align_with_the_test_partition() {
        let records = linear_records(50);
        let sub = subset(&records);
        let config = SplitConfig::default();
        let result = analyze(&sub, &config);
        let split = train_test_split(sub.len(), &config);

        assert_eq!(result.predicted.len(), 10);
        assert_eq!(result.actual.len(), result.predicted.len());
        assert_eq!(result.train_len, 40);
        let expected: Vec<f64> = split
            .test
            .iter()
            .map(|&i| sub.records[i].temperature_celsius)
            .collect();
        assert_eq!(result.actual, expected);
    }

    #[test]
    fn rerun_is_bit_identical() {
        let records: Vec<WeatherRecord> = (0..37)
            .map(|i| record("Delhi", i, 25.0 + (i as f64 * 1.3).sin() * 4.0))
            .collect();
        let sub = subset(&records);
        let first = analyze(&sub, &SplitConfig::default());
        let second = analyze(&sub, &SplitConfig::default());

        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first.predicted), bits(&second.predicted));
        assert_eq!(first.model, second.model);
    }

    #[test]
    fn single_row_yields_empty_result() {
        let records = vec![record("Delhi", 0, 30.0)];
        let result = analyze(&subset(&records), &SplitConfig::default());
        assert!(result.is_empty());
        assert!(result.model.is_none());
        assert!(result.pairs().is_empty());
        assert_eq!(
            result.skipped,
            Some(AnalysisError::InsufficientData { needed: 2, got: 1 })
        );
    }

    #[test]
    fn empty_subset_yields_empty_result() {
        let result = analyze(&subset(&[]), &SplitConfig::default());
        assert!(result.is_empty());
        assert!(result.metrics.is_none());
    }

    #[test]
    fn constant_predictors_fall_back_to_the_mean() {
        let records: Vec<WeatherRecord> = (0..10)
            .map(|i| {
                let mut r = record("Delhi", 0, 20.0 + i as f64);
                r.last_updated += chrono::Duration::hours(i);
                r
            })
            .collect();
        let result = analyze(&subset(&records), &SplitConfig::default());
        let model = result.model.unwrap();
        assert_eq!(model.coefficients, [0.0, 0.0, 0.0]);
        let train_mean = {
            let split = train_test_split(10, &SplitConfig::default());
            split.train.iter().map(|&i| records[i].temperature_celsius).sum::<f64>()
                / split.train.len() as f64
        };
        assert_in_delta!(model.intercept, train_mean, 1e-9);
    }
}
