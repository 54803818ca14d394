use statrs::statistics::Statistics;

use crate::data::model::{CitySubset, Field};

const N: usize = Field::ALL.len();

/// Pairwise Pearson coefficients over [`Field::ALL`], in that order.
///
/// Undefined pairs (fewer than two rows, or a field without variance) hold
/// `0.0` and report `false` from [`is_defined`](Self::is_defined). The
/// diagonal is always `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    values: [[f64; N]; N],
    defined: [[bool; N]; N],
    pub sample_size: usize,
}

impl CorrelationMatrix {
    pub fn fields(&self) -> &'static [Field; N] {
        &Field::ALL
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn is_defined(&self, i: usize, j: usize) -> bool {
        self.defined[i][j]
    }

    /// Coefficient between two named fields.
    pub fn between(&self, a: Field, b: Field) -> f64 {
        self.values[index_of(a)][index_of(b)]
    }

    /// Whether no off-diagonal coefficient could be computed.
    pub fn is_degenerate(&self) -> bool {
        (0..N).all(|i| (0..N).all(|j| i == j || !self.defined[i][j]))
    }
}

fn index_of(field: Field) -> usize {
    Field::ALL
        .iter()
        .position(|&f| f == field)
        .unwrap_or_default()
}

/// Compute the correlation matrix for one city.
pub fn correlate(subset: &CitySubset<'_>) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = Field::ALL.iter().map(|&f| subset.column(f)).collect();
    let spreads: Vec<Option<f64>> = columns.iter().map(|c| spread(c)).collect();

    let mut values = [[0.0; N]; N];
    let mut defined = [[false; N]; N];

    for i in 0..N {
        values[i][i] = 1.0;
        defined[i][i] = spreads[i].is_some();
        for j in (i + 1)..N {
            if let (Some(si), Some(sj)) = (spreads[i], spreads[j]) {
                let cov = columns[i].iter().population_covariance(columns[j].iter());
                let r = (cov / (si * sj)).clamp(-1.0, 1.0);
                values[i][j] = r;
                values[j][i] = r;
                defined[i][j] = true;
                defined[j][i] = true;
            }
        }
    }

    if subset.len() < 2 {
        log::warn!(
            "{}: correlation needs at least 2 rows, got {}",
            subset.city,
            subset.len()
        );
    }

    CorrelationMatrix {
        values,
        defined,
        sample_size: subset.len(),
    }
}

/// Population standard deviation, or `None` when the column cannot take
/// part in a correlation. A column of identical values has no variance even
/// when rounding in the mean leaves a tiny residual.
fn spread(column: &[f64]) -> Option<f64> {
    let first = *column.first()?;
    if column.len() < 2 || column.iter().all(|&v| v == first) {
        return None;
    }
    let sd = column.iter().population_std_dev();
    (sd.is_finite() && sd > 0.0).then_some(sd)
}
