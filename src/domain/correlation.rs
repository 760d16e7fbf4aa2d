//! Pairwise Pearson correlation over aligned return columns.

/// Pearson correlation of two equal-length samples.
///
/// `None` when there are fewer than 2 observations, the lengths differ, or
/// either sample has zero (or non-finite) variance.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let n = a.len();
    if n < 2 || b.len() != n {
        return None;
    }
    let mean_a = a.iter().sum::<f64>() / n as f64;
    let mean_b = b.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if !(var_a.is_finite() && var_b.is_finite()) || var_a <= 0.0 || var_b <= 0.0 {
        return None;
    }
    let corr = cov / (var_a.sqrt() * var_b.sqrt());
    corr.is_finite().then(|| corr.clamp(-1.0, 1.0))
}

/// Square, symmetric correlation matrix keyed by ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    tickers: Vec<String>,
    values: Vec<Option<f64>>,
}

impl CorrelationMatrix {
    /// Build from one return column per ticker. All columns must share rows.
    pub fn from_columns(tickers: Vec<String>, columns: &[Vec<f64>]) -> Self {
        let n = tickers.len();
        let mut values = vec![None; n * n];
        for i in 0..n {
            // Diagonal is 1 whenever the column has a usable variance.
            values[i * n + i] = pearson(&columns[i], &columns[i]).map(|_| 1.0);
            for j in (i + 1)..n {
                let corr = pearson(&columns[i], &columns[j]);
                values[i * n + j] = corr;
                values[j * n + i] = corr;
            }
        }
        Self { tickers, values }
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        let n = self.tickers.len();
        if i >= n || j >= n {
            return None;
        }
        self.values[i * n + j]
    }

    pub fn index_of(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }

    pub fn get_by_ticker(&self, a: &str, b: &str) -> Option<f64> {
        self.get(self.index_of(a)?, self.index_of(b)?)
    }

    /// False when the instrument's own return series has no variance.
    pub fn is_usable(&self, i: usize) -> bool {
        self.get(i, i).is_some()
    }

    /// Matrix restricted to `indices`, in that order.
    pub fn sub_matrix(&self, indices: &[usize]) -> Self {
        let m = indices.len();
        let mut values = Vec::with_capacity(m * m);
        for &i in indices {
            for &j in indices {
                values.push(self.get(i, j));
            }
        }
        Self {
            tickers: indices.iter().map(|&i| self.tickers[i].clone()).collect(),
            values,
        }
    }

    /// Row-major rows, for rendering.
    pub fn rows(&self) -> Vec<Vec<Option<f64>>> {
        let n = self.tickers.len();
        (0..n)
            .map(|i| self.values[i * n..(i + 1) * n].to_vec())
            .collect()
    }
}
