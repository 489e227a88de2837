use crate::Result;
use core::fmt::Write as _;
use ohno::bail;
use serde::Serialize;

/// Bin count used when the caller doesn't choose one.
pub const DEFAULT_BINS: usize = 65;

const BLOCKS: [char; 8] = [' ', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One equal-width bin, identified by its closed right boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub boundary: f64,
    pub size: usize,
}

/// Equal-width histogram over a fixed range.
///
/// Bins are left-open and right-closed, except the first which also holds the
/// lower bound of the range. Samples outside the range land in the nearest end bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    lower: f64,
    bins: Vec<HistogramBin>,
}

impl Histogram {
    /// Bin `samples` into `bins` equal-width bins spanning `[lo, hi]`.
    ///
    /// # Errors
    ///
    /// Returns an error when there are no samples, no bins, a non-finite sample, or the
    /// range is empty or unbounded.
    pub fn build(samples: &[f64], bins: usize, (lo, hi): (f64, f64)) -> Result<Self> {
        if samples.is_empty() {
            bail!("cannot build a histogram without samples");
        }
        if bins == 0 {
            bail!("a histogram needs at least one bin");
        }
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            bail!("invalid histogram range [{lo}, {hi}]");
        }
        if let Some(bad) = samples.iter().find(|x| !x.is_finite()) {
            bail!("cannot bin non-finite sample {bad}");
        }

        let width = (hi - lo) / as_f64(bins);
        let mut bins: Vec<_> = (1..=bins)
            .map(|i| HistogramBin {
                boundary: as_f64(i).mul_add(width, lo),
                size: 0,
            })
            .collect();

        // rounding must not leave the maximum outside the last bin
        if let Some(last) = bins.last_mut() {
            last.boundary = hi;
        }

        let last = bins.len() - 1;
        for &sample in samples {
            let index = bins.partition_point(|bin| bin.boundary < sample).min(last);
            bins[index].size += 1;
        }

        Ok(Self { lower: lo, bins })
    }

    /// Build a histogram over the default range for `samples`.
    ///
    /// # Errors
    ///
    /// Returns an error when there are no samples or no bins.
    pub fn with_default_range(samples: &[f64], bins: usize) -> Result<Self> {
        let Some(range) = default_range(samples.iter().copied()) else {
            bail!("cannot build a histogram without samples");
        };
        Self::build(samples, bins, range)
    }

    /// The range covered, from the lower bound to the last boundary.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        (self.lower, self.bins.last().map_or(self.lower, |bin| bin.boundary))
    }

    #[must_use]
    pub fn bins(&self) -> &[HistogramBin] {
        &self.bins
    }

    /// Number of samples binned.
    #[must_use]
    pub fn total(&self) -> usize {
        self.bins.iter().map(|bin| bin.size).sum()
    }

    /// Size of the fullest bin.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.bins.iter().map(|bin| bin.size).max().unwrap_or(0)
    }

    /// Render as one block character per bin, scaled to the fullest bin.
    ///
    /// Empty bins are blank and non-empty bins always show at least the lowest block.
    #[must_use]
    pub fn plot_unicode(&self) -> String {
        let max_size = self.max_size();
        let mut plot = String::with_capacity(self.bins.len() * 3);

        for bin in &self.bins {
            let level = if bin.size == 0 || max_size == 0 {
                0
            } else {
                (bin.size * (BLOCKS.len() - 1) / max_size).max(1)
            };
            let _ = plot.write_char(BLOCKS[level.min(BLOCKS.len() - 1)]);
        }

        plot
    }
}

/// The range `[min(0, smallest), largest]`, widened by one when it would be empty.
///
/// Returns `None` when there are no samples.
#[must_use]
pub fn default_range(samples: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = samples
        .into_iter()
        .fold(None, |acc: Option<(f64, f64)>, x| match acc {
            None => Some((x, x)),
            Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
        })?;

    let lo = lo.min(0.0);
    let hi = if hi > lo { hi } else { lo + 1.0 };
    Some((lo, hi))
}

#[expect(clippy::cast_precision_loss, reason = "bin counts are small")]
const fn as_f64(n: usize) -> f64 {
    n as f64
}
