use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencySummary {
    pub count: usize,
    pub min: Duration,
    pub max: Duration,
    pub avg: Duration,
}

/// Min, max and mean in one linear pass. Empty input yields zeros.
#[must_use]
pub fn summarize(samples: &[Duration]) -> LatencySummary {
    let mut iter = samples.iter().copied();
    let Some(first) = iter.next() else {
        return LatencySummary::default();
    };
    let mut min = first;
    let mut max = first;
    let mut total = first.as_nanos();
    for sample in iter {
        min = min.min(sample);
        max = max.max(sample);
        total = total.saturating_add(sample.as_nanos());
    }
    LatencySummary {
        count: samples.len(),
        min,
        max,
        avg: mean_of(total, samples.len()),
    }
}

#[must_use]
pub fn mean(samples: &[Duration]) -> Duration {
    let total = samples
        .iter()
        .fold(0u128, |acc, sample| acc.saturating_add(sample.as_nanos()));
    mean_of(total, samples.len())
}

fn mean_of(total_nanos: u128, count: usize) -> Duration {
    let Ok(count) = u128::try_from(count) else {
        return Duration::ZERO;
    };
    let avg = total_nanos.checked_div(count).unwrap_or(0);
    Duration::from_nanos(u64::try_from(avg).unwrap_or(u64::MAX))
}

/// Index of the `pct`-th percentile in a sorted sample of `len` values:
/// `floor(len * pct / 100)`, clamped to the last element.
#[must_use]
pub fn percentile_index(len: usize, pct: u8) -> Option<usize> {
    let last = len.checked_sub(1)?;
    let scaled = len.saturating_mul(usize::from(pct)).checked_div(100)?;
    Some(scaled.min(last))
}

/// Percentile of an already sorted sample; always one of the observed values.
#[must_use]
pub fn percentile(sorted: &[Duration], pct: u8) -> Duration {
    percentile_index(sorted.len(), pct)
        .and_then(|index| sorted.get(index).copied())
        .unwrap_or(Duration::ZERO)
}

/// `part / whole * 100`, or zero for an empty whole.
#[must_use]
pub fn rate_percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}
