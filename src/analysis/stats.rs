pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Share of `total` items that satisfied a predicate; `None` when there is nothing to divide.
pub fn fraction(hits: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(hits as f64 / total as f64)
    }
}

/// Median, minimum and maximum over the values that were available.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spread {
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Spread {
    pub fn of<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let available: Vec<f64> = values.into_iter().flatten().collect();
        Spread {
            median: median(&available),
            min: available.iter().copied().reduce(f64::min),
            max: available.iter().copied().reduce(f64::max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_mean_and_fraction() {
        assert_eq!(mean(&[1.0, 3.0]), Some(2.0));
        assert_eq!(mean(&[]), None);
        assert_eq!(fraction(3, 4), Some(0.75));
        assert_eq!(fraction(0, 0), None);
    }

    #[test]
    fn test_spread_skips_unavailable() {
        let spread = Spread::of([Some(0.5), None, Some(0.4), Some(0.6), None]);
        assert_eq!(spread.median, Some(0.5));
        assert_eq!(spread.min, Some(0.4));
        assert_eq!(spread.max, Some(0.6));
    }

    #[test]
    fn test_spread_all_unavailable() {
        assert_eq!(Spread::of([None, None]), Spread::default());
    }
}
