use crate::diagnostics::Diagnostic;
use crate::types::Dataset;

/// Summary of the spill-duration distribution, fitted once per dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationStats {
    pub mean: f64,
    pub std_dev: f64,
    pub normalized_min: f64,
    pub normalized_max: f64,
}

/// Turns spill durations into marker sizes: z-score first, then a clamped
/// linear rescale of the z-score range onto `size_range`.
#[derive(Debug, Clone)]
pub struct SpillNormalizer {
    stats: Option<NormalizationStats>,
    size_range: [f64; 2],
}

impl SpillNormalizer {
    /// Fits over every parsed duration in the dataset. Returns a
    /// `DegenerateStatistics` diagnostic when the durations have no spread.
    pub fn fit(dataset: &Dataset, size_range: [f64; 2]) -> (Self, Option<Diagnostic>) {
        let durations: Vec<f64> = dataset.durations().collect();
        let stats = fit_stats(&durations);

        let diagnostic = match stats {
            Some(_) => None,
            None => Some(Diagnostic::DegenerateStatistics {
                samples: durations.len(),
                size_px: midpoint(size_range),
            }),
        };

        (Self { stats, size_range }, diagnostic)
    }

    pub fn stats(&self) -> Option<&NormalizationStats> {
        self.stats.as_ref()
    }

    /// Marker size for one duration. Missing durations get the smallest
    /// size; without usable statistics every duration gets the midpoint.
    pub fn size_px(&self, duration: Option<f64>) -> f64 {
        let [out_min, out_max] = self.size_range;
        match (duration, &self.stats) {
            (None, _) => out_min,
            (Some(_), None) => midpoint(self.size_range),
            (Some(d), Some(stats)) => scale(
                standardize(d, stats.mean, stats.std_dev),
                [stats.normalized_min, stats.normalized_max],
                [out_min, out_max],
            ),
        }
    }
}

/// `None` when there is nothing to standardize against: no samples, or a
/// zero (or non-finite) standard deviation.
pub fn fit_stats(values: &[f64]) -> Option<NormalizationStats> {
    let mean = mean(values)?;
    let std_dev = population_std_dev(values, mean);
    if !(std_dev.is_finite() && std_dev > 0.0) {
        return None;
    }

    let (normalized_min, normalized_max) = values
        .iter()
        .map(|&v| standardize(v, mean, std_dev))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), z| (lo.min(z), hi.max(z)));

    Some(NormalizationStats {
        mean,
        std_dev,
        normalized_min,
        normalized_max,
    })
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Divides by N, not N - 1.
pub fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

pub fn standardize(value: f64, mean: f64, std_dev: f64) -> f64 {
    (value - mean) / std_dev
}

/// Clamp `value` into `input` and map it linearly onto `output`.
pub fn scale(value: f64, input: [f64; 2], output: [f64; 2]) -> f64 {
    let [in_min, in_max] = input;
    let [out_min, out_max] = output;
    let clamped = value.min(in_max).max(in_min);
    (clamped - in_min) / (in_max - in_min) * (out_max - out_min) + out_min
}

fn midpoint([lo, hi]: [f64; 2]) -> f64 {
    (lo + hi) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;

    const SIZES: [f64; 2] = [15.0, 35.0];

    fn dataset(durations: &[Option<f64>]) -> Dataset {
        Dataset::new(
            durations
                .iter()
                .enumerate()
                .map(|(i, d)| Record {
                    line: i as u64 + 2,
                    site_name: format!("site {}", i),
                    asset_type: "Storm tank".to_string(),
                    receiving_water: "River".to_string(),
                    spills_duration: *d,
                    spills_count: 1,
                    monitoring: Some(100.0),
                    lat: Some(51.0),
                    lng: Some(-2.0),
                })
                .collect(),
        )
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn population_statistics_divide_by_n() {
        let stats = fit_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!(approx(stats.mean, 5.0));
        assert!(approx(stats.std_dev, 2.0));
        assert!(approx(stats.normalized_min, -1.5));
        assert!(approx(stats.normalized_max, 2.0));
    }

    #[test]
    fn extremes_map_to_the_ends_of_the_size_range() {
        let data = dataset(&[Some(0.0), Some(3.0), Some(10.0), Some(400.0)]);
        let (normalizer, diagnostic) = SpillNormalizer::fit(&data, SIZES);

        assert!(diagnostic.is_none());
        assert!(approx(normalizer.size_px(Some(0.0)), 15.0));
        assert!(approx(normalizer.size_px(Some(400.0)), 35.0));
    }

    #[test]
    fn sizes_are_monotonic_in_duration() {
        let durations = [Some(5.0), Some(0.5), Some(120.0), Some(33.0), Some(33.0), Some(7.25)];
        let data = dataset(&durations);
        let (normalizer, _) = SpillNormalizer::fit(&data, SIZES);

        let mut pairs: Vec<(f64, f64)> = durations
            .iter()
            .map(|d| (d.unwrap(), normalizer.size_px(*d)))
            .collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

        for window in pairs.windows(2) {
            assert!(window[0].1 <= window[1].1);
        }
        assert!(pairs.iter().all(|(_, s)| (15.0..=35.0).contains(s)));
    }

    #[test]
    fn values_outside_the_fitted_range_are_clamped() {
        let data = dataset(&[Some(1.0), Some(2.0), Some(3.0)]);
        let (normalizer, _) = SpillNormalizer::fit(&data, SIZES);
        assert!(approx(normalizer.size_px(Some(-50.0)), 15.0));
        assert!(approx(normalizer.size_px(Some(1e6)), 35.0));
    }

    #[test]
    fn uniform_durations_fall_back_to_midpoint() {
        let data = dataset(&[Some(4.0), Some(4.0), Some(4.0)]);
        let (normalizer, diagnostic) = SpillNormalizer::fit(&data, SIZES);

        assert!(normalizer.stats().is_none());
        assert_eq!(
            diagnostic,
            Some(Diagnostic::DegenerateStatistics { samples: 3, size_px: 25.0 })
        );
        assert_eq!(normalizer.size_px(Some(4.0)), 25.0);
    }

    #[test]
    fn missing_durations_are_excluded_and_drawn_smallest() {
        let data = dataset(&[Some(1.0), None, Some(3.0)]);
        let (normalizer, diagnostic) = SpillNormalizer::fit(&data, SIZES);

        assert!(diagnostic.is_none());
        assert!(approx(normalizer.stats().unwrap().mean, 2.0));
        assert_eq!(normalizer.size_px(None), 15.0);
    }

    #[test]
    fn empty_dataset_is_degenerate() {
        let (_, diagnostic) = SpillNormalizer::fit(&Dataset::default(), SIZES);
        assert!(matches!(diagnostic, Some(Diagnostic::DegenerateStatistics { samples: 0, .. })));
    }

    #[test]
    fn scale_clamps_then_maps() {
        assert_eq!(scale(0.5, [0.0, 1.0], [15.0, 35.0]), 25.0);
        assert_eq!(scale(2.0, [0.0, 1.0], [15.0, 35.0]), 35.0);
        assert_eq!(scale(-1.0, [0.0, 1.0], [15.0, 35.0]), 15.0);
    }
}
