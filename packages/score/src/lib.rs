#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Signal normalization and composite fragility index.
//!
//! Pure functions over the stage-one raw scores. The maxima are computed
//! once from the entire tract population, after the raw pass completes,
//! so every tract in a run shares the same scale; normalization never
//! looks at per-tract state beyond the raw values themselves.

use fragility_map_models::{CompositeWeights, NormalizedSignals, RawSignals, SignalMaxima};

/// Per-signal maxima across the whole population.
///
/// Effectively min-max normalization with the minimum assumed to be 0,
/// which holds for all three raw signals.
#[must_use]
pub fn maxima<'a, I>(raw: I) -> SignalMaxima
where
    I: IntoIterator<Item = &'a RawSignals>,
{
    raw.into_iter().fold(
        SignalMaxima {
            flood_exposure: 0.0,
            truck_dependency: 0.0,
            hub_proximity: 0.0,
        },
        |acc, signals| SignalMaxima {
            flood_exposure: acc.flood_exposure.max(signals.flood_exposure),
            truck_dependency: acc.truck_dependency.max(signals.truck_dependency),
            hub_proximity: acc.hub_proximity.max(signals.hub_proximity),
        },
    )
}

/// Rescales one tract's raw signals against the population maxima.
///
/// A maximum of 0 defines the normalized value as 0 for that signal, so
/// an all-zero population or a single degenerate tract never divides by
/// zero. Hub proximity is polarity-inverted: closer hubs mean higher
/// risk.
#[must_use]
pub fn normalize(raw: &RawSignals, maxima: &SignalMaxima) -> NormalizedSignals {
    NormalizedSignals {
        flood_exposure: ratio_or_zero(raw.flood_exposure, maxima.flood_exposure),
        truck_dependency: ratio_or_zero(raw.truck_dependency, maxima.truck_dependency),
        hub_proximity: if maxima.hub_proximity > 0.0 {
            1.0 - raw.hub_proximity / maxima.hub_proximity
        } else {
            0.0
        },
    }
}

/// Weighted composite of the three normalized signals.
///
/// With weights summing to 1.0 and normalized inputs in [0, 1] the
/// result stays in [0, 1]; the flood double-counting edge case is the
/// only way past the upper bound and is deliberately not clamped here.
#[must_use]
pub fn compose(normalized: &NormalizedSignals, weights: &CompositeWeights) -> f64 {
    weights.truck * normalized.truck_dependency
        + weights.flood * normalized.flood_exposure
        + weights.hub * normalized.hub_proximity
}

fn ratio_or_zero(value: f64, max: f64) -> f64 {
    if max > 0.0 { value / max } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(flood: f64, truck: f64, hub: f64) -> RawSignals {
        RawSignals {
            flood_exposure: flood,
            truck_dependency: truck,
            hub_proximity: hub,
        }
    }

    #[test]
    fn maxima_over_population() {
        let scores = vec![raw(0.2, 5.0, 1.0), raw(0.8, 1.0, 4.0), raw(0.5, 3.0, 2.0)];
        let m = maxima(&scores);
        assert!((m.flood_exposure - 0.8).abs() < 1e-12);
        assert!((m.truck_dependency - 5.0).abs() < 1e-12);
        assert!((m.hub_proximity - 4.0).abs() < 1e-12);
    }

    #[test]
    fn normalized_values_stay_in_unit_interval() {
        let scores = vec![raw(0.2, 5.0, 1.0), raw(0.8, 1.0, 4.0)];
        let m = maxima(&scores);
        for s in &scores {
            let n = normalize(s, &m);
            assert!((0.0..=1.0).contains(&n.flood_exposure));
            assert!((0.0..=1.0).contains(&n.truck_dependency));
            assert!((0.0..=1.0).contains(&n.hub_proximity));
        }
    }

    #[test]
    fn zero_maximum_normalizes_to_zero() {
        let scores = vec![raw(0.0, 0.0, 0.0), raw(0.0, 0.0, 0.0)];
        let m = maxima(&scores);
        let n = normalize(&scores[0], &m);
        assert!(n.flood_exposure.abs() < 1e-12);
        assert!(n.truck_dependency.abs() < 1e-12);
        assert!(n.hub_proximity.abs() < 1e-12);
    }

    #[test]
    fn hub_proximity_is_inverted() {
        let scores = vec![raw(0.0, 0.0, 1.0), raw(0.0, 0.0, 4.0)];
        let m = maxima(&scores);
        let near = normalize(&scores[0], &m);
        let far = normalize(&scores[1], &m);
        assert!((near.hub_proximity - 0.75).abs() < 1e-12);
        assert!(far.hub_proximity.abs() < 1e-12);
        assert!(near.hub_proximity > far.hub_proximity);
    }

    #[test]
    fn flood_double_count_can_exceed_unit_interval() {
        // Population maximum comes from a clean tract, but a tract with
        // overlapping flood polygons can carry a raw ratio above it.
        let m = SignalMaxima {
            flood_exposure: 1.0,
            truck_dependency: 1.0,
            hub_proximity: 1.0,
        };
        let n = normalize(&raw(1.4, 0.0, 0.0), &m);
        assert!(n.flood_exposure > 1.0);
    }

    #[test]
    fn composes_with_default_weights() {
        let n = NormalizedSignals {
            flood_exposure: 0.5,
            truck_dependency: 1.0,
            hub_proximity: 0.5,
        };
        let fragility = compose(&n, &CompositeWeights::default());
        assert!((fragility - 0.7).abs() < 1e-12);
    }

    #[test]
    fn composition_is_order_independent_and_deterministic() {
        let n = NormalizedSignals {
            flood_exposure: 0.31,
            truck_dependency: 0.77,
            hub_proximity: 0.12,
        };
        let w = CompositeWeights::default();
        assert_eq!(compose(&n, &w).to_bits(), compose(&n, &w).to_bits());
    }
}
