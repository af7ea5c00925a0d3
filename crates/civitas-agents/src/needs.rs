//! Per-agent motivational needs.
//!
//! Each need is a scalar in a declared range that drifts linearly every
//! simulated second. Values are clamped on every write. Urgency normalizes a
//! value to `[0, 1]` where 1 is worst: the normalized value for
//! bad-when-high needs, one minus it for bad-when-low needs.

use std::collections::BTreeMap;

use civitas_types::{NeedKind, NeedPolarity};

use crate::config::NeedSpec;

#[derive(Debug, Clone, PartialEq)]
struct NeedState {
    spec: NeedSpec,
    value: f64,
}

impl NeedState {
    fn span(&self) -> f64 {
        self.spec.max - self.spec.min
    }

    fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.value;
        }
        value.clamp(self.spec.min, self.spec.max)
    }

    fn urgency(&self) -> f64 {
        let span = self.span();
        let normalized = if span > 0.0 {
            ((self.value - self.spec.min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        match self.spec.polarity {
            NeedPolarity::BadWhenHigh => normalized,
            NeedPolarity::BadWhenLow => 1.0 - normalized,
        }
    }
}

/// The fixed set of needs of one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Needs {
    entries: Vec<NeedState>,
}

impl Needs {
    /// Instantiate needs from their declarations.
    ///
    /// Initial values are clamped into range. Ranges given with `min > max`
    /// are swapped; a repeated kind keeps its first declaration.
    pub fn new(specs: &[NeedSpec]) -> Self {
        let mut entries: Vec<NeedState> = Vec::with_capacity(specs.len());
        for spec in specs {
            if entries.iter().any(|e| e.spec.kind == spec.kind) {
                continue;
            }
            let mut spec = *spec;
            if spec.min > spec.max {
                core::mem::swap(&mut spec.min, &mut spec.max);
            }
            let mut state = NeedState {
                spec,
                value: spec.min,
            };
            state.value = state.clamp(spec.initial);
            entries.push(state);
        }
        Self { entries }
    }

    /// Advance every need by `rate * dt`, clamped to its range.
    ///
    /// Negative or non-finite `dt` is ignored.
    pub fn update(&mut self, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        for entry in &mut self.entries {
            let next = entry.value + entry.spec.rate * dt;
            entry.value = entry.clamp(next);
        }
    }

    /// The need with the highest urgency and that urgency.
    ///
    /// Ties go to the need declared first. `None` only when no needs are
    /// declared.
    pub fn get_most_critical(&self) -> Option<(NeedKind, f64)> {
        let mut best: Option<(NeedKind, f64)> = None;
        for entry in &self.entries {
            let urgency = entry.urgency();
            if best.is_none_or(|(_, u)| urgency > u) {
                best = Some((entry.spec.kind, urgency));
            }
        }
        best
    }

    /// Current value of `kind`.
    pub fn value(&self, kind: NeedKind) -> Option<f64> {
        self.find(kind).map(|e| e.value)
    }

    /// Current urgency of `kind` in `[0, 1]`.
    pub fn urgency(&self, kind: NeedKind) -> Option<f64> {
        self.find(kind).map(NeedState::urgency)
    }

    /// Overwrite the value of `kind`, clamped to its range.
    pub fn set(&mut self, kind: NeedKind, value: f64) {
        if let Some(entry) = self.find_mut(kind) {
            entry.value = entry.clamp(value);
        }
    }

    /// Move `kind` toward its good end by `fraction` of its range.
    ///
    /// Negative fractions make the need worse. The result is clamped.
    pub fn satisfy(&mut self, kind: NeedKind, fraction: f64) {
        if !fraction.is_finite() {
            return;
        }
        if let Some(entry) = self.find_mut(kind) {
            let amount = fraction * entry.span();
            let next = match entry.spec.polarity {
                NeedPolarity::BadWhenHigh => entry.value - amount,
                NeedPolarity::BadWhenLow => entry.value + amount,
            };
            entry.value = entry.clamp(next);
        }
    }

    /// Iterate over `(kind, value)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (NeedKind, f64)> + '_ {
        self.entries.iter().map(|e| (e.spec.kind, e.value))
    }

    /// Urgency of every need keyed by kind.
    pub fn urgencies(&self) -> BTreeMap<NeedKind, f64> {
        self.entries
            .iter()
            .map(|e| (e.spec.kind, e.urgency()))
            .collect()
    }

    /// Value of every need keyed by kind.
    pub fn values(&self) -> BTreeMap<NeedKind, f64> {
        self.iter().collect()
    }

    /// Number of declared needs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no needs are declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, kind: NeedKind) -> Option<&NeedState> {
        self.entries.iter().find(|e| e.spec.kind == kind)
    }

    fn find_mut(&mut self, kind: NeedKind) -> Option<&mut NeedState> {
        self.entries.iter_mut().find(|e| e.spec.kind == kind)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::NeedsConfig;

    fn defaults() -> Needs {
        Needs::new(&NeedsConfig::default().needs)
    }

    #[test]
    fn update_is_monotonic_until_clamped() {
        let mut needs = defaults();
        let mut last_hunger = needs.value(NeedKind::Hunger).unwrap();
        let mut last_energy = needs.value(NeedKind::Energy).unwrap();
        for _ in 0..2_000 {
            needs.update(1.0);
            let h = needs.value(NeedKind::Hunger).unwrap();
            let e = needs.value(NeedKind::Energy).unwrap();
            assert!(h >= last_hunger && h <= 100.0);
            assert!(e <= last_energy && e >= 0.0);
            last_hunger = h;
            last_energy = e;
        }
        assert!((last_hunger - 100.0).abs() < 1e-9);
        assert!(last_energy.abs() < 1e-9);
    }

    #[test]
    fn invalid_dt_is_ignored() {
        let mut needs = defaults();
        let before = needs.values();
        needs.update(-5.0);
        needs.update(f64::NAN);
        assert_eq!(needs.values(), before);
    }

    #[test]
    fn urgency_respects_polarity() {
        let mut needs = defaults();
        needs.set(NeedKind::Hunger, 75.0);
        needs.set(NeedKind::Energy, 0.25);
        assert!((needs.urgency(NeedKind::Hunger).unwrap() - 0.75).abs() < 1e-12);
        assert!((needs.urgency(NeedKind::Energy).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn most_critical_ties_go_to_first_declared() {
        let mut needs = defaults();
        needs.set(NeedKind::Hunger, 50.0);
        needs.set(NeedKind::Energy, 0.5);
        needs.set(NeedKind::Social, 0.5);
        needs.set(NeedKind::Fun, 0.5);
        assert_eq!(needs.get_most_critical().map(|(k, _)| k), Some(NeedKind::Hunger));
        needs.set(NeedKind::Fun, 0.1);
        assert_eq!(needs.get_most_critical().map(|(k, _)| k), Some(NeedKind::Fun));
    }

    #[test]
    fn satisfy_moves_toward_good_end_and_clamps() {
        let mut needs = defaults();
        needs.set(NeedKind::Hunger, 80.0);
        needs.satisfy(NeedKind::Hunger, 0.5);
        assert!((needs.value(NeedKind::Hunger).unwrap() - 30.0).abs() < 1e-9);
        needs.satisfy(NeedKind::Hunger, 5.0);
        assert!(needs.value(NeedKind::Hunger).unwrap().abs() < 1e-9);

        needs.set(NeedKind::Social, 0.9);
        needs.satisfy(NeedKind::Social, 0.15);
        assert!((needs.value(NeedKind::Social).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn initial_values_and_ranges_are_sanitized() {
        let specs = [
            NeedSpec::new(NeedKind::Fun, 1.0, 0.0, -0.1, NeedPolarity::BadWhenLow, 7.0),
            NeedSpec::new(NeedKind::Fun, 0.0, 100.0, 1.0, NeedPolarity::BadWhenHigh, 50.0),
        ];
        let needs = Needs::new(&specs);
        assert_eq!(needs.len(), 1);
        assert!((needs.value(NeedKind::Fun).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(needs.value(NeedKind::Hunger), None);
    }

    #[test]
    fn empty_needs_have_no_critical() {
        let needs = Needs::new(&[]);
        assert!(needs.is_empty());
        assert_eq!(needs.get_most_critical(), None);
    }
}
