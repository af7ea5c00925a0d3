//! Personality compatibility and the relationship change it produces.
//!
//! Compatibility is the inverse of the normalized personality distance over
//! openness, conscientiousness, extraversion, and agreeableness, plus a bonus
//! for agreeable pairs. A pair at compatibility 0.5 leaves the relationship
//! unchanged; above it they warm to each other, below it they cool.

use civitas_types::Personality;

use crate::config::SocialConfig;

/// Compatibility of two personalities in `[0, 1]`.
pub fn compatibility(a: &Personality, b: &Personality, config: &SocialConfig) -> f64 {
    let mean_agreeableness = (a.agreeableness + b.agreeableness) / 2.0;
    let raw = 1.0 - a.social_distance(b) + config.agreeableness_bonus * mean_agreeableness;
    if raw.is_nan() { 0.5 } else { raw.clamp(0.0, 1.0) }
}

/// Signed relationship change for one interaction at `compatibility`.
///
/// Ranges over `[-strength, strength]`.
pub fn relationship_delta(compatibility: f64, config: &SocialConfig) -> f64 {
    (compatibility.clamp(0.0, 1.0) - 0.5) * 2.0 * config.interaction_strength
}

/// Classification of a relationship score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    /// Above the friend threshold.
    Friend,
    /// Between the thresholds.
    Neutral,
    /// Below the hostile threshold.
    Hostile,
}

/// Classify `relationship` against the configured thresholds.
pub fn standing(relationship: f64, config: &SocialConfig) -> Standing {
    if relationship > config.friend_threshold {
        Standing::Friend
    } else if relationship < config.hostile_threshold {
        Standing::Hostile
    } else {
        Standing::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_agreeable_personalities_are_fully_compatible() {
        let cfg = SocialConfig::default();
        let p = Personality::new(0.5, 0.5, 0.5, 1.0, 0.5);
        assert!((compatibility(&p, &p, &cfg) - 1.0).abs() < 1e-12);
        assert!((relationship_delta(1.0, &cfg) - cfg.interaction_strength).abs() < 1e-12);
    }

    #[test]
    fn opposite_disagreeable_personalities_clash() {
        let cfg = SocialConfig::default();
        let a = Personality::new(0.0, 0.0, 0.0, 0.0, 0.5);
        let b = Personality::new(1.0, 1.0, 1.0, 0.0, 0.5);
        let c = compatibility(&a, &b, &cfg);
        assert!(c < 0.5);
        assert!(relationship_delta(c, &cfg) < 0.0);
    }

    #[test]
    fn agreeableness_raises_compatibility() {
        let cfg = SocialConfig::default();
        let grumpy = Personality::new(0.2, 0.8, 0.3, 0.0, 0.5);
        let other = Personality::new(0.8, 0.2, 0.7, 0.0, 0.5);
        let kind = Personality::new(0.2, 0.8, 0.3, 0.6, 0.5);
        let other_kind = Personality::new(0.8, 0.2, 0.7, 0.6, 0.5);
        assert!(compatibility(&kind, &other_kind, &cfg) > compatibility(&grumpy, &other, &cfg));
    }

    #[test]
    fn neutral_compatibility_changes_nothing() {
        let cfg = SocialConfig::default();
        assert!(relationship_delta(0.5, &cfg).abs() < 1e-12);
    }

    #[test]
    fn standing_thresholds_are_strict() {
        let cfg = SocialConfig::default();
        assert_eq!(standing(50.0, &cfg), Standing::Neutral);
        assert_eq!(standing(50.1, &cfg), Standing::Friend);
        assert_eq!(standing(-50.0, &cfg), Standing::Neutral);
        assert_eq!(standing(-50.1, &cfg), Standing::Hostile);
    }
}
