//! Perception and collision avoidance.
//!
//! Perception is a brute-force O(n^2) distance scan, rebuilt every tick.
//! Each observer's radius scales with its extraversion. The scan is
//! symmetric in distance but not in visibility: an outgoing agent may see a
//! shy one that does not see it back.

use civitas_agents::Neighbor;
use civitas_types::{AgentId, Personality, Vec2};

/// One agent as seen by the perception scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// The agent.
    pub id: AgentId,
    /// Its position.
    pub position: Vec2,
    /// How far it can see.
    pub radius: f64,
}

/// Perception radius for an agent with `personality`.
///
/// `base * (0.5 + extraversion)`, so radii range over `[0.5, 1.5] * base`.
pub fn perception_radius(base: f64, personality: &Personality) -> f64 {
    (base * (0.5 + personality.extraversion)).max(0.0)
}

/// Build every body's neighbor list.
///
/// Output is parallel to `bodies`. Each list holds the other bodies within
/// the observer's radius, nearest first with ties broken by id.
/// `relationship(observer, other)` supplies the observer's score toward
/// each neighbor.
pub fn perceive<F>(bodies: &[Body], relationship: F) -> Vec<Vec<Neighbor>>
where
    F: Fn(AgentId, AgentId) -> f64,
{
    bodies
        .iter()
        .map(|observer| {
            let mut seen: Vec<Neighbor> = bodies
                .iter()
                .filter(|other| other.id != observer.id)
                .filter_map(|other| {
                    let distance = observer.position.distance(other.position);
                    (distance <= observer.radius).then(|| Neighbor {
                        id: other.id,
                        position: other.position,
                        distance,
                        relationship: relationship(observer.id, other.id),
                    })
                })
                .collect();
            seen.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));
            seen
        })
        .collect()
}

/// Below this separation two agents count as coincident.
const COINCIDENT: f64 = 1e-9;

/// Repulsion velocity pushing agent `id` at `position` away from crowding
/// neighbors.
///
/// Each neighbor closer than `personal_space` contributes
/// `strength * (personal_space - d) / personal_space` along the unit vector
/// pointing away from it. A coincident neighbor pushes at full weight along
/// [`separation_axis`], in opposite directions for the two agents.
pub fn avoidance(
    id: AgentId,
    position: Vec2,
    neighbors: &[Neighbor],
    personal_space: f64,
    strength: f64,
) -> Vec2 {
    if personal_space <= 0.0 {
        return Vec2::ZERO;
    }
    neighbors
        .iter()
        .filter(|n| n.distance < personal_space)
        .fold(Vec2::ZERO, |push, n| {
            let offset = position - n.position;
            let away = if offset.length() < COINCIDENT {
                let axis = separation_axis(id, n.id);
                if id < n.id { -axis } else { axis }
            } else {
                offset.normalized()
            };
            let weight = ((personal_space - n.distance) / personal_space).clamp(0.0, 1.0);
            push + away * (weight * strength)
        })
}

/// Unit direction along which a coincident pair separates.
///
/// Depends only on the unordered pair, so both agents agree on it.
pub fn separation_axis(a: AgentId, b: AgentId) -> Vec2 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mix = lo.into_inner().as_u128() ^ hi.into_inner().as_u128().rotate_left(17);
    let degrees = mix
        .checked_rem(360)
        .and_then(|d| u16::try_from(d).ok())
        .unwrap_or(0);
    let radians = f64::from(degrees).to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(x: f64, y: f64, radius: f64) -> Body {
        Body {
            id: AgentId::new(),
            position: Vec2::new(x, y),
            radius,
        }
    }

    #[test]
    fn radius_scales_with_extraversion() {
        let shy = Personality::new(0.5, 0.5, 0.0, 0.5, 0.5);
        let outgoing = Personality::new(0.5, 0.5, 1.0, 0.5, 0.5);
        assert!((perception_radius(6.0, &shy) - 3.0).abs() < 1e-12);
        assert!((perception_radius(6.0, &outgoing) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn perceive_filters_by_observer_radius() {
        let bodies = [body(0.0, 0.0, 5.0), body(3.0, 0.0, 1.0), body(10.0, 0.0, 5.0)];
        let seen = perceive(&bodies, |_, _| 0.0);
        assert_eq!(seen.len(), 3);
        assert_eq!(seen.first().map(Vec::len), Some(1));
        // The second body is too short-sighted to see the first one.
        assert_eq!(seen.get(1).map(Vec::len), Some(0));
        assert_eq!(seen.get(2).map(Vec::len), Some(0));
    }

    #[test]
    fn neighbors_are_sorted_nearest_first() {
        let bodies = [body(0.0, 0.0, 10.0), body(4.0, 0.0, 1.0), body(1.0, 0.0, 1.0)];
        let seen = perceive(&bodies, |_, _| 0.0);
        let distances: Vec<f64> = seen
            .first()
            .map(|list| list.iter().map(|n| n.distance).collect())
            .unwrap_or_default();
        assert_eq!(distances.len(), 2);
        assert!(distances.windows(2).all(|w| w.first() <= w.get(1)));
    }

    #[test]
    fn relationship_lookup_is_directional() {
        let bodies = [body(0.0, 0.0, 5.0), body(1.0, 0.0, 5.0)];
        let first = bodies.first().map(|b| b.id);
        let seen = perceive(&bodies, |observer, _| if Some(observer) == first { 40.0 } else { -5.0 });
        let rel = |i: usize| seen.get(i).and_then(|l| l.first()).map(|n| n.relationship);
        assert_eq!(rel(0), Some(40.0));
        assert_eq!(rel(1), Some(-5.0));
    }

    #[test]
    fn avoidance_pushes_away_and_scales_with_closeness() {
        let near = Neighbor {
            id: AgentId::new(),
            position: Vec2::new(0.2, 0.0),
            distance: 0.2,
            relationship: 0.0,
        };
        let far = Neighbor {
            position: Vec2::new(0.0, 5.0),
            distance: 5.0,
            ..near
        };
        let me = AgentId::new();
        let push = avoidance(me, Vec2::ZERO, &[near, far], 0.8, 1.0);
        assert!(push.x < 0.0);
        assert!(push.y.abs() < 1e-12);
        assert!((push.length() - 0.75).abs() < 1e-12);
        assert_eq!(avoidance(me, Vec2::ZERO, &[far], 0.8, 1.0), Vec2::ZERO);
    }

    #[test]
    fn coincident_agents_push_apart_at_full_strength() {
        let (a, b) = (AgentId::new(), AgentId::new());
        let spot = Vec2::new(5.5, 5.5);
        let seen_by = |other: AgentId| Neighbor {
            id: other,
            position: spot,
            distance: 0.0,
            relationship: 0.0,
        };
        let push_a = avoidance(a, spot, &[seen_by(b)], 0.8, 1.0);
        let push_b = avoidance(b, spot, &[seen_by(a)], 0.8, 1.0);
        assert!((push_a.length() - 1.0).abs() < 1e-12);
        assert!((push_b.length() - 1.0).abs() < 1e-12);
        let sum = push_a + push_b;
        assert!(sum.length() < 1e-12);
        // Same pair, same axis, every time.
        assert_eq!(separation_axis(a, b), separation_axis(b, a));
        assert_eq!(avoidance(a, spot, &[seen_by(b)], 0.8, 1.0), push_a);
    }
}
