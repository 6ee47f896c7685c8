//! Pointer gesture synthesis.
//!
//! Gestures are expanded into a plan of primitive steps up front; the
//! handlers then play the plan through the sink. Coordinates are relative
//! to the pointer position, as a HID mouse only reports motion.

use crate::sink::MouseButton;
use std::time::Duration;

/// Target spacing between intermediate swipe moves.
pub const STEP_INTERVAL: Duration = Duration::from_millis(10);
pub const MIN_SWIPE_STEPS: u32 = 2;
pub const MAX_SWIPE_STEPS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureStep {
    Move { dx: i32, dy: i32 },
    Press(MouseButton),
    Release(MouseButton),
    Pause(Duration),
}

/// Drag from `from` to `to` with the left button held, spreading the motion
/// evenly over `duration`.
///
/// The path is interpolated on cumulative positions, so the moves always sum
/// to exactly `to - from` with no rounding drift.
pub fn swipe(from: (i32, i32), to: (i32, i32), duration: Duration) -> Vec<GestureStep> {
    let steps = (duration.as_millis() / STEP_INTERVAL.as_millis())
        .clamp(MIN_SWIPE_STEPS as u128, MAX_SWIPE_STEPS as u128) as u32;
    let interval = duration / steps;
    let dx = i64::from(to.0) - i64::from(from.0);
    let dy = i64::from(to.1) - i64::from(from.1);

    let mut plan = Vec::with_capacity(steps as usize * 2 + 3);
    plan.push(GestureStep::Move {
        dx: from.0,
        dy: from.1,
    });
    plan.push(GestureStep::Press(MouseButton::Left));

    let (mut x, mut y) = (0i64, 0i64);
    for i in 1..=i64::from(steps) {
        let (tx, ty) = (dx * i / i64::from(steps), dy * i / i64::from(steps));
        plan.push(GestureStep::Move {
            dx: (tx - x) as i32,
            dy: (ty - y) as i32,
        });
        (x, y) = (tx, ty);
        if !interval.is_zero() {
            plan.push(GestureStep::Pause(interval));
        }
    }

    plan.push(GestureStep::Release(MouseButton::Left));
    plan
}

/// Move to a point and click there.
pub fn tap(x: i32, y: i32) -> Vec<GestureStep> {
    vec![
        GestureStep::Move { dx: x, dy: y },
        GestureStep::Press(MouseButton::Left),
        GestureStep::Release(MouseButton::Left),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moves(plan: &[GestureStep]) -> Vec<(i32, i32)> {
        plan.iter()
            .filter_map(|step| match step {
                GestureStep::Move { dx, dy } => Some((*dx, *dy)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_swipe_even_steps() {
        let plan = swipe((0, 0), (100, 50), Duration::from_millis(100));
        assert_eq!(plan[1], GestureStep::Press(MouseButton::Left));
        assert_eq!(plan.last(), Some(&GestureStep::Release(MouseButton::Left)));
        let path = &moves(&plan)[1..];
        assert_eq!(path.len(), 10);
        assert!(path.iter().all(|m| *m == (10, 5)));
        let pauses: Vec<_> = plan
            .iter()
            .filter(|s| matches!(s, GestureStep::Pause(_)))
            .collect();
        assert_eq!(pauses.len(), 10);
        assert!(pauses.iter().all(|p| **p == GestureStep::Pause(STEP_INTERVAL)));
    }

    #[test]
    fn test_swipe_sums_exactly() {
        let plan = swipe((5, 5), (12, -30), Duration::from_millis(70));
        let path = &moves(&plan)[1..];
        let total = path
            .iter()
            .fold((0, 0), |(x, y), (dx, dy)| (x + dx, y + dy));
        assert_eq!(total, (7, -35));
        assert_eq!(moves(&plan)[0], (5, 5));
    }

    #[test]
    fn test_short_swipe_has_two_moves() {
        let plan = swipe((0, 0), (10, 10), Duration::ZERO);
        assert_eq!(moves(&plan).len(), 3);
        assert!(!plan.iter().any(|s| matches!(s, GestureStep::Pause(_))));
    }

    #[test]
    fn test_long_swipe_is_capped() {
        let plan = swipe((0, 0), (1000, 0), Duration::from_secs(60));
        assert_eq!(moves(&plan).len(), MAX_SWIPE_STEPS as usize + 1);
    }

    #[test]
    fn test_tap() {
        assert_eq!(
            tap(3, 4),
            vec![
                GestureStep::Move { dx: 3, dy: 4 },
                GestureStep::Press(MouseButton::Left),
                GestureStep::Release(MouseButton::Left),
            ]
        );
    }
}
