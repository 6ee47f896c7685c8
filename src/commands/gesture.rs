//! [`Swipe`] and [`Tap`]: pointer gestures.
//!
//! Script syntax:
//! - `SWIPE x1 y1 x2 y2 duration_ms`
//! - `TAP x y`

use crate::command::Action;
use crate::context::ExecutionContext;
use crate::error::{ParseWarning, RunError};
use crate::gesture::{self, GestureStep};
use crate::parser::parse_ints;
use crate::sink::InjectionSink;
use async_trait::async_trait;
use std::time::Duration;

/// Drags from one point to another over a duration.
pub struct Swipe {
    pub from: (i32, i32),
    pub to: (i32, i32),
    pub duration: Duration,
}

#[async_trait(?Send)]
impl Action for Swipe {
    const NAME: &'static str = "SWIPE";

    fn parse(args: &str) -> Result<Self, ParseWarning> {
        let [x1, y1, x2, y2, ms] = parse_ints::<5>(Self::NAME, args)?;
        let ms = u64::try_from(ms)
            .map_err(|_| ParseWarning::invalid(Self::NAME, "duration must not be negative"))?;
        Ok(Self {
            from: (x1, y1),
            to: (x2, y2),
            duration: Duration::from_millis(ms),
        })
    }

    async fn execute(
        &self,
        ctx: &mut ExecutionContext,
        sink: &mut dyn InjectionSink,
    ) -> Result<(), RunError> {
        play(&gesture::swipe(self.from, self.to, self.duration), ctx, sink).await
    }
}

/// Clicks at a single point.
pub struct Tap {
    pub x: i32,
    pub y: i32,
}

#[async_trait(?Send)]
impl Action for Tap {
    const NAME: &'static str = "TAP";

    fn parse(args: &str) -> Result<Self, ParseWarning> {
        let [x, y] = parse_ints::<2>(Self::NAME, args)?;
        Ok(Self { x, y })
    }

    async fn execute(
        &self,
        ctx: &mut ExecutionContext,
        sink: &mut dyn InjectionSink,
    ) -> Result<(), RunError> {
        play(&gesture::tap(self.x, self.y), ctx, sink).await
    }
}

async fn play(
    plan: &[GestureStep],
    ctx: &mut ExecutionContext,
    sink: &mut dyn InjectionSink,
) -> Result<(), RunError> {
    for step in plan {
        match *step {
            GestureStep::Move { dx, dy } => sink.move_by(dx, dy).await?,
            GestureStep::Press(button) => sink.press(button.into()).await?,
            GestureStep::Release(button) => sink.release(button.into()).await?,
            GestureStep::Pause(duration) => ctx.suspend(sink, duration).await?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::event::Event;
    use crate::sink::{MouseButton, RecordingSink};

    #[test]
    fn test_parse_swipe() {
        let swipe = Swipe::parse("0 0 100 50 200").unwrap();
        assert_eq!(swipe.to, (100, 50));
        assert_eq!(swipe.duration, Duration::from_millis(200));
        assert!(Swipe::parse("0 0 100 50").is_err());
        assert!(Swipe::parse("0 0 100 50 -1").is_err());
    }

    #[tokio::test]
    async fn test_swipe_press_moves_release() {
        let mut ctx = ExecutionContext::new(&EngineConfig::default());
        let mut sink = RecordingSink::new();
        Swipe::parse("10 10 30 10 20")
            .unwrap()
            .execute(&mut ctx, &mut sink)
            .await
            .unwrap();
        assert_eq!(
            sink.events(),
            &[
                Event::Move { dx: 10, dy: 10 },
                Event::press(MouseButton::Left),
                Event::Move { dx: 10, dy: 0 },
                Event::sleep_ms(10),
                Event::Move { dx: 10, dy: 0 },
                Event::sleep_ms(10),
                Event::release(MouseButton::Left),
            ]
        );
    }

    #[tokio::test]
    async fn test_tap() {
        let mut ctx = ExecutionContext::new(&EngineConfig::default());
        let mut sink = RecordingSink::new();
        Tap::parse("5 -5")
            .unwrap()
            .execute(&mut ctx, &mut sink)
            .await
            .unwrap();
        assert_eq!(
            sink.events(),
            &[
                Event::Move { dx: 5, dy: -5 },
                Event::press(MouseButton::Left),
                Event::release(MouseButton::Left),
            ]
        );
    }
}
