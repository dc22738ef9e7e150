use std::time::Duration;

pub const DEFAULT_CLICK_STEP: f32 = 0.1;
pub const DEFAULT_HOVER_FADE: Duration = Duration::from_millis(1000);
pub const DEFAULT_HOVER_HOLD: Duration = Duration::from_millis(3000);

const SETTLE_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeTiming {
    /// Alpha change per tick for click and drag fades.
    pub click_step: f32,
    pub hover_fade: Duration,
    pub hover_hold: Duration,
}

impl Default for FadeTiming {
    fn default() -> Self {
        Self {
            click_step: DEFAULT_CLICK_STEP,
            hover_fade: DEFAULT_HOVER_FADE,
            hover_hold: DEFAULT_HOVER_HOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    Out,
    /// Hover previews only: pinned at zero until the hold time runs out.
    Hold,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeSource {
    Click,
    Hover,
}

/// What a tick did to a fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeProgress {
    Running,
    /// A click fade reached zero; the shape is now hidden.
    ReachedHidden,
    /// Back at full opacity; the fade can be dropped.
    Settled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fade {
    pub alpha: f32,
    pub direction: FadeDirection,
    pub source: FadeSource,
    hold_left: Duration,
}

impl Fade {
    pub fn click_out(from: f32) -> Self {
        Self::click(from, FadeDirection::Out)
    }

    pub fn click_in(from: f32) -> Self {
        Self::click(from, FadeDirection::In)
    }

    fn click(from: f32, direction: FadeDirection) -> Self {
        Self {
            alpha: from.clamp(0.0, 1.0),
            direction,
            source: FadeSource::Click,
            hold_left: Duration::ZERO,
        }
    }

    pub fn hover() -> Self {
        Self {
            alpha: 1.0,
            direction: FadeDirection::Out,
            source: FadeSource::Hover,
            hold_left: Duration::ZERO,
        }
    }

    pub fn is_click(&self) -> bool {
        self.source == FadeSource::Click
    }

    pub fn advance(&mut self, dt: Duration, timing: &FadeTiming) -> FadeProgress {
        match self.source {
            FadeSource::Click => self.advance_click(timing.click_step),
            FadeSource::Hover => self.advance_hover(dt, timing),
        }
    }

    fn advance_click(&mut self, step: f32) -> FadeProgress {
        let step = step.max(SETTLE_EPSILON);
        match self.direction {
            FadeDirection::Out | FadeDirection::Hold => {
                self.alpha -= step;
                if self.alpha <= SETTLE_EPSILON {
                    self.alpha = 0.0;
                    return FadeProgress::ReachedHidden;
                }
            }
            FadeDirection::In => {
                self.alpha += step;
                if self.alpha >= 1.0 - SETTLE_EPSILON {
                    self.alpha = 1.0;
                    return FadeProgress::Settled;
                }
            }
        }
        FadeProgress::Running
    }

    fn advance_hover(&mut self, dt: Duration, timing: &FadeTiming) -> FadeProgress {
        let delta = if timing.hover_fade.is_zero() {
            1.0
        } else {
            dt.as_secs_f32() / timing.hover_fade.as_secs_f32()
        };
        match self.direction {
            FadeDirection::Out => {
                self.alpha -= delta;
                if self.alpha <= SETTLE_EPSILON {
                    self.alpha = 0.0;
                    self.direction = FadeDirection::Hold;
                    self.hold_left = timing.hover_hold;
                }
            }
            FadeDirection::Hold => {
                self.hold_left = self.hold_left.saturating_sub(dt);
                if self.hold_left.is_zero() {
                    self.direction = FadeDirection::In;
                }
            }
            FadeDirection::In => {
                self.alpha += delta;
                if self.alpha >= 1.0 - SETTLE_EPSILON {
                    self.alpha = 1.0;
                    return FadeProgress::Settled;
                }
            }
        }
        FadeProgress::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(100);

    #[test]
    fn click_out_reaches_hidden_after_ten_ticks() {
        let timing = FadeTiming::default();
        let mut fade = Fade::click_out(1.0);
        for _ in 0..9 {
            assert_eq!(fade.advance(FRAME, &timing), FadeProgress::Running);
        }
        assert_eq!(fade.advance(FRAME, &timing), FadeProgress::ReachedHidden);
        assert_eq!(fade.alpha, 0.0);
    }

    #[test]
    fn click_step_ignores_frame_duration() {
        let timing = FadeTiming::default();
        let mut fade = Fade::click_in(0.0);
        fade.advance(Duration::from_secs(5), &timing);
        assert!((fade.alpha - 0.1).abs() < 1e-6);
    }

    #[test]
    fn click_in_settles_at_full_alpha() {
        let timing = FadeTiming::default();
        let mut fade = Fade::click_in(0.55);
        let mut ticks = 0;
        while fade.advance(FRAME, &timing) == FadeProgress::Running {
            ticks += 1;
            assert!(ticks < 20);
        }
        assert_eq!(fade.alpha, 1.0);
    }

    #[test]
    fn hover_fades_holds_and_returns() {
        let timing = FadeTiming::default();
        let mut fade = Fade::hover();

        for _ in 0..5 {
            fade.advance(FRAME, &timing);
        }
        assert!((fade.alpha - 0.5).abs() < 1e-3);
        assert_eq!(fade.direction, FadeDirection::Out);

        for _ in 0..5 {
            fade.advance(FRAME, &timing);
        }
        assert_eq!(fade.alpha, 0.0);
        assert_eq!(fade.direction, FadeDirection::Hold);

        for _ in 0..29 {
            assert_eq!(fade.advance(FRAME, &timing), FadeProgress::Running);
        }
        assert_eq!(fade.direction, FadeDirection::Hold);
        fade.advance(FRAME, &timing);
        assert_eq!(fade.direction, FadeDirection::In);

        let mut ticks = 0;
        while fade.advance(FRAME, &timing) == FadeProgress::Running {
            ticks += 1;
            assert!(ticks < 20);
        }
        assert_eq!(fade.alpha, 1.0);
    }

    #[test]
    fn hover_never_reports_hidden() {
        let timing = FadeTiming {
            hover_fade: Duration::ZERO,
            hover_hold: Duration::ZERO,
            ..FadeTiming::default()
        };
        let mut fade = Fade::hover();
        let mut outcomes = Vec::new();
        for _ in 0..4 {
            outcomes.push(fade.advance(FRAME, &timing));
        }
        assert!(!outcomes.contains(&FadeProgress::ReachedHidden));
        assert_eq!(outcomes.last(), Some(&FadeProgress::Settled));
    }
}
