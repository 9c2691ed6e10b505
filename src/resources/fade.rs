//! Screen fade collaborator.
//!
//! The transition controller does not draw anything itself; it asks a
//! [`FadeCollaborator`] to obscure the screen before content is swapped and
//! to reveal it afterwards. A fade is asynchronous: [`FadeCollaborator::begin`]
//! starts it and the controller polls [`FadeCollaborator::advance`] once per
//! frame until it reports completion.
//!
//! [`ScreenFade`] is the built-in implementation. It only computes an eased
//! overlay opacity; a renderer reads [`FadeCollaborator::opacity`] and paints
//! a full-screen quad with it.

/// Which way a fade goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    /// Visible content to fully obscured.
    Out,
    /// Fully obscured to visible content.
    In,
}

/// Performs timed fade-outs and fade-ins.
pub trait FadeCollaborator: Send + Sync {
    /// Start a fade lasting `duration` seconds, replacing any fade in progress.
    fn begin(&mut self, direction: FadeDirection, duration: f32);
    /// Advance the running fade by `dt` seconds.
    ///
    /// Returns `true` once the fade has completed; calling it again after
    /// completion keeps returning `true`.
    fn advance(&mut self, dt: f32) -> bool;
    /// Overlay opacity in `[0, 1]`, where `1.0` hides the screen entirely.
    fn opacity(&self) -> f32;
}

/// Easing functions for the fade curve.
///
/// These transform a linear `t` (0.0 to 1.0) into a smoother progression.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant speed (no easing).
    #[default]
    Linear,
    /// Starts slow, accelerates (quadratic).
    QuadIn,
    /// Starts fast, decelerates (quadratic).
    QuadOut,
    /// Slow start and end (quadratic).
    QuadInOut,
    /// Slow start and end (cubic).
    CubicInOut,
}

/// Apply an easing function to a normalized time value clamped to [0.0, 1.0].
pub(crate) fn ease(e: Easing, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    match e {
        Easing::Linear => t,
        Easing::QuadIn => t * t,
        Easing::QuadOut => t * (2.0 - t),
        Easing::QuadInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                -1.0 + (4.0 - 2.0 * t) * t
            }
        }
        Easing::CubicInOut => {
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                let p = 2.0 * t - 2.0;
                0.5 * p * p * p + 1.0
            }
        }
    }
}

/// Eased full-screen fade driven by frame deltas.
#[derive(Debug, Clone)]
pub struct ScreenFade {
    direction: FadeDirection,
    duration: f32,
    time: f32,
    easing: Easing,
    opacity: f32,
}

impl Default for ScreenFade {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenFade {
    /// A finished fade-in: the screen starts fully visible.
    pub fn new() -> Self {
        ScreenFade {
            direction: FadeDirection::In,
            duration: 0.0,
            time: 0.0,
            easing: Easing::Linear,
            opacity: 0.0,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn direction(&self) -> FadeDirection {
        self.direction
    }

    pub fn is_finished(&self) -> bool {
        self.time >= self.duration
    }

    fn refresh_opacity(&mut self) {
        let t = if self.duration > 0.0 {
            self.time / self.duration
        } else {
            1.0
        };
        let eased = ease(self.easing, t);
        self.opacity = match self.direction {
            FadeDirection::Out => eased,
            FadeDirection::In => 1.0 - eased,
        };
    }
}

impl FadeCollaborator for ScreenFade {
    fn begin(&mut self, direction: FadeDirection, duration: f32) {
        self.direction = direction;
        self.duration = duration.max(0.0);
        self.time = 0.0;
        self.refresh_opacity();
        log::debug!("fade {:?} started ({}s)", direction, self.duration);
    }

    fn advance(&mut self, dt: f32) -> bool {
        if !self.is_finished() {
            self.time = (self.time + dt.max(0.0)).min(self.duration);
            self.refresh_opacity();
        }
        self.is_finished()
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }
}
