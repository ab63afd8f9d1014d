//! Auto-scroll decisions for the conversation viewport.
//!
//! The follower samples a "near bottom" predicate against the scroll
//! container immediately before each mutation is rendered. After the
//! mutation, it smooth-scrolls to the bottom only if the sample was true;
//! a user who has scrolled up to read history is never force-scrolled.

/// Distance-from-bottom cutoff, in pixels, below which the viewport is
/// considered pinned to the bottom.
pub const NEAR_BOTTOM_PX: f64 = 180.0;

/// Scroll container geometry at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl Viewport {
    /// Pixels between the bottom of the visible area and the bottom of
    /// the content.
    pub fn distance_from_bottom(&self) -> f64 {
        self.scroll_height - self.scroll_top - self.client_height
    }

    /// Whether the viewport is within [`NEAR_BOTTOM_PX`] of the bottom.
    pub fn near_bottom(&self) -> bool {
        self.distance_from_bottom() < NEAR_BOTTOM_PX
    }
}

/// What the embedding UI should do after rendering a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirective {
    /// Smooth-scroll to the bottom of the container.
    FollowBottom,
    /// Leave the viewport where the user put it.
    Hold,
}

/// Derives auto-scroll decisions from store mutations and viewport
/// geometry. Call [`before_mutation`](Self::before_mutation) with the
/// geometry sampled before the mutation is rendered, then
/// [`after_mutation`](Self::after_mutation) once it has been.
#[derive(Debug, Default)]
pub struct ScrollFollower {
    was_near_bottom: bool,
}

impl ScrollFollower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample the near-bottom predicate before the mutation renders.
    pub fn before_mutation(&mut self, viewport: &Viewport) {
        self.was_near_bottom = viewport.near_bottom();
    }

    /// Decide what to do now that the mutation has rendered.
    pub fn after_mutation(&self) -> ScrollDirective {
        if self.was_near_bottom {
            ScrollDirective::FollowBottom
        } else {
            ScrollDirective::Hold
        }
    }
}
