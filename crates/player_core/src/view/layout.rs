/// Screen density scale, injected instead of read from the display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayDensity(f32);

impl DisplayDensity {
    pub const BASELINE: Self = Self(1.0);

    /// Rejects zero, negative and non-finite scales.
    pub fn new(scale: f32) -> Option<Self> {
        (scale.is_finite() && scale > 0.0).then_some(Self(scale))
    }

    /// Density-independent pixels to physical pixels, truncating.
    pub fn to_px(self, dp: u32) -> i32 {
        (dp as f32 * self.0) as i32
    }
}

impl Default for DisplayDensity {
    fn default() -> Self {
        Self::BASELINE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    MatchParent,
    WrapContent,
    Exact(i32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Insets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Insets {
    pub fn uniform(px: i32) -> Self {
        Self {
            left: px,
            top: px,
            right: px,
            bottom: px,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    pub width: Dimension,
    pub height: Dimension,
    pub margins: Insets,
}

impl LayoutParams {
    pub fn fill_width_wrap_height(margins: Insets) -> Self {
        Self {
            width: Dimension::MatchParent,
            height: Dimension::WrapContent,
            margins,
        }
    }
}
