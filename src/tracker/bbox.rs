/// Axis-aligned bounding box in integer pixel coordinates.
///
/// Stored in TLBR form (top-left x, top-left y, bottom-right x, bottom-right y),
/// which is what trackers hand out per frame. Coordinates are frame-relative and
/// may lie partially outside the frame; use [`BBox::clamp_to`] before slicing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct BBox {
    /// Top-left x coordinate
    pub x1: i32,
    /// Top-left y coordinate
    pub y1: i32,
    /// Bottom-right x coordinate (exclusive)
    pub x2: i32,
    /// Bottom-right y coordinate (exclusive)
    pub y2: i32,
}

impl BBox {
    /// Create a box from TLBR corners.
    #[inline]
    pub fn from_tlbr(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a box from top-left corner and dimensions (TLWH format).
    #[inline]
    pub fn from_tlwh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x.saturating_add(width),
            y2: y.saturating_add(height),
        }
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [i32; 4] {
        [self.x1, self.y1, self.width(), self.height()]
    }

    #[inline]
    pub fn to_tlbr(&self) -> [i32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Horizontal extent, saturating at `i32::MAX` for extreme corners.
    #[inline]
    pub fn width(&self) -> i32 {
        self.x2.saturating_sub(self.x1)
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.y2.saturating_sub(self.y1)
    }

    /// Area in pixels; zero for empty or inverted boxes.
    #[inline]
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width() as i64 * self.height() as i64
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }

    /// Get the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (
            (self.x1 as f32 + self.x2 as f32) / 2.0,
            (self.y1 as f32 + self.y2 as f32) / 2.0,
        )
    }

    /// Grow the box by `fraction` of its width on the left and right and by
    /// `fraction` of its height on the top and bottom.
    ///
    /// The margin is truncated towards zero, so a 9px wide box with a 10%
    /// margin does not grow horizontally at all. Corners saturate at the
    /// `i32` range instead of wrapping.
    pub fn expand(&self, fraction: f32) -> Self {
        let margin_x = (self.width() as f32 * fraction) as i32;
        let margin_y = (self.height() as f32 * fraction) as i32;
        Self {
            x1: self.x1.saturating_sub(margin_x),
            y1: self.y1.saturating_sub(margin_y),
            x2: self.x2.saturating_add(margin_x),
            y2: self.y2.saturating_add(margin_y),
        }
    }

    /// Restrict the box to `[0, width] x [0, height]`.
    ///
    /// The result may be empty when the box lies entirely outside the frame.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        let h = i32::try_from(height).unwrap_or(i32::MAX);
        Self {
            x1: self.x1.clamp(0, w),
            y1: self.y1.clamp(0, h),
            x2: self.x2.clamp(0, w),
            y2: self.y2.clamp(0, h),
        }
    }
}
