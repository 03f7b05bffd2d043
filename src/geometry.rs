//! Plain geometry values: [`Rect`] and [`Strut`].
//!
//! Neither type carries any state beyond its fields; all the interesting
//! arithmetic lives in [`workarea`](crate::workarea).

use serde::{Deserialize, Serialize};

/// An integer rectangle on the combined desktop.
///
/// `width` and `height` are never negative once a rectangle has been through
/// any of the shrinking helpers below; they clamp at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the right-most column.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// One past the bottom-most row.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Bounding box of every rectangle in `rects`, or `None` if the slice is
    /// empty.
    pub fn union_of(rects: &[Rect]) -> Option<Rect> {
        let first = rects.first()?;
        let (mut l, mut t, mut r, mut b) = (first.x, first.y, first.right(), first.bottom());
        for rect in &rects[1..] {
            l = l.min(rect.x);
            t = t.min(rect.y);
            r = r.max(rect.right());
            b = b.max(rect.bottom());
        }
        Some(Rect::new(l, t, r - l, b - t))
    }

    /// Move the left edge right by `amount`, keeping the right edge fixed.
    ///
    /// The shift is limited to the current width so the rectangle never
    /// inverts.
    pub fn cut_left(&mut self, amount: i32) {
        let amount = amount.clamp(0, self.width.max(0));
        self.x += amount;
        self.width -= amount;
    }

    /// Move the top edge down by `amount`, keeping the bottom edge fixed.
    pub fn cut_top(&mut self, amount: i32) {
        let amount = amount.clamp(0, self.height.max(0));
        self.y += amount;
        self.height -= amount;
    }

    /// Pull the right edge in by `amount`.
    pub fn cut_right(&mut self, amount: i32) {
        self.width = (self.width - amount.max(0)).max(0);
    }

    /// Pull the bottom edge up by `amount`.
    pub fn cut_bottom(&mut self, amount: i32) {
        self.height = (self.height - amount.max(0)).max(0);
    }
}

/// Margins reserved along the four edges of the combined desktop by a panel,
/// dock or other client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Strut {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Strut {
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Componentwise maximum of `self` and `other`.
    ///
    /// Struts from several sources are never summed: two panels on the same
    /// edge overlap, so only the larger one counts.
    pub fn merge(self, other: Strut) -> Strut {
        Strut {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Strut::default()
    }
}

/// Convert an unsigned margin into the signed coordinate space.
pub(crate) fn margin(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}
