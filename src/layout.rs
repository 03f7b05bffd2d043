//! Desktop layout descriptor: how pagers should arrange the desktops in a
//! grid.
//!
//! The layout is advisory and comes from outside (usually a pager writes
//! it).  The raw form is a list of 3 or 4 integers: orientation, columns,
//! rows and, in the 4-element form, the starting corner.  [`RawLayout::parse`]
//! turns that list into a tagged value first, then [`DesktopLayout::resolve`]
//! applies defaults and bounds.  Nothing here ever fails; bad input simply
//! leaves the defaults in place.

use serde::{Deserialize, Serialize};

const ORIENTATION_VERTICAL: u32 = 1;

const CORNER_TOP_LEFT: u32 = 0;
const CORNER_TOP_RIGHT: u32 = 1;
const CORNER_BOTTOM_RIGHT: u32 = 2;
const CORNER_BOTTOM_LEFT: u32 = 3;

/// Whether desktops are numbered along rows or along columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// The grid corner that holds desktop 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Corner {
    #[default]
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

/// A raw layout descriptor, tagged by the protocol revision that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawLayout {
    /// Three elements.  Old pagers omitted the corner; they always meant
    /// top-right.
    Legacy {
        orientation: u32,
        columns: u32,
        rows: u32,
    },
    /// Four elements.
    Full {
        orientation: u32,
        columns: u32,
        rows: u32,
        corner: u32,
    },
}

impl RawLayout {
    /// Interpret a raw integer list.  Any length other than 3 or 4 yields
    /// `None`.
    pub fn parse(data: &[u32]) -> Option<Self> {
        match *data {
            [orientation, columns, rows] => Some(RawLayout::Legacy {
                orientation,
                columns,
                rows,
            }),
            [orientation, columns, rows, corner] => Some(RawLayout::Full {
                orientation,
                columns,
                rows,
                corner,
            }),
            _ => None,
        }
    }

    fn fields(&self) -> (u32, u32, u32) {
        match *self {
            RawLayout::Legacy {
                orientation,
                columns,
                rows,
            }
            | RawLayout::Full {
                orientation,
                columns,
                rows,
                ..
            } => (orientation, columns, rows),
        }
    }

    fn corner(&self) -> Corner {
        match *self {
            RawLayout::Legacy { .. } => Corner::TopRight,
            RawLayout::Full { corner, .. } => match corner {
                CORNER_TOP_RIGHT => Corner::TopRight,
                CORNER_BOTTOM_RIGHT => Corner::BottomRight,
                CORNER_BOTTOM_LEFT => Corner::BottomLeft,
                _ => Corner::TopLeft,
            },
        }
    }
}

/// The validated layout of `rows × columns` desktops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopLayout {
    pub orientation: Orientation,
    pub start_corner: Corner,
    pub rows: u32,
    pub columns: u32,
}

impl DesktopLayout {
    /// One row holding every desktop, numbered from the top-left.
    pub fn default_for(desktops: u32) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            start_corner: Corner::TopLeft,
            rows: 1,
            columns: desktops.max(1),
        }
    }

    /// Build a layout for `desktops` desktops from an optional raw
    /// descriptor.
    ///
    /// A zero in either rows or columns is filled in from the other; both
    /// zero keeps the default grid.  The minor axis is then capped at the
    /// desktop count and the major axis at `ceil(desktops / minor)`.
    pub fn resolve(raw: Option<&RawLayout>, desktops: u32) -> Self {
        let n = desktops.max(1);
        let mut layout = Self::default_for(n);

        let Some(raw) = raw else {
            return layout;
        };

        let (orientation, columns, rows) = raw.fields();
        if orientation == ORIENTATION_VERTICAL {
            layout.orientation = Orientation::Vertical;
        }
        layout.start_corner = raw.corner();

        if !(columns == 0 && rows == 0) {
            let (mut columns, mut rows) = (columns, rows);
            if columns == 0 {
                columns = n.div_ceil(rows);
            } else if rows == 0 {
                rows = n.div_ceil(columns);
            }
            layout.columns = columns;
            layout.rows = rows;
        }

        match layout.orientation {
            Orientation::Horizontal => {
                layout.rows = layout.rows.min(n);
                layout.columns = layout.columns.min(n.div_ceil(layout.rows));
            }
            Orientation::Vertical => {
                layout.columns = layout.columns.min(n);
                layout.rows = layout.rows.min(n.div_ceil(layout.columns));
            }
        }
        layout
    }

    /// The 4-element wire form: orientation, columns, rows, starting corner.
    pub fn to_raw(&self) -> [u32; 4] {
        let orientation = match self.orientation {
            Orientation::Horizontal => 0,
            Orientation::Vertical => ORIENTATION_VERTICAL,
        };
        let corner = match self.start_corner {
            Corner::TopLeft => CORNER_TOP_LEFT,
            Corner::TopRight => CORNER_TOP_RIGHT,
            Corner::BottomRight => CORNER_BOTTOM_RIGHT,
            Corner::BottomLeft => CORNER_BOTTOM_LEFT,
        };
        [orientation, self.columns, self.rows, corner]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(data: &[u32], n: u32) -> DesktopLayout {
        DesktopLayout::resolve(RawLayout::parse(data).as_ref(), n)
    }

    #[test]
    fn missing_descriptor_is_one_row() {
        let l = DesktopLayout::resolve(None, 4);
        assert_eq!(l, DesktopLayout::default_for(4));
        assert_eq!((l.rows, l.columns), (1, 4));
        assert_eq!(l.orientation, Orientation::Horizontal);
        assert_eq!(l.start_corner, Corner::TopLeft);
    }

    #[test]
    fn two_elements_are_ignored() {
        assert_eq!(resolve(&[1, 2], 6), DesktopLayout::default_for(6));
    }

    #[test]
    fn five_elements_are_ignored() {
        assert_eq!(resolve(&[1, 2, 3, 1, 9], 6), DesktopLayout::default_for(6));
    }

    #[test]
    fn vertical_columns_backfilled_from_rows() {
        let l = resolve(&[1, 0, 2, 1], 6);
        assert_eq!(l.orientation, Orientation::Vertical);
        assert_eq!(l.start_corner, Corner::TopRight);
        assert_eq!((l.rows, l.columns), (2, 3));
    }

    #[test]
    fn rows_backfilled_with_rounding_up() {
        let l = resolve(&[0, 3, 0, 0], 7);
        assert_eq!((l.rows, l.columns), (3, 3));
    }

    #[test]
    fn legacy_form_forces_top_right() {
        let l = resolve(&[0, 2, 2], 4);
        assert_eq!(l.start_corner, Corner::TopRight);
        assert_eq!((l.rows, l.columns), (2, 2));
    }

    #[test]
    fn unknown_corner_falls_back_to_top_left() {
        assert_eq!(resolve(&[0, 2, 2, 42], 4).start_corner, Corner::TopLeft);
        assert_eq!(resolve(&[0, 2, 2, 3], 4).start_corner, Corner::BottomLeft);
    }

    #[test]
    fn both_zero_keeps_default_grid() {
        let l = resolve(&[1, 0, 0, 2], 5);
        assert_eq!((l.rows, l.columns), (1, 5));
        // Orientation and corner are still honoured.
        assert_eq!(l.orientation, Orientation::Vertical);
        assert_eq!(l.start_corner, Corner::BottomRight);
    }

    #[test]
    fn oversized_horizontal_grid_is_clamped() {
        let l = resolve(&[0, 10, 10, 0], 4);
        assert_eq!((l.rows, l.columns), (4, 1));
    }

    #[test]
    fn oversized_vertical_grid_is_clamped() {
        let l = resolve(&[1, 9, 9, 0], 6);
        assert_eq!((l.rows, l.columns), (1, 6));
    }

    #[test]
    fn raw_form_resolves_to_itself() {
        let l = resolve(&[1, 0, 2, 1], 6);
        assert_eq!(resolve(&l.to_raw(), 6), l);
    }
}
