//! Work-area computation.
//!
//! A [`WorkAreaTable`] holds one rectangle per `(desktop, head)` pair, plus
//! an extra row for windows on every desktop and an extra column for the
//! union of all heads:
//!
//! ```text
//!              head 0   head 1   ...   union
//! desktop 0    Rect     Rect           Rect
//! desktop 1    Rect     Rect           Rect
//! ...
//! all          Rect     Rect           Rect
//! ```
//!
//! Tables are immutable once built.  Any change to the desktop count, the
//! monitor layout or the struts builds a fresh table which then replaces the
//! old one wholesale.
//!
//! Struts are applied against the edges of the *combined* desktop: a left
//! strut is measured from the left-most head's origin and removed from every
//! head that starts within that margin.  A strut that only covers part of
//! one edge (a panel on a single monitor of a multi-monitor setup) is still
//! treated as covering the whole edge.

use crate::desktop::DesktopId;
use crate::geometry::{margin, Rect, Strut};

const NO_STRUTS: [Strut; 1] = [Strut::new(0, 0, 0, 0)];

/// Rectangles for every `(desktop or all, head or union)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkAreaTable {
    desktops: usize,
    heads: usize,
    /// Row-major, `(desktops + 1) * (heads + 1)` entries.
    areas: Vec<Rect>,
}

impl Default for WorkAreaTable {
    fn default() -> Self {
        Self::build(&[], &NO_STRUTS)
    }
}

impl WorkAreaTable {
    /// Build a table from the physical `monitors` and one aggregated strut
    /// per row.
    ///
    /// `struts` has one entry per desktop followed by the entry for the
    /// "all desktops" row, so the table has `struts.len() - 1` real desktops.
    pub fn build(monitors: &[Rect], struts: &[Strut]) -> Self {
        let desktops = struts.len().saturating_sub(1);
        let heads = monitors.len();
        let union = Rect::union_of(monitors).unwrap_or_default();

        let mut areas = Vec::with_capacity((desktops + 1) * (heads + 1));
        let struts = if struts.is_empty() { &NO_STRUTS[..] } else { struts };
        for &strut in struts {
            let mut row: Vec<Rect> = monitors.to_vec();
            let mut row_union = union;
            apply_strut(&mut row, &mut row_union, strut);
            areas.extend(row);
            areas.push(row_union);
        }

        Self {
            desktops,
            heads,
            areas,
        }
    }

    /// Number of real desktops.
    pub fn desktops(&self) -> usize {
        self.desktops
    }

    /// Number of real heads.
    pub fn heads(&self) -> usize {
        self.heads
    }

    /// Raw cell access: `row` in `0..=desktops`, `head` in `0..=heads`.
    pub fn cell(&self, row: usize, head: usize) -> Option<Rect> {
        if row > self.desktops || head > self.heads {
            return None;
        }
        self.areas.get(row * (self.heads + 1) + head).copied()
    }

    /// Work area of `desktop` on `head`.
    ///
    /// `head == heads()` is the union column.  A real desktop past the end
    /// of the table, or a head past the union column, yields `None`.
    pub fn lookup(&self, desktop: DesktopId, head: usize) -> Option<Rect> {
        let row = match desktop {
            DesktopId::Index(i) if i < self.desktops => i,
            DesktopId::Index(_) => return None,
            DesktopId::All => self.desktops,
        };
        self.cell(row, head)
    }

    /// Union-column work area of each real desktop, flattened as
    /// `x, y, width, height` quadruples.  The "all desktops" row has no slot.
    pub fn flatten(&self) -> Vec<i32> {
        (0..self.desktops)
            .filter_map(|row| self.cell(row, self.heads))
            .flat_map(|r| [r.x, r.y, r.width, r.height])
            .collect()
    }
}

/// Combine every window's strut into one strut per row.
///
/// A window on desktop `i` contributes to row `i`; a sticky window
/// contributes to every row, including the trailing "all desktops" row.  The
/// dock's strut applies everywhere.  Windows on a desktop index past `count`
/// are skipped.
pub fn aggregate_struts(
    count: usize,
    windows: impl IntoIterator<Item = (DesktopId, Strut)>,
    dock: Strut,
) -> Vec<Strut> {
    let mut rows = vec![dock; count + 1];
    for (desktop, strut) in windows {
        match desktop {
            DesktopId::All => {
                for row in rows.iter_mut() {
                    *row = row.merge(strut);
                }
            }
            DesktopId::Index(i) if i < count => rows[i] = rows[i].merge(strut),
            DesktopId::Index(_) => {}
        }
    }
    rows
}

/// Subtract `strut` from every head and from the union, left, top, right
/// then bottom.
fn apply_strut(heads: &mut [Rect], union: &mut Rect, strut: Strut) {
    if strut.left > 0 {
        let left = margin(strut.left);
        if let Some(o) = heads.iter().map(|h| h.x).min() {
            for head in heads.iter_mut() {
                let edge = o.saturating_add(left) - head.x;
                if edge > 0 {
                    head.cut_left(edge);
                }
            }
        }
        union.cut_left(left);
    }
    if strut.top > 0 {
        let top = margin(strut.top);
        if let Some(o) = heads.iter().map(|h| h.y).min() {
            for head in heads.iter_mut() {
                let edge = o.saturating_add(top) - head.y;
                if edge > 0 {
                    head.cut_top(edge);
                }
            }
        }
        union.cut_top(top);
    }
    if strut.right > 0 {
        let right = margin(strut.right);
        if let Some(o) = heads.iter().map(Rect::right).max() {
            for head in heads.iter_mut() {
                let edge = head.right() - o.saturating_sub(right);
                if edge > 0 {
                    head.cut_right(edge);
                }
            }
        }
        union.cut_right(right);
    }
    if strut.bottom > 0 {
        let bottom = margin(strut.bottom);
        if let Some(o) = heads.iter().map(Rect::bottom).max() {
            for head in heads.iter_mut() {
                let edge = head.bottom() - o.saturating_sub(bottom);
                if edge > 0 {
                    head.cut_bottom(edge);
                }
            }
        }
        union.cut_bottom(bottom);
    }
}
