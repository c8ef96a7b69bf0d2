//! Where to put a popup panel relative to the element that opened it.
//!
//! Units are whatever the host measures in (CSS pixels, terminal cells);
//! only the gaps below assume the unit is small.

/// Space left between the anchor and a panel flipped above it
pub const FLIP_GAP: i32 = 2;

/// Space kept between a panel pulled back from the right edge and that edge
pub const EDGE_MARGIN: i32 = 5;

/// A rectangle relative to the visible viewport
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Rect {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

/// The visible window and how far the document under it is scrolled
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Viewport {
    pub scroll_top: i32,
    pub scroll_left: i32,
    pub width: i32,
    pub height: i32,
}

/// Document coordinates for the panel's top-left corner
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Placement {
    pub top: i32,
    pub left: i32,
    pub flip_up: bool,
    pub flip_left: bool,
}

/// Place `panel` below `anchor`, flipping it above when it would run off the
/// bottom of the viewport and fits above, and pulling it left when it would
/// run off the right edge.  The panel never starts left of the scroll
/// origin.
pub fn place_panel(anchor: Rect, panel: Size, viewport: Viewport) -> Placement {
    let mut top = anchor.bottom() + viewport.scroll_top;
    let mut left = anchor.left + viewport.scroll_left;
    let flip_up =
        top + panel.height > viewport.scroll_top + viewport.height && anchor.top > panel.height;
    if flip_up {
        top = anchor.top + viewport.scroll_top - panel.height - FLIP_GAP;
    }
    let flip_left = left + panel.width > viewport.scroll_left + viewport.width;
    if flip_left {
        left = viewport.scroll_left + viewport.width - panel.width - EDGE_MARGIN;
    }
    left = left.max(viewport.scroll_left);
    Placement {
        top,
        left,
        flip_up,
        flip_left,
    }
}
