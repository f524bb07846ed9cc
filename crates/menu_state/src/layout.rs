use serde::Serialize;

/// Viewports narrower than this many logical pixels use the compact layout.
pub const DEFAULT_COMPACT_BREAKPOINT: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    Compact,
    Expanded,
}

impl LayoutMode {
    pub fn from_compact(is_compact: bool) -> Self {
        if is_compact {
            Self::Compact
        } else {
            Self::Expanded
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoint {
    width: u32,
}

impl Breakpoint {
    pub const fn new(width: u32) -> Self {
        Self { width }
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn is_compact(self, viewport_width: u32) -> bool {
        viewport_width < self.width
    }

    pub fn layout_for(self, viewport_width: u32) -> LayoutMode {
        LayoutMode::from_compact(self.is_compact(viewport_width))
    }
}

impl Default for Breakpoint {
    fn default() -> Self {
        Self::new(DEFAULT_COMPACT_BREAKPOINT)
    }
}
