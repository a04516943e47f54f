/// A navigation point from an NCX document (hierarchical).
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct NavPoint {
    pub label: String,
    pub href: String,
    pub children: Vec<NavPoint>,
    /// Play order from the NCX `playOrder` attribute. Advisory only.
    pub play_order: Option<usize>,
}

/// A parsed navigation document.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct NavDocument {
    /// Text of `docTitle`, if present.
    pub title: Option<String>,
    pub nav_points: Vec<NavPoint>,
}

/// Depth-first projection of a [`NavPoint`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FlatTocEntry {
    pub title: String,
    /// Nesting level; root nav points are level 1.
    pub level: usize,
    pub href: String,
    pub play_order: Option<usize>,
}

impl NavPoint {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            children: Vec::new(),
            play_order: None,
        }
    }

    pub fn with_child(mut self, child: NavPoint) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_play_order(mut self, order: usize) -> Self {
        self.play_order = Some(order);
        self
    }
}

impl NavDocument {
    /// Flatten the tree in pre-order: every point is immediately followed by
    /// its whole subtree, before its next sibling.
    ///
    /// Sequence order is document order; `play_order` is carried along but
    /// never used to sort.
    pub fn flatten(&self) -> Vec<FlatTocEntry> {
        let mut entries = Vec::new();
        for point in &self.nav_points {
            flatten_into(point, 1, &mut entries);
        }
        entries
    }
}

fn flatten_into(point: &NavPoint, level: usize, out: &mut Vec<FlatTocEntry>) {
    out.push(FlatTocEntry {
        title: point.label.trim().to_string(),
        level,
        href: point.href.clone(),
        play_order: point.play_order,
    });
    for child in &point.children {
        flatten_into(child, level + 1, out);
    }
}
