//! A scrollable document of sections standing in for the host page.

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub id: String,
    pub top: f32,
    pub height: f32,
}

#[derive(Clone, Debug)]
pub struct Page {
    sections: Vec<Section>,
    scroll_y: f32,
    viewport_height: f32,
}

impl Page {
    /// Stacks sections top to bottom in the order given.
    pub fn new<I, S>(sections: I, viewport_height: f32) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        let mut top = 0.0;
        let sections = sections
            .into_iter()
            .map(|(id, height)| {
                let section = Section { id: id.into(), top, height };
                top += height;
                section
            })
            .collect();
        Self { sections, scroll_y: 0.0, viewport_height }
    }

    /// Layout of a typical portfolio page, in viewport heights.
    pub fn portfolio(viewport_height: f32) -> Self {
        let vh = viewport_height;
        Self::new(
            [
                ("hero", vh),
                ("about", vh * 0.8),
                ("projects", vh * 1.6),
                ("experience", vh * 1.1),
                ("contact", vh * 0.7),
            ],
            vh,
        )
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    pub fn document_height(&self) -> f32 {
        self.sections.last().map(|s| s.top + s.height).unwrap_or(0.0)
    }

    fn max_scroll(&self) -> f32 {
        (self.document_height() - self.viewport_height).max(0.0)
    }

    /// Scrolls by `delta` pixels, clamped to the document. Returns the new offset.
    pub fn scroll_by(&mut self, delta: f32) -> f32 {
        self.scroll_to(self.scroll_y + delta)
    }

    pub fn scroll_to(&mut self, y: f32) -> f32 {
        self.scroll_y = y.clamp(0.0, self.max_scroll());
        self.scroll_y
    }

    pub fn set_viewport_height(&mut self, viewport_height: f32) {
        self.viewport_height = viewport_height;
        self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll());
    }

    /// Fraction of `section` currently inside the viewport.
    pub fn visibility(&self, section: &Section) -> f32 {
        if section.height <= 0.0 {
            return 0.0;
        }
        let top = section.top.max(self.scroll_y);
        let bottom = (section.top + section.height).min(self.scroll_y + self.viewport_height);
        ((bottom - top) / section.height).clamp(0.0, 1.0)
    }

    pub fn visibilities(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.sections.iter().map(move |s| (s.id.as_str(), self.visibility(s)))
    }
}
