//! Point filters applied to raw pointer coordinates before a tool uses them.
//!
//! Filters run in order and the first one that adjusts the coordinate wins;
//! later filters are skipped for that event.

use kurbo::{Line, Point, Vec2};

use crate::document::Document;
use crate::geometry::{distance, project_on_line, segment_intersection, snap_to_grid};
use crate::graph::distinct_points;
use crate::settings::EditorSettings;

/// What a filter may look at while processing a coordinate.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    pub document: &'a Document,
    pub settings: &'a EditorSettings,
}

impl<'a> FilterContext<'a> {
    pub fn new(document: &'a Document, settings: &'a EditorSettings) -> Self {
        Self { document, settings }
    }
}

/// A stage in the point filter pipeline.
pub trait PointFilter: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Adjust `point` in place. Returns true when the point was changed.
    fn process(&mut self, ctx: &FilterContext<'_>, point: &mut Point) -> bool;

    /// Drop any guide visuals left by the last `process` call.
    fn clear(&mut self);

    /// Guide lines to draw for the last snap.
    fn guides(&self) -> &[Line] {
        &[]
    }
}

/// Rounds coordinates to the grid.
#[derive(Debug, Default)]
pub struct GridFilter;

impl PointFilter for GridFilter {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn process(&mut self, ctx: &FilterContext<'_>, point: &mut Point) -> bool {
        if !ctx.settings.grid_snap {
            return false;
        }
        let snapped = snap_to_grid(*point, ctx.settings.grid_pitch, ctx.settings.grid_origin);
        if snapped == *point {
            return false;
        }
        *point = snapped;
        true
    }

    fn clear(&mut self) {}
}

/// Snaps to document points, guide endpoints and guide crossings, then onto
/// guide lines themselves.
#[derive(Debug, Default)]
pub struct LineSnapFilter {
    guides: Vec<Line>,
}

impl LineSnapFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidate snap targets, in priority order within equal distance.
    fn targets(document: &Document, guides: &[Line]) -> Vec<Point> {
        let mut targets: Vec<Point> = distinct_points(&document.shapes)
            .into_iter()
            .filter_map(|p| document.points.position(p))
            .collect();
        for guide in guides {
            targets.push(guide.p0);
            targets.push(guide.p1);
        }
        for (i, a) in guides.iter().enumerate() {
            for b in &guides[i + 1..] {
                if let Some((p, _, _)) = segment_intersection(a.p0, a.p1, b.p0, b.p1) {
                    targets.push(p);
                }
            }
        }
        targets
    }

    fn mark(&mut self, target: Point, size: f64) {
        let dx = Vec2::new(size, 0.0);
        let dy = Vec2::new(0.0, size);
        self.guides.push(Line::new(target - dx, target + dx));
        self.guides.push(Line::new(target - dy, target + dy));
    }
}

impl PointFilter for LineSnapFilter {
    fn name(&self) -> &'static str {
        "line"
    }

    fn process(&mut self, ctx: &FilterContext<'_>, point: &mut Point) -> bool {
        self.guides.clear();
        if !ctx.settings.line_snap {
            return false;
        }
        let threshold = ctx.settings.line_snap_threshold;
        let document = ctx.document;
        let guide_lines: Vec<Line> = document
            .guides
            .iter()
            .filter_map(|g| g.geometry(&document.points))
            .collect();

        let nearest = Self::targets(document, &guide_lines)
            .into_iter()
            .map(|t| (t, distance(t, *point)))
            .filter(|(_, d)| *d <= threshold)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((target, _)) = nearest {
            self.mark(target, threshold);
            let changed = target != *point;
            *point = target;
            return changed;
        }

        let projected = guide_lines
            .iter()
            .map(|line| (*line, project_on_line(*point, *line).0))
            .map(|(line, p)| (line, p, distance(p, *point)))
            .filter(|(_, _, d)| *d <= threshold)
            .min_by(|a, b| a.2.total_cmp(&b.2));
        match projected {
            Some((line, target, _)) => {
                self.guides.push(line);
                let changed = target != *point;
                *point = target;
                changed
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.guides.clear();
    }

    fn guides(&self) -> &[Line] {
        &self.guides
    }
}

/// Ordered list of filters with "first adjustment wins" semantics.
#[derive(Debug)]
pub struct FilterPipeline {
    filters: Vec<Box<dyn PointFilter>>,
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new(vec![Box::new(GridFilter), Box::new(LineSnapFilter::new())])
    }
}

impl FilterPipeline {
    pub fn new(filters: Vec<Box<dyn PointFilter>>) -> Self {
        Self { filters }
    }

    pub fn push(&mut self, filter: Box<dyn PointFilter>) {
        self.filters.push(filter);
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.filters.iter().map(|f| f.name())
    }

    /// Run the filters over `point`. Returns whether any filter adjusted it.
    pub fn apply(&mut self, ctx: &FilterContext<'_>, point: &mut Point) -> bool {
        self.clear();
        self.filters.iter_mut().any(|f| f.process(ctx, point))
    }

    pub fn clear(&mut self) {
        for filter in &mut self.filters {
            filter.clear();
        }
    }

    /// Guide visuals of every filter.
    pub fn guides(&self) -> Vec<Line> {
        self.filters
            .iter()
            .flat_map(|f| f.guides().iter().copied())
            .collect()
    }
}
