#![forbid(unsafe_code)]

//! Coordinate renderer.
//!
//! Converts a [`LayoutMap`] into one [`RenderedPage`] per page: absolute
//! glyph and block positions with right-to-left column order, followed by
//! the page-level ornaments of [`crate::decor`].

use tracing::{debug, debug_span, trace, warn};
use vgrid_core::{
    AttributeRegistry, Attributes, ContentStream, DecorationRecord, ElementId,
    ElementKind, GlyphMetrics, HorizontalAlign, PageGeometry, Point, Rect, SourceRef,
    SubColumnAlign, VerticalAlign,
};
use vgrid_layout::{LayoutMap, PageSummary, Placement, SubColumn};

use crate::decor::{
    self, Background, ColumnBorders, DebugGrid, Drawer, OuterFrame, ReservedColumns,
};
use crate::instruction::{Content, Draw, DrawInstruction, RenderedPage};
use crate::mapping::{PageCounter, PageFrame};

/// Renders layout maps against one geometry and registry.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    geometry: &'a PageGeometry,
    registry: &'a AttributeRegistry,
}

impl<'a> Renderer<'a> {
    pub fn new(geometry: &'a PageGeometry, registry: &'a AttributeRegistry) -> Self {
        Self { geometry, registry }
    }

    /// Render every page of `map`. Each page consumes one number from
    /// `counter`.
    pub fn render(
        &self,
        stream: &ContentStream,
        map: &LayoutMap,
        counter: &mut PageCounter,
    ) -> Vec<RenderedPage> {
        let _span = debug_span!("render", pages = map.page_count()).entered();
        report_unplaced(stream, map);

        let groups = map.by_page();
        map.pages()
            .iter()
            .enumerate()
            .map(|(index, summary)| {
                let index = index as u32;
                let ids = groups.get(&index).map_or(&[][..], Vec::as_slice);
                self.render_page(stream, map, summary, index, counter.take(), ids)
            })
            .collect()
    }

    fn render_page(
        &self,
        stream: &ContentStream,
        map: &LayoutMap,
        summary: &PageSummary,
        index: u32,
        page_number: u32,
        ids: &[ElementId],
    ) -> RenderedPage {
        let frame = PageFrame::new(self.geometry, summary, index, page_number);
        let mut out: Vec<DrawInstruction> = Vec::new();
        let underlay: [&dyn Drawer; 4] =
            [&Background, &ColumnBorders, &ReservedColumns, &OuterFrame];
        for drawer in underlay {
            drawer.draw(&frame, &mut out);
        }

        let mut boxes = Vec::new();
        for &id in ids {
            let (Some(element), Some(placement)) = (stream.get(id), map.get(id)) else {
                continue;
            };
            let mut page = PageContent {
                renderer: self,
                frame: &frame,
                out: &mut out,
                boxes: &mut boxes,
            };
            page.element(id, &element.kind, &element.attrs, placement);
        }

        if !self.geometry.overlay.is_empty() {
            DebugGrid { boxes: &boxes }.draw(&frame, &mut out);
        }

        let (width, height) = frame.page_size();
        debug!(
            page = index,
            page_number,
            columns = frame.total_columns,
            instructions = out.len(),
            "page rendered"
        );
        RenderedPage {
            index,
            page_number,
            width,
            height,
            total_columns: frame.total_columns,
            instructions: out,
        }
    }
}

/// Log every element that should have a coordinate but has none.
fn report_unplaced(stream: &ContentStream, map: &LayoutMap) {
    for (id, element) in stream.iter() {
        let expects_coordinate = !matches!(
            element.kind,
            ElementKind::Spacing { .. } | ElementKind::Break(_)
        );
        if expects_coordinate && map.get(id).is_none() {
            warn!(
                element = id.0,
                kind = element.kind.name(),
                "element has no grid coordinate, dropped"
            );
        }
    }
}

/// Horizontal alignment of an annotation glyph inside its half column.
fn sub_column_align(policy: SubColumnAlign, sub: SubColumn) -> HorizontalAlign {
    match (policy, sub) {
        (SubColumnAlign::Center, _) => HorizontalAlign::Center,
        (SubColumnAlign::Outward, SubColumn::First)
        | (SubColumnAlign::Inward, SubColumn::Second) => HorizontalAlign::End,
        (SubColumnAlign::Outward, SubColumn::Second)
        | (SubColumnAlign::Inward, SubColumn::First) => HorizontalAlign::Start,
    }
}

/// Cell slot a glyph is aligned in.
#[derive(Debug, Clone, Copy)]
struct Slot {
    x: f64,
    width: f64,
    top: f64,
}

/// Per-page emission state.
struct PageContent<'r, 'f> {
    renderer: &'r Renderer<'r>,
    frame: &'f PageFrame<'f>,
    out: &'f mut Vec<DrawInstruction>,
    boxes: &'f mut Vec<Rect>,
}

impl PageContent<'_, '_> {
    fn element(&mut self, id: ElementId, kind: &ElementKind, attrs: &Attributes, p: &Placement) {
        match kind {
            ElementKind::Glyph(metrics) => self.glyph(id, metrics, attrs, p),
            ElementKind::Block { source, .. } => self.block(id, *source, p),
            ElementKind::Decoration(decoration) => {
                let registry = self.renderer.registry;
                match registry.decoration(*decoration) {
                    Some(record) => {
                        let slot = self.slot(p, None);
                        self.mark(id, record, slot);
                    }
                    None => warn!(element = id.0, decoration = decoration.0, "unknown decoration"),
                }
            }
            ElementKind::Float(float) => {
                decor::margin::float_block(self.frame, id, float, &mut *self.out);
            }
            ElementKind::SideNote(note) => {
                decor::margin::side_note(
                    self.frame,
                    self.renderer.registry,
                    id,
                    note,
                    p,
                    &mut *self.out,
                );
            }
            ElementKind::Spacing { .. } | ElementKind::Break(_) => {
                trace!(element = id.0, "zero-size element ignored");
            }
        }
    }

    fn slot(&self, p: &Placement, sub: Option<SubColumn>) -> Slot {
        let g = self.renderer.geometry;
        let column_x = self.frame.column_x(p.coord.column);
        let top = self.frame.row_y(p.coord.row) - f64::from(p.elevation) * g.cell_height;
        let half = g.cell_width / 2.0;
        match sub {
            None => Slot {
                x: column_x,
                width: g.cell_width,
                top,
            },
            // The first sub-column is the right-hand half, read first.
            Some(SubColumn::First) => Slot {
                x: column_x + half,
                width: half,
                top,
            },
            Some(SubColumn::Second) => Slot {
                x: column_x,
                width: half,
                top,
            },
        }
    }

    fn glyph(&mut self, id: ElementId, m: &GlyphMetrics, attrs: &Attributes, p: &Placement) {
        let g = self.renderer.geometry;
        let registry = self.renderer.registry;
        let style = attrs.style.and_then(|s| registry.style(s));
        let color = style.and_then(|s| s.color).unwrap_or(g.font_color);
        let size = style.and_then(|s| s.font_size);

        let slot = self.slot(p, p.sub_column);
        let align = match p.sub_column {
            Some(sub) => sub_column_align(g.annotation_align, sub),
            None => style.and_then(|s| s.align).unwrap_or(g.horizontal_align),
        };
        let x = slot.x
            + match align {
                HorizontalAlign::Start => 0.0,
                HorizontalAlign::Center => (slot.width - m.width) / 2.0,
                HorizontalAlign::End => slot.width - m.width,
            };

        let scale = p.vertical_scale;
        let (ascent, descent) = (m.height * scale, m.depth * scale);
        // Distributed rows already name the glyph's top edge.
        let align = if p.respaced {
            VerticalAlign::Top
        } else {
            g.vertical_align
        };
        let baseline = match align {
            VerticalAlign::Top => slot.top + ascent,
            VerticalAlign::Center => slot.top + (g.cell_height - ascent - descent) / 2.0 + ascent,
            VerticalAlign::Bottom => slot.top + g.cell_height - descent,
        };

        self.out.place(
            Some(id),
            Point::new(x, baseline),
            (1.0, scale),
            Content::Glyph {
                ch: m.ch,
                color,
                size,
            },
        );
        self.out.kern(id, -m.width);
        self.boxes
            .push(Rect::new(x, baseline - ascent, m.width, ascent + descent));

        if let Some(decoration) = attrs.decoration {
            match registry.decoration(decoration) {
                Some(record) => self.mark(id, record, slot),
                None => trace!(
                    element = id.0,
                    decoration = decoration.0,
                    "decoration not registered"
                ),
            }
        }
    }

    fn mark(&mut self, id: ElementId, record: &DecorationRecord, slot: Slot) {
        let ch = self.renderer.geometry.cell_height;
        let at = Point::new(
            slot.x + slot.width * (0.5 + record.x_offset),
            slot.top + ch * (0.5 + record.y_offset),
        );
        let scale = if record.scale.is_finite() && record.scale > 0.0 {
            record.scale
        } else {
            1.0
        };
        self.out.place(
            Some(id),
            at,
            (scale, scale),
            Content::Mark {
                ch: record.glyph,
                color: record.color,
            },
        );
    }

    fn block(&mut self, id: ElementId, source: SourceRef, p: &Placement) {
        let g = self.renderer.geometry;
        let width = f64::from(p.width_cells) * g.cell_width;
        let height = f64::from(p.height_cells) * g.cell_height;
        // Anchored at its top-left cell: the last logical column is leftmost.
        let last = p.coord.column + p.width_cells.saturating_sub(1);
        let x = self.frame.column_x(last);
        let y = self.frame.row_y(p.coord.row) - f64::from(p.elevation) * g.cell_height;

        self.out.place(
            Some(id),
            Point::new(x, y),
            (1.0, p.vertical_scale),
            Content::Source {
                source,
                width,
                height,
            },
        );
        self.out.kern(id, -width);
        self.boxes.push(Rect::new(x, y, width, height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vgrid_core::{Color, ContentElement, DecorationRecord, GridConfig, StyleRecord};
    use vgrid_layout::simulate;

    fn glyph(ch: char) -> ContentElement {
        ContentElement::bare(ElementKind::Glyph(GlyphMetrics::new(ch, 20.0, 16.0, 4.0)))
    }

    fn render(
        stream: &ContentStream,
        geometry: &PageGeometry,
        registry: &AttributeRegistry,
    ) -> Vec<RenderedPage> {
        let map = simulate(stream, geometry);
        Renderer::new(geometry, registry).render(stream, &map, &mut PageCounter::default())
    }

    fn placed_at(page: &RenderedPage, id: u32) -> Option<Point> {
        page.instructions_for(ElementId(id)).find_map(|i| match i {
            DrawInstruction::Place { at, .. } | DrawInstruction::Scaled { at, .. } => Some(*at),
            _ => None,
        })
    }

    #[test]
    fn columns_read_right_to_left() {
        let geometry = PageGeometry::grid(2, 20.0, 20.0);
        let stream: ContentStream = "天地玄".chars().map(glyph).collect();
        let pages = render(&stream, &geometry, &AttributeRegistry::new());
        let page = &pages[0];
        assert_eq!(page.total_columns, 2);

        let first = placed_at(page, 0).expect("placed");
        let third = placed_at(page, 2).expect("placed");
        // Column 0 is the right one; glyphs are centered in their cells.
        assert_eq!(first, Point::new(36.0 + 20.0, 36.0 + 16.0));
        assert_eq!(third, Point::new(36.0, 36.0 + 16.0));
    }

    #[test]
    fn every_glyph_is_followed_by_kern() {
        let geometry = PageGeometry::grid(4, 20.0, 20.0);
        let stream: ContentStream = "天地".chars().map(glyph).collect();
        let pages = render(&stream, &geometry, &AttributeRegistry::new());
        assert_eq!(pages[0].instructions_for(ElementId(1)).count(), 2);
        assert!(matches!(
            pages[0].instructions_for(ElementId(1)).last(),
            Some(DrawInstruction::Kern { advance, .. }) if *advance == -20.0
        ));
    }

    #[test]
    fn vertical_alignment_policies() {
        let stream: ContentStream = std::iter::once(glyph('中')).collect();
        let mut baselines = Vec::new();
        for align in [VerticalAlign::Top, VerticalAlign::Center, VerticalAlign::Bottom] {
            let geometry = GridConfig {
                vertical_align: align,
                cell_height: 30.0,
                ..GridConfig::default()
            }
            .geometry();
            let pages = render(&stream, &geometry, &AttributeRegistry::new());
            baselines.push(placed_at(&pages[0], 0).expect("placed").y - 36.0);
        }
        assert_eq!(baselines, vec![16.0, 21.0, 26.0]);
    }

    #[test]
    fn style_overrides_color_and_alignment() {
        let mut registry = AttributeRegistry::new();
        let style = registry.register_style(StyleRecord {
            color: Some(Color::RED),
            font_size: Some(12.0),
            align: Some(HorizontalAlign::Start),
        });
        let geometry = GridConfig {
            cell_width: 30.0,
            ..GridConfig::default()
        }
        .geometry();
        let attrs = Attributes {
            style: Some(style),
            ..Attributes::default()
        };
        let stream: ContentStream = std::iter::once(ContentElement::new(
            ElementKind::Glyph(GlyphMetrics::new('紅', 20.0, 16.0, 4.0)),
            attrs,
        ))
        .collect();
        let pages = render(&stream, &geometry, &registry);
        let place = pages[0].instructions_for(ElementId(0)).next().expect("placed");
        assert_eq!(
            place,
            &DrawInstruction::Place {
                element: Some(ElementId(0)),
                at: Point::new(36.0, 36.0 + 16.0),
                content: Content::Glyph {
                    ch: '紅',
                    color: Color::RED,
                    size: Some(12.0),
                },
            }
        );
    }

    #[test]
    fn annotation_halves_align_outward() {
        let note = Attributes {
            annotation: true,
            ..Attributes::default()
        };
        let stream: ContentStream = (0..2)
            .map(|_| {
                ContentElement::new(
                    ElementKind::Glyph(GlyphMetrics::new('注', 8.0, 8.0, 2.0)),
                    note,
                )
            })
            .collect();
        let pages = render(&stream, &PageGeometry::grid(4, 20.0, 20.0), &AttributeRegistry::new());
        let right = placed_at(&pages[0], 0).expect("placed");
        let left = placed_at(&pages[0], 1).expect("placed");
        assert_eq!(right.x, 36.0 + 20.0 - 8.0);
        assert_eq!(left.x, 36.0);
        assert_eq!(right.y, left.y);
    }

    #[test]
    fn decorated_glyph_gets_overlay() {
        let mut registry = AttributeRegistry::new();
        let dot = registry.register_decoration(DecorationRecord::mark('、', Color::RED));
        let attrs = Attributes {
            decoration: Some(dot),
            ..Attributes::default()
        };
        let stream: ContentStream = std::iter::once(ContentElement::new(
            ElementKind::Glyph(GlyphMetrics::new('圈', 20.0, 16.0, 4.0)),
            attrs,
        ))
        .collect();
        let pages = render(&stream, &PageGeometry::default(), &registry);
        let last = pages[0].instructions_for(ElementId(0)).last().expect("emitted");
        assert_eq!(
            last,
            &DrawInstruction::Place {
                element: Some(ElementId(0)),
                at: Point::new(46.0, 46.0),
                content: Content::Mark {
                    ch: '、',
                    color: Color::RED,
                },
            }
        );
    }

    #[test]
    fn block_is_anchored_at_top_left_cell() {
        let stream: ContentStream = vec![
            glyph('一'),
            ContentElement::bare(ElementKind::Break(vgrid_core::BreakKind::Column)),
            ContentElement::bare(ElementKind::Block {
                width_cells: 2,
                height_cells: 2,
                source: SourceRef(5),
            }),
        ]
        .into_iter()
        .collect();
        let pages = render(&stream, &PageGeometry::grid(4, 20.0, 20.0), &AttributeRegistry::new());
        let page = &pages[0];
        assert_eq!(page.total_columns, 3);
        // Logical columns 1..=2 map to physical 1..=0; the left edge is physical 0.
        assert_eq!(placed_at(page, 2), Some(Point::new(36.0, 36.0)));
        assert!(matches!(
            page.instructions_for(ElementId(2)).last(),
            Some(DrawInstruction::Kern { advance, .. }) if *advance == -40.0
        ));
    }

    #[test]
    fn squeezed_glyphs_are_scaled() {
        let geometry = GridConfig {
            row_limit: 2,
            distribute: true,
            ..GridConfig::default()
        }
        .geometry();
        let stream: ContentStream = (0..2)
            .map(|_| {
                ContentElement::bare(ElementKind::Glyph(GlyphMetrics::new('高', 20.0, 32.0, 8.0)))
            })
            .collect();
        let pages = render(&stream, &geometry, &AttributeRegistry::new());
        assert!(pages[0].instructions.iter().any(|i| matches!(
            i,
            DrawInstruction::Scaled { scale_y, .. } if *scale_y == 0.5
        )));
    }

    #[test]
    fn top_alignment_only_for_respaced_columns() {
        let geometry = GridConfig {
            row_limit: 4,
            cell_height: 30.0,
            distribute: true,
            ..GridConfig::default()
        }
        .geometry();
        let registry = AttributeRegistry::new();

        let spread: ContentStream = std::iter::once(glyph('中')).collect();
        let pages = render(&spread, &geometry, &registry);
        assert_eq!(placed_at(&pages[0], 0).map(|p| p.y), Some(36.0 + 16.0));

        // A column holding a block keeps its rows and the center policy.
        let with_block: ContentStream = vec![
            ContentElement::bare(ElementKind::Block {
                width_cells: 1,
                height_cells: 1,
                source: SourceRef(1),
            }),
            glyph('中'),
        ]
        .into_iter()
        .collect();
        let pages = render(&with_block, &geometry, &registry);
        assert_eq!(placed_at(&pages[0], 1).map(|p| p.y), Some(36.0 + 30.0 + 21.0));
    }

    #[test]
    fn page_numbers_continue() {
        let geometry = GridConfig {
            row_limit: 1,
            page_columns: 1,
            ..GridConfig::default()
        }
        .geometry();
        let stream: ContentStream = "一二".chars().map(glyph).collect();
        let map = simulate(&stream, &geometry);
        let registry = AttributeRegistry::new();
        let mut counter = PageCounter::new(7);
        let pages = Renderer::new(&geometry, &registry).render(&stream, &map, &mut counter);
        let numbers: Vec<u32> = pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![7, 8]);
        assert_eq!(counter.peek(), 9);
    }
}
