//! End-to-end layout scenarios: tree in, grid coordinates out.

use vgrid_core::{ElementId, GlyphMetrics, GridConfig, PageGeometry, SourceRef};
use vgrid_layout::{Container, LayoutMap, Node, SubColumn, normalize, simulate};

fn glyph_node(ch: char) -> Node {
    Node::glyph(GlyphMetrics::new(ch, 20.0, 16.0, 4.0))
}

fn glyphs(n: usize) -> Vec<Node> {
    "天地玄黄宇宙洪荒日月盈昃辰宿列张寒来暑往秋收冬藏"
        .chars()
        .cycle()
        .take(n)
        .map(glyph_node)
        .collect()
}

fn columns_of(map: &LayoutMap) -> Vec<(u16, f64)> {
    map.iter()
        .map(|(_, p)| (p.coord.column, p.coord.row))
        .collect()
}

#[test]
fn ten_glyphs_over_three_columns() {
    let stream = normalize(&[Node::Container(Container::group(glyphs(10)))], 20.0);
    let map = simulate(&stream, &PageGeometry::grid(4, 20.0, 20.0));

    let placed = columns_of(&map);
    let by_column = |c: u16| placed.iter().filter(|p| p.0 == c).count();
    assert_eq!(by_column(0), 4);
    assert_eq!(by_column(1), 4);
    assert_eq!(by_column(2), 2);
    assert_eq!(placed[8], (2, 0.0));
    assert_eq!(placed[9], (2, 1.0));
    assert_eq!(map.page_count(), 1);
}

#[test]
fn reserved_columns_stay_empty() {
    let geometry = GridConfig {
        row_limit: 4,
        reserved_interval: 3,
        ..GridConfig::default()
    }
    .geometry();
    let stream = normalize(&glyphs(20), 20.0);
    let map = simulate(&stream, &geometry);

    let used: Vec<u16> = map.iter().map(|(_, p)| p.coord.column).collect();
    assert!(used.iter().all(|&c| c != 3));
    assert_eq!(used[12], 4);
    assert!(map.pages()[0].reserved.contains(&3));
}

#[test]
fn block_claims_two_columns() {
    let mut tree = vec![Node::Container(Container::block(2, 3, SourceRef(7)))];
    tree.push(glyph_node('文'));
    let stream = normalize(&tree, 20.0);
    let map = simulate(&stream, &PageGeometry::grid(3, 20.0, 20.0));

    let block = map.get(ElementId(0)).expect("block placed");
    assert!(block.is_block);
    assert_eq!((block.width_cells, block.height_cells), (2, 3));
    let next = map.get(ElementId(1)).expect("glyph placed");
    assert_eq!((next.coord.column, next.coord.row), (2, 0.0));
}

#[test]
fn distribute_mode_spreads_column() {
    let geometry = GridConfig {
        row_limit: 6,
        distribute: true,
        ..GridConfig::default()
    }
    .geometry();
    let stream = normalize(&glyphs(3), 20.0);
    let map = simulate(&stream, &geometry);
    let rows: Vec<f64> = map.iter().map(|(_, p)| p.coord.row).collect();
    assert_eq!(rows, vec![0.0, 2.5, 5.0]);
}

fn with_notes(n: usize) -> Vec<Node> {
    let mut tree = glyphs(1);
    let notes: Vec<Node> = (0..n)
        .map(|_| Node::glyph(GlyphMetrics::new('注', 10.0, 8.0, 2.0)))
        .collect();
    tree.push(Node::Container(Container::group(notes).annotated()));
    tree
}

fn note_cells(map: &LayoutMap, notes: usize) -> Vec<(u16, f64, SubColumn)> {
    (1..=notes)
        .map(|i| {
            let p = map.get(ElementId(i as u32)).expect("note placed");
            let sub = p.sub_column.expect("note in a sub-column");
            (p.coord.column, p.coord.row, sub)
        })
        .collect()
}

#[test]
fn annotation_run_of_six_fills_available_rows() {
    // Three rows left, two slots per row: the run ends flush with the column.
    let stream = normalize(&with_notes(6), 20.0);
    let map = simulate(&stream, &PageGeometry::grid(4, 20.0, 20.0));

    use SubColumn::{First, Second};
    assert_eq!(
        note_cells(&map, 6),
        vec![
            (0, 1.0, First),
            (0, 2.0, First),
            (0, 3.0, First),
            (0, 1.0, Second),
            (0, 2.0, Second),
            (0, 3.0, Second),
        ]
    );
}

#[test]
fn annotation_run_of_seven_continues_in_next_column() {
    let stream = normalize(&with_notes(7), 20.0);
    let map = simulate(&stream, &PageGeometry::grid(4, 20.0, 20.0));

    let cells = note_cells(&map, 7);
    assert!(cells[..6].iter().all(|c| c.0 == 0));
    assert_eq!(cells[6], (1, 0.0, SubColumn::First));
}

#[test]
fn annotation_overflow_continues_in_next_column() {
    // One body glyph leaves three rows; thirteen notes need 3 + 4 rows.
    let stream = normalize(&with_notes(13), 20.0);
    let map = simulate(&stream, &PageGeometry::grid(4, 20.0, 20.0));

    let first = map.get(ElementId(1)).expect("placed");
    assert_eq!((first.coord.column, first.coord.row), (0, 1.0));
    assert_eq!(first.sub_column, Some(SubColumn::First));

    let overflow = map.get(ElementId(7)).expect("placed");
    assert_eq!((overflow.coord.column, overflow.coord.row), (1, 0.0));
    assert_eq!(overflow.sub_column, Some(SubColumn::First));

    let last = map.get(ElementId(13)).expect("placed");
    assert_eq!(last.coord.column, 1);
    assert_eq!(last.sub_column, Some(SubColumn::Second));
}

#[test]
fn paragraphs_start_new_columns_with_indent() {
    let tree = vec![
        Node::Container(Container::paragraph(glyphs(5)).with_first_line_indent(2)),
        Node::Container(Container::paragraph(glyphs(2)).with_indent(1)),
    ];
    let stream = normalize(&tree, 20.0);
    let map = simulate(&stream, &PageGeometry::grid(4, 20.0, 20.0));

    let placed = columns_of(&map);
    assert_eq!(placed[0], (0, 2.0));
    assert_eq!(placed[2], (1, 0.0));
    assert_eq!(placed[5], (2, 1.0));
    assert_eq!(placed[6], (2, 2.0));
}

#[test]
fn leading_glue_becomes_indent() {
    let mut children = vec![Node::Glue(40.0)];
    children.extend(glyphs(2));
    let stream = normalize(&[Node::Container(Container::line(children))], 20.0);
    let map = simulate(&stream, &PageGeometry::grid(10, 20.0, 20.0));
    let rows: Vec<f64> = map.iter().map(|(_, p)| p.coord.row).collect();
    assert_eq!(rows, vec![2.0, 3.0]);
}

#[test]
fn empty_stream_yields_empty_map() {
    let stream = normalize(&[], 20.0);
    let map = simulate(&stream, &PageGeometry::default());
    assert_eq!(map.page_count(), 0);
    assert_eq!(map.placed_count(), 0);
}
