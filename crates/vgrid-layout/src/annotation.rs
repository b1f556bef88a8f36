#![forbid(unsafe_code)]

//! Dual sub-column annotation flow (jiazhu).
//!
//! An annotation run is set as two half-width sub-columns inside the normal
//! column. The run is cut into chunks, one per column; a chunk of `n`
//! glyphs spans `ceil(n / 2)` rows, its first half running down sub-column 0
//! (the right-hand half, read first) and the rest down sub-column 1.
//!
//! ```
//! use vgrid_layout::annotation::{split, SubColumn};
//!
//! // 10 glyphs, 3 rows left in this column, 4 rows in every later column.
//! let chunks = split(10, 3, 4);
//! assert_eq!(chunks.len(), 2);
//! assert_eq!((chunks[0].rows, chunks[0].new_column), (3, false));
//! assert_eq!((chunks[1].rows, chunks[1].new_column), (2, true));
//! assert_eq!(chunks[0].slots[3].sub_column, SubColumn::Second);
//! ```

use smallvec::SmallVec;

/// Which half of the column an annotation glyph occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubColumn {
    /// Right-hand half, read first.
    First,
    /// Left-hand half.
    Second,
}

impl SubColumn {
    /// Numeric index (0 or 1).
    #[inline]
    pub const fn index(self) -> u8 {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

/// Placement of one glyph inside a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JiazhuSlot {
    /// Index of the glyph within the run.
    pub index: usize,
    /// Row relative to the chunk's first row.
    pub relative_row: u16,
    pub sub_column: SubColumn,
}

/// A run segment bound to one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JiazhuChunk {
    /// The chunk starts in a new column rather than the current one.
    pub new_column: bool,
    /// Rows consumed in its column.
    pub rows: u16,
    pub slots: SmallVec<[JiazhuSlot; 16]>,
}

/// Split a run of `count` annotation glyphs into column chunks.
///
/// `available_in_first_column` is the number of rows left below the cursor;
/// `capacity_per_column` is the usable row count of every later column. A
/// chunk never starts with fewer than two rows left in its column, except a
/// terminal chunk of at most two glyphs.
pub fn split(
    count: usize,
    available_in_first_column: u16,
    capacity_per_column: u16,
) -> Vec<JiazhuChunk> {
    let capacity = capacity_per_column.max(1);
    let mut chunks = Vec::new();
    let mut next = 0usize;
    let mut available = available_in_first_column;
    let mut new_column = false;

    while next < count {
        let remaining = count - next;
        // A fresh column is taken as-is even when it is a single row high.
        if available == 0 || (available < 2 && remaining > 2 && !new_column) {
            available = capacity;
            new_column = true;
            continue;
        }

        let take = remaining.min(2 * usize::from(available));
        let rows = take.div_ceil(2);
        let slots = (0..take)
            .map(|i| {
                let (relative_row, sub_column) = if i < rows {
                    (i, SubColumn::First)
                } else {
                    (i - rows, SubColumn::Second)
                };
                JiazhuSlot {
                    index: next + i,
                    relative_row: relative_row as u16,
                    sub_column,
                }
            })
            .collect();

        chunks.push(JiazhuChunk {
            new_column,
            rows: rows as u16,
            slots,
        });

        next += take;
        available = capacity;
        new_column = true;
    }
    chunks
}
