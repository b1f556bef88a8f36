#![forbid(unsafe_code)]

//! Distribute-mode packing.
//!
//! Spreads a column's elements evenly over its available height instead of
//! stacking them one per row.
//!
//! # Model
//!
//! Let `A = H · cell_height` be the available height and `S = Σ hᵢ` the
//! natural heights of the `N` elements.
//!
//! - `S ≤ A`: elements keep their height and are separated by the uniform gap
//!   `g = (A − S) / (N − 1)`, so `Σ hᵢ + (N − 1) · g = A`. A single element
//!   stays at the top.
//! - `S > A`: every height is multiplied by the squeeze factor `s = A / S`
//!   (`s < 1`) and each element is centered in an equal share `A / N`.

/// Placement computed for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    /// Offset of each element from the column start, in rows.
    pub rows: Vec<f64>,
    /// Gap between consecutive elements, in points (0 when squeezed).
    pub gap: f64,
    /// Vertical scale applied to every element (1 unless squeezed).
    pub scale: f64,
}

/// Distribute elements with the given natural `heights` (points) over
/// `available_rows` rows of `cell_height` points.
pub fn distribute(heights: &[f64], available_rows: u16, cell_height: f64) -> Distribution {
    let n = heights.len();
    if n == 0 || cell_height <= 0.0 {
        return Distribution {
            rows: Vec::new(),
            gap: 0.0,
            scale: 1.0,
        };
    }

    let available = f64::from(available_rows) * cell_height;
    let total: f64 = heights.iter().map(|h| h.max(0.0)).sum();

    if total <= available {
        let gap = if n > 1 {
            (available - total) / (n - 1) as f64
        } else {
            0.0
        };
        let mut offset = 0.0;
        let rows = heights
            .iter()
            .map(|h| {
                let row = offset / cell_height;
                offset += h.max(0.0) + gap;
                row
            })
            .collect();
        return Distribution {
            rows,
            gap,
            scale: 1.0,
        };
    }

    let scale = available / total;
    let share = available / n as f64;
    let rows = heights
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let scaled = h.max(0.0) * scale;
            (i as f64 * share + (share - scaled) / 2.0) / cell_height
        })
        .collect();
    Distribution {
        rows,
        gap: 0.0,
        scale,
    }
}
