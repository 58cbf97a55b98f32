//! Row-parallel raster fill, with or without rayon.
//!
//! Every engine stage computes each output cell from the same-position input
//! cells only, so rows can be filled independently. With the `parallel`
//! feature rows are spread over rayon's pool; without it (e.g. WASM builds)
//! they are filled in order. Results are identical either way.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Allocate `rows * cols` cells of `init` and let `fill(row, row_cells)`
/// write each row.
pub(crate) fn fill_rows<T, F>(rows: usize, cols: usize, init: T, fill: F) -> Vec<T>
where
    T: Clone + Send + Sync,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    let mut out = vec![init; rows * cols];
    if out.is_empty() {
        return out;
    }

    #[cfg(feature = "parallel")]
    out.par_chunks_mut(cols)
        .enumerate()
        .for_each(|(row, cells)| fill(row, cells));

    #[cfg(not(feature = "parallel"))]
    out.chunks_mut(cols)
        .enumerate()
        .for_each(|(row, cells)| fill(row, cells));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_row_once() {
        let out = fill_rows(3, 4, 0usize, |row, cells| {
            for (col, c) in cells.iter_mut().enumerate() {
                *c = row * 10 + col;
            }
        });
        assert_eq!(out.len(), 12);
        assert_eq!(out[0], 0);
        assert_eq!(out[5], 11);
        assert_eq!(out[11], 23);
    }

    #[test]
    fn empty_shape_yields_empty_vec() {
        assert!(fill_rows(0, 5, 1u8, |_, _| {}).is_empty());
        assert!(fill_rows(5, 0, 1u8, |_, _| {}).is_empty());
    }
}
