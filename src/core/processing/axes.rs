use ndarray::{ArrayD, ArrayViewD};

use crate::error::{Error, Result};

/// Resolve a possibly negative axis index against `ndim` dimensions.
pub fn normalize_axis(axis: i64, ndim: usize) -> Result<usize> {
    let n = ndim as i64;
    let resolved = if axis < 0 { axis + n } else { axis };
    if (0..n).contains(&resolved) {
        Ok(resolved as usize)
    } else {
        Err(Error::invalid("channel_axis", axis))
    }
}

/// Move axis `from` to position `to`, shifting the others (numpy `moveaxis`).
/// The result is an owned array in standard layout.
pub fn move_axis<A: Clone>(array: ArrayViewD<'_, A>, from: usize, to: usize) -> ArrayD<A> {
    if from == to {
        return array.to_owned();
    }
    let mut order: Vec<usize> = (0..array.ndim()).filter(|&a| a != from).collect();
    order.insert(to, from);
    array.permuted_axes(order).as_standard_layout().into_owned()
}
