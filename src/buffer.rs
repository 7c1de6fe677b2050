//! Fixed-capacity, variably-occupied component storage
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Row-major storage for up to `n_max` component vectors of `ndim` fields,
/// of which only the first `n` rows are live.
///
/// The backing store is allocated once at construction; births, deaths, and
/// perturbations never allocate. Rows at index >= `n` hold stale values and
/// are never exposed by the read accessors.
///
/// # Example
///
/// ```
/// use rjmc::buffer::ComponentBuffer;
///
/// let mut buf = ComponentBuffer::new(4, 2);
/// assert!(buf.is_empty());
///
/// buf.push_row().copy_from_slice(&[1.0, 2.0]);
/// buf.push_row().copy_from_slice(&[3.0, 4.0]);
/// assert_eq!(buf.n(), 2);
///
/// buf.swap_remove(0);
/// assert_eq!(buf.n(), 1);
/// assert_eq!(buf.row(0), &[3.0, 4.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct ComponentBuffer {
    data: Vec<f64>,
    ndim: usize,
    n_max: usize,
    n: usize,
}

impl ComponentBuffer {
    /// Create an empty buffer with room for `n_max` rows of `ndim` fields
    ///
    /// # Panics
    ///
    /// Panics if `n_max` or `ndim` is zero.
    pub fn new(n_max: usize, ndim: usize) -> Self {
        assert!(n_max > 0, "n_max must be at least 1");
        assert!(ndim > 0, "ndim must be at least 1");
        ComponentBuffer {
            data: vec![0.0; n_max * ndim],
            ndim,
            n_max,
            n: 0,
        }
    }

    /// Number of live rows
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Row capacity
    #[inline]
    pub fn n_max(&self) -> usize {
        self.n_max
    }

    /// Fields per row
    #[inline]
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.n == self.n_max
    }

    /// Read one live row
    ///
    /// # Panics
    ///
    /// Panics if `ix` is outside the live region.
    #[inline]
    pub fn row(&self, ix: usize) -> &[f64] {
        assert!(ix < self.n, "row {} is outside the live region (n = {})", ix, self.n);
        &self.data[ix * self.ndim..(ix + 1) * self.ndim]
    }

    /// Mutable access to one live row
    #[inline]
    pub fn row_mut(&mut self, ix: usize) -> &mut [f64] {
        assert!(ix < self.n, "row {} is outside the live region (n = {})", ix, self.n);
        &mut self.data[ix * self.ndim..(ix + 1) * self.ndim]
    }

    /// The whole live region as one contiguous row-major slice
    #[inline]
    pub fn valid(&self) -> &[f64] {
        &self.data[..self.n * self.ndim]
    }

    /// Iterate over the live rows
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.valid().chunks_exact(self.ndim)
    }

    /// Grow the live region by one row and return it for the caller to fill.
    ///
    /// The returned row holds stale values until written.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is full.
    pub fn push_row(&mut self) -> &mut [f64] {
        assert!(self.n < self.n_max, "buffer is full (n_max = {})", self.n_max);
        self.n += 1;
        self.row_mut(self.n - 1)
    }

    /// Swap two live rows in place
    pub fn swap_rows(&mut self, i: usize, j: usize) {
        assert!(i < self.n && j < self.n, "swap outside the live region");
        if i == j {
            return;
        }
        for k in 0..self.ndim {
            self.data.swap(i * self.ndim + k, j * self.ndim + k);
        }
    }

    /// Remove row `ix` in O(1) by swapping the last live row into its place
    /// and shrinking the live region.
    ///
    /// Row order is not preserved.
    pub fn swap_remove(&mut self, ix: usize) {
        assert!(ix < self.n, "row {} is outside the live region (n = {})", ix, self.n);
        self.swap_rows(ix, self.n - 1);
        self.n -= 1;
    }

    /// Set the live count directly.
    ///
    /// Used for rollback; rows re-exposed by growing `n` hold whatever was
    /// last written there.
    pub(crate) fn set_len(&mut self, n: usize) {
        assert!(n <= self.n_max, "n = {} exceeds n_max = {}", n, self.n_max);
        self.n = n;
    }
}
