//! Maps Laplace-domain quantities from eigen-parameter space to physical
//! aquifer layers.
//!
//! Every quantity handled here is an `(eigen x npval)` matrix, or a stack of
//! them. Column `p` is projected with the eigenvector matrix of sample `p`.

use nalgebra::DMatrix;

use crate::C64;
use crate::aquifer::AquiferData;
use crate::errors::{ElementError, Result};

/// Which physical layers a caller wants back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayerSelection {
    Single(usize),
    List(Vec<usize>),
    All,
}

impl LayerSelection {
    pub fn resolve(&self, naq: usize) -> Result<Vec<usize>> {
        let layers = match self {
            LayerSelection::Single(layer) => vec![*layer],
            LayerSelection::List(layers) => layers.clone(),
            LayerSelection::All => return Ok((0..naq).collect()),
        };
        match layers.iter().find(|&&layer| layer >= naq) {
            Some(&layer) => Err(ElementError::LayerOutOfRange { layer, naq }),
            None => Ok(layers),
        }
    }
}

impl Default for LayerSelection {
    fn default() -> Self {
        LayerSelection::Single(0)
    }
}

impl From<usize> for LayerSelection {
    fn from(layer: usize) -> Self {
        LayerSelection::Single(layer)
    }
}

impl From<Vec<usize>> for LayerSelection {
    fn from(layers: Vec<usize>) -> Self {
        LayerSelection::List(layers)
    }
}

impl From<&[usize]> for LayerSelection {
    fn from(layers: &[usize]) -> Self {
        LayerSelection::List(layers.to_vec())
    }
}

pub struct LayerProjector<'a> {
    aq: &'a AquiferData,
}

impl<'a> LayerProjector<'a> {
    pub fn new(aq: &'a AquiferData) -> Self {
        LayerProjector { aq }
    }

    /// `(neigen x npval)` to `(naq x npval)`.
    pub fn project(&self, x: &DMatrix<C64>) -> Result<DMatrix<C64>> {
        if x.nrows() != self.aq.neigen() {
            return Err(ElementError::ShapeMismatch {
                what: "eigen-parameter rows",
                expected: self.aq.neigen(),
                found: x.nrows(),
            });
        }
        if x.ncols() != self.aq.npval() {
            return Err(ElementError::ShapeMismatch {
                what: "Laplace samples",
                expected: self.aq.npval(),
                found: x.ncols(),
            });
        }
        let mut out = DMatrix::<C64>::zeros(self.aq.naq(), x.ncols());
        for (p, eigvec) in self.aq.eigvec().iter().enumerate() {
            out.set_column(p, &(eigvec * x.column(p)));
        }
        Ok(out)
    }

    pub fn project_stack(&self, stack: &[DMatrix<C64>]) -> Result<Vec<DMatrix<C64>>> {
        stack.iter().map(|x| self.project(x)).collect()
    }

    /// Projects every matrix of `stack` and keeps the rows in `layers`.
    /// The leading axis of the result still follows `stack`.
    pub fn project_select(
        &self,
        stack: &[DMatrix<C64>],
        layers: &LayerSelection,
    ) -> Result<Vec<DMatrix<C64>>> {
        let rows = layers.resolve(self.aq.naq())?;
        stack
            .iter()
            .map(|x| Ok(select_rows(&self.project(x)?, &rows)))
            .collect()
    }

    /// Projects a per-parameter stack and makes layers the leading axis:
    /// result `[layer]` is an `(nparam x npval)` matrix.
    pub fn project_layer_major(
        &self,
        stack: &[DMatrix<C64>],
        layers: &LayerSelection,
    ) -> Result<Vec<DMatrix<C64>>> {
        let rows = layers.resolve(self.aq.naq())?;
        let projected = self.project_stack(stack)?;
        Ok(swap_leading(&projected, &rows, self.aq.npval()))
    }
}

pub(crate) fn select_rows(m: &DMatrix<C64>, rows: &[usize]) -> DMatrix<C64> {
    DMatrix::from_fn(rows.len(), m.ncols(), |i, j| m[(rows[i], j)])
}

// stack[k] is (rows x npval); result[i] is (stack.len() x npval) taken from row rows[i]
fn swap_leading(stack: &[DMatrix<C64>], rows: &[usize], npval: usize) -> Vec<DMatrix<C64>> {
    rows.iter()
        .map(|&row| DMatrix::from_fn(stack.len(), npval, |k, p| stack[k][(row, p)]))
        .collect()
}
