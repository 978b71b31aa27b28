use std::sync::Arc;

use nalgebra::DMatrix;

use crate::C64;
use crate::errors::{ElementError, Result};

// Eigen decomposition of one aquifer system, as delivered by the aquifer collaborator
#[derive(Clone, Debug)]
pub struct AquiferData {
    // One (layers x eigen-parameters) matrix per Laplace sample
    eigvec: Vec<DMatrix<C64>>,
}

impl AquiferData {
    pub fn new(eigvec: Vec<DMatrix<C64>>) -> Result<Self> {
        let first = eigvec.first().ok_or(ElementError::ShapeMismatch {
            what: "eigvec Laplace samples",
            expected: 1,
            found: 0,
        })?;
        let (rows, cols) = first.shape();
        for matrix in &eigvec {
            if matrix.nrows() != rows {
                return Err(ElementError::ShapeMismatch {
                    what: "eigvec layers",
                    expected: rows,
                    found: matrix.nrows(),
                });
            }
            if matrix.ncols() != cols {
                return Err(ElementError::ShapeMismatch {
                    what: "eigvec eigen-parameters",
                    expected: cols,
                    found: matrix.ncols(),
                });
            }
        }
        Ok(AquiferData { eigvec })
    }

    // Aquifer whose eigen-parameters coincide with its layers
    pub fn identity(naq: usize, npval: usize) -> Result<Self> {
        Self::new(vec![DMatrix::identity(naq, naq); npval])
    }

    /// Number of physical layers.
    pub fn naq(&self) -> usize {
        self.eigvec[0].nrows()
    }

    /// Number of eigen-parameters per Laplace sample.
    pub fn neigen(&self) -> usize {
        self.eigvec[0].ncols()
    }

    pub fn npval(&self) -> usize {
        self.eigvec.len()
    }

    pub fn eigvec(&self) -> &[DMatrix<C64>] {
        &self.eigvec
    }
}

/// Spatial lookup of the aquifer present at a point.
///
/// Must be deterministic and free of side effects: the same point always
/// yields the same eigen decomposition.
pub trait AquiferLookup: Send + Sync {
    fn find_aquifer_data(&self, x: f64, y: f64) -> Arc<AquiferData>;
}

// A single aquifer covering the whole plane
pub struct UniformAquifer {
    data: Arc<AquiferData>,
}

impl UniformAquifer {
    pub fn new(data: AquiferData) -> Self {
        UniformAquifer {
            data: Arc::new(data),
        }
    }
}

impl AquiferLookup for UniformAquifer {
    fn find_aquifer_data(&self, _x: f64, _y: f64) -> Arc<AquiferData> {
        Arc::clone(&self.data)
    }
}
