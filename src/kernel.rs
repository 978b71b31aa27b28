use nalgebra::DMatrix;

use crate::C64;
use crate::aquifer::AquiferData;
use crate::errors::{ElementError, Result};

/// Influence arrays of one element: entry `[param]` is an `(naq x npval)`
/// matrix in eigen-parameter space for a unit-strength parameter.
pub type Influence = Vec<DMatrix<C64>>;

/// Closed-form response of one element variant.
///
/// `potinf` and `disinf` are the two influence functions every variant must
/// supply. The defaults fail with [`ElementError::Unimplemented`] so a variant
/// that forgets one never reads as a zero field.
pub trait ElementKernel: Send + Sync {
    /// Variant name, echoed by `Element::write`.
    fn name(&self) -> &str;

    /// Point used to look up the aquifer the element sits in.
    fn control_point(&self) -> (f64, f64);

    /// Unit potential influence, `nparam` matrices of `(naq x npval)`.
    fn potinf(&self, _x: f64, _y: f64, _aq: &AquiferData) -> Result<Influence> {
        Err(ElementError::Unimplemented {
            element: self.name().to_string(),
            capability: "potinf",
        })
    }

    /// Unit discharge influence in x and y, same shapes as `potinf`.
    fn disinf(&self, _x: f64, _y: f64, _aq: &AquiferData) -> Result<(Influence, Influence)> {
        Err(ElementError::Unimplemented {
            element: self.name().to_string(),
            capability: "disinf",
        })
    }

    // Discharge of the element itself per unit parameter, cached at initialize
    fn dischargeinf(&self, _aq: &AquiferData) -> Result<Influence> {
        Err(ElementError::Unimplemented {
            element: self.name().to_string(),
            capability: "dischargeinf",
        })
    }

    // Hook for state that needs the aquifer or other elements to exist
    fn initialize(&mut self, _aq: &AquiferData) -> Result<()> {
        Ok(())
    }

    fn headinside(&self, _t: &[f64]) -> Option<DMatrix<f64>> {
        log::warn!("headinside is not implemented for {}", self.name());
        None
    }

    fn run_after_solve(&mut self) {}

    fn plot(&self) {}
}
