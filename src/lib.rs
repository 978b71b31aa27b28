mod aquifer;
mod boundary_cond;
mod config;
mod element;
mod errors;
mod invlap;
mod kernel;
mod model;
mod projection;
mod superposition;

pub use aquifer::{AquiferData, AquiferLookup, UniformAquifer};
pub use boundary_cond::{BcKind, BoundaryHistory};
pub use config::{ElementConfig, ModelConfig, ModelSettings};
pub use element::{Element, SolveState};
pub use errors::{ElementError, Result};
pub use invlap::InverseLaplace;
pub use kernel::{ElementKernel, Influence};
pub use model::Model;
pub use projection::{LayerProjector, LayerSelection};

pub use num_complex::Complex;

pub type C64 = Complex<f64>;
