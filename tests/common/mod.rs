//! Stub kernels and inverse transforms with hand-computable answers.

#![allow(dead_code)]

use std::sync::Arc;

use nalgebra::DMatrix;
use ttim_element::{
    AquiferData, AquiferLookup, C64, ElementKernel, Influence, InverseLaplace, Model,
    ModelSettings, Result, UniformAquifer,
};

/// Unit influence of 1 in every eigen-parameter, layer and sample.
pub struct UnitKernel {
    pub nparam: usize,
}

impl UnitKernel {
    pub fn boxed(nparam: usize) -> Box<dyn ElementKernel> {
        Box::new(UnitKernel { nparam })
    }

    fn ones(&self, aq: &AquiferData) -> Influence {
        vec![DMatrix::from_element(aq.neigen(), aq.npval(), C64::new(1.0, 0.0)); self.nparam]
    }
}

impl ElementKernel for UnitKernel {
    fn name(&self) -> &str {
        "UnitKernel"
    }

    fn control_point(&self) -> (f64, f64) {
        (0.0, 0.0)
    }

    fn potinf(&self, _x: f64, _y: f64, aq: &AquiferData) -> Result<Influence> {
        Ok(self.ones(aq))
    }

    fn disinf(&self, _x: f64, _y: f64, aq: &AquiferData) -> Result<(Influence, Influence)> {
        Ok((self.ones(aq), self.ones(aq)))
    }

    fn dischargeinf(&self, aq: &AquiferData) -> Result<Influence> {
        Ok(self.ones(aq))
    }
}

/// Self-discharge taken verbatim from a fixed influence.
pub struct FixedKernel {
    pub dischargeinf: Influence,
}

impl ElementKernel for FixedKernel {
    fn name(&self) -> &str {
        "FixedKernel"
    }

    fn control_point(&self) -> (f64, f64) {
        (10.0, 20.0)
    }

    fn dischargeinf(&self, _aq: &AquiferData) -> Result<Influence> {
        Ok(self.dischargeinf.clone())
    }
}

/// Inverse of a constant signal: the real part of the first sample at every time.
pub struct IdentityInverse;

impl InverseLaplace for IdentityInverse {
    fn invert(&self, signal: &[C64], times: &[f64]) -> Vec<f64> {
        vec![signal[0].re; times.len()]
    }
}

pub fn settings(tmin: f64, tmax: f64, tstart: f64) -> ModelSettings {
    ModelSettings {
        name: "ml".to_string(),
        tmin,
        tmax,
        tstart,
    }
}

/// Model over a uniform aquifer with the given eigenvectors and samples `p`.
pub fn model_with(settings: ModelSettings, aq: AquiferData, p: Vec<C64>) -> Model {
    let lookup: Arc<dyn AquiferLookup> = Arc::new(UniformAquifer::new(aq));
    Model::new(settings, p, lookup, Box::new(IdentityInverse))
}

/// One layer, one Laplace sample at p = 1.
pub fn single_layer_model(tmin: f64, tmax: f64) -> Model {
    model_with(
        settings(tmin, tmax, 0.0),
        AquiferData::identity(1, 1).unwrap(),
        vec![C64::new(1.0, 0.0)],
    )
}

pub fn c(re: f64) -> C64 {
    C64::new(re, 0.0)
}
