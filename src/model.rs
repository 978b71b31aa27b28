use std::collections::HashMap;
use std::sync::Arc;

use nalgebra::DMatrix;

use crate::C64;
use crate::aquifer::AquiferLookup;
use crate::boundary_cond::BcKind;
use crate::config::{ElementConfig, ModelConfig, ModelSettings};
use crate::element::Element;
use crate::errors::{ElementError, Result};
use crate::invlap::InverseLaplace;
use crate::kernel::ElementKernel;

/// Owns the elements and the collaborators they are evaluated against: the
/// Laplace samples, the aquifer lookup and the inverse transform.
pub struct Model {
    settings: ModelSettings,
    p: Vec<C64>, // Laplace samples shared by all elements
    aquifer: Arc<dyn AquiferLookup>,
    inverse: Box<dyn InverseLaplace>,
    elements: Vec<Element>,
    labels: HashMap<String, usize>,
    gvbclist: Vec<usize>, // Given then variable elements, each in insertion order
    initialized: bool,
}

impl Model {
    pub fn new(
        settings: ModelSettings,
        p: Vec<C64>,
        aquifer: Arc<dyn AquiferLookup>,
        inverse: Box<dyn InverseLaplace>,
    ) -> Self {
        Model {
            settings,
            p,
            aquifer,
            inverse,
            elements: Vec::new(),
            labels: HashMap::new(),
            gvbclist: Vec::new(),
            initialized: false,
        }
    }

    /// Builds a model from a TOML config; `make_kernel` supplies the kernel
    /// of each configured element.
    pub fn from_config<F>(
        config: ModelConfig,
        p: Vec<C64>,
        aquifer: Arc<dyn AquiferLookup>,
        inverse: Box<dyn InverseLaplace>,
        mut make_kernel: F,
    ) -> Result<Self>
    where
        F: FnMut(&ElementConfig) -> Result<Box<dyn ElementKernel>>,
    {
        let mut model = Model::new(config.model, p, aquifer, inverse);
        for element in config.elements {
            let kernel = make_kernel(&element)?;
            model.add_element(element, kernel)?;
        }
        Ok(model)
    }

    /// Registers an element and returns its index. Label and input errors
    /// leave the model untouched.
    pub fn add_element(&mut self, config: ElementConfig, kernel: Box<dyn ElementKernel>) -> Result<usize> {
        if self.initialized {
            return Err(ElementError::AlreadyInitialized(self.settings.name.clone()));
        }
        if let Some(label) = &config.label {
            if self.labels.contains_key(label) {
                return Err(ElementError::LabelExists(label.clone()));
            }
        }
        let element = Element::new(config, kernel, self.settings.tstart)?;
        let index = self.elements.len();
        if let Some(label) = element.label() {
            self.labels.insert(label.to_string(), index);
        }
        self.elements.push(element);
        Ok(index)
    }

    /// Wires every element to its aquifer and collects the elements with a
    /// boundary history: given ones first, then variable ones, each in
    /// insertion order. Runs once, after all elements are registered.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Err(ElementError::AlreadyInitialized(self.settings.name.clone()));
        }
        let mut gvbclist = Vec::new();
        for kind in [BcKind::Given, BcKind::Variable] {
            gvbclist.extend(
                self.elements
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.kind() == kind)
                    .map(|(i, _)| i),
            );
        }
        for element in self.elements.iter_mut() {
            element.setbc();
            element.initialize(Arc::clone(&self.aquifer))?;
            let npval = element.aq()?.npval();
            if npval != self.p.len() {
                return Err(ElementError::ShapeMismatch {
                    what: "aquifer Laplace samples",
                    expected: self.p.len(),
                    found: npval,
                });
            }
        }
        log::debug!(
            "initialized {} elements, {} with a boundary history",
            self.elements.len(),
            gvbclist.len()
        );
        self.gvbclist = gvbclist;
        self.initialized = true;
        Ok(())
    }

    /// Stores the solved coefficients of one element: one `(nparam x npval)`
    /// matrix per entry of `gvbclist`.
    pub fn set_parameters(&mut self, index: usize, parameters: Vec<DMatrix<C64>>) -> Result<()> {
        if !self.initialized {
            return Err(ElementError::NotInitialized(format!("model {}", self.settings.name)));
        }
        if parameters.len() != self.gvbclist.len() {
            return Err(ElementError::ShapeMismatch {
                what: "parameter sets against gvbclist",
                expected: self.gvbclist.len(),
                found: parameters.len(),
            });
        }
        if let Some(m) = parameters.iter().find(|m| m.ncols() != self.p.len()) {
            return Err(ElementError::ShapeMismatch {
                what: "parameter Laplace samples",
                expected: self.p.len(),
                found: m.ncols(),
            });
        }
        self.elements
            .get_mut(index)
            .ok_or(ElementError::UnknownElement(index))?
            .set_parameters(parameters)
    }

    pub fn run_after_solve(&mut self) {
        for element in self.elements.iter_mut() {
            element.run_after_solve();
        }
    }

    pub fn discharge(&self, index: usize, t: &[f64], derivative: u32) -> Result<DMatrix<f64>> {
        self.element(index)?.discharge_series(self, t, derivative)
    }

    pub fn element(&self, index: usize) -> Result<&Element> {
        self.elements
            .get(index)
            .ok_or(ElementError::UnknownElement(index))
    }

    pub fn element_by_label(&self, label: &str) -> Option<&Element> {
        self.labels.get(label).map(|&i| &self.elements[i])
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn gvbclist(&self) -> &[usize] {
        &self.gvbclist
    }

    pub fn gvbc_elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.gvbclist.iter().map(|&i| &self.elements[i])
    }

    pub fn ngvbc(&self) -> usize {
        self.gvbclist.len()
    }

    pub fn p(&self) -> &[C64] {
        &self.p
    }

    pub fn tmin(&self) -> f64 {
        self.settings.tmin
    }

    pub fn tmax(&self) -> f64 {
        self.settings.tmax
    }

    pub fn tstart(&self) -> f64 {
        self.settings.tstart
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn aquifer(&self) -> &Arc<dyn AquiferLookup> {
        &self.aquifer
    }

    pub fn inverse(&self) -> &dyn InverseLaplace {
        self.inverse.as_ref()
    }

    pub fn write(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.write(&self.settings.name))
            .collect()
    }
}
