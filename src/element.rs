use std::sync::Arc;

use nalgebra::DMatrix;

use crate::C64;
use crate::aquifer::{AquiferData, AquiferLookup};
use crate::boundary_cond::{BcKind, BoundaryHistory};
use crate::config::ElementConfig;
use crate::errors::{ElementError, Result};
use crate::kernel::{ElementKernel, Influence};
use crate::projection::{LayerProjector, LayerSelection};

// Solved coefficients, one (nparam x npval) matrix per entry of the model gvbclist
#[derive(Clone, Debug)]
pub enum SolveState {
    Unsolved,
    Solved(Vec<DMatrix<C64>>),
}

// Everything wired up by initialize(), once the aquifer exists
struct Binding {
    lookup: Arc<dyn AquiferLookup>,
    aq: Arc<AquiferData>,
    dischargeinf: Option<Influence>,
    dischargeinflayers: Option<DMatrix<C64>>, // (nlayers x npval), given elements only
}

/// A hydraulic feature: its declared inputs, its kernel and its solved state.
pub struct Element {
    config: ElementConfig,
    history: Option<BoundaryHistory>,
    kernel: Box<dyn ElementKernel>,
    binding: Option<Binding>,
    state: SolveState,
}

impl Element {
    /// Validates the declared fields and builds an unsolved element. The
    /// boundary history is checked before anything else is stored.
    pub fn new(
        config: ElementConfig,
        kernel: Box<dyn ElementKernel>,
        model_tstart: f64,
    ) -> Result<Self> {
        let history = BoundaryHistory::from_rows(&config.tsandbc, model_tstart)?;
        if config.layers.is_empty() {
            return Err(ElementError::ShapeMismatch {
                what: "element layers",
                expected: 1,
                found: 0,
            });
        }
        let history = match config.kind {
            BcKind::Given | BcKind::Variable => Some(history),
            BcKind::Zero => None,
        };
        Ok(Element {
            config,
            history,
            kernel,
            binding: None,
            state: SolveState::Unsolved,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn label(&self) -> Option<&str> {
        self.config.label.as_deref()
    }

    pub fn kind(&self) -> BcKind {
        self.config.kind
    }

    pub fn layers(&self) -> &[usize] {
        &self.config.layers
    }

    pub fn nlayers(&self) -> usize {
        self.config.layers.len()
    }

    pub fn nparam(&self) -> usize {
        self.config.nparam
    }

    pub fn nunknowns(&self) -> usize {
        self.config.nunknowns
    }

    pub fn rzero(&self) -> f64 {
        self.config.rzero
    }

    pub fn config(&self) -> &ElementConfig {
        &self.config
    }

    pub fn history(&self) -> Option<&BoundaryHistory> {
        self.history.as_ref()
    }

    pub fn kernel(&self) -> &dyn ElementKernel {
        self.kernel.as_ref()
    }

    pub fn setbc(&mut self) {
        if let Some(history) = self.history.as_mut() {
            history.setbc();
        }
    }

    /// Binds the element to its aquifer and caches the self-discharge terms.
    /// Called by the model orchestration, after all elements exist.
    pub fn initialize(&mut self, lookup: Arc<dyn AquiferLookup>) -> Result<()> {
        let (x, y) = self.kernel.control_point();
        let aq = lookup.find_aquifer_data(x, y);
        LayerSelection::List(self.config.layers.clone()).resolve(aq.naq())?;
        self.kernel.initialize(&aq)?;

        let dischargeinf = match self.kernel.dischargeinf(&aq) {
            Ok(inf) => {
                self.check_influence(&inf, &aq, "dischargeinf")?;
                Some(inf)
            }
            Err(ElementError::Unimplemented { .. }) => None,
            Err(e) => return Err(e),
        };
        let dischargeinflayers = match (&dischargeinf, self.kind()) {
            (Some(inf), BcKind::Given) => Some(self.pair_with_layers(inf, &aq)?),
            _ => None,
        };

        log::debug!(
            "initialized {} {:?} in {} of {} layers",
            self.name(),
            self.label(),
            self.nlayers(),
            aq.naq()
        );
        self.binding = Some(Binding {
            lookup,
            aq,
            dischargeinf,
            dischargeinflayers,
        });
        Ok(())
    }

    // Parameter i of a given element is its strength in screened layer i
    fn pair_with_layers(&self, inf: &Influence, aq: &AquiferData) -> Result<DMatrix<C64>> {
        if self.nparam() != self.nlayers() {
            return Err(ElementError::ShapeMismatch {
                what: "parameters of a given element (one per layer)",
                expected: self.nlayers(),
                found: self.nparam(),
            });
        }
        let mut out = DMatrix::<C64>::zeros(self.nlayers(), aq.npval());
        for (i, &layer) in self.config.layers.iter().enumerate() {
            for (p, eigvec) in aq.eigvec().iter().enumerate() {
                out[(i, p)] = (0..aq.neigen())
                    .map(|e| inf[i][(e, p)] * eigvec[(layer, e)])
                    .sum::<C64>();
            }
        }
        Ok(out)
    }

    fn check_influence(&self, inf: &Influence, aq: &AquiferData, what: &'static str) -> Result<()> {
        if inf.len() != self.nparam() {
            return Err(ElementError::ShapeMismatch {
                what,
                expected: self.nparam(),
                found: inf.len(),
            });
        }
        for m in inf {
            if m.shape() != (aq.neigen(), aq.npval()) {
                return Err(ElementError::ShapeMismatch {
                    what,
                    expected: aq.neigen() * aq.npval(),
                    found: m.nrows() * m.ncols(),
                });
            }
        }
        Ok(())
    }

    fn binding(&self) -> Result<&Binding> {
        self.binding
            .as_ref()
            .ok_or_else(|| ElementError::NotInitialized(self.name().to_string()))
    }

    pub fn is_initialized(&self) -> bool {
        self.binding.is_some()
    }

    /// Aquifer at the element's control point.
    pub fn aq(&self) -> Result<&Arc<AquiferData>> {
        Ok(&self.binding()?.aq)
    }

    pub fn dischargeinf(&self) -> Result<&Influence> {
        self.binding()?
            .dischargeinf
            .as_ref()
            .ok_or_else(|| ElementError::Unimplemented {
                element: self.name().to_string(),
                capability: "dischargeinf",
            })
    }

    pub fn dischargeinflayers(&self) -> Result<&DMatrix<C64>> {
        self.binding()?
            .dischargeinflayers
            .as_ref()
            .ok_or_else(|| ElementError::Unimplemented {
                element: self.name().to_string(),
                capability: "dischargeinflayers",
            })
    }

    pub fn is_solved(&self) -> bool {
        matches!(self.state, SolveState::Solved(_))
    }

    /// Stores the solved coefficients. Written once; a second write fails.
    pub fn set_parameters(&mut self, parameters: Vec<DMatrix<C64>>) -> Result<()> {
        if self.is_solved() {
            return Err(ElementError::AlreadySolved(self.name().to_string()));
        }
        for m in &parameters {
            if m.nrows() != self.nparam() {
                return Err(ElementError::ShapeMismatch {
                    what: "parameter rows",
                    expected: self.nparam(),
                    found: m.nrows(),
                });
            }
        }
        self.state = SolveState::Solved(parameters);
        Ok(())
    }

    pub fn parameters(&self) -> Result<&[DMatrix<C64>]> {
        match &self.state {
            SolveState::Solved(parameters) => Ok(parameters),
            SolveState::Unsolved => Err(ElementError::NotSolved(self.name().to_string())),
        }
    }

    // Runs `f` on the given aquifer, or on the one found at (x, y)
    fn with_aquifer<T>(
        &self,
        x: f64,
        y: f64,
        aq: Option<&AquiferData>,
        f: impl FnOnce(&AquiferData) -> Result<T>,
    ) -> Result<T> {
        match aq {
            Some(aq) => f(aq),
            None => {
                let found = self.binding()?.lookup.find_aquifer_data(x, y);
                f(&found)
            }
        }
    }

    pub fn potinf(&self, x: f64, y: f64, aq: Option<&AquiferData>) -> Result<Influence> {
        self.with_aquifer(x, y, aq, |aq| self.kernel.potinf(x, y, aq))
    }

    pub fn disinf(&self, x: f64, y: f64, aq: Option<&AquiferData>) -> Result<(Influence, Influence)> {
        self.with_aquifer(x, y, aq, |aq| self.kernel.disinf(x, y, aq))
    }

    /// Solved potential, one `(naq x npval)` matrix per entry of the model gvbclist.
    pub fn potential(&self, x: f64, y: f64, aq: Option<&AquiferData>) -> Result<Vec<DMatrix<C64>>> {
        let parameters = self.parameters()?;
        self.with_aquifer(x, y, aq, |aq| {
            weighted_sum(parameters, &self.kernel.potinf(x, y, aq)?)
        })
    }

    pub fn unitpotential(&self, x: f64, y: f64, aq: Option<&AquiferData>) -> Result<DMatrix<C64>> {
        self.with_aquifer(x, y, aq, |aq| sum_params(&self.kernel.potinf(x, y, aq)?, aq))
    }

    pub fn discharge(
        &self,
        x: f64,
        y: f64,
        aq: Option<&AquiferData>,
    ) -> Result<(Vec<DMatrix<C64>>, Vec<DMatrix<C64>>)> {
        let parameters = self.parameters()?;
        self.with_aquifer(x, y, aq, |aq| {
            let (qx, qy) = self.kernel.disinf(x, y, aq)?;
            Ok((weighted_sum(parameters, &qx)?, weighted_sum(parameters, &qy)?))
        })
    }

    pub fn unitdischarge(
        &self,
        x: f64,
        y: f64,
        aq: Option<&AquiferData>,
    ) -> Result<(DMatrix<C64>, DMatrix<C64>)> {
        self.with_aquifer(x, y, aq, |aq| {
            let (qx, qy) = self.kernel.disinf(x, y, aq)?;
            Ok((sum_params(&qx, aq)?, sum_params(&qy, aq)?))
        })
    }

    // Functions used to build equations

    /// Unit potential per layer: `[layer]` is an `(nparam x npval)` matrix.
    pub fn potinflayers(
        &self,
        x: f64,
        y: f64,
        layers: &LayerSelection,
        aq: Option<&AquiferData>,
    ) -> Result<Vec<DMatrix<C64>>> {
        self.with_aquifer(x, y, aq, |aq| {
            LayerProjector::new(aq).project_layer_major(&self.kernel.potinf(x, y, aq)?, layers)
        })
    }

    /// Solved potential per gvbclist entry: `[k]` is `(len(layers) x npval)`.
    pub fn potentiallayers(
        &self,
        x: f64,
        y: f64,
        layers: &LayerSelection,
        aq: Option<&AquiferData>,
    ) -> Result<Vec<DMatrix<C64>>> {
        let parameters = self.parameters()?;
        self.with_aquifer(x, y, aq, |aq| {
            let pot = weighted_sum(parameters, &self.kernel.potinf(x, y, aq)?)?;
            LayerProjector::new(aq).project_select(&pot, layers)
        })
    }

    pub fn unitpotentiallayers(
        &self,
        x: f64,
        y: f64,
        layers: &LayerSelection,
        aq: Option<&AquiferData>,
    ) -> Result<DMatrix<C64>> {
        self.with_aquifer(x, y, aq, |aq| {
            let pot = sum_params(&self.kernel.potinf(x, y, aq)?, aq)?;
            project_one(aq, &pot, layers)
        })
    }

    pub fn disinflayers(
        &self,
        x: f64,
        y: f64,
        layers: &LayerSelection,
        aq: Option<&AquiferData>,
    ) -> Result<(Vec<DMatrix<C64>>, Vec<DMatrix<C64>>)> {
        self.with_aquifer(x, y, aq, |aq| {
            let (qx, qy) = self.kernel.disinf(x, y, aq)?;
            let projector = LayerProjector::new(aq);
            Ok((
                projector.project_layer_major(&qx, layers)?,
                projector.project_layer_major(&qy, layers)?,
            ))
        })
    }

    pub fn dischargelayers(
        &self,
        x: f64,
        y: f64,
        layers: &LayerSelection,
        aq: Option<&AquiferData>,
    ) -> Result<(Vec<DMatrix<C64>>, Vec<DMatrix<C64>>)> {
        let parameters = self.parameters()?;
        self.with_aquifer(x, y, aq, |aq| {
            let (qx, qy) = self.kernel.disinf(x, y, aq)?;
            let projector = LayerProjector::new(aq);
            Ok((
                projector.project_select(&weighted_sum(parameters, &qx)?, layers)?,
                projector.project_select(&weighted_sum(parameters, &qy)?, layers)?,
            ))
        })
    }

    pub fn unitdischargelayers(
        &self,
        x: f64,
        y: f64,
        layers: &LayerSelection,
        aq: Option<&AquiferData>,
    ) -> Result<(DMatrix<C64>, DMatrix<C64>)> {
        self.with_aquifer(x, y, aq, |aq| {
            let (qx, qy) = self.kernel.disinf(x, y, aq)?;
            Ok((
                project_one(aq, &sum_params(&qx, aq)?, layers)?,
                project_one(aq, &sum_params(&qy, aq)?, layers)?,
            ))
        })
    }

    pub fn headinside(&self, t: &[f64]) -> Option<DMatrix<f64>> {
        self.kernel.headinside(t)
    }

    pub fn run_after_solve(&mut self) {
        self.kernel.run_after_solve();
    }

    pub fn plot(&self) {
        self.kernel.plot();
    }

    /// Script-like echo of the declared construction fields.
    pub fn write(&self, model_name: &str) -> String {
        let c = &self.config;
        let mut rv = format!("{}({},\n", c.name, model_name);
        let tsandbc: Vec<String> = c
            .tsandbc
            .iter()
            .map(|row| format!("({:?},{:?})", row[0], row[1]))
            .collect();
        rv.push_str(&format!("layers = {:?},\n", c.layers));
        rv.push_str(&format!("nparam = {},\n", c.nparam));
        rv.push_str(&format!("nunknowns = {},\n", c.nunknowns));
        rv.push_str(&format!("tsandbc = [{}],\n", tsandbc.join(",")));
        rv.push_str(&format!("type = '{}',\n", c.kind.code()));
        if let Some(label) = &c.label {
            rv.push_str(&format!("label = '{}',\n", label));
        }
        rv.push_str(&format!("rzero = {:?},\n", c.rzero));
        rv.push_str(")\n");
        rv
    }
}

// Sum over parameters of parameters[k][param, p] * inf[param][row, p], for every k
pub(crate) fn weighted_sum(
    parameters: &[DMatrix<C64>],
    inf: &Influence,
) -> Result<Vec<DMatrix<C64>>> {
    let Some(first) = inf.first() else {
        return Ok(vec![DMatrix::zeros(0, 0); parameters.len()]);
    };
    let (rows, npval) = first.shape();
    parameters
        .iter()
        .map(|weights| {
            if weights.nrows() != inf.len() || weights.ncols() != npval {
                return Err(ElementError::ShapeMismatch {
                    what: "parameters against influence",
                    expected: inf.len() * npval,
                    found: weights.nrows() * weights.ncols(),
                });
            }
            let mut out = DMatrix::<C64>::zeros(rows, npval);
            for (param, m) in inf.iter().enumerate() {
                for p in 0..npval {
                    let w = weights[(param, p)];
                    for r in 0..rows {
                        out[(r, p)] += w * m[(r, p)];
                    }
                }
            }
            Ok(out)
        })
        .collect()
}

fn sum_params(inf: &Influence, aq: &AquiferData) -> Result<DMatrix<C64>> {
    let mut out = DMatrix::<C64>::zeros(aq.neigen(), aq.npval());
    for m in inf {
        if m.shape() != out.shape() {
            return Err(ElementError::ShapeMismatch {
                what: "influence",
                expected: out.nrows() * out.ncols(),
                found: m.nrows() * m.ncols(),
            });
        }
        out += m;
    }
    Ok(out)
}

fn project_one(aq: &AquiferData, x: &DMatrix<C64>, layers: &LayerSelection) -> Result<DMatrix<C64>> {
    let mut projected = LayerProjector::new(aq).project_select(std::slice::from_ref(x), layers)?;
    Ok(projected.remove(0))
}
