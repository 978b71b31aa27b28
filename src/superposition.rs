//! Time-domain discharge of an element by superposing boundary-condition
//! steps in Laplace space and inverting each one.

use nalgebra::DMatrix;

use crate::C64;
use crate::boundary_cond::BcKind;
use crate::element::{Element, weighted_sum};
use crate::errors::{ElementError, Result};
use crate::invlap::InverseLaplace;
use crate::model::Model;
use crate::projection::{LayerProjector, LayerSelection};

// Time window and inverse transform shared by every step of one query
struct Inverter<'a> {
    tmin: f64,
    tmax: f64,
    routine: &'a dyn InverseLaplace,
}

impl Inverter<'_> {
    /// Adds `increment` times the inverse of every row of `s`, shifted by
    /// `start`, into the matching row of `rv`. Entries outside the model
    /// bounds or before the step has reached `tmin` stay untouched.
    fn superpose(&self, rv: &mut DMatrix<f64>, s: &DMatrix<C64>, increment: f64, t: &[f64], start: f64) {
        let idx: Vec<usize> = (0..t.len())
            .filter(|&j| t[j] >= self.tmin && t[j] <= self.tmax && t[j] - start >= self.tmin)
            .collect();
        if idx.is_empty() {
            return;
        }
        let shifted: Vec<f64> = idx.iter().map(|&j| t[j] - start).collect();
        for i in 0..s.nrows() {
            let signal: Vec<C64> = s.row(i).iter().copied().collect();
            let values = self.routine.invert(&signal, &shifted);
            for (&j, value) in idx.iter().zip(values) {
                rv[(i, j)] += increment * value;
            }
        }
    }
}

// Multiplies column p by p^derivative
fn differentiate(s: &DMatrix<C64>, p: &[C64], derivative: u32) -> DMatrix<C64> {
    if derivative == 0 {
        return s.clone();
    }
    let mut out = s.clone();
    for (mut column, pval) in out.column_iter_mut().zip(p) {
        column *= pval.powu(derivative);
    }
    out
}

impl Element {
    /// Discharge of the element in each of its layers at times `t`, shaped
    /// `(nlayers x len(t))`.
    ///
    /// `t` must be ascending. Times outside `[tmin, tmax]` are reported with
    /// a warning and get zero. `derivative` is the order of the time
    /// derivative, applied as a power of the Laplace variable.
    pub fn discharge_series(&self, model: &Model, t: &[f64], derivative: u32) -> Result<DMatrix<f64>> {
        if t.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(ElementError::UnorderedTimes);
        }
        let inverter = Inverter {
            tmin: model.tmin(),
            tmax: model.tmax(),
            routine: model.inverse(),
        };
        if let (Some(&first), Some(&last)) = (t.first(), t.last()) {
            if first < inverter.tmin || last > inverter.tmax {
                log::warn!(
                    "some of the times are smaller than tmin or larger than tmax; zeros are substituted"
                );
            }
        }

        let mut rv = DMatrix::<f64>::zeros(self.nlayers(), t.len());
        match self.kind() {
            BcKind::Given => {
                let s = differentiate(self.dischargeinflayers()?, model.p(), derivative);
                if let Some(history) = self.history() {
                    // each step further offsets the running time axis
                    let mut offset = 0.0;
                    for (start, increment) in history.steps() {
                        offset += start;
                        inverter.superpose(&mut rv, &s, increment, t, offset);
                    }
                }
            }
            BcKind::Variable | BcKind::Zero => {
                let parameters = self.parameters()?;
                if parameters.len() != model.ngvbc() {
                    return Err(ElementError::ShapeMismatch {
                        what: "parameter sets against gvbclist",
                        expected: model.ngvbc(),
                        found: parameters.len(),
                    });
                }
                let aq = self.aq()?;
                let weighted = weighted_sum(parameters, self.dischargeinf()?)?;
                let layers = LayerSelection::List(self.layers().to_vec());
                let s = LayerProjector::new(aq).project_select(&weighted, &layers)?;

                let Some(&last) = t.last() else {
                    return Ok(rv);
                };
                for (k, e) in model.gvbc_elements().enumerate() {
                    let sk = differentiate(&s[k], model.p(), derivative);
                    let Some(history) = e.history() else {
                        continue;
                    };
                    for (start, increment) in history.steps() {
                        if last - start < inverter.tmin {
                            log::trace!("{} step at {start} has not started yet", e.name());
                            continue;
                        }
                        inverter.superpose(&mut rv, &sk, increment, t, start);
                    }
                }
            }
        }
        Ok(rv)
    }
}
