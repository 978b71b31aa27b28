use crate::errors::{ElementError, Result};

// How the strength of an element evolves through time
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BcKind {
    Given,    // strength prescribed through time, drives other elements
    Variable, // boundary condition varies through time, strength is solved for
    Zero,     // boundary condition is zero through time
}

impl BcKind {
    pub fn code(&self) -> char {
        match self {
            BcKind::Given => 'g',
            BcKind::Variable => 'v',
            BcKind::Zero => 'z',
        }
    }
}

/// Piecewise-constant boundary-condition history of one element.
///
/// Times are stored relative to the model start time. When the first relative
/// time is positive a `(0, 0)` anchor is prepended, so the history always
/// starts at zero.
#[derive(Clone, Debug)]
pub struct BoundaryHistory {
    tstart: Vec<f64>, // Start time of every step, relative to model tstart
    bcin: Vec<f64>,   // Cumulative boundary value from each start time on
    bc: Vec<f64>,     // Step increments, filled by setbc()
}

impl BoundaryHistory {
    /// Builds a history from raw rows. Every row must have exactly two
    /// columns and times must increase strictly. Nothing is built on error.
    pub fn from_rows(rows: &[Vec<f64>], model_tstart: f64) -> Result<Self> {
        if rows.is_empty() {
            return Err(ElementError::EmptyHistory);
        }
        let mut pairs = Vec::with_capacity(rows.len());
        for (row, values) in rows.iter().enumerate() {
            if values.len() != 2 {
                return Err(ElementError::InputShape {
                    row,
                    columns: values.len(),
                });
            }
            pairs.push((values[0], values[1]));
        }
        Self::from_pairs(&pairs, model_tstart)
    }

    pub fn from_pairs(pairs: &[(f64, f64)], model_tstart: f64) -> Result<Self> {
        if pairs.is_empty() {
            return Err(ElementError::EmptyHistory);
        }
        for (row, window) in pairs.windows(2).enumerate() {
            if window[1].0 <= window[0].0 {
                return Err(ElementError::UnorderedHistory { row: row + 1 });
            }
        }

        let mut tstart: Vec<f64> = pairs.iter().map(|&(t, _)| t - model_tstart).collect();
        let mut bcin: Vec<f64> = pairs.iter().map(|&(_, v)| v).collect();
        if tstart[0] > 0.0 {
            tstart.insert(0, 0.0);
            bcin.insert(0, 0.0);
        }

        let mut history = BoundaryHistory {
            tstart,
            bcin,
            bc: Vec::new(),
        };
        history.setbc();
        Ok(history)
    }

    /// Derives the step increments from the cumulative values. Safe to call
    /// any number of times.
    pub fn setbc(&mut self) {
        if self.bcin.len() > 1 {
            self.bc = Vec::with_capacity(self.bcin.len());
            self.bc.push(self.bcin[0]);
            self.bc
                .extend(self.bcin.windows(2).map(|pair| pair[1] - pair[0]));
        } else {
            self.bc = self.bcin.clone();
        }
    }

    pub fn tstart(&self) -> &[f64] {
        &self.tstart
    }

    pub fn bcin(&self) -> &[f64] {
        &self.bcin
    }

    pub fn increments(&self) -> &[f64] {
        &self.bc
    }

    pub fn ntstart(&self) -> usize {
        self.tstart.len()
    }

    /// Step start times paired with their increments.
    pub fn steps(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.tstart.iter().copied().zip(self.bc.iter().copied())
    }
}
