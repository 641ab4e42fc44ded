use crate::config::{Config, Init, Params};
use crate::error::FirmError;
use crate::field::{Field, Value, to_count};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::{Bernoulli, Uniform};
use serde::{Deserialize, Serialize};

/// Population of firms following the decision rules of Lengnick (2013).
///
/// Firms are rows: every field is a vector with one entry per firm,
/// and firm `id` is entry `id` of each vector. The population owns the
/// random number generator used by the rules, so a seeded population
/// replays the same sequence of decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Firms {
    n_firms: usize,

    gamma: Vec<u32>,
    delta: Vec<f64>,
    i_phi_lower: Vec<f64>,
    i_phi_upper: Vec<f64>,
    nu: Vec<f64>,
    p_phi_lower: Vec<f64>,
    p_phi_upper: Vec<f64>,
    theta: Vec<f64>,
    t_lambda: Vec<f64>,

    m: Vec<f64>,
    i: Vec<f64>,
    d: Vec<f64>,
    w: Vec<f64>,
    p: Vec<f64>,
    l: Vec<u32>,
    v: Vec<u32>,
    nv: Vec<u32>,

    rng: ChaCha12Rng,
}

/// Inventory relative to the band `[i_phi_lower * d, i_phi_upper * d]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stock {
    Short,
    Balanced,
    Excess,
}

enum Column<'a> {
    Real(&'a mut Vec<f64>),
    Count(&'a mut Vec<u32>),
}

impl Firms {
    /// Create `n_firms` firms with default parameters and initial state.
    pub fn new(n_firms: usize, rng: ChaCha12Rng) -> Self {
        let par = Params::default();
        let init = Init::default();
        Self {
            n_firms,

            gamma: vec![par.gamma; n_firms],
            delta: vec![par.delta; n_firms],
            i_phi_lower: vec![par.i_phi_lower; n_firms],
            i_phi_upper: vec![par.i_phi_upper; n_firms],
            nu: vec![par.nu; n_firms],
            p_phi_lower: vec![par.p_phi_lower; n_firms],
            p_phi_upper: vec![par.p_phi_upper; n_firms],
            theta: vec![par.theta; n_firms],
            t_lambda: vec![par.t_lambda; n_firms],

            m: vec![init.m; n_firms],
            i: vec![init.i; n_firms],
            d: vec![init.d; n_firms],
            w: vec![init.w; n_firms],
            p: vec![init.p; n_firms],
            l: vec![init.l; n_firms],
            v: vec![init.v; n_firms],
            nv: vec![init.nv; n_firms],

            rng,
        }
    }

    pub fn with_seed(n_firms: usize, seed: u64) -> Self {
        Self::new(n_firms, ChaCha12Rng::seed_from_u64(seed))
    }

    /// Create a population and apply the parameters and initial state of `cfg`.
    pub fn from_config(cfg: &Config, rng: ChaCha12Rng) -> Result<Self, FirmError> {
        let mut firms = Self::new(cfg.population.n_firms, rng);
        for (field, val) in cfg.params.values().into_iter().chain(cfg.init.values()) {
            firms.set_field(field, Value::Scalar(val), None)?;
        }
        Ok(firms)
    }

    /// Restart the random number generator from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha12Rng::seed_from_u64(seed);
    }

    pub fn n_firms(&self) -> usize {
        self.n_firms
    }

    pub fn m(&self) -> &[f64] {
        &self.m
    }

    pub fn i(&self) -> &[f64] {
        &self.i
    }

    pub fn d(&self) -> &[f64] {
        &self.d
    }

    pub fn w(&self) -> &[f64] {
        &self.w
    }

    pub fn p(&self) -> &[f64] {
        &self.p
    }

    pub fn l(&self) -> &[u32] {
        &self.l
    }

    pub fn v(&self) -> &[u32] {
        &self.v
    }

    pub fn nv(&self) -> &[u32] {
        &self.nv
    }

    /// Set the field called `name`.
    ///
    /// Without `id`, a scalar is written to every firm and a vector must hold
    /// exactly one value per firm. With `id`, only that firm is written and
    /// the value must be a scalar.
    ///
    /// # Errors
    /// Returns an error if the name is unknown, the value has the wrong shape,
    /// a count field receives a value that is not a whole number, or `id` is
    /// out of range. The field is left untouched on error.
    pub fn set_property<V: Into<Value>>(
        &mut self,
        name: &str,
        value: V,
        id: Option<usize>,
    ) -> Result<(), FirmError> {
        let field = name.parse()?;
        self.set_field(field, value.into(), id)
    }

    pub fn set_field(
        &mut self,
        field: Field,
        value: Value,
        id: Option<usize>,
    ) -> Result<(), FirmError> {
        let n_firms = self.n_firms;
        match id {
            Some(id) => {
                let Value::Scalar(val) = value else {
                    return Err(FirmError::VectorWithId { field });
                };
                if id >= n_firms {
                    return Err(FirmError::IdOutOfRange { id, n_firms });
                }
                match self.column_mut(field) {
                    Column::Real(col) => col[id] = val,
                    Column::Count(col) => col[id] = to_count(field, val)?,
                }
                log::debug!("set {field} of firm {id} to {val}");
            }
            None => {
                let vals = match value {
                    Value::Scalar(val) => vec![val; n_firms],
                    Value::Vector(vals) => {
                        if vals.len() != n_firms {
                            return Err(FirmError::SizeMismatch {
                                field,
                                expected: n_firms,
                                actual: vals.len(),
                            });
                        }
                        vals
                    }
                };
                match self.column_mut(field) {
                    Column::Real(col) => *col = vals,
                    Column::Count(col) => {
                        *col = vals
                            .into_iter()
                            .map(|val| to_count(field, val))
                            .collect::<Result<_, _>>()?;
                    }
                }
                log::debug!("set {field} of all {n_firms} firms");
            }
        }
        Ok(())
    }

    /// Copy of the field called `name`, one value per firm.
    pub fn property(&self, name: &str) -> Result<Vec<f64>, FirmError> {
        Ok(self.field(name.parse()?))
    }

    pub fn field(&self, field: Field) -> Vec<f64> {
        match field {
            Field::Gamma => counts_to_reals(&self.gamma),
            Field::Delta => self.delta.clone(),
            Field::IPhiLower => self.i_phi_lower.clone(),
            Field::IPhiUpper => self.i_phi_upper.clone(),
            Field::Nu => self.nu.clone(),
            Field::PPhiLower => self.p_phi_lower.clone(),
            Field::PPhiUpper => self.p_phi_upper.clone(),
            Field::Theta => self.theta.clone(),
            Field::TLambda => self.t_lambda.clone(),
            Field::M => self.m.clone(),
            Field::I => self.i.clone(),
            Field::D => self.d.clone(),
            Field::W => self.w.clone(),
            Field::P => self.p.clone(),
            Field::L => counts_to_reals(&self.l),
            Field::V => counts_to_reals(&self.v),
            Field::Nv => counts_to_reals(&self.nv),
        }
    }

    /// Check that every field holds one value per firm.
    ///
    /// Needed after deserialization, which does not enforce alignment.
    pub fn check_shape(&self) -> Result<(), FirmError> {
        let n_firms = self.n_firms;
        for field in Field::ALL {
            let len = self.column_len(field);
            if len != n_firms {
                return Err(FirmError::SizeMismatch {
                    field,
                    expected: n_firms,
                    actual: len,
                });
            }
        }
        Ok(())
    }

    /// Check that no firm has both an open vacancy and a vacancy-free streak.
    ///
    /// # Errors
    /// Returns the first conflicting firm.
    pub fn check_vacancies(&self) -> Result<(), FirmError> {
        match (0..self.n_firms).find(|&id| self.v[id] > 0 && self.nv[id] > 0) {
            Some(id) => Err(FirmError::VacancyConflict {
                id,
                v: self.v[id],
                nv: self.nv[id],
            }),
            None => Ok(()),
        }
    }

    /// Adjust wages for one month.
    ///
    /// A firm raises its wage if its vacancy went unfilled and its inventory
    /// still calls for one, and cuts it after `gamma` vacancy-free months if
    /// its inventory does not call for a vacancy. The relative change is
    /// uniform in `[0, delta)`. Wages are not bounded below.
    ///
    /// # Errors
    /// Returns an error, without changing any wage, if a firm has both an
    /// open vacancy and a vacancy-free streak.
    pub fn adjust_wages(&mut self) -> Result<(), FirmError> {
        self.check_vacancies()?;

        let mut n_raised = 0;
        let mut n_cut = 0;
        let mut w_next = Vec::with_capacity(self.n_firms);
        for id in 0..self.n_firms {
            let next_vacancy = self.stock(id) == Stock::Short;
            let dir = if self.v[id] > 0 && next_vacancy {
                n_raised += 1;
                1.0
            } else if self.nv[id] >= self.gamma[id] && !next_vacancy {
                n_cut += 1;
                -1.0
            } else {
                0.0
            };
            let mag = sample_fraction(&mut self.rng, self.delta[id]);
            w_next.push(self.w[id] * (1.0 + dir * mag));
        }
        self.w = w_next;

        log::debug!("raised {n_raised} and cut {n_cut} of {} wages", self.n_firms);
        Ok(())
    }

    /// Adjust vacancies and workforce for one month.
    ///
    /// A firm short of inventory holds one open vacancy; otherwise its
    /// vacancy-free streak grows. A firm with excess inventory fires one
    /// worker, if it has any.
    pub fn adjust_workforce(&mut self) {
        let mut v_next = Vec::with_capacity(self.n_firms);
        let mut nv_next = Vec::with_capacity(self.n_firms);
        let mut l_next = Vec::with_capacity(self.n_firms);
        for id in 0..self.n_firms {
            let stock = self.stock(id);
            if stock == Stock::Short {
                v_next.push(1);
                nv_next.push(0);
            } else {
                v_next.push(0);
                nv_next.push(self.nv[id].saturating_add(1));
            }
            if stock == Stock::Excess {
                l_next.push(self.l[id].saturating_sub(1));
            } else {
                l_next.push(self.l[id]);
            }
        }

        let n_vacancies = v_next.iter().filter(|&&v| v > 0).count();
        let n_fired = l_next.iter().zip(&self.l).filter(|(new, old)| new < old).count();

        self.v = v_next;
        self.nv = nv_next;
        self.l = l_next;

        log::debug!("{n_vacancies} open vacancies, {n_fired} workers fired");
    }

    /// Adjust prices for one month.
    ///
    /// A firm short of inventory raises its price and a firm with excess
    /// inventory lowers it, by a relative amount uniform in `[0, nu)`. The
    /// result is clipped to the band `[p_phi_lower, p_phi_upper]` times
    /// marginal cost, widened to include the current price so a move never
    /// goes against its direction. The new price is kept with probability
    /// `theta`: always when `theta >= 1`, never when `theta <= 0` or NaN.
    pub fn adjust_prices(&mut self) {
        let mut n_changed = 0;
        let mut p_next = Vec::with_capacity(self.n_firms);
        for id in 0..self.n_firms {
            let p = self.p[id];
            let cost = self.w[id] / self.t_lambda[id];
            let lower = self.p_phi_lower[id] * cost;
            let upper = self.p_phi_upper[id] * cost;

            let (dir, lower, upper) = match self.stock(id) {
                Stock::Short => (1.0, lower.max(p), upper.max(p)),
                Stock::Excess => (-1.0, lower.min(p), upper.min(p)),
                Stock::Balanced => (0.0, p, p),
            };
            let mag = sample_fraction(&mut self.rng, self.nu[id]);
            // Same order as numpy's clip: an inverted band yields `upper`.
            let candidate = (p + dir * p * mag).max(lower).min(upper);

            if sample_accept(&mut self.rng, self.theta[id]) {
                if candidate != p {
                    n_changed += 1;
                }
                p_next.push(candidate);
            } else {
                p_next.push(p);
            }
        }
        self.p = p_next;

        log::debug!("changed {n_changed} of {} prices", self.n_firms);
    }

    fn stock(&self, id: usize) -> Stock {
        let i = self.i[id];
        if i < self.i_phi_lower[id] * self.d[id] {
            Stock::Short
        } else if i > self.i_phi_upper[id] * self.d[id] {
            Stock::Excess
        } else {
            Stock::Balanced
        }
    }

    fn column_mut(&mut self, field: Field) -> Column<'_> {
        match field {
            Field::Gamma => Column::Count(&mut self.gamma),
            Field::Delta => Column::Real(&mut self.delta),
            Field::IPhiLower => Column::Real(&mut self.i_phi_lower),
            Field::IPhiUpper => Column::Real(&mut self.i_phi_upper),
            Field::Nu => Column::Real(&mut self.nu),
            Field::PPhiLower => Column::Real(&mut self.p_phi_lower),
            Field::PPhiUpper => Column::Real(&mut self.p_phi_upper),
            Field::Theta => Column::Real(&mut self.theta),
            Field::TLambda => Column::Real(&mut self.t_lambda),
            Field::M => Column::Real(&mut self.m),
            Field::I => Column::Real(&mut self.i),
            Field::D => Column::Real(&mut self.d),
            Field::W => Column::Real(&mut self.w),
            Field::P => Column::Real(&mut self.p),
            Field::L => Column::Count(&mut self.l),
            Field::V => Column::Count(&mut self.v),
            Field::Nv => Column::Count(&mut self.nv),
        }
    }

    fn column_len(&self, field: Field) -> usize {
        match field {
            Field::Gamma => self.gamma.len(),
            Field::Delta => self.delta.len(),
            Field::IPhiLower => self.i_phi_lower.len(),
            Field::IPhiUpper => self.i_phi_upper.len(),
            Field::Nu => self.nu.len(),
            Field::PPhiLower => self.p_phi_lower.len(),
            Field::PPhiUpper => self.p_phi_upper.len(),
            Field::Theta => self.theta.len(),
            Field::TLambda => self.t_lambda.len(),
            Field::M => self.m.len(),
            Field::I => self.i.len(),
            Field::D => self.d.len(),
            Field::W => self.w.len(),
            Field::P => self.p.len(),
            Field::L => self.l.len(),
            Field::V => self.v.len(),
            Field::Nv => self.nv.len(),
        }
    }
}

/// Draw uniformly from `[0, max)`; an empty or non-finite range yields 0.
fn sample_fraction(rng: &mut ChaCha12Rng, max: f64) -> f64 {
    Uniform::new(0.0, max).map_or(0.0, |dist| dist.sample(rng))
}

/// Draw an acceptance with probability `prob`, saturating outside `[0, 1]`.
fn sample_accept(rng: &mut ChaCha12Rng, prob: f64) -> bool {
    if prob >= 1.0 {
        return true;
    }
    Bernoulli::new(prob).is_ok_and(|dist| dist.sample(rng))
}

fn counts_to_reals(col: &[u32]) -> Vec<f64> {
    col.iter().map(|&val| val as f64).collect()
}
