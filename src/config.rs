use crate::field::Field;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Population configuration.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    pub population: PopulationConfig,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub init: Init,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of firms.
    pub n_firms: usize,
    /// Seed of the random number generator (OS entropy if omitted).
    pub seed: Option<u64>,
}

/// Behavioral parameters shared by every firm at creation.
///
/// Defaults are the values of Lengnick (2013), Table 1.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Vacancy-free months before a wage cut is allowed.
    pub gamma: u32,
    /// Maximum relative wage change per month.
    pub delta: f64,
    /// Inventory band as fractions of last demand.
    pub i_phi_lower: f64,
    pub i_phi_upper: f64,
    /// Maximum relative price change per month.
    pub nu: f64,
    /// Price band as fractions of marginal cost.
    pub p_phi_lower: f64,
    pub p_phi_upper: f64,
    /// Probability that a proposed price change is accepted.
    pub theta: f64,
    /// Output per worker.
    pub t_lambda: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            gamma: 24,
            delta: 0.019,
            i_phi_lower: 0.25,
            i_phi_upper: 1.0,
            nu: 0.02,
            p_phi_lower: 1.025,
            p_phi_upper: 1.15,
            theta: 0.75,
            t_lambda: 3.0,
        }
    }
}

impl Params {
    pub fn values(&self) -> Vec<(Field, f64)> {
        vec![
            (Field::Gamma, self.gamma as f64),
            (Field::Delta, self.delta),
            (Field::IPhiLower, self.i_phi_lower),
            (Field::IPhiUpper, self.i_phi_upper),
            (Field::Nu, self.nu),
            (Field::PPhiLower, self.p_phi_lower),
            (Field::PPhiUpper, self.p_phi_upper),
            (Field::Theta, self.theta),
            (Field::TLambda, self.t_lambda),
        ]
    }
}

/// Initial state shared by every firm at creation.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Init {
    pub m: f64,
    pub i: f64,
    pub d: f64,
    pub w: f64,
    pub p: f64,
    pub l: u32,
    pub v: u32,
    pub nv: u32,
}

impl Default for Init {
    fn default() -> Self {
        Self {
            m: 0.0,
            i: 5.0,
            d: 5.0,
            w: 1.0,
            p: 1.0,
            l: 1,
            v: 1,
            nv: 0,
        }
    }
}

impl Init {
    pub fn values(&self) -> Vec<(Field, f64)> {
        vec![
            (Field::M, self.m),
            (Field::I, self.i),
            (Field::D, self.d),
            (Field::W, self.w),
            (Field::P, self.p),
            (Field::L, self.l as f64),
            (Field::V, self.v as f64),
            (Field::Nv, self.nv as f64),
        ]
    }
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.population.n_firms, 1..1_000_000).context("invalid number of firms")?;

        let par = &self.params;
        check_num(par.delta, 0.0..1.0).context("invalid maximum wage change")?;
        check_num(par.nu, 0.0..1.0).context("invalid maximum price change")?;
        check_num(par.theta, 0.0..=1.0).context("invalid price acceptance probability")?;
        check_num(par.t_lambda, f64::MIN_POSITIVE..).context("invalid labor productivity")?;
        check_band(par.i_phi_lower, par.i_phi_upper).context("invalid inventory band")?;
        check_band(par.p_phi_lower, par.p_phi_upper).context("invalid price band")?;

        let init = &self.init;
        check_num(init.i, 0.0..).context("invalid initial inventory")?;
        check_num(init.d, 0.0..).context("invalid initial demand")?;
        check_num(init.w, f64::MIN_POSITIVE..).context("invalid initial wage")?;
        check_num(init.p, f64::MIN_POSITIVE..).context("invalid initial price")?;
        if init.v > 0 && init.nv > 0 {
            bail!("initial vacancies and vacancy-free months cannot both be positive");
        }

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_band(lower: f64, upper: f64) -> Result<()> {
    check_num(lower, 0.0..).context("invalid lower bound")?;
    if lower > upper {
        bail!("lower bound {lower} must not exceed upper bound {upper}");
    }
    Ok(())
}
