use crate::config::Config;
use crate::field::Value;
use crate::firms::Firms;
use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use rmp_serde::{decode, encode};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

/// Order of the wage and workforce rules within a month.
///
/// Prices are always adjusted last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Order {
    #[default]
    WagesFirst,
    WorkforceFirst,
}

/// Drives a firm population stored in a simulation directory.
pub struct Manager {
    sim_dir: PathBuf,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();
        if !sim_dir.is_dir() {
            bail!("{sim_dir:?} is not a directory");
        }
        Ok(Self { sim_dir })
    }

    /// Build a population from the config file and save it.
    pub fn create_population(&self) -> Result<()> {
        let cfg = Config::from_file(self.config_file()).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        let rng = match cfg.population.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng()?,
        };
        let firms = Firms::from_config(&cfg, rng).context("failed to construct firms")?;

        let checkpoint_file = self.checkpoint_file();
        save_checkpoint(&firms, &checkpoint_file)
            .with_context(|| format!("failed to save {checkpoint_file:?}"))?;
        log::info!("created {checkpoint_file:?}");

        Ok(())
    }

    /// Apply one mutation to the saved population.
    pub fn set_property(&self, prop: &str, value: Value, id: Option<usize>) -> Result<()> {
        let mut firms = self.load()?;
        firms
            .set_property(prop, value, id)
            .with_context(|| format!("failed to set {prop}"))?;
        self.save(&firms)
    }

    /// Run the firm rules for one month on the saved population.
    pub fn step_month(&self, order: Order) -> Result<()> {
        let mut firms = self.load()?;

        match order {
            Order::WagesFirst => {
                firms.adjust_wages().context("failed to adjust wages")?;
                firms.adjust_workforce();
            }
            Order::WorkforceFirst => {
                firms.adjust_workforce();
                firms.adjust_wages().context("failed to adjust wages")?;
            }
        }
        firms.adjust_prices();

        log::info!("completed month with order {order:?}");
        self.save(&firms)
    }

    pub fn show_property(&self, prop: &str) -> Result<Vec<f64>> {
        let firms = self.load()?;
        let vals = firms
            .property(prop)
            .with_context(|| format!("failed to read {prop}"))?;
        Ok(vals)
    }

    fn load(&self) -> Result<Firms> {
        let checkpoint_file = self.checkpoint_file();
        let firms = load_checkpoint(&checkpoint_file)
            .with_context(|| format!("failed to load {checkpoint_file:?}"))?;
        log::info!("loaded {checkpoint_file:?}");
        Ok(firms)
    }

    fn save(&self, firms: &Firms) -> Result<()> {
        let checkpoint_file = self.checkpoint_file();
        save_checkpoint(firms, &checkpoint_file)
            .with_context(|| format!("failed to save {checkpoint_file:?}"))
    }

    fn config_file(&self) -> PathBuf {
        self.sim_dir.join("config.toml")
    }

    fn checkpoint_file(&self) -> PathBuf {
        self.sim_dir.join("firms.msgpack")
    }
}

/// Save the whole population, random number generator included.
pub fn save_checkpoint<P: AsRef<Path>>(firms: &Firms, file: P) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    encode::write(&mut writer, firms).context("failed to serialize firms")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}

/// Load a population saved with [`save_checkpoint`].
pub fn load_checkpoint<P: AsRef<Path>>(file: P) -> Result<Firms> {
    let file = file.as_ref();
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut reader = BufReader::new(file);
    let firms: Firms = decode::from_read(&mut reader).context("failed to deserialize firms")?;
    firms.check_shape().context("inconsistent firm arrays")?;
    Ok(firms)
}
