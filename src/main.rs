use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use firmsim::field::Value;
use firmsim::manager::{Manager, Order};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    sim_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Create,

    Set {
        #[arg(long)]
        prop: String,

        #[arg(long, conflicts_with = "values")]
        value: Option<f64>,

        #[arg(long, value_delimiter = ',')]
        values: Option<Vec<f64>>,

        #[arg(long)]
        id: Option<usize>,
    },

    Step {
        #[arg(long, value_enum, default_value_t)]
        order: Order,
    },

    Show {
        #[arg(long)]
        prop: String,
    },
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.sim_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Create => mgr.create_population()?,
        Command::Set {
            prop,
            value,
            values,
            id,
        } => {
            let value = match (value, values) {
                (Some(val), None) => Value::Scalar(val),
                (None, Some(vals)) => Value::Vector(vals),
                _ => bail!("exactly one of --value and --values is required"),
            };
            mgr.set_property(&prop, value, id)?
        }
        Command::Step { order } => mgr.step_month(order)?,
        Command::Show { prop } => {
            for val in mgr.show_property(&prop)? {
                println!("{val}");
            }
        }
    }

    Ok(())
}
