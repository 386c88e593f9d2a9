use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::{debug, info};

use pgtune::conf::ConfFile;
use pgtune::system::SystemInfo;
use pgtune::{recommend_all, ParallelRecommender};

#[derive(Parser, Debug)]
#[command(name = "pgtune")]
#[command(about = "Recommend PostgreSQL parallelism settings for this machine", long_about = None)]
struct Args {
    /// Number of CPUs to tune for (defaults to the number of logical CPUs)
    #[arg(long, env = "PGTUNE_CPUS", allow_negative_numbers = true)]
    cpus: Option<i64>,

    /// postgresql.conf to update with the recommendations
    #[arg(long, value_name = "PATH")]
    conf_path: Option<PathBuf>,

    /// Write the updated conf here instead of overwriting --conf-path
    #[arg(long, value_name = "PATH")]
    out_path: Option<PathBuf>,

    /// Show changes without writing them
    #[arg(long)]
    dry_run: bool,

    /// Only print the recommended settings
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    if args.out_path.is_some() && args.conf_path.is_none() {
        anyhow::bail!("--out-path requires --conf-path");
    }

    if args.dry_run && args.conf_path.is_none() {
        anyhow::bail!("--dry-run requires --conf-path");
    }

    let system = SystemInfo::detect(args.cpus);
    if !args.quiet {
        println!("Tuning for {} CPUs", system.cpus);
    }

    let recommender = ParallelRecommender::new(system.cpus);
    let recommendations = recommend_all(&recommender)?;

    for rec in &recommendations {
        println!("{}", rec);
    }

    let Some(conf_path) = args.conf_path else {
        return Ok(());
    };

    let mut conf = ConfFile::load(&conf_path)?;
    let changes = conf.apply(&recommendations);
    debug!("{} changes for {}", changes.len(), conf_path.display());

    if !args.quiet {
        if changes.is_empty() {
            println!("\n{} is already tuned", conf_path.display());
        } else {
            println!("\nChanges to {}:", conf_path.display());
            for change in &changes {
                if let Some(old) = &change.old {
                    println!("- {}", old);
                }
                println!("+ {}", change.new);
            }
        }
    }

    if args.dry_run {
        info!("dry run, not writing {}", conf_path.display());
        return Ok(());
    }

    if changes.is_empty() && args.out_path.is_none() {
        info!("no changes, leaving {} untouched", conf_path.display());
        return Ok(());
    }

    let out_path = args.out_path.unwrap_or(conf_path);
    conf.save(&out_path)?;

    if !args.quiet {
        println!("Saved {}", out_path.display());
    }

    Ok(())
}
