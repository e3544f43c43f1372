use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use log::LevelFilter;

use pox_solver::{
    LoadedScenario, PoolInterface, Reason, ResolverConfig, RuleGenerator, RuleSet, RuleType, Scenario,
    Whitelist,
};

#[derive(Parser, Debug)]
#[command(name = "pox-solver")]
#[command(about = "Inspect the SAT rules generated for a package resolution scenario")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Resolver config file, replacing the scenario's own config
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the generated rules
    Rules {
        /// Scenario JSON file
        scenario: PathBuf,

        /// Ignore platform requirements (php, ext-*, lib-*)
        #[arg(long)]
        ignore_platform_reqs: bool,

        /// Print literals instead of readable sentences
        #[arg(long)]
        raw: bool,
    },

    /// Print the packages rule generation may consider
    Whitelist {
        /// Scenario JSON file
        scenario: PathBuf,
    },

    /// Print rule counts by type and reason
    Stats {
        /// Scenario JSON file
        scenario: PathBuf,

        /// Ignore platform requirements (php, ext-*, lib-*)
        #[arg(long)]
        ignore_platform_reqs: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Result of one rule generation run
struct Generated {
    loaded: LoadedScenario,
    rules: RuleSet,
    whitelist: Whitelist,
}

fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logger(verbosity: u8) {
    let mut builder = env_logger::builder();
    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(level_for(verbosity));
    }
    builder
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

/// Load a scenario with config layered as file, environment, then flags
fn load(scenario: &Path, config: Option<&Path>, ignore_platform_reqs: bool) -> Result<LoadedScenario> {
    let mut scenario = Scenario::from_file(scenario)
        .with_context(|| format!("Failed to load scenario {}", scenario.display()))?;

    if let Some(path) = config {
        scenario.config = ResolverConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
    }
    scenario
        .config
        .apply_env()
        .context("Invalid environment configuration")?;
    if ignore_platform_reqs {
        scenario.config.ignore_platform_reqs = true;
    }

    Ok(scenario.build()?)
}

fn generate(mut loaded: LoadedScenario) -> Result<Generated> {
    let platform = loaded.config.platform_matcher()?;

    let (rules, whitelist) = {
        let mut generator = RuleGenerator::new(&mut loaded.pool).with_platform_matcher(platform);
        let rules = generator.get_rules_for(
            loaded.request.jobs(),
            &loaded.installed,
            loaded.config.ignore_platform_reqs,
        );
        (rules, generator.whitelist().clone())
    };

    Ok(Generated {
        loaded,
        rules,
        whitelist,
    })
}

fn render_rules(generated: &Generated, raw: bool) -> Result<String> {
    if raw {
        return Ok(generated.rules.to_string());
    }

    Ok(generated
        .rules
        .pretty_string(&generated.loaded.pool, &generated.loaded.installed)?)
}

fn render_whitelist(generated: &Generated) -> String {
    let mut ids: Vec<_> = generated.whitelist.iter().copied().collect();
    ids.sort_unstable();

    let pool = &generated.loaded.pool;
    ids.iter()
        .filter_map(|&id| pool.entry(id).map(|entry| (id, entry)))
        .map(|(id, entry)| {
            let marker = if generated.loaded.installed.contains_key(&id) {
                " (installed)"
            } else {
                ""
            };
            format!("{:>4} {}{}\n", id, entry.pretty_string(), marker)
        })
        .collect()
}

fn render_stats(generated: &Generated, json: bool) -> Result<String> {
    let stats = generated.rules.stats();

    if json {
        let by_type: serde_json::Map<String, serde_json::Value> = stats
            .by_type
            .iter()
            .map(|(t, count)| (t.name().to_lowercase(), (*count).into()))
            .collect();
        let by_reason: serde_json::Map<String, serde_json::Value> = stats
            .by_reason
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(r, count)| (r.name().to_string(), (*count).into()))
            .collect();

        let value = serde_json::json!({
            "total": stats.total,
            "assertions": stats.assertions,
            "disabled": stats.disabled,
            "whitelisted": generated.whitelist.len(),
            "by-type": by_type,
            "by-reason": by_reason,
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let mut out = String::new();
    out.push_str(&format!("{} rules, {} assertions\n", stats.total, stats.assertions));
    out.push_str(&format!("{} packages whitelisted\n", generated.whitelist.len()));
    for rule_type in RuleType::ALL {
        out.push_str(&format!("  {:<8}{}\n", rule_type.name(), stats.of_type(rule_type)));
    }
    for reason in Reason::ALL {
        let count = stats.of_reason(reason);
        if count > 0 {
            out.push_str(&format!("  {:<28}{}\n", reason.name(), count));
        }
    }
    Ok(out)
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);
    let config = args.config.as_deref();

    match args.command {
        Commands::Rules {
            scenario,
            ignore_platform_reqs,
            raw,
        } => {
            let generated = generate(load(&scenario, config, ignore_platform_reqs)?)?;
            println!(
                "{} {}",
                style("Rules for").green().bold(),
                style(scenario.display()).cyan()
            );
            print!("{}", render_rules(&generated, raw)?);
        }
        Commands::Whitelist { scenario } => {
            let generated = generate(load(&scenario, config, false)?)?;
            println!(
                "{} {}",
                style("Whitelisted packages for").green().bold(),
                style(scenario.display()).cyan()
            );
            print!("{}", render_whitelist(&generated));
        }
        Commands::Stats {
            scenario,
            ignore_platform_reqs,
            json,
        } => {
            let generated = generate(load(&scenario, config, ignore_platform_reqs)?)?;
            println!("{}", render_stats(&generated, json)?);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}
