use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use meta_filter_forge::{
    ParamValue,
    catalog::OperationCatalog,
    filters,
    graph::Topology,
    preset::Preset,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, PartialEq)]
enum Command {
    List,
    Describe(String),
    Attach(String),
}

#[derive(Debug, Default, Clone)]
struct Cli {
    command: Option<Command>,
    catalog: Option<PathBuf>,
    preset: Option<PathBuf>,
    sets: Vec<(String, String)>,
}

const USAGE: &str = "supported: --list, --describe <filter>, --attach <filter>, \
                     --set <param>=<value>, --preset <file.json>, --catalog <file.json>";

fn parse_cli(args: &[String]) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut i = 0;
    let value_of = |i: usize, flag: &str| -> Result<String> {
        args.get(i + 1)
            .cloned()
            .ok_or_else(|| anyhow!("missing value for {flag}"))
    };
    while i < args.len() {
        match args[i].as_str() {
            "--list" => {
                cli.command = Some(Command::List);
                i += 1;
            }
            "--describe" => {
                cli.command = Some(Command::Describe(value_of(i, "--describe")?));
                i += 2;
            }
            "--attach" => {
                cli.command = Some(Command::Attach(value_of(i, "--attach")?));
                i += 2;
            }
            "--set" => {
                let v = value_of(i, "--set")?;
                let Some((k, val)) = v.split_once('=') else {
                    bail!("--set expects <param>=<value>, got '{v}'");
                };
                cli.sets.push((k.trim().to_string(), val.to_string()));
                i += 2;
            }
            "--preset" => {
                cli.preset = Some(PathBuf::from(value_of(i, "--preset")?));
                i += 2;
            }
            "--catalog" => {
                cli.catalog = Some(PathBuf::from(value_of(i, "--catalog")?));
                i += 2;
            }
            other => bail!("unknown argument: {other} ({USAGE})"),
        }
    }
    Ok(cli)
}

fn run(cli: Cli) -> Result<()> {
    let registry = filters::builtin_registry().context("failed to register built-in filters")?;

    match cli.command.ok_or_else(|| anyhow!("no command given ({USAGE})"))? {
        Command::List => {
            for def in registry.iter() {
                let info = def.info();
                println!("{:<16} {:<34} [{}]", info.name, info.title, info.categories.join(":"));
            }
        }
        Command::Describe(name) => {
            let def = registry
                .get(&name)
                .ok_or_else(|| anyhow!("unknown filter '{name}'"))?;
            let mut doc = def.describe()?;
            doc["fingerprint"] = serde_json::json!(def.fingerprint()?);
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        Command::Attach(name) => {
            let catalog = match &cli.catalog {
                Some(path) => OperationCatalog::load_from_path(path)
                    .with_context(|| format!("failed to load catalog {}", path.display()))?,
                None => OperationCatalog::load_default()?,
            };
            let mut instance = registry
                .attach(&name, &catalog)
                .with_context(|| format!("failed to attach '{name}'"))?;

            if let Some(path) = &cli.preset {
                let preset = Preset::load(path)
                    .with_context(|| format!("failed to read preset {}", path.display()))?;
                preset.apply(&mut instance)?;
            }

            let schema = instance.definition().schema().clone();
            let mut writes = Vec::with_capacity(cli.sets.len());
            for (k, v) in &cli.sets {
                let spec = schema
                    .get(k)
                    .ok_or_else(|| anyhow!("'{name}' has no parameter '{k}'"))?;
                let value = ParamValue::parse_as(v, spec.ty)
                    .ok_or_else(|| anyhow!("'{v}' is not a valid {} for '{k}'", spec.ty))?;
                writes.push((k.as_str(), value));
            }
            instance.set_many(writes)?;

            let topology: &Topology = instance.topology();
            let chain: Vec<&str> = topology
                .main_chain()
                .unwrap_or_default()
                .into_iter()
                .map(|id| topology.entry(id).label.as_str())
                .collect();
            let mut doc = instance.snapshot();
            doc["main_chain"] = serde_json::json!(chain);
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,meta_filter_forge=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_cli(&args)?;
    run(cli)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_attach_with_sets() {
        let cli = parse_cli(&args(&["--attach", "gegl:chrome", "--set", "glow=9", "--set", "value=#ffffff"])).unwrap();
        assert_eq!(cli.command, Some(Command::Attach("gegl:chrome".to_string())));
        assert_eq!(
            cli.sets,
            vec![
                ("glow".to_string(), "9".to_string()),
                ("value".to_string(), "#ffffff".to_string())
            ]
        );
    }

    #[test]
    fn rejects_unknown_flags_and_missing_values() {
        assert!(parse_cli(&args(&["--bogus"])).is_err());
        assert!(parse_cli(&args(&["--describe"])).is_err());
        assert!(parse_cli(&args(&["--set", "novalue"])).is_err());
    }
}
