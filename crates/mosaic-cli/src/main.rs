//! Mosaic - Command-line shell host
//!
//! Navigates the shell to one or more paths and prints the composed
//! document after each one.
//!
//! ```text
//! mosaic [--config shell.json] [--assets ./dist] [--outlet] /page/home /mfe1
//! ```

use anyhow::{bail, Context, Result};
use mosaic_net::{FileTransport, HttpConfig, HttpTransport, SchemeTransport};
use mosaic_shell::{PageState, Shell, ShellConfig};
use std::path::PathBuf;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "mimalloc")]
use mimalloc::MiMalloc;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const USAGE: &str = "usage: mosaic [--config <file>] [--assets <dir>] [--outlet] [path...]";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    assets: Option<PathBuf>,
    outlet_only: bool,
    paths: Vec<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                parsed.config = Some(args.next().context("--config needs a file")?.into());
            }
            "--assets" | "-a" => {
                parsed.assets = Some(args.next().context("--assets needs a directory")?.into());
            }
            "--outlet" => parsed.outlet_only = true,
            "--help" | "-h" => bail!(USAGE),
            flag if flag.starts_with('-') && flag.len() > 1 => bail!("unknown option {flag}\n{USAGE}"),
            _ => parsed.paths.push(arg),
        }
    }
    if parsed.paths.is_empty() {
        parsed.paths.push("/".to_string());
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => ShellConfig::load(path)?,
        None => ShellConfig::default(),
    };
    let assets = match args.assets {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine working directory")?,
    };

    tracing::info!(version = mosaic_shell::VERSION, assets = %assets.display(), "starting shell");

    let http = HttpTransport::new(HttpConfig::default())?;
    let transport = Rc::new(SchemeTransport::new(http, FileTransport::new(assets)));
    let shell = Shell::new(config, transport)?;

    let executor = smol::LocalExecutor::new();
    let last_state = smol::block_on(executor.run(async {
        let mut last_state = None;
        for path in &args.paths {
            let route = shell.navigate(path).await?;
            tracing::info!(path = %path, ?route, state = ?shell.page_state(), "navigation settled");
            println!("{}", if args.outlet_only { shell.outlet_html() } else { shell.html() });
            last_state = shell.page_state();
        }
        anyhow::Ok(last_state)
    }))?;

    shell.close();

    if let Some(PageState::Error(message)) = last_state {
        bail!("page failed: {message}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults_to_home() {
        let parsed = args(&[]).unwrap();
        assert_eq!(parsed.paths, vec!["/"]);
        assert!(parsed.config.is_none());
    }

    #[test]
    fn test_flags_and_paths() {
        let parsed = args(&["--config", "shell.json", "/page/home", "-a", "dist", "--outlet", "/mfe1"]).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("shell.json")));
        assert_eq!(parsed.assets, Some(PathBuf::from("dist")));
        assert!(parsed.outlet_only);
        assert_eq!(parsed.paths, vec!["/page/home", "/mfe1"]);
    }

    #[test]
    fn test_missing_flag_value() {
        assert!(args(&["--config"]).is_err());
        assert!(args(&["--bogus"]).is_err());
    }
}
