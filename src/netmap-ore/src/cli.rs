//! A thin wrapper over [`clap::Parser`] that fills in an environment
//! variable for every flag that doesn't already declare one explicitly.

use clap::{CommandFactory, FromArgMatches, Parser};

/// Options controlling how [`parse_args`] builds the final [`clap::Command`].
pub struct CliConfig {
    /// Prefix applied to the upper-cased flag name of any argument that has
    /// no explicit `env = "..."` attribute of its own.
    pub env_prefix: Option<&'static str>,
    /// Whether to keep clap's built-in `-V`/`--version` flag.
    pub enable_version_flag: bool,
}

/// Parses `Args` from the process's command line, applying [`CliConfig`].
pub fn parse_args<Args>(config: CliConfig) -> Args
where
    Args: Parser,
{
    let mut cmd = Args::command();

    if let Some(prefix) = config.env_prefix {
        let ids: Vec<String> = cmd
            .get_arguments()
            .map(|arg| arg.get_id().to_string())
            .collect();
        for id in ids {
            let needs_env = cmd
                .get_arguments()
                .find(|arg| arg.get_id().as_str() == id)
                .map(|arg| arg.get_env().is_none())
                .unwrap_or(false);
            if needs_env {
                let env_var = format!("{prefix}{}", id.to_uppercase().replace('-', "_"));
                cmd = cmd.mut_arg(id, |arg| arg.env(env_var));
            }
        }
    }

    if !config.enable_version_flag {
        cmd = cmd.disable_version_flag(true);
    }

    let matches = cmd.get_matches();
    match Args::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(err) => err.exit(),
    }
}
