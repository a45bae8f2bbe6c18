//! Build command implementation

use anyhow::Result;
use clap::Args;

use crate::build::{compile_db, BuildOptions, BuildResult, Executor};
use crate::config::{BuildConfig, TouchPolicy};
use crate::exec::ProcessToolchain;
use crate::utils::terminal::{print_info, print_success, print_warning};

/// Build-only options
#[derive(Args, Debug, Default)]
pub struct BuildCommand {
    /// Never bump a source's timestamp when one of its headers changed
    #[arg(long)]
    pub no_touch: bool,

    /// Write compile_commands.json into the build directory
    #[arg(long)]
    pub compile_commands: bool,
}

impl BuildCommand {
    /// Touch policy after applying `--no-touch`
    pub fn touch_policy(&self, configured: TouchPolicy) -> TouchPolicy {
        if self.no_touch {
            TouchPolicy::Leave
        } else {
            configured
        }
    }

    /// Execute the build command
    pub fn execute(&self, config: &BuildConfig, dry_run: bool, verbose: bool) -> Result<()> {
        if !config.source_root().is_dir() {
            print_warning(&format!(
                "source directory {} does not exist",
                config.source_dir.display()
            ));
        }

        let options = BuildOptions { dry_run, verbose };
        let toolchain = ProcessToolchain::new(&config.root);
        let result = Executor::new(config, toolchain, options).run()?;

        if self.compile_commands && !dry_run {
            let units = result
                .sources
                .iter()
                .zip(&result.objects)
                .map(|(source, object)| (source.as_path(), object.as_path()));
            let commands = compile_db::entries(config, units);
            if !commands.is_empty() {
                let path = compile_db::write(config, &commands)?;
                if verbose {
                    print_info(&format!("wrote {}", path.display()));
                }
            }
        }

        Self::print_summary(config, &result, dry_run, verbose);
        Ok(())
    }

    fn print_summary(config: &BuildConfig, result: &BuildResult, dry_run: bool, verbose: bool) {
        if !result.any_recompiled() {
            if verbose {
                print_info(&format!(
                    "{} up to date ({} units)",
                    config.binary.display(),
                    result.up_to_date()
                ));
            }
            return;
        }

        let message = format!(
            "{} {} ({} compiled, {} up to date)",
            if dry_run { "would build" } else { "built" },
            config.binary.display(),
            result.compiled.len(),
            result.up_to_date()
        );
        if dry_run {
            print_info(&message);
        } else {
            print_success(&message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_touch_overrides_config() {
        let cmd = BuildCommand {
            no_touch: true,
            compile_commands: false,
        };
        assert_eq!(cmd.touch_policy(TouchPolicy::Touch), TouchPolicy::Leave);

        let cmd = BuildCommand::default();
        assert_eq!(cmd.touch_policy(TouchPolicy::Touch), TouchPolicy::Touch);
        assert_eq!(cmd.touch_policy(TouchPolicy::Leave), TouchPolicy::Leave);
    }
}
