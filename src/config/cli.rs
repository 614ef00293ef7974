use crate::config::toml_config::{TomlConfig, MODULE_PATH_ENV};
use crate::domain::model::{BindMode, BindScope, Coordinate2D};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "native-bridge")]
#[command(about = "Bind a symbol from a native module and issue a raw system call")]
pub struct CliConfig {
    /// TOML configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<String>,

    /// Shared library to load
    #[arg(long, env = MODULE_PATH_ENV)]
    pub module: Option<String>,

    /// Exported `Coordinate2D -> Coordinate2D` function to bind
    #[arg(long)]
    pub symbol: Option<String>,

    #[arg(long, value_enum)]
    pub scope: Option<BindScope>,

    #[arg(long, value_enum)]
    pub mode: Option<BindMode>,

    #[arg(short, long, allow_hyphen_values = true)]
    pub x: Option<f64>,

    #[arg(short, long, allow_hyphen_values = true)]
    pub y: Option<f64>,

    /// Raw syscall number for this host (default: process identifier)
    #[arg(long)]
    pub syscall: Option<i64>,

    /// Syscall argument, repeatable, at most six
    #[arg(long = "arg", allow_hyphen_values = true)]
    pub args: Vec<i64>,

    #[arg(long, help = "Skip loading and binding the module")]
    pub skip_binding: bool,

    #[arg(long, help = "Skip the raw system call")]
    pub skip_syscall: bool,

    #[arg(long, help = "Print the report as JSON")]
    pub json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Loads the config file when one is given, applies command-line
    /// overrides and validates the result.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let base = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        let merged = self.apply_overrides(base);
        merged.validate()?;
        Ok(merged)
    }

    pub fn apply_overrides(&self, mut config: TomlConfig) -> TomlConfig {
        if let Some(module) = &self.module {
            config.module.path = Some(module.clone());
        }
        if let Some(symbol) = &self.symbol {
            config.module.symbol = symbol.clone();
        }
        if let Some(scope) = self.scope {
            config.module.scope = scope;
        }
        if let Some(mode) = self.mode {
            config.module.mode = mode;
        }
        let input = config.module.input;
        config.module.input = Coordinate2D::new(self.x.unwrap_or(input.x), self.y.unwrap_or(input.y));
        if let Some(number) = self.syscall {
            config.syscall.number = Some(number);
        }
        if !self.args.is_empty() {
            config.syscall.args = self.args.clone();
        }
        config
    }

    pub fn verbose_or(&self, config: &TomlConfig) -> bool {
        self.verbose || config.verbose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::HarnessSettings;

    #[test]
    fn test_flags_override_file_values() {
        let cli = CliConfig::parse_from([
            "native-bridge",
            "--module",
            "/opt/libother.so",
            "--scope",
            "local",
            "-x",
            "-4.5",
            "--syscall",
            "3",
            "--arg",
            "-1",
        ]);
        let base = TomlConfig::from_toml_str("[module]\npath = \"/opt/libswap.so\"\nsymbol = \"swap\"\n").unwrap();

        let merged = cli.apply_overrides(base);
        assert_eq!(merged.module_path(), Some("/opt/libother.so"));
        assert_eq!(merged.load_options().scope, BindScope::Local);
        assert_eq!(merged.symbol(), "swap");
        assert_eq!(merged.input(), Coordinate2D::new(-4.5, 2.0));
        assert_eq!(merged.syscall_number().map(|n| n.get()), Some(3));
        assert_eq!(merged.syscall_args(), &[-1]);
    }
}
