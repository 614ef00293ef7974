use crate::domain::model::{BindMode, BindScope, Coordinate2D, LoadOptions, SyscallNumber};
use crate::domain::ports::HarnessSettings;
use crate::utils::error::{BridgeError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fallback for `module.path` when neither the file nor the command line sets it.
pub const MODULE_PATH_ENV: &str = "NATIVE_BRIDGE_MODULE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub module: ModuleConfig,
    #[serde(default)]
    pub syscall: SyscallConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub path: Option<String>,
    #[serde(default)]
    pub scope: BindScope,
    #[serde(default)]
    pub mode: BindMode,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_input")]
    pub input: Coordinate2D,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            path: None,
            scope: BindScope::default(),
            mode: BindMode::default(),
            symbol: default_symbol(),
            input: default_input(),
        }
    }
}

fn default_symbol() -> String {
    "swap".to_string()
}

fn default_input() -> Coordinate2D {
    Coordinate2D::new(1.0, 2.0)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyscallConfig {
    /// Raw number for the host kernel; the process-identifier call when unset.
    pub number: Option<i64>,
    #[serde(default)]
    pub args: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BridgeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: TomlConfig =
            toml::from_str(&processed_content).map_err(|e| BridgeError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        if config.module.path.is_none() {
            config.module.path = std::env::var(MODULE_PATH_ENV).ok();
        }

        Ok(config)
    }

    /// 替換環境變數 (例如 ${NATIVE_BRIDGE_MODULE})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BridgeError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        // 未設定的變數保持原樣，交給驗證階段報錯
        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(path) = &self.module.path {
            validation::validate_path("module.path", path)?;
        }

        validation::validate_symbol_name("module.symbol", &self.module.symbol)?;

        if let Some(number) = self.syscall.number {
            validation::validate_range("syscall.number", number, 0, i64::MAX)?;
        }

        validation::validate_syscall_args("syscall.args", &self.syscall.args)?;

        Ok(())
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl HarnessSettings for TomlConfig {
    fn module_path(&self) -> Option<&str> {
        self.module.path.as_deref()
    }

    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            scope: self.module.scope,
            mode: self.module.mode,
        }
    }

    fn symbol(&self) -> &str {
        &self.module.symbol
    }

    fn input(&self) -> Coordinate2D {
        self.module.input
    }

    fn syscall_number(&self) -> Option<SyscallNumber> {
        self.syscall.number.map(SyscallNumber::new)
    }

    fn syscall_args(&self) -> &[i64] {
        &self.syscall.args
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[module]
path = "/opt/modules/libgeometry.so"
scope = "local"
mode = "lazy"
symbol = "translate_unit"
input = { x = 3.5, y = -1.0 }

[syscall]
number = 39
args = []

[logging]
verbose = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.module_path(), Some("/opt/modules/libgeometry.so"));
        assert_eq!(config.load_options(), LoadOptions::local().with_mode(BindMode::Lazy));
        assert_eq!(config.symbol(), "translate_unit");
        assert_eq!(config.input(), Coordinate2D::new(3.5, -1.0));
        assert_eq!(config.syscall_number(), Some(SyscallNumber::new(39)));
        assert!(config.verbose());
        assert!(!config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_empty_sections() {
        let config = TomlConfig::from_toml_str("[module]\npath = \"libm.so.6\"\n").unwrap();

        assert_eq!(config.symbol(), "swap");
        assert_eq!(config.input(), Coordinate2D::new(1.0, 2.0));
        assert_eq!(config.load_options(), LoadOptions::global());
        assert_eq!(config.syscall_number(), None);
        assert!(config.syscall_args().is_empty());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("NATIVE_BRIDGE_TEST_LIB_DIR", "/srv/native");

        let toml_content = r#"
[module]
path = "${NATIVE_BRIDGE_TEST_LIB_DIR}/libswap.so"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.module_path(), Some("/srv/native/libswap.so"));
    }

    #[test]
    fn test_unresolved_variable_fails_validation() {
        let toml_content = r#"
[module]
path = "${NATIVE_BRIDGE_TEST_UNSET_VARIABLE}/libswap.so"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, BridgeError::InvalidConfigValueError { ref field, .. } if field == "module.path"));
    }

    #[test]
    fn test_invalid_values() {
        let too_many = TomlConfig::from_toml_str("[syscall]\nargs = [1, 2, 3, 4, 5, 6, 7]\n").unwrap();
        assert!(too_many.validate().is_err());

        let negative = TomlConfig::from_toml_str("[syscall]\nnumber = -5\n").unwrap();
        assert!(negative.validate().is_err());

        let blank_symbol = TomlConfig::from_toml_str("[module]\nsymbol = \"\"\n").unwrap();
        assert!(blank_symbol.validate().is_err());

        let bad_scope = TomlConfig::from_toml_str("[module]\nscope = \"everywhere\"\n");
        assert!(matches!(bad_scope, Err(BridgeError::ConfigValidationError { .. })));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[module]\npath = \"/tmp/libfixture.so\"\nsymbol = \"swap\"").unwrap();

        let config = TomlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.module_path(), Some("/tmp/libfixture.so"));

        let missing = TomlConfig::from_file("/definitely/not/here.toml");
        assert!(matches!(missing, Err(BridgeError::IoError(_))));
    }
}
