/// Positional arguments: `[config_path] [symbol]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorArgs {
    pub config_path: String,
    /// Overrides the symbol from the config file
    pub symbol: Option<String>,
}

impl MonitorArgs {
    /// Parse from the process arguments
    pub fn from_env(default_config: &str) -> Self {
        Self::parse(std::env::args().skip(1), default_config)
    }

    pub fn parse<I: IntoIterator<Item = String>>(args: I, default_config: &str) -> Self {
        let mut args = args.into_iter();
        let config_path = args.next().unwrap_or_else(|| default_config.to_string());
        let symbol = args.next().map(|s| s.to_uppercase());

        Self { config_path, symbol }
    }
}
