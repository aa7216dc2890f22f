use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] ConfigError),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Placeholder the wallet analyzer URL template must carry
pub const WALLET_ADDRESS_PLACEHOLDER: &str = "{wallet_address}";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// General system settings
    pub system: SystemSettings,

    /// Trader selection thresholds
    pub selection: SelectionConfig,

    /// Crawl-target derivation settings
    pub crawl: CrawlConfig,

    /// Feed file locations
    pub feeds: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSettings {
    /// Enable debug mode
    pub debug_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Percentage-PnL rank threshold a trader must clear to be visited
    pub top_n_cutoff: u32,

    /// Hard cap on wallets queued per run
    pub max_wallets_to_visit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// How many top-gainer rows to expand into detail crawls
    /// (None = all of them)
    pub listing_limit: Option<usize>,

    /// Entry page for the top-gainers table
    pub gainers_url: String,

    /// Wallet analytics page, with a `{wallet_address}` placeholder
    pub wallet_analyzer_url_template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Directory feed files are written into
    pub output_dir: PathBuf,

    /// Top-gainers JSON feed file name
    pub top_gainers_file: String,

    /// Top-traders JSON feed file name
    pub top_traders_file: String,

    /// Wallet-stats JSON feed file name
    pub wallet_stats_file: String,

    /// Wallet-stats CSV export file name
    pub wallet_stats_csv_file: String,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            system: SystemSettings { debug_mode: false },
            selection: SelectionConfig {
                top_n_cutoff: 250,
                max_wallets_to_visit: 15,
            },
            crawl: CrawlConfig {
                listing_limit: None,
                // Volume > 500k, Liquidity > 250k, MCap > 1M
                gainers_url: "https://dexscreener.com/gainers/solana?min24HSells=30&min24HTxns=300&min24HVol=500000&minLiq=250000&minMarketCap=1000000&order=desc&rankBy=priceChangeH24".to_string(),
                wallet_analyzer_url_template: "https://dexcheck.ai/app/wallet-analyzer/{wallet_address}".to_string(),
            },
            feeds: FeedConfig {
                output_dir: PathBuf::from("feeds"),
                top_gainers_file: "top_gainers.json".to_string(),
                top_traders_file: "top_traders.json".to_string(),
                wallet_stats_file: "wallet_stats.json".to_string(),
                wallet_stats_csv_file: "wallet_stats.csv".to_string(),
            },
        }
    }
}

impl SelectionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_n_cutoff == 0 {
            return Err(ConfigurationError::InvalidValue(
                "top_n_cutoff must be at least 1".to_string(),
            ));
        }

        if self.max_wallets_to_visit == 0 {
            return Err(ConfigurationError::InvalidValue(
                "max_wallets_to_visit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl CrawlConfig {
    pub fn validate(&self) -> Result<()> {
        if self.listing_limit == Some(0) {
            return Err(ConfigurationError::InvalidValue(
                "listing_limit of 0 would crawl nothing; omit it to crawl all listings".to_string(),
            ));
        }

        if self.gainers_url.is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "gainers_url is required".to_string(),
            ));
        }

        if !self.wallet_analyzer_url_template.contains(WALLET_ADDRESS_PLACEHOLDER) {
            return Err(ConfigurationError::InvalidValue(format!(
                "wallet_analyzer_url_template must contain the {} placeholder",
                WALLET_ADDRESS_PLACEHOLDER
            )));
        }

        Ok(())
    }

    /// Fill the wallet analyzer URL template for one wallet
    pub fn wallet_analyzer_url(&self, wallet_address: &str) -> String {
        self.wallet_analyzer_url_template
            .replace(WALLET_ADDRESS_PLACEHOLDER, wallet_address)
    }
}

impl FeedConfig {
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "feeds output_dir is required".to_string(),
            ));
        }

        for name in [
            &self.top_gainers_file,
            &self.top_traders_file,
            &self.wallet_stats_file,
            &self.wallet_stats_csv_file,
        ] {
            if name.is_empty() {
                return Err(ConfigurationError::InvalidValue(
                    "feed file names must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn top_gainers_path(&self) -> PathBuf {
        self.output_dir.join(&self.top_gainers_file)
    }

    pub fn top_traders_path(&self) -> PathBuf {
        self.output_dir.join(&self.top_traders_file)
    }

    pub fn wallet_stats_path(&self) -> PathBuf {
        self.output_dir.join(&self.wallet_stats_file)
    }

    pub fn wallet_stats_csv_path(&self) -> PathBuf {
        self.output_dir.join(&self.wallet_stats_csv_file)
    }
}

impl ScoutConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config_builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&ScoutConfig::default())?);

        // Add config file if it exists
        if config_path.as_ref().exists() {
            info!(
                "Loading configuration from: {}",
                config_path.as_ref().display()
            );
            config_builder = config_builder.add_source(File::from(config_path.as_ref()));
        } else {
            debug!("Config file not found, using defaults and environment variables");
        }

        // Add environment variables with prefix
        config_builder = config_builder.add_source(
            Environment::with_prefix("SCOUT")
                .try_parsing(true)
                .separator("__"),
        );

        let config = config_builder.build()?;
        let scout_config: ScoutConfig = config.try_deserialize()?;

        scout_config.validate()?;

        Ok(scout_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.selection.validate()?;
        self.crawl.validate()?;
        self.feeds.validate()?;
        Ok(())
    }
}

/// Configuration manager for loading and holding the scout configuration
#[derive(Debug)]
pub struct ConfigManager {
    config: ScoutConfig,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Result<Self> {
        let config = ScoutConfig::load()?;
        info!("Configuration loaded successfully");
        debug!("Configuration: {:#?}", config);

        Ok(Self { config })
    }

    /// Create configuration manager from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = ScoutConfig::load_from_path(path)?;
        Ok(Self { config })
    }

    /// Get a reference to the current configuration
    pub fn config(&self) -> &ScoutConfig {
        &self.config
    }
}
