use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Medilink telehealth coordination server
#[derive(Parser, Serialize, Deserialize, Clone, Debug)]
#[command(name = "medilink-server", version, about = "Medilink telehealth coordination server")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "MEDILINK_PORT", default_value = "8080")]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "MEDILINK_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Path to TOML config file
    #[arg(long, default_value = "./medilink.toml")]
    pub config: String,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long, env = "MEDILINK_JSON_LOGS")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    pub generate_config: bool,

    /// Hex-encoded JWT signing secret. A random per-boot key is used
    /// when unset; with an in-memory store, tokens die with the process
    /// anyway.
    #[arg(long, env = "MEDILINK_JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// Session token lifetime in hours
    #[arg(long, env = "MEDILINK_TOKEN_TTL_HOURS", default_value = "24")]
    pub token_ttl_hours: i64,

    /// Seed the store with demo users, doctors, and an appointment
    #[arg(long, env = "MEDILINK_SEED_DEMO_DATA")]
    pub seed_demo_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: "0.0.0.0".to_string(),
            config: "./medilink.toml".to_string(),
            json_logs: false,
            generate_config: false,
            jwt_secret: None,
            token_ttl_hours: 24,
            seed_demo_data: false,
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (MEDILINK_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        let cli = Config::parse();
        let config_path = cli.config.clone();

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("MEDILINK_"))
            .merge(Serialized::defaults(cli))
            .extract()
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# Medilink Server Configuration
# Place this file at ./medilink.toml or specify with --config <path>
# All settings can be overridden via environment variables (MEDILINK_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 8080)
# port = 8080

# Bind address (default: 0.0.0.0, all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging for Docker/production
# json_logs = false

# Hex-encoded JWT signing secret; random per boot when unset
# jwt_secret = ""

# Session token lifetime in hours (default: 24)
# token_ttl_hours = 24

# Seed demo users, doctors, and an appointment at startup
# seed_demo_data = false
"#
    .to_string()
}
