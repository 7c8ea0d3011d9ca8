/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address for the HTTP API.
    pub listen: String,
    /// SQLite database path, or the literal `memory`.
    pub db: String,
    /// Whether to provision demo records at startup.
    pub seed: bool,
}
