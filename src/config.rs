//! Database connection configuration
//!
//! Connection parameters are never hard-coded: they come from an optional
//! `vendaseg.toml` file (or a file named with `--config`) merged with
//! `VENDAS_*` environment variables, loaded once at process start.

use serde::Deserialize;

/// MySQL connection parameters for the sales database.
#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

fn default_host() -> String {
    "localhost".to_string()
}

impl DbConfig {
    /// Load configuration from the optional config file and `VENDAS_*`
    /// environment variables (`VENDAS_HOST`, `VENDAS_USER`,
    /// `VENDAS_PASSWORD`, `VENDAS_DATABASE`). Environment wins over file.
    pub fn load(path: Option<&str>) -> crate::Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("host", default_host())?
            .add_source(config::File::with_name("vendaseg").required(false));

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("VENDAS"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "user = \"analyst\"").unwrap();
        writeln!(file, "password = \"s3cret\"").unwrap();
        writeln!(file, "database = \"VENDAS_DB\"").unwrap();

        let cfg = DbConfig::load(file.path().to_str()).unwrap();
        assert_eq!(cfg.host, "localhost"); // default kicks in
        assert_eq!(cfg.user, "analyst");
        assert_eq!(cfg.password, "s3cret");
        assert_eq!(cfg.database, "VENDAS_DB");
    }

    #[test]
    fn test_host_override_from_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "host = \"db.internal\"").unwrap();
        writeln!(file, "user = \"analyst\"").unwrap();
        writeln!(file, "password = \"s3cret\"").unwrap();
        writeln!(file, "database = \"VENDAS_DB\"").unwrap();

        let cfg = DbConfig::load(file.path().to_str()).unwrap();
        assert_eq!(cfg.host, "db.internal");
    }
}
