use std::path::PathBuf;

use clap::Args;

use s3vol_daemon::service_config::{ConfigError, Overrides};
use s3vol_daemon::state::{AppConfig, StateError};
use s3vol_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// Directory bucket mountpoints are created under
    /// [default: /var/lib/docker-volumes/s3vol]
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Unix socket to serve the plugin API on
    /// [default: /run/docker/plugins/s3vol.sock]
    #[arg(long)]
    pub socket: Option<PathBuf>,

    /// goofys binary to mount buckets with [default: goofys]
    #[arg(long)]
    pub goofys_bin: Option<PathBuf>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Default log level; RUST_LOG overrides it per target [default: info]
    #[arg(long)]
    pub log_level: Option<tracing::Level>,

    /// Object store endpoint for volumes that do not set one
    #[arg(long, env = "ENDPOINT")]
    pub endpoint: Option<String>,

    /// Access key for volumes that do not set one
    #[arg(long, env = "ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// Secret key for volumes that do not set one
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("state error: {0}")]
    StateError(#[from] StateError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),
}

impl Serve {
    fn overrides(&self) -> Overrides {
        Overrides {
            root: self.root.clone(),
            socket: self.socket.clone(),
            goofys_bin: self.goofys_bin.clone(),
            log_dir: self.log_dir.clone(),
            log_level: self.log_level,
            endpoint: self.endpoint.clone(),
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let file = AppConfig::load(ctx.config_path.as_deref())?;
        let config = ServiceConfig::resolve(self.overrides(), file)?;

        spawn_service(&config).await;
        Ok("plugin stopped".to_string())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::cli::args::Args;
    use crate::Command;

    fn serve(argv: &[&str]) -> super::Serve {
        match Args::try_parse_from(argv).unwrap().command {
            Command::Serve(serve) => serve,
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn flags_become_overrides() {
        let serve = serve(&[
            "s3vol",
            "serve",
            "--root",
            "/srv/vols",
            "--log-level",
            "debug",
            "--endpoint",
            "http://minio:9000",
        ]);
        let overrides = serve.overrides();

        assert_eq!(overrides.root.as_deref(), Some(std::path::Path::new("/srv/vols")));
        assert_eq!(overrides.log_level, Some(tracing::Level::DEBUG));
        assert_eq!(overrides.endpoint.as_deref(), Some("http://minio:9000"));
        assert!(overrides.socket.is_none());
    }

    #[test]
    fn config_flag_is_global() {
        let args = Args::try_parse_from(["s3vol", "serve", "--config", "/etc/s3vol.toml"]).unwrap();
        assert_eq!(args.config, Some("/etc/s3vol.toml".into()));
    }
}
