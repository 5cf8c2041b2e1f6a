use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Unix socket docker connects to
    pub socket_path: PathBuf,
    // log level for http tracing
    pub log_level: tracing::Level,
}

impl Config {
    pub fn new(socket_path: PathBuf) -> Self {
        tracing::info!(
            "Creating plugin API Config: socket_path={}",
            socket_path.display()
        );
        Self {
            socket_path,
            log_level: tracing::Level::INFO,
        }
    }
}
