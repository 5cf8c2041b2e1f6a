use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{MountPrimitive, PrimitiveError};
use crate::volume::MountConfig;

pub const DEFAULT_GOOFYS_BINARY: &str = "goofys";

const ACCESS_KEY_ENV: &str = "AWS_ACCESS_KEY_ID";
const SECRET_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";

/// One way of tearing down a FUSE mount, tried in order until one succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl DetachCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Platform unmount commands: a clean unmount first, then a lazy/forced one.
pub fn default_detach_commands() -> Vec<DetachCommand> {
    #[cfg(target_os = "macos")]
    {
        vec![
            DetachCommand::new("umount", &["-f"]),
            DetachCommand::new("diskutil", &["unmount", "force"]),
        ]
    }

    #[cfg(not(target_os = "macos"))]
    {
        vec![
            DetachCommand::new("fusermount", &["-u"]),
            DetachCommand::new("fusermount", &["-uz"]),
            DetachCommand::new("fusermount3", &["-u"]),
            DetachCommand::new("fusermount3", &["-uz"]),
        ]
    }
}

/// Mounts buckets by running the goofys binary.
///
/// goofys daemonizes once the mount is serving, so awaiting the spawned
/// process is awaiting the mount.
#[derive(Debug, Clone)]
pub struct GoofysPrimitive {
    binary: PathBuf,
    detach_commands: Vec<DetachCommand>,
}

impl Default for GoofysPrimitive {
    fn default() -> Self {
        Self::new(DEFAULT_GOOFYS_BINARY)
    }
}

impl GoofysPrimitive {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            detach_commands: default_detach_commands(),
        }
    }

    pub fn with_detach_commands(mut self, commands: Vec<DetachCommand>) -> Self {
        self.detach_commands = commands;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Command line for mounting `config` at `mountpoint`. Credentials are
    /// not part of it; they travel in the environment.
    pub fn command_args(mountpoint: &Path, config: &MountConfig) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        let mut flag = |name: &str, value: String| {
            args.push(name.into());
            args.push(value.into());
        };

        for option in &config.fuse_options {
            flag("-o", option.clone());
        }
        flag(
            "--stat-cache-ttl",
            format!("{}s", config.stat_cache_ttl.as_secs()),
        );
        flag(
            "--type-cache-ttl",
            format!("{}s", config.type_cache_ttl.as_secs()),
        );
        if let Some(endpoint) = &config.endpoint {
            flag("--endpoint", endpoint.clone());
        }
        if let Some(region) = &config.region {
            flag("--region", region.clone());
        }
        if let Some(storage_class) = &config.storage_class {
            flag("--storage-class", storage_class.clone());
        }
        flag("--acl", config.acl.clone());
        if let Some(uid) = config.uid {
            flag("--uid", uid.to_string());
        }
        if let Some(gid) = config.gid {
            flag("--gid", gid.to_string());
        }
        // leading zero: goofys parses these as octal
        flag("--dir-mode", format!("0{:o}", config.dir_mode));
        flag("--file-mode", format!("0{:o}", config.file_mode));
        if let Some(cache) = &config.cache {
            flag(
                "--cache",
                format!("--free:{}:{}", cache.free, cache.directory.display()),
            );
        }

        if config.cheap {
            args.push("--cheap".into());
        }
        if config.debug_s3 {
            args.push("--debug_s3".into());
        }

        args.push(config.source().into());
        args.push(mountpoint.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl MountPrimitive for GoofysPrimitive {
    async fn attach(&self, mountpoint: &Path, config: &MountConfig) -> Result<(), PrimitiveError> {
        if let Some(cache) = &config.cache {
            tokio::fs::create_dir_all(&cache.directory)
                .await
                .map_err(|e| {
                    PrimitiveError::Message(format!(
                        "failed to create cache directory {}: {}",
                        cache.directory.display(),
                        e
                    ))
                })?;
        }

        let mut cmd = Command::new(&self.binary);
        cmd.args(Self::command_args(mountpoint, config))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(credentials) = &config.credentials {
            cmd.env(ACCESS_KEY_ENV, &credentials.access_key)
                .env(SECRET_KEY_ENV, &credentials.secret_key);
        }

        tracing::debug!(
            binary = %self.binary.display(),
            source = %config.source(),
            mountpoint = %mountpoint.display(),
            "running goofys"
        );

        let program = self.binary.display().to_string();
        let output = cmd.output().await.map_err(|source| PrimitiveError::Spawn {
            program: program.clone(),
            source,
        })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(PrimitiveError::Failed {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    async fn force_detach(&self, mountpoint: &Path) -> Result<(), PrimitiveError> {
        let mut last_error =
            PrimitiveError::Message("no unmount command configured".to_string());

        for detach in &self.detach_commands {
            let result = Command::new(&detach.program)
                .args(&detach.args)
                .arg(mountpoint)
                .stdin(Stdio::null())
                .output()
                .await;

            match result {
                Ok(output) if output.status.success() => {
                    tracing::debug!(
                        program = %detach.program,
                        args = ?detach.args,
                        mountpoint = %mountpoint.display(),
                        "unmounted"
                    );
                    return Ok(());
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                    tracing::debug!(
                        program = %detach.program,
                        args = ?detach.args,
                        %stderr,
                        "unmount attempt failed"
                    );
                    last_error = PrimitiveError::Failed {
                        program: detach.program.clone(),
                        status: output.status,
                        stderr,
                    };
                }
                Err(source) => {
                    tracing::debug!(program = %detach.program, error = %source, "unmount command unavailable");
                    last_error = PrimitiveError::Spawn {
                        program: detach.program.clone(),
                        source,
                    };
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::volume::{translate, BucketId, MountDefaults, VolumeOptions};

    fn config(pairs: &[(&str, &str)]) -> MountConfig {
        let options: VolumeOptions = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        translate(
            &BucketId::from_volume_name("b1"),
            &options,
            &MountDefaults::default(),
        )
        .unwrap()
    }

    fn args_of(config: &MountConfig) -> Vec<String> {
        GoofysPrimitive::command_args(Path::new("/mnt/b1"), config)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn flag_values(args: &[String]) -> HashMap<&str, &str> {
        args.windows(2)
            .filter(|w| (w[0].starts_with('-') && !w[1].starts_with("--")) || w[0] == "--cache")
            .map(|w| (w[0].as_str(), w[1].as_str()))
            .collect()
    }

    #[test]
    fn default_command_line() {
        let args = args_of(&config(&[]));
        let flags = flag_values(&args);

        assert_eq!(flags.get("-o"), Some(&"allow_other"));
        assert_eq!(flags.get("--stat-cache-ttl"), Some(&"60s"));
        assert_eq!(flags.get("--acl"), Some(&"private"));
        assert_eq!(flags.get("--dir-mode"), Some(&"0755"));
        assert_eq!(flags.get("--file-mode"), Some(&"0644"));
        assert!(!args.contains(&"--endpoint".to_string()));
        assert!(!args.contains(&"--cheap".to_string()));

        let tail: Vec<&str> = args.iter().rev().take(2).map(String::as_str).collect();
        assert_eq!(tail, vec!["/mnt/b1", "b1"]);
    }

    #[test]
    fn overrides_reach_command_line() {
        let args = args_of(&config(&[
            ("bucket", "real"),
            ("prefix", "sub"),
            ("endpoint", "http://minio:9000"),
            ("region", "eu-west-1"),
            ("uid", "1000"),
            ("file-mode", "600"),
            ("cheap", "true"),
            ("debugs3", "true"),
            ("use-cache", "true"),
        ]));
        let flags = flag_values(&args);

        assert_eq!(flags.get("--endpoint"), Some(&"http://minio:9000"));
        assert_eq!(flags.get("--region"), Some(&"eu-west-1"));
        assert_eq!(flags.get("--uid"), Some(&"1000"));
        assert_eq!(flags.get("--file-mode"), Some(&"0600"));
        assert_eq!(flags.get("--cache"), Some(&"--free:50%:/tmp/b1"));
        assert!(args.contains(&"--cheap".to_string()));
        assert!(args.contains(&"--debug_s3".to_string()));
        assert_eq!(args[args.len() - 2], "real:sub");
    }

    #[test]
    fn credentials_stay_off_the_command_line() {
        let args = args_of(&config(&[("access_key", "AKID"), ("secret_key", "SECRET")]));
        assert!(!args.iter().any(|a| a.contains("AKID") || a.contains("SECRET")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn attach_reports_exit_status() {
        let mountpoint = Path::new("/nonexistent/b1");

        GoofysPrimitive::new("true")
            .attach(mountpoint, &config(&[]))
            .await
            .unwrap();

        let err = GoofysPrimitive::new("false")
            .attach(mountpoint, &config(&[]))
            .await
            .unwrap_err();
        assert!(matches!(err, PrimitiveError::Failed { .. }));

        let err = GoofysPrimitive::new("/nonexistent/goofys")
            .attach(mountpoint, &config(&[]))
            .await
            .unwrap_err();
        assert!(matches!(err, PrimitiveError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn force_detach_falls_through_to_next_command() {
        let mountpoint = Path::new("/nonexistent/b1");

        let primitive = GoofysPrimitive::new("true").with_detach_commands(vec![
            DetachCommand::new("/nonexistent/fusermount", &["-u"]),
            DetachCommand::new("false", &[]),
            DetachCommand::new("true", &[]),
        ]);
        primitive.force_detach(mountpoint).await.unwrap();

        let primitive = GoofysPrimitive::new("true")
            .with_detach_commands(vec![DetachCommand::new("false", &[])]);
        let err = primitive.force_detach(mountpoint).await.unwrap_err();
        assert!(matches!(err, PrimitiveError::Failed { ref program, .. } if program == "false"));
    }
}
