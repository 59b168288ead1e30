use crate::kubeconfig::{Kubeconfig, KubeconfigError};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct KubeconfigFile {
    /// Kubeconfig file to use (defaults to $HOME/.kube/config)
    #[structopt(short = "f", long = "file", parse(from_os_str))]
    pub path: Option<PathBuf>,
}

impl KubeconfigFile {
    pub fn resolve(&self) -> Result<PathBuf, KubeconfigError> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Kubeconfig::default_path(),
        }
    }
}

#[derive(Debug, StructOpt)]
pub enum ClustersCommand {
    /// Print current cluster
    Current {
        #[structopt(flatten)]
        file: KubeconfigFile,
    },
    /// Switch to specified cluster
    Switch {
        cluster_id: String,
        #[structopt(flatten)]
        file: KubeconfigFile,
    },
    /// Print the discovery record of a cluster
    Get { cluster_id: String },
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Discover clusters and switch between them
    Clusters {
        #[structopt(subcommand)]
        command: ClustersCommand,
    },
    /// Store the discovery base URL and cloud profile
    Configure {
        #[structopt(long = "base-url")]
        base_url: Option<String>,
        #[structopt(long = "profile")]
        profile: Option<String>,
    },
}

/// Pharos is a tool for cluster discovery and distribution of kubeconfig files.
#[derive(Debug, StructOpt)]
#[structopt(name = "pharos")]
pub struct Args {
    /// Pharos configuration file (defaults to $HOME/.kube/pharos/config)
    #[structopt(long = "config", parse(from_os_str), global = true)]
    pub config: Option<PathBuf>,
    /// Log debug output to stderr
    #[structopt(long = "verbose", global = true)]
    pub verbose: bool,
    #[structopt(subcommand)]
    pub command: Command,
}

pub fn parse() -> Args {
    Args::from_args()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_switch_with_file() {
        let args = Args::from_iter(&["pharos", "clusters", "switch", "production-6906ce", "-f", "/tmp/kubeconfig"]);
        match args.command {
            Command::Clusters {
                command: ClustersCommand::Switch { cluster_id, file },
            } => {
                assert_eq!(cluster_id, "production-6906ce");
                assert_eq!(file.resolve().unwrap(), PathBuf::from("/tmp/kubeconfig"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn current_defaults_to_home_kubeconfig() {
        let args = Args::from_iter(&["pharos", "clusters", "current"]);
        match args.command {
            Command::Clusters {
                command: ClustersCommand::Current { file },
            } => {
                let expected = dirs::home_dir().unwrap().join(".kube").join("config");
                assert_eq!(file.resolve().unwrap(), expected);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn switch_requires_cluster_id() {
        assert!(Args::from_iter_safe(&["pharos", "clusters", "switch"]).is_err());
    }

    #[test]
    fn configure_takes_optional_fields() {
        let args = Args::from_iter(&["pharos", "--config", "/tmp/pharos", "configure", "--profile", "egg"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/pharos")));
        match args.command {
            Command::Configure { base_url, profile } => {
                assert_eq!(base_url, None);
                assert_eq!(profile.as_deref(), Some("egg"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
