mod args;
mod bearer;
mod config;
mod discovery;
mod error;
mod kubeconfig;
mod utils;

use args::{Args, ClustersCommand, Command};
use bearer::IamAuthenticator;
use config::{Config, ConfigError};
use discovery::DiscoveryClient;
use error::Error;
use std::{path::Path, process, sync::Arc};

fn main() {
    let args = args::parse();

    let filter = if args.verbose { "warn,pharos=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: could not start runtime: {}", err);
            process::exit(1);
        }
    };

    // an interrupt can only land on an await point, all of which precede the kubeconfig write
    let result = runtime.block_on(async {
        tokio::select! {
            result = run(&args) => result,
            Ok(()) = tokio::signal::ctrl_c() => Err(Error::Interrupted),
        }
    });

    if let Err(err) = result {
        log::debug!("{} failed: {}", describe(&args.command), err.kind());
        eprintln!("error: {}: {}", describe(&args.command), err);
        process::exit(1);
    }
}

fn describe(command: &Command) -> &'static str {
    match command {
        Command::Clusters { command } => match command {
            ClustersCommand::Current { .. } => "unable to retrieve cluster",
            ClustersCommand::Switch { .. } => "cluster switch unsuccessful",
            ClustersCommand::Get { .. } => "unable to fetch cluster",
        },
        Command::Configure { .. } => "unable to save configuration",
    }
}

fn discovery_client(config_path: Option<&Path>) -> Result<DiscoveryClient, Error> {
    let mut config = Config::new(config_path)?;
    config.load()?;
    let client = DiscoveryClient::from_config(&config, Arc::new(IamAuthenticator::default()))?;
    log::debug!("discovery at {} (timeout {:?})", client.base_url(), client.timeout());
    Ok(client)
}

async fn run(args: &Args) -> Result<(), Error> {
    match &args.command {
        Command::Clusters { command } => match command {
            ClustersCommand::Current { file } => {
                let name = kubeconfig::current_cluster(file.resolve()?)?;
                println!("{}", name);
            }
            ClustersCommand::Switch { cluster_id, file } => {
                println!("SWITCHING TO CLUSTER {}...", cluster_id);
                let path = file.resolve()?;
                let client = discovery_client(args.config.as_deref())?;
                let switched = kubeconfig::switch_cluster(&path, cluster_id, &client).await?;
                if let Some(warning) = switched.warning() {
                    eprintln!("WARNING: {}", warning);
                }
                println!("SUCCESS: SWITCHED CLUSTER TO {}", cluster_id);
            }
            ClustersCommand::Get { cluster_id } => {
                let client = discovery_client(args.config.as_deref())?;
                let cluster = client.fetch_cluster(cluster_id).await?;
                println!("{}", cluster);
            }
        },
        Command::Configure { base_url, profile } => {
            let mut config = Config::new(args.config.as_deref())?;
            match config.load() {
                Ok(()) | Err(ConfigError::NotConfigured { .. }) => {}
                Err(err) => return Err(err.into()),
            }
            if let Some(base_url) = base_url {
                config.base_url = Some(base_url.clone());
            }
            if let Some(profile) = profile {
                config.cloud_profile = Some(profile.clone());
            }
            config.save()?;
            println!("configuration saved to {}", config.path().display());
        }
    }
    Ok(())
}
