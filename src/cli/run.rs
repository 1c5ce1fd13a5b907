use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use tracing::debug;

use crate::cli::Handler;
use crate::core::client::{Client, WorkloadClient};
use crate::core::config::Configuration;
use crate::core::ports::process_ports;
use crate::core::workload::{
    key_value_map, process_host_aliases, process_resources, split_tokens, Container, Error,
    Workload,
};

/// Run a new workload on the cluster.
#[derive(Debug, Args)]
pub struct RunWorkload {
    /// Name of the workload
    pub name: Option<String>,

    /// Namespace to deploy into
    #[clap(long)]
    pub namespace: Option<String>,

    /// Image to run
    #[clap(long)]
    pub image: Option<String>,

    /// Command to run in the container
    #[clap(long)]
    pub command: Option<String>,

    /// Overwrite the default ENTRYPOINT of the image
    #[clap(long)]
    pub entrypoint: Option<String>,

    /// Set one or more environment variables in the form of key=value
    #[clap(short, long)]
    pub env: Vec<String>,

    /// Annotations (key/value metadata) to set on the workload
    #[clap(long)]
    pub annotation: Vec<String>,

    /// Key/value pairs used to label the workload and make scheduling decisions
    #[clap(short, long)]
    pub label: Vec<String>,

    /// CPU limit in milli CPUs
    #[clap(long)]
    pub cpu: Option<String>,

    /// CPU to reserve in milli CPUs
    #[clap(long)]
    pub cpu_reserve: Option<String>,

    /// Memory limit in MiB
    #[clap(short, long)]
    pub memory: Option<String>,

    /// Memory to reserve in MiB
    #[clap(long)]
    pub memory_reserve: Option<String>,

    /// Nvidia GPU limit in milli GPUs
    #[clap(long)]
    pub nvidia_gpu: Option<String>,

    /// Nvidia GPU to reserve in milli GPUs
    #[clap(long)]
    pub nvidia_gpu_reserve: Option<String>,

    /// Number of containers to run
    #[clap(long, default_value_t = 1)]
    pub scale: i64,

    /// DNS policy, either `ClusterFirst` or `ClusterFirstWithHostNet`
    #[clap(long, default_value = "ClusterFirst")]
    pub dns_policy: String,

    /// Pull image on container start, one of `Always`, `IfNotPresent` or `Never`
    #[clap(long, default_value = "Always")]
    pub image_pull_policy: String,

    /// Use the host's network namespace
    #[clap(long)]
    pub host_network: bool,

    /// Use the host's IPC namespace
    #[clap(long)]
    pub ipc: bool,

    /// Use the host's PID namespace
    #[clap(long)]
    pub pid: bool,

    /// Container host name
    #[clap(long)]
    pub hostname: Option<String>,

    /// Host alias in the form IP=HOST
    #[clap(long)]
    pub host_alias: Vec<String>,

    /// Host port to publish, either <port>:<port> or <hostip>:<hostport>:<port>
    #[clap(long)]
    pub hostport: Vec<String>,

    /// Cluster port to publish, either <port> or <port>:<port>
    #[clap(long)]
    pub clusterport: Vec<String>,

    /// Load balancer port mapping in the format <port>:<port>
    #[clap(long)]
    pub lbport: Vec<String>,

    /// Node port to publish, either <port> or <port>:<port>
    #[clap(long)]
    pub nodeport: Vec<String>,

    /// Give extended privileges to the container
    #[clap(long)]
    pub privileged: bool,

    /// Mount the container's root filesystem as read only
    #[clap(long)]
    pub read_only: bool,

    /// Run as non root
    #[clap(long)]
    pub run_as_non_root: bool,

    /// Allow the container to gain more privileges than its parent process
    #[clap(long)]
    pub allow_privilege_escalation: bool,

    /// Filesystem group
    #[clap(long)]
    pub fsg: Option<i64>,

    /// Time in seconds before the container is forcefully stopped
    #[clap(long)]
    pub stop_timeout: Option<i64>,

    /// Workload subdomain
    #[clap(long)]
    pub subdomain: Option<String>,

    /// Allocate a pseudo-TTY
    #[clap(short, long)]
    pub tty: bool,

    /// Keep STDIN open even if not attached
    #[clap(short, long)]
    pub interactive: bool,

    /// User ID to run the container process as
    #[clap(short, long)]
    pub user: Option<i64>,

    /// Working directory inside the container
    #[clap(short, long)]
    pub workdir: Option<String>,
}

/// Assembles the workload out of the raw flag values.
///
/// The namespace is validated first, then every flag category is parsed into
/// its typed counterpart. Any parse error aborts the assembly, nothing is
/// submitted half-built.
impl TryFrom<&RunWorkload> for Workload {
    type Error = Error;

    fn try_from(opts: &RunWorkload) -> Result<Self, Self::Error> {
        let namespace = opts
            .namespace
            .as_deref()
            .filter(|namespace| !namespace.is_empty())
            .ok_or(Error::MissingNamespace)?;

        let ports = process_ports(&opts.nodeport, &opts.clusterport, &opts.lbport, &opts.hostport)?;
        let name = opts.name.clone().unwrap_or_default();

        let container = Container {
            name: name.clone(),
            image: opts.image.clone().unwrap_or_default(),
            image_pull_policy: opts.image_pull_policy.clone(),
            command: opts.command.as_deref().map(split_tokens).unwrap_or_default(),
            entrypoint: opts
                .entrypoint
                .as_deref()
                .map(split_tokens)
                .unwrap_or_default(),
            environment: key_value_map(&opts.env)?,
            ports,
            allow_privilege_escalation: opts.allow_privilege_escalation,
            privileged: opts.privileged,
            read_only: opts.read_only,
            run_as_non_root: opts.run_as_non_root,
            resources: process_resources(
                &opts.cpu,
                &opts.cpu_reserve,
                &opts.memory,
                &opts.memory_reserve,
                &opts.nvidia_gpu,
                &opts.nvidia_gpu_reserve,
            ),
            stdin: opts.interactive,
            tty: opts.tty,
            uid: opts.user,
            working_dir: opts.workdir.clone(),
        };

        Ok(Workload {
            name,
            namespace: namespace.to_string(),
            scale: opts.scale,
            dns_policy: opts.dns_policy.clone(),
            host_network: opts.host_network,
            host_ipc: opts.ipc,
            host_pid: opts.pid,
            labels: key_value_map(&opts.label)?,
            annotations: key_value_map(&opts.annotation)?,
            hostname: opts.hostname.clone(),
            subdomain: opts.subdomain.clone(),
            fsgid: opts.fsg,
            termination_grace_period_seconds: opts.stop_timeout,
            host_aliases: process_host_aliases(&opts.host_alias),
            containers: vec![container],
        })
    }
}

impl RunWorkload {
    /// Builds the workload and submits it to the cluster.
    ///
    /// The workload is fully assembled and validated before the client is
    /// invoked, a flag error never reaches the controller.
    async fn submit<C: WorkloadClient + Sync>(&self, client: &C) -> Result<()> {
        let workload = Workload::try_from(self)?;
        debug!("assembled workload: {:?}", workload);

        let workload_id = client.create_workload(&workload).await?;
        println!(
            "Workload {} has been successfully created with ID : {}",
            &workload.name, workload_id
        );
        Ok(())
    }
}

#[async_trait]
impl Handler for RunWorkload {
    async fn handler(&self) -> Result<()> {
        let config = Configuration::load()?;
        self.submit(&Client::init(config.cluster)).await
    }
}
