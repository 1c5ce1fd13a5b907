use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::ports::PortMapping;

/// `Workload` holds all the attributes sent to the cluster when creating a workload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workload {
    pub name: String,
    pub namespace: String,
    pub scale: i64,
    pub dns_policy: String,
    pub host_network: bool,
    pub host_ipc: bool,
    pub host_pid: bool,
    pub labels: HashMap<String, String>,
    pub annotations: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fsgid: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_grace_period_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host_aliases: Vec<HostAlias>,
    pub containers: Vec<Container>,
}

/// `Container` holds the attributes for one workload container.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub name: String,
    pub image: String,
    pub image_pull_policy: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entrypoint: Vec<String>,
    pub environment: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortMapping>,
    pub allow_privilege_escalation: bool,
    pub privileged: bool,
    pub read_only: bool,
    pub run_as_non_root: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Resources>,
    pub stdin: bool,
    pub tty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

/// `HostAlias` maps an IP address to the hostnames that resolve to it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostAlias {
    pub ip: String,
    pub hostnames: Vec<String>,
}

/// `Resources` holds the limits and reservations of a container, one block
/// per subsystem. A subsystem without any value set stays `None`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Resources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<ResourceRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<ResourceRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nvidia_gpu: Option<ResourceRequest>,
}

/// Limit and reservation for one resource subsystem. Values are carried as
/// opaque strings, the controller is the one validating them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
}

/// Workload assembly errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("namespace is required")]
    MissingNamespace,
    #[error("invalid port token `{token}`: {source}")]
    InvalidPortToken {
        token: String,
        source: std::num::ParseIntError,
    },
    #[error("invalid port mapping: {0}")]
    InvalidPortMapping(String),
    #[error("invalid key/value pair `{0}`, expected KEY=VALUE")]
    InvalidKeyValue(String),
}

/// Splits a raw command line on whitespace.
pub fn split_tokens(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(String::from).collect()
}

/// Builds a map out of repeated `key=value` strings, splitting once on the
/// first `=`. The last occurrence of a duplicate key wins.
pub fn key_value_map(pairs: &[String]) -> Result<HashMap<String, String>, Error> {
    let mut map = HashMap::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::InvalidKeyValue(pair.clone()))?;
        map.insert(key.to_string(), value.to_string());
    }
    Ok(map)
}

/// Groups repeated `IP=HOSTNAME` entries by IP.
///
/// Entries that do not contain exactly one `=` are skipped. Hostnames keep
/// their input order within one IP. The order of the IPs themselves is
/// unspecified, callers must not depend on it.
pub fn process_host_aliases(entries: &[String]) -> Vec<HostAlias> {
    let mut grouped: HashMap<&str, Vec<String>> = HashMap::new();
    for entry in entries {
        let pieces: Vec<&str> = entry.split('=').collect();
        if pieces.len() != 2 {
            continue;
        }
        grouped
            .entry(pieces[0])
            .or_default()
            .push(pieces[1].to_string());
    }

    grouped
        .into_iter()
        .map(|(ip, hostnames)| HostAlias {
            ip: ip.to_string(),
            hostnames,
        })
        .collect()
}

/// Builds the resource block of a container out of the six resource flags.
///
/// A subsystem is only populated when at least one of its pair is non-empty,
/// and the whole block is `None` when every flag is empty.
pub fn process_resources(
    cpu: &Option<String>,
    cpu_reserve: &Option<String>,
    memory: &Option<String>,
    memory_reserve: &Option<String>,
    nvidia_gpu: &Option<String>,
    nvidia_gpu_reserve: &Option<String>,
) -> Option<Resources> {
    let cpu = resource_request(cpu, cpu_reserve);
    let memory = resource_request(memory, memory_reserve);
    let nvidia_gpu = resource_request(nvidia_gpu, nvidia_gpu_reserve);

    if cpu.is_none() && memory.is_none() && nvidia_gpu.is_none() {
        return None;
    }
    Some(Resources {
        cpu,
        memory,
        nvidia_gpu,
    })
}

fn resource_request(limit: &Option<String>, request: &Option<String>) -> Option<ResourceRequest> {
    let limit = limit.clone().filter(|value| !value.is_empty());
    let request = request.clone().filter(|value| !value.is_empty());

    if limit.is_none() && request.is_none() {
        return None;
    }
    Some(ResourceRequest { limit, request })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn split_tokens_on_whitespace() {
        assert_eq!(
            split_tokens("sh -c  'sleep 1'"),
            vec!["sh", "-c", "'sleep", "1'"]
        );
    }

    #[test]
    fn key_value_map_last_write_wins() {
        let map = key_value_map(&strings(&["a=1", "b=2", "a=3"])).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], "3");
        assert_eq!(map["b"], "2");
    }

    #[test]
    fn key_value_map_splits_on_the_first_delimiter() {
        let map = key_value_map(&strings(&["a=b=c"])).unwrap();
        assert_eq!(map["a"], "b=c");
    }

    #[test]
    fn key_value_map_rejects_entries_without_delimiter() {
        let error = key_value_map(&strings(&["a=1", "oops"])).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid key/value pair `oops`, expected KEY=VALUE"
        );
    }

    #[test]
    fn host_aliases_group_hostnames_by_ip() {
        let aliases = process_host_aliases(&strings(&["10.0.0.1=a", "10.0.0.1=b", "bad-entry"]));
        assert_eq!(
            aliases,
            vec![HostAlias {
                ip: "10.0.0.1".to_string(),
                hostnames: strings(&["a", "b"]),
            }]
        );
    }

    #[test]
    fn host_aliases_skip_entries_with_more_than_one_delimiter() {
        let aliases = process_host_aliases(&strings(&["10.0.0.1=a=b"]));
        assert!(aliases.is_empty());
    }

    #[test]
    fn resources_with_only_cpu_set() {
        let resources = process_resources(
            &Some("100m".to_string()),
            &None,
            &None,
            &None,
            &None,
            &None,
        )
        .unwrap();

        assert_eq!(
            resources.cpu,
            Some(ResourceRequest {
                limit: Some("100m".to_string()),
                request: None,
            })
        );
        assert_eq!(resources.memory, None);
        assert_eq!(resources.nvidia_gpu, None);
    }

    #[test]
    fn resources_with_only_a_reservation_set() {
        let resources =
            process_resources(&None, &None, &None, &Some("256".to_string()), &None, &None)
                .unwrap();

        assert_eq!(resources.cpu, None);
        assert_eq!(
            resources.memory,
            Some(ResourceRequest {
                limit: None,
                request: Some("256".to_string()),
            })
        );
    }

    #[test]
    fn resources_absent_when_every_flag_is_empty() {
        let resources = process_resources(
            &None,
            &Some(String::new()),
            &None,
            &None,
            &Some(String::new()),
            &None,
        );
        assert_eq!(resources, None);
    }

    #[test]
    fn gpu_flags_land_in_the_gpu_block() {
        let resources = process_resources(
            &None,
            &None,
            &None,
            &None,
            &Some("1000m".to_string()),
            &Some("500m".to_string()),
        )
        .unwrap();

        assert_eq!(resources.memory, None);
        assert_eq!(
            resources.nvidia_gpu,
            Some(ResourceRequest {
                limit: Some("1000m".to_string()),
                request: Some("500m".to_string()),
            })
        );
    }
}
