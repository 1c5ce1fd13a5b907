use serde::{Deserialize, Serialize};

use crate::core::workload::Error;

const PROTOCOL_TCP: &str = "TCP";

/// The network exposure mechanisms supported for a container port.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    NodePort,
    #[serde(rename = "ClusterIP")]
    ClusterIp,
    LoadBalancer,
    HostPort,
}

/// A single container port exposure.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub kind: PortKind,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_ip: Option<String>,
}

impl PortMapping {
    fn new(kind: PortKind) -> Self {
        Self {
            kind,
            protocol: PROTOCOL_TCP.to_string(),
            container_port: None,
            source_port: None,
            host_ip: None,
        }
    }
}

/// Parses every port flag category and concatenates the results in a fixed
/// order: node ports, cluster ports, load balancer ports, host ports.
///
/// Any invalid mapping aborts the whole parse, no partial list is returned.
pub fn process_ports(
    nodeports: &[String],
    clusterports: &[String],
    lbports: &[String],
    hostports: &[String],
) -> Result<Vec<PortMapping>, Error> {
    let mut ports = process_mapped_ports(nodeports, PortKind::NodePort)?;
    ports.extend(process_mapped_ports(clusterports, PortKind::ClusterIp)?);
    ports.extend(process_mapped_ports(lbports, PortKind::LoadBalancer)?);
    ports.extend(process_host_ports(hostports)?);
    Ok(ports)
}

/// Parses `<port>` and `<port>:<port>` mappings for the given exposure kind.
pub fn process_mapped_ports(raw: &[String], kind: PortKind) -> Result<Vec<PortMapping>, Error> {
    let mut ports = Vec::with_capacity(raw.len());
    for mapping in raw {
        let pieces = parse_port_tokens(mapping)?;
        let mut port = PortMapping::new(kind);
        match pieces.as_slice() {
            // A lone cluster port sets the source port, every other kind
            // treats it as the container port.
            [source] if kind == PortKind::ClusterIp => port.source_port = Some(*source),
            [container] => port.container_port = Some(*container),
            [source, container] => {
                port.source_port = Some(*source);
                port.container_port = Some(*container);
            }
            _ => return Err(Error::InvalidPortMapping(mapping.clone())),
        }
        ports.push(port);
    }
    Ok(ports)
}

/// Parses `<hostport>:<port>` and `<hostip>:<hostport>:<port>` mappings.
pub fn process_host_ports(raw: &[String]) -> Result<Vec<PortMapping>, Error> {
    let mut ports = Vec::with_capacity(raw.len());
    for mapping in raw {
        let pieces: Vec<&str> = mapping.split(':').collect();
        let mut port = PortMapping::new(PortKind::HostPort);
        match pieces.as_slice() {
            [source, container] => {
                port.source_port = Some(parse_port(source)?);
                port.container_port = Some(parse_port(container)?);
            }
            [host_ip, source, container] => {
                port.host_ip = Some(host_ip.to_string());
                port.source_port = Some(parse_port(source)?);
                port.container_port = Some(parse_port(container)?);
            }
            _ => return Err(Error::InvalidPortMapping(mapping.clone())),
        }
        ports.push(port);
    }
    Ok(ports)
}

fn parse_port_tokens(mapping: &str) -> Result<Vec<u16>, Error> {
    mapping.split(':').map(parse_port).collect()
}

fn parse_port(token: &str) -> Result<u16, Error> {
    token.parse().map_err(|source| Error::InvalidPortToken {
        token: token.to_string(),
        source,
    })
}
