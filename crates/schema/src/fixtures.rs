//! Shared test fixtures: a process-wide registry and populated v1beta2 records.

use std::collections::BTreeMap;

use capo_api::cluster::v1beta2::{
    ApiEndpoint, Bootstrap, Cluster, ClusterInitializationStatus, ClusterNetwork, ClusterSpec, ClusterStatus,
    ContractVersionedObjectReference, ControlPlaneTopology, Machine, MachineAddress, MachineInitializationStatus,
    MachinePool, MachinePoolSpec, MachinePoolStatus, MachineSpec, MachineStatus, MachineTemplateSpec, NetworkRanges,
    TemplateMetadata, Topology,
};
use capo_api::infrastructure;
use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, Time};
use kube::core::ObjectMeta;
use once_cell::sync::Lazy;

use crate::{setup_scheme, Scheme};

pub const NAMESPACE: &str = "default";
pub const CLUSTER_NAME: &str = "test-cluster";
pub const KUBERNETES_VERSION: &str = "v1.30.1";

/// Label Cluster API puts on every object owned by a cluster.
pub const CLUSTER_NAME_LABEL: &str = "cluster.x-k8s.io/cluster-name";

static SCHEME: Lazy<Scheme> = Lazy::new(setup_scheme);

/// The shared registry, built on first use.
pub fn scheme() -> &'static Scheme {
    &SCHEME
}

// 2024-01-01T00:00:00Z; whole seconds so timestamps survive the wire format.
fn timestamp() -> Time {
    Time(DateTime::<Utc>::from_timestamp(1_704_067_200, 0).unwrap_or_default())
}

fn meta(name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(NAMESPACE.to_string()),
        uid: Some(uuid::Uuid::new_v4().to_string()),
        labels: Some(BTreeMap::from([(CLUSTER_NAME_LABEL.to_string(), CLUSTER_NAME.to_string())])),
        ..ObjectMeta::default()
    }
}

pub fn condition(type_: &str, status: &str, reason: &str) -> Condition {
    Condition {
        type_: type_.to_string(),
        status: status.to_string(),
        reason: reason.to_string(),
        message: String::new(),
        last_transition_time: timestamp(),
        observed_generation: Some(1),
    }
}

fn infra_ref(kind: &str, name: &str) -> ContractVersionedObjectReference {
    ContractVersionedObjectReference {
        kind: kind.to_string(),
        name: name.to_string(),
        api_group: infrastructure::GROUP.to_string(),
    }
}

/// A managed-topology cluster with three control plane replicas.
pub fn cluster_v1beta2(name: &str) -> Cluster {
    let mut cluster = Cluster::new(
        name,
        ClusterSpec {
            paused: None,
            cluster_network: Some(ClusterNetwork {
                pods: Some(NetworkRanges { cidr_blocks: vec!["192.168.0.0/16".to_string()] }),
                ..ClusterNetwork::default()
            }),
            control_plane_endpoint: ApiEndpoint { host: "10.0.0.10".to_string(), port: 6443 },
            control_plane_ref: None,
            infrastructure_ref: Some(infra_ref("OCICluster", name)),
            topology: Some(Topology {
                class: "oci-default".to_string(),
                version: KUBERNETES_VERSION.to_string(),
                control_plane: Some(ControlPlaneTopology { replicas: Some(3), ..ControlPlaneTopology::default() }),
                ..Topology::default()
            }),
            availability_gates: Vec::new(),
        },
    );
    cluster.metadata = meta(name);
    cluster.status = Some(ClusterStatus {
        conditions: vec![condition("Available", "True", "Available")],
        initialization: Some(ClusterInitializationStatus {
            infrastructure_provisioned: Some(true),
            control_plane_initialized: Some(true),
        }),
        phase: Some("Provisioned".to_string()),
        observed_generation: Some(1),
        ..ClusterStatus::default()
    });
    cluster
}

pub fn machine_spec(name: &str) -> MachineSpec {
    MachineSpec {
        cluster_name: CLUSTER_NAME.to_string(),
        bootstrap: Bootstrap { config_ref: None, data_secret_name: Some(format!("{name}-bootstrap")) },
        infrastructure_ref: infra_ref("OCIMachine", name),
        version: Some(KUBERNETES_VERSION.to_string()),
        provider_id: Some(format!("oci://{name}")),
        failure_domain: Some("1".to_string()),
        min_ready_seconds: None,
        readiness_gates: Vec::new(),
        deletion: None,
    }
}

pub fn machine_v1beta2(name: &str) -> Machine {
    let mut machine = Machine::new(name, machine_spec(name));
    machine.metadata = meta(name);
    machine.status = Some(MachineStatus {
        conditions: vec![condition("Ready", "True", "Ready")],
        initialization: Some(MachineInitializationStatus {
            infrastructure_provisioned: Some(true),
            bootstrap_data_secret_created: Some(true),
        }),
        addresses: vec![MachineAddress { type_: "InternalIP".to_string(), address: "10.0.0.20".to_string() }],
        phase: Some("Running".to_string()),
        last_updated: Some(timestamp()),
        ..MachineStatus::default()
    });
    machine
}

pub fn machine_pool_v1beta2(name: &str) -> MachinePool {
    let mut pool = MachinePool::new(
        name,
        MachinePoolSpec {
            cluster_name: CLUSTER_NAME.to_string(),
            replicas: Some(2),
            template: MachineTemplateSpec { metadata: TemplateMetadata::default(), spec: machine_spec(name) },
            provider_id_list: vec![format!("oci://{name}-0"), format!("oci://{name}-1")],
            failure_domains: vec!["1".to_string(), "2".to_string()],
        },
    );
    pool.metadata = meta(name);
    pool.status = Some(MachinePoolStatus {
        conditions: vec![condition("Ready", "True", "Ready")],
        replicas: Some(2),
        ready_replicas: Some(2),
        available_replicas: Some(2),
        up_to_date_replicas: Some(2),
        phase: Some("Running".to_string()),
        ..MachinePoolStatus::default()
    });
    pool
}
