//! OCI infrastructure provider kinds (`infrastructure.cluster.x-k8s.io`).

pub mod v1beta2;

pub const GROUP: &str = "infrastructure.cluster.x-k8s.io";
