//! Schema families. Each function registers one family's kinds into a builder;
//! [`crate::setup_scheme`] applies them in a fixed order.

use capo_api::cluster::{v1beta1, v1beta2};
use capo_api::exp::v1beta2 as exp;
use capo_api::infrastructure::v1beta2 as infra;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::api::{apps, batch, coordination};

use crate::{Family, SchemeBuilder};

/// Built-in Kubernetes kinds the provider reads or writes.
pub fn client_go(b: &mut SchemeBuilder) {
    let f = Family::ClientGo;
    b.register::<corev1::ConfigMap>(f)
        .register::<corev1::Secret>(f)
        .register::<corev1::Namespace>(f)
        .register::<corev1::Node>(f)
        .register::<corev1::Pod>(f)
        .register::<corev1::Service>(f)
        .register::<corev1::ServiceAccount>(f)
        .register::<corev1::Event>(f)
        .register::<corev1::PersistentVolumeClaim>(f)
        .register::<apps::v1::Deployment>(f)
        .register::<apps::v1::StatefulSet>(f)
        .register::<apps::v1::DaemonSet>(f)
        .register::<apps::v1::ReplicaSet>(f)
        .register::<batch::v1::Job>(f)
        .register::<coordination::v1::Lease>(f);
}

pub fn cluster_api_v1beta1(b: &mut SchemeBuilder) {
    let f = Family::ClusterApiV1Beta1;
    b.register::<v1beta1::Cluster>(f)
        .register::<v1beta1::Machine>(f)
        .register::<v1beta1::MachinePool>(f);
}

pub fn cluster_api_v1beta2(b: &mut SchemeBuilder) {
    let f = Family::ClusterApiV1Beta2;
    b.register::<v1beta2::Cluster>(f)
        .register::<v1beta2::Machine>(f)
        .register::<v1beta2::MachinePool>(f);
}

pub fn infrastructure_v1beta2(b: &mut SchemeBuilder) {
    let f = Family::Infrastructure;
    b.register::<infra::OCICluster>(f)
        .register::<infra::OCIMachine>(f)
        .register::<infra::OCIMachineTemplate>(f)
        .register::<infra::OCIClusterIdentity>(f);
}

pub fn exp_infrastructure_v1beta2(b: &mut SchemeBuilder) {
    let f = Family::ExpInfrastructure;
    b.register::<exp::OCIMachinePool>(f)
        .register::<exp::OCIManagedCluster>(f)
        .register::<exp::OCIManagedControlPlane>(f)
        .register::<exp::OCIManagedMachinePool>(f);
}
