use capo_core::{gvk_key, parse_gvk_key, ResourceKind, SchemaGeneration, CLUSTER_API_GROUP};
use capo_schema::fixtures;
use capo_schema::{setup_scheme, Family, Scope, SchemeError};
use kube::core::GroupVersionKind;

const EXPECTED: [&str; 29] = [
    "v1/ConfigMap",
    "v1/Secret",
    "v1/Namespace",
    "v1/Node",
    "v1/Pod",
    "v1/Service",
    "v1/ServiceAccount",
    "v1/Event",
    "v1/PersistentVolumeClaim",
    "apps/v1/Deployment",
    "apps/v1/StatefulSet",
    "apps/v1/DaemonSet",
    "apps/v1/ReplicaSet",
    "batch/v1/Job",
    "coordination.k8s.io/v1/Lease",
    "cluster.x-k8s.io/v1beta1/Cluster",
    "cluster.x-k8s.io/v1beta1/Machine",
    "cluster.x-k8s.io/v1beta1/MachinePool",
    "cluster.x-k8s.io/v1beta2/Cluster",
    "cluster.x-k8s.io/v1beta2/Machine",
    "cluster.x-k8s.io/v1beta2/MachinePool",
    "infrastructure.cluster.x-k8s.io/v1beta2/OCICluster",
    "infrastructure.cluster.x-k8s.io/v1beta2/OCIMachine",
    "infrastructure.cluster.x-k8s.io/v1beta2/OCIMachineTemplate",
    "infrastructure.cluster.x-k8s.io/v1beta2/OCIClusterIdentity",
    "infrastructure.cluster.x-k8s.io/v1beta2/OCIMachinePool",
    "infrastructure.cluster.x-k8s.io/v1beta2/OCIManagedCluster",
    "infrastructure.cluster.x-k8s.io/v1beta2/OCIManagedControlPlane",
    "infrastructure.cluster.x-k8s.io/v1beta2/OCIManagedMachinePool",
];

#[test]
fn registry_holds_every_family_once() {
    let scheme = setup_scheme();
    let keys: Vec<String> = scheme.entries().iter().map(|e| e.key()).collect();
    assert_eq!(keys, EXPECTED, "registration order and contents");
    for key in EXPECTED {
        let gvk = parse_gvk_key(key).unwrap();
        assert!(scheme.recognizes(&gvk), "{key} should be recognized");
        assert_eq!(gvk_key(&scheme.entry(&gvk).unwrap().gvk), key);
    }
    assert_eq!(
        scheme.families(),
        vec![
            Family::ClientGo,
            Family::ClusterApiV1Beta1,
            Family::ClusterApiV1Beta2,
            Family::Infrastructure,
            Family::ExpInfrastructure,
        ]
    );
}

#[test]
fn both_cluster_api_generations_resolve_to_their_own_definitions() {
    let scheme = setup_scheme();
    for kind in ResourceKind::ALL {
        let old = scheme.entry(&kind.gvk(SchemaGeneration::V1Beta1)).unwrap();
        let new = scheme.entry(&kind.gvk(SchemaGeneration::V1Beta2)).unwrap();
        assert_eq!(old.family, Family::ClusterApiV1Beta1);
        assert_eq!(new.family, Family::ClusterApiV1Beta2);
        assert_eq!(old.resource.plural, kind.plural());
        assert_eq!(new.resource.plural, kind.plural());
        assert!(old.namespaced() && new.namespaced());
    }
    assert_eq!(scheme.kinds_for_group(CLUSTER_API_GROUP).count(), 6);
}

#[test]
fn unknown_kinds_are_not_recognized() {
    let scheme = setup_scheme();
    let unknown = GroupVersionKind::gvk("example.io", "v1", "Widget");
    assert!(!scheme.recognizes(&unknown));
    assert!(scheme.entry(&unknown).is_none());
    // Known kind, unknown generation.
    assert!(!scheme.recognizes(&GroupVersionKind::gvk(CLUSTER_API_GROUP, "v1alpha4", "Cluster")));
    let err = scheme.lookup("example.io/v1", "Widget").unwrap_err();
    assert!(err.is_not_registered(), "unexpected error: {err}");
}

#[test]
fn decode_validates_against_the_typed_shape() {
    let scheme = fixtures::scheme();
    let yaml = br#"
apiVersion: cluster.x-k8s.io/v1beta1
kind: Machine
metadata:
  name: m1
  namespace: default
spec:
  clusterName: c1
  bootstrap:
    dataSecretName: m1-bootstrap
  infrastructureRef:
    kind: OCIMachine
    name: m1
"#;
    let obj = scheme.decode(yaml).unwrap();
    assert_eq!(obj.metadata.name.as_deref(), Some("m1"));
    assert_eq!(obj.data["spec"]["clusterName"], "c1");

    // v1beta1 requires clusterName.
    let missing = br#"{"apiVersion":"cluster.x-k8s.io/v1beta1","kind":"Machine","metadata":{"name":"m1"},"spec":{"bootstrap":{},"infrastructureRef":{}}}"#;
    match scheme.decode(missing) {
        Err(SchemeError::Decode { gvk, source }) => {
            assert_eq!(gvk, "cluster.x-k8s.io/v1beta1/Machine");
            assert!(source.to_string().contains("clusterName"), "{source}");
        }
        other => panic!("expected a decode failure, got {other:?}"),
    }

    let unregistered = br#"{"apiVersion":"example.io/v1","kind":"Widget","metadata":{"name":"w"}}"#;
    assert!(matches!(scheme.decode(unregistered), Err(SchemeError::NotRegistered { .. })));
}

#[test]
fn encode_round_trips_a_fixture() {
    let scheme = fixtures::scheme();
    let machine = fixtures::machine_v1beta2("m1");
    let obj = scheme.decode_value(serde_json::to_value(&machine).unwrap()).unwrap();
    let bytes = scheme.encode(&obj).unwrap();
    let back: capo_api::cluster::v1beta2::Machine = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(back, machine);
}

#[test]
fn new_object_honours_scope() {
    let scheme = fixtures::scheme();
    let cm = scheme
        .new_object(&GroupVersionKind::gvk("", "v1", "ConfigMap"), "cfg", Some(fixtures::NAMESPACE))
        .unwrap();
    assert_eq!(cm.metadata.namespace.as_deref(), Some(fixtures::NAMESPACE));
    assert_eq!(cm.types.as_ref().map(|t| t.api_version.as_str()), Some("v1"));

    let ns_gvk = GroupVersionKind::gvk("", "v1", "Namespace");
    assert_eq!(scheme.entry(&ns_gvk).unwrap().scope, Scope::Cluster);
    let ns = scheme.new_object(&ns_gvk, "team-a", Some("ignored")).unwrap();
    assert_eq!(ns.metadata.namespace, None);

    let cluster = scheme
        .new_object(&ResourceKind::Cluster.gvk(SchemaGeneration::V1Beta2), "c1", Some("capi"))
        .unwrap();
    assert_eq!(cluster.types.unwrap().api_version, "cluster.x-k8s.io/v1beta2");

    let err = scheme.new_object(&GroupVersionKind::gvk("example.io", "v1", "Widget"), "w", None).unwrap_err();
    assert!(err.is_not_registered());
}

#[test]
fn shared_scheme_is_built_once() {
    assert!(std::ptr::eq(fixtures::scheme(), fixtures::scheme()));
    let seen: Vec<usize> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| fixtures::scheme() as *const _ as usize)).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(seen.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(fixtures::scheme().len(), EXPECTED.len());
}

#[test]
fn fixtures_carry_fresh_uids() {
    let a = fixtures::cluster_v1beta2("c1");
    let b = fixtures::cluster_v1beta2("c1");
    assert_ne!(a.metadata.uid, b.metadata.uid);
    assert_eq!(
        a.metadata.labels.as_ref().and_then(|l| l.get(fixtures::CLUSTER_NAME_LABEL)).map(String::as_str),
        Some(fixtures::CLUSTER_NAME)
    );
}
