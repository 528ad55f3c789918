use capo_api::cluster::v1beta2::{self, FailureDomain};
use capo_convert::{
    convert_cluster_v1beta2_to_v1beta1, convert_machine_pool_v1beta2_to_v1beta1, convert_machine_v1beta2_to_v1beta1,
    downgrade_value, AnyNewer, AnyOlder, Downgrade,
};
use capo_core::{ConversionError, ResourceKind, SchemaGeneration};
use capo_schema::fixtures;
use serde_json::json;

#[test]
fn cluster_shared_fields_survive_and_new_fields_fall_away() {
    let cluster = fixtures::cluster_v1beta2("c1");
    let old = convert_cluster_v1beta2_to_v1beta1(Some(&cluster)).unwrap().expect("present in, present out");

    assert_eq!(old.metadata.name.as_deref(), Some("c1"));
    assert_eq!(old.metadata.uid, cluster.metadata.uid);
    assert_eq!(old.metadata.labels, cluster.metadata.labels);
    let topology = old.spec.topology.as_ref().unwrap();
    assert_eq!(topology.class, "oci-default");
    assert_eq!(topology.version, fixtures::KUBERNETES_VERSION);
    assert_eq!(topology.control_plane.as_ref().and_then(|cp| cp.replicas), Some(3));
    assert_eq!(old.spec.control_plane_endpoint.host, "10.0.0.10");
    assert_eq!(old.spec.control_plane_endpoint.port, 6443);

    let infra = old.spec.infrastructure_ref.as_ref().unwrap();
    assert_eq!(infra.kind.as_deref(), Some("OCICluster"));
    assert_eq!(infra.name.as_deref(), Some("c1"));
    assert_eq!(infra.api_version, None, "apiGroup has no v1beta1 counterpart");

    let status = old.status.as_ref().unwrap();
    assert_eq!(status.phase.as_deref(), Some("Provisioned"));
    assert_eq!(status.conditions.len(), 1);
    assert_eq!(status.conditions[0].type_, "Available");
    assert_eq!(status.conditions[0].reason.as_deref(), Some("Available"));
    assert!(status.conditions[0].last_transition_time.is_some());
    // `initialization` only exists in v1beta2; the v1beta1 flags keep their defaults.
    assert!(!status.infrastructure_ready);
    assert!(!status.control_plane_ready);

    let tree = serde_json::to_value(&old).unwrap();
    assert_eq!(tree["apiVersion"], "cluster.x-k8s.io/v1beta1");
    assert_eq!(tree["kind"], "Cluster");
    assert!(tree["status"].get("initialization").is_none());
}

#[test]
fn machine_downgrade_keeps_provider_fields() {
    let machine = fixtures::machine_v1beta2("m1");
    let old = convert_machine_v1beta2_to_v1beta1(Some(&machine)).unwrap().unwrap();
    assert_eq!(old.spec.cluster_name, fixtures::CLUSTER_NAME);
    assert_eq!(old.spec.provider_id.as_deref(), Some("oci://m1"));
    assert_eq!(old.spec.failure_domain.as_deref(), Some("1"));
    assert_eq!(old.spec.bootstrap.data_secret_name.as_deref(), Some("m1-bootstrap"));
    assert_eq!(old.spec.infrastructure_ref.kind.as_deref(), Some("OCIMachine"));
    let status = old.status.unwrap();
    assert_eq!(status.addresses.len(), 1);
    assert_eq!(status.addresses[0].address, "10.0.0.20");
    assert_eq!(status.last_updated, machine.status.unwrap().last_updated);
}

#[test]
fn machine_pool_downgrade_keeps_replicas() {
    let pool = fixtures::machine_pool_v1beta2("mp1");
    let old = convert_machine_pool_v1beta2_to_v1beta1(Some(&pool)).unwrap().unwrap();
    assert_eq!(old.spec.cluster_name, fixtures::CLUSTER_NAME);
    assert_eq!(old.spec.replicas, Some(2));
    assert_eq!(old.spec.provider_id_list, pool.spec.provider_id_list);
    assert_eq!(old.spec.template.spec.cluster_name, fixtures::CLUSTER_NAME);
    let status = old.status.unwrap();
    assert_eq!(status.ready_replicas, 2);
    assert_eq!(status.unavailable_replicas, 0);
}

#[test]
fn absent_records_stay_absent() {
    assert!(convert_cluster_v1beta2_to_v1beta1(None).unwrap().is_none());
    assert!(convert_machine_v1beta2_to_v1beta1(None).unwrap().is_none());
    assert!(convert_machine_pool_v1beta2_to_v1beta1(None).unwrap().is_none());
}

#[test]
fn missing_required_field_fails_the_whole_conversion() {
    let mut pool = fixtures::machine_pool_v1beta2("mp1");
    pool.spec.cluster_name.clear();
    let err = convert_machine_pool_v1beta2_to_v1beta1(Some(&pool)).unwrap_err();
    assert!(err.is_decode(), "unexpected error kind: {err:?}");
    assert_eq!(err.kind(), ResourceKind::MachinePool);
    let msg = err.to_string();
    assert!(msg.contains("MachinePool v1beta2 -> v1beta1"), "{msg}");
    assert!(msg.contains("clusterName"), "{msg}");

    let mut machine = fixtures::machine_v1beta2("m1");
    machine.spec.cluster_name.clear();
    let err = convert_machine_v1beta2_to_v1beta1(Some(&machine)).unwrap_err();
    assert!(err.is_decode());
    assert_eq!(err.kind(), ResourceKind::Machine);
}

#[test]
fn empty_topology_class_is_rejected_by_v1beta1() {
    let mut cluster = fixtures::cluster_v1beta2("c1");
    if let Some(t) = cluster.spec.topology.as_mut() {
        t.class.clear();
    }
    let err = convert_cluster_v1beta2_to_v1beta1(Some(&cluster)).unwrap_err();
    assert!(err.is_decode());
    assert!(err.to_string().contains("class"), "{err}");
}

#[test]
fn failure_domain_list_does_not_fit_the_v1beta1_map() {
    let mut cluster = fixtures::cluster_v1beta2("c1");
    if let Some(status) = cluster.status.as_mut() {
        status.failure_domains =
            vec![FailureDomain { name: "AD-1".into(), control_plane: Some(true), attributes: Default::default() }];
    }
    let err = cluster.downgrade().unwrap_err();
    assert!(err.is_decode());
    assert_eq!(err.conversion(), Some(v1beta2::Cluster::conversion()));
}

#[test]
fn conversion_is_deterministic_and_leaves_input_untouched() {
    let cluster = fixtures::cluster_v1beta2("c1");
    let before = cluster.clone();
    let a = cluster.downgrade().unwrap();
    let b = cluster.downgrade().unwrap();
    assert_eq!(a, b);
    assert_eq!(cluster, before);
}

#[test]
fn concurrent_conversions_are_independent() {
    let records: Vec<v1beta2::Machine> = (0..8).map(|i| fixtures::machine_v1beta2(&format!("m{i}"))).collect();
    let names: Vec<Option<String>> = std::thread::scope(|s| {
        let handles: Vec<_> = records.iter().map(|m| s.spawn(move || m.downgrade().unwrap().metadata.name)).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for (i, name) in names.iter().enumerate() {
        assert_eq!(name.as_deref(), Some(format!("m{i}").as_str()));
    }
}

#[test]
fn untyped_entry_point() {
    let machine = fixtures::machine_v1beta2("m1");
    let input = serde_json::to_value(&machine).unwrap();
    let out = downgrade_value(ResourceKind::Machine, &input).unwrap();
    assert_eq!(out["apiVersion"], "cluster.x-k8s.io/v1beta1");
    assert_eq!(out["spec"]["clusterName"], fixtures::CLUSTER_NAME);
    assert!(out["spec"]["infrastructureRef"].get("apiGroup").is_none());

    let err = downgrade_value(ResourceKind::Cluster, &json!({ "metadata": { "name": "c1" } })).unwrap_err();
    assert_eq!(err.conversion(), None, "rejected before the bridge ran: {err}");
    assert_eq!(err.kind(), ResourceKind::Cluster);
    assert!(err.to_string().contains("v1beta2"), "{err}");
}

#[test]
fn untyped_entry_point_rejects_a_record_of_another_kind_or_generation() {
    let pool = serde_json::to_value(fixtures::machine_pool_v1beta2("mp1")).unwrap();
    let err = downgrade_value(ResourceKind::Cluster, &pool).unwrap_err();
    assert!(matches!(err, ConversionError::Input { kind: ResourceKind::Cluster, .. }), "{err:?}");
    assert!(err.to_string().contains("MachinePool"), "{err}");

    let mut machine = serde_json::to_value(fixtures::machine_v1beta2("m1")).unwrap();
    machine["apiVersion"] = json!("cluster.x-k8s.io/v1beta1");
    let err = downgrade_value(ResourceKind::Machine, &machine).unwrap_err();
    assert!(
        matches!(err, ConversionError::Input { kind: ResourceKind::Machine, generation: SchemaGeneration::V1Beta2, .. }),
        "{err:?}"
    );
    assert!(err.to_string().contains("cluster.x-k8s.io/v1beta1"), "{err}");

    let bare = json!({
        "apiVersion": "cluster.x-k8s.io/v1beta2",
        "kind": "MachinePool",
        "metadata": { "name": "m" },
        "spec": {}
    });
    assert!(matches!(downgrade_value(ResourceKind::Cluster, &bare), Err(ConversionError::Input { .. })));
    assert!(matches!(
        AnyNewer::from_value(ResourceKind::Machine, &bare),
        Err(ConversionError::Input { kind: ResourceKind::Machine, .. })
    ));
}

#[test]
fn any_newer_dispatches_by_kind() {
    let newer = AnyNewer::from(fixtures::machine_pool_v1beta2("mp1"));
    assert_eq!(newer.kind(), ResourceKind::MachinePool);
    assert_eq!(newer.conversion(), v1beta2::MachinePool::conversion());
    match newer.downgrade().unwrap() {
        AnyOlder::MachinePool(mp) => assert_eq!(mp.metadata.name.as_deref(), Some("mp1")),
        other => panic!("wrong kind: {:?}", other.kind()),
    }
}

#[test]
fn output_is_accepted_by_the_registry() {
    let scheme = fixtures::scheme();
    let old = fixtures::cluster_v1beta2("c1").downgrade().unwrap();
    let obj = scheme.decode_value(serde_json::to_value(&old).unwrap()).unwrap();
    let entry = scheme.lookup("cluster.x-k8s.io/v1beta1", "Cluster").unwrap();
    assert_eq!(entry.gvk, ResourceKind::Cluster.gvk(SchemaGeneration::V1Beta1));
    assert_eq!(obj.metadata.name.as_deref(), Some("c1"));
}
