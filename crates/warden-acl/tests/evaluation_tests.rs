//! End-to-end evaluation through the public API.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use std::sync::Arc;

use common::{POD_READER_POLICY, RecordingStore};
use warden_acl::{Decision, Error, MemoryPolicyStore, PermissionEvaluator, Scope, StoreError};
use warden_core::{Action, PolicyDocument, ResourceAttributes, Subject};

fn alice() -> Subject {
    Subject::new("alice").with_groups(["dev"])
}

fn pods_in_ns1(verb: &str) -> Action {
    Action::resource(ResourceAttributes::new(verb, "pods").namespace("ns1"))
}

#[test]
fn test_group_role_binding_grants_namespaced_get() {
    let store = Arc::new(RecordingStore::new(POD_READER_POLICY));
    let evaluator = PermissionEvaluator::new(store);
    assert!(evaluator.evaluate(&alice(), &pods_in_ns1("get")).unwrap());
}

#[test]
fn test_same_setup_denies_delete_without_error() {
    let store = Arc::new(RecordingStore::new(POD_READER_POLICY));
    let evaluator = PermissionEvaluator::new(store);
    let result = evaluator.evaluate(&alice(), &pods_in_ns1("delete"));
    assert!(matches!(result, Ok(false)));
}

#[test]
fn test_lookup_order_is_cluster_then_namespace() {
    let store = Arc::new(RecordingStore::new(POD_READER_POLICY));
    let evaluator = PermissionEvaluator::new(Arc::clone(&store));
    evaluator.evaluate(&alice(), &pods_in_ns1("get")).unwrap();

    assert_eq!(
        store.calls(),
        vec![
            "list_cluster_role_bindings".to_string(),
            "list_role_bindings ns1".to_string(),
            "get_role ns1/pod-reader".to_string(),
        ]
    );
}

#[test]
fn test_roles_of_inapplicable_bindings_are_not_fetched() {
    let store = Arc::new(RecordingStore::new(POD_READER_POLICY));
    let evaluator = PermissionEvaluator::new(Arc::clone(&store));
    evaluator
        .evaluate(&Subject::new("bob"), &pods_in_ns1("get"))
        .unwrap();

    assert!(
        store
            .calls()
            .iter()
            .all(|call| !call.starts_with("get_")),
        "unexpected role lookups: {:?}",
        store.calls()
    );
}

#[test]
fn test_cluster_grant_short_circuits_namespace_scope() {
    let store = Arc::new(RecordingStore::new(POD_READER_POLICY));
    let evaluator = PermissionEvaluator::new(Arc::clone(&store));
    let root = Subject::new("root");

    let decision = evaluator.decide(&root, &pods_in_ns1("delete")).unwrap();
    assert_eq!(decision.grant().unwrap().scope, Scope::Cluster);
    assert!(
        !store
            .calls()
            .iter()
            .any(|call| call.starts_with("list_role_bindings"))
    );
}

#[test]
fn test_group_cluster_binding_ignores_user_name() {
    let doc = PolicyDocument::from_yaml_str(
        r#"
clusterRoles:
  - name: admin
    rules:
      - verbs: ["*"]
        apiGroups: ["*"]
        resources: ["*"]
clusterRoleBindings:
  - name: admins
    roleRef: admin
    subjects:
      - kind: Group
        name: admins
"#,
    )
    .unwrap();
    let evaluator = PermissionEvaluator::new(Arc::new(MemoryPolicyStore::from_document(doc)));
    let subject = Subject::new("someone-unknown").with_groups(["admins"]);
    let action = Action::resource(
        ResourceAttributes::new("delete", "deployments")
            .api_group("apps")
            .name("web")
            .namespace("prod"),
    );
    assert!(evaluator.evaluate(&subject, &action).unwrap());
}

#[test]
fn test_store_unavailable_is_error() {
    let evaluator = PermissionEvaluator::new(Arc::new(RecordingStore::unavailable()));
    let err = evaluator
        .evaluate(&alice(), &pods_in_ns1("get"))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Store(StoreError::Unavailable { .. })
    ));
}

#[test]
fn test_missing_cluster_role_aborts_before_namespace_scope() {
    let store = Arc::new(RecordingStore::new(
        r#"
clusterRoleBindings:
  - name: dangling
    roleRef: ghost
    subjects:
      - kind: Group
        name: dev
"#,
    ));
    let evaluator = PermissionEvaluator::new(Arc::clone(&store));
    let err = evaluator
        .evaluate(&alice(), &pods_in_ns1("get"))
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(
        store.calls(),
        vec![
            "list_cluster_role_bindings".to_string(),
            "get_cluster_role ghost".to_string(),
        ]
    );
}

#[test]
fn test_subresource_wildcards_through_evaluator() {
    let doc = PolicyDocument::from_yaml_str(
        r#"
clusterRoles:
  - name: scaler
    rules:
      - verbs: ["update"]
        apiGroups: ["apps"]
        resources: ["*/scale"]
  - name: pod-debugger
    rules:
      - verbs: ["get"]
        apiGroups: [""]
        resources: ["pods/*"]
clusterRoleBindings:
  - name: ops
    roleRef: scaler
    subjects: [{kind: Group, name: ops}]
  - name: ops-debug
    roleRef: pod-debugger
    subjects: [{kind: Group, name: ops}]
"#,
    )
    .unwrap();
    let evaluator = PermissionEvaluator::new(Arc::new(MemoryPolicyStore::from_document(doc)));
    let ops = Subject::new("olga").with_groups(["ops"]);

    let scale = |resource: &str, sub: &str| {
        Action::resource(
            ResourceAttributes::new("update", resource)
                .api_group("apps")
                .subresource(sub)
                .namespace("prod"),
        )
    };
    assert!(evaluator.evaluate(&ops, &scale("deployments", "scale")).unwrap());
    assert!(evaluator.evaluate(&ops, &scale("statefulsets", "scale")).unwrap());
    assert!(!evaluator.evaluate(&ops, &scale("deployments", "status")).unwrap());

    let pod_sub = |sub: &str| {
        Action::resource(ResourceAttributes::new("get", "pods").subresource(sub))
    };
    assert!(evaluator.evaluate(&ops, &pod_sub("log")).unwrap());
    assert!(evaluator.evaluate(&ops, &pod_sub("status")).unwrap());

    let deploy_log = Action::resource(
        ResourceAttributes::new("get", "deployments").subresource("log"),
    );
    assert!(!evaluator.evaluate(&ops, &deploy_log).unwrap());
}

#[test]
fn test_snapshot_refresh_changes_decisions() {
    let store = Arc::new(MemoryPolicyStore::from_document(PolicyDocument::default()));
    let evaluator = PermissionEvaluator::new(Arc::clone(&store));
    assert_eq!(
        evaluator.decide(&alice(), &pods_in_ns1("get")).unwrap(),
        Decision::NoGrant
    );

    store.replace(PolicyDocument::from_yaml_str(POD_READER_POLICY).unwrap());
    assert!(evaluator.evaluate(&alice(), &pods_in_ns1("get")).unwrap());
}

#[test]
fn test_concurrent_evaluation() {
    let store = Arc::new(MemoryPolicyStore::from_document(
        PolicyDocument::from_yaml_str(POD_READER_POLICY).unwrap(),
    ));
    let evaluator = PermissionEvaluator::new(store);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let evaluator = evaluator.clone();
            std::thread::spawn(move || {
                let verb = if i % 2 == 0 { "get" } else { "delete" };
                let allowed = evaluator.evaluate(&alice(), &pods_in_ns1(verb)).unwrap();
                (verb, allowed)
            })
        })
        .collect();

    for handle in handles {
        let (verb, allowed) = handle.join().expect("evaluation thread panicked");
        assert_eq!(allowed, verb == "get");
    }
}

#[test]
fn test_service_account_subjects_are_skipped() {
    let doc = PolicyDocument::from_yaml_str(
        r#"
clusterRoles:
  - name: viewer
    rules:
      - verbs: ["get", "list"]
        apiGroups: [""]
        resources: ["pods"]
clusterRoleBindings:
  - name: viewers
    roleRef: viewer
    subjects:
      - kind: ServiceAccount
        name: default
        namespace: kube-system
      - kind: Group
        name: dev
"#,
    )
    .unwrap();
    let evaluator = PermissionEvaluator::new(Arc::new(MemoryPolicyStore::from_document(doc)));

    assert!(evaluator.evaluate(&alice(), &pods_in_ns1("list")).unwrap());
    assert!(
        !evaluator
            .evaluate(&Subject::new("default"), &pods_in_ns1("list"))
            .unwrap()
    );
}
