//! Snapshot tests
//!
//! Loads the state files in tests/fixtures/states and compares evaluated expressions and
//! synthesized configuration against inline snapshots.

use std::path::PathBuf;
use tfgke::cluster::{DataGoogleContainerCluster, DataGoogleContainerClusterConfig};
use tfgke::state::ClusterStates;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("TFGKE_LOG"))
        .with_writer(std::io::stderr)
        .try_init();
}

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn states() -> ClusterStates {
    let mut states = ClusterStates::default();
    states
        .load_directory(&fixtures().join("states"))
        .expect("fixtures must load");
    states
}

fn evaluate(expression: &str) -> tfgke::value::Value {
    states().evaluate(expression).expect("valid value")
}

#[test]
fn load_directory() {
    init_logging();

    let states = states();
    let names: Vec<_> = states.names().collect();
    insta::assert_snapshot!(names.join("\n"), @r###"
    staging
    module.tenants.tenant["blue"]
    primary
    "###);
}

#[test]
fn evaluate_nested_blocks() {
    init_logging();

    insta::assert_yaml_snapshot!(
        evaluate("data.google_container_cluster.primary.nodePool[1].nodeConfig[0].taint"),
        @r###"
    - effect: NO_SCHEDULE
      key: nvidia.com/gpu
      value: present
    "###
    );
}

#[test]
fn evaluate_for_expression() {
    init_logging();

    insta::assert_yaml_snapshot!(
        evaluate("{ for pool in data.google_container_cluster.primary.node_pool : pool.name => pool.node_count }"),
        @r###"
    general: 2
    gpu: 0
    "###
    );
}

#[test]
fn evaluate_across_instances() {
    init_logging();

    insta::assert_yaml_snapshot!(
        evaluate("[data.google_container_cluster.primary.release_channel[0].channel, data.google_container_cluster.staging.releaseChannel[0].channel]"),
        @r###"
    - REGULAR
    - RAPID
    "###
    );
}

#[test]
fn evaluate_set_elements() {
    init_logging();

    insta::assert_yaml_snapshot!(
        evaluate("[for block in tolist(data.google_container_cluster.primary.masterAuthorizedNetworksConfig[0].cidrBlocks) : block.display_name]"),
        @r###"
    - internal
    - office
    "###
    );
    insta::assert_yaml_snapshot!(
        evaluate("tolist(data.google_container_cluster.primary.maintenancePolicy[0].maintenanceExclusion)[0].exclusionOptions[0].scope"),
        @"NO_UPGRADES"
    );
}

#[test]
fn evaluate_unknown_field() {
    init_logging();

    let error = states()
        .evaluate("data.google_container_cluster.primary.nodePools")
        .unwrap_err();
    insta::assert_snapshot!(error.to_string(), @r###"unknown field "nodePools" at "primary""###);
}

#[test]
fn synthesize_json() {
    init_logging();

    let contents = std::fs::read_to_string(fixtures().join("cluster.yaml")).unwrap();
    let config: DataGoogleContainerClusterConfig = serde_yaml::from_str(&contents).unwrap();
    let cluster = DataGoogleContainerCluster::new("primary", config).unwrap();

    insta::assert_snapshot!(
        serde_json::to_string_pretty(&cluster.to_json()).unwrap(),
        @r###"
    {
      "data": {
        "google_container_cluster": {
          "primary": {
            "name": "prod-eu",
            "location": "europe-west1",
            "project": "acme-prod",
            "depends_on": [
              "google_project_service.container"
            ]
          }
        }
      }
    }
    "###
    );
}

#[test]
fn synthesize_attributes() {
    init_logging();

    let cluster = DataGoogleContainerCluster::new(
        "primary",
        DataGoogleContainerClusterConfig::new("prod-eu").with_project("acme-prod"),
    )
    .unwrap();

    let attributes = tfgke::value::Value::from(cluster.synthesize_attributes());
    insta::assert_yaml_snapshot!(attributes, @r###"
    name: prod-eu
    project: acme-prod
    "###);
}
