//! typed facades over the nested blocks of `google_container_cluster`
//!
//! Every facade is a thin wrapper around [crate::reference::OutputReference]; all lookups go
//! through the schema. Fields without a typed accessor stay reachable through `reference()`.
use crate::output_reference;

output_reference! {
    /// The resolved `google_container_cluster` data source
    pub struct ClusterReference {
        string name;
        string id;
        string location;
        string project;
        string cluster_ipv4_cidr;
        string datapath_provider;
        number default_max_pods_per_node;
        string description;
        boolean enable_autopilot;
        boolean enable_binary_authorization;
        boolean enable_intranode_visibility;
        boolean enable_kubernetes_alpha;
        boolean enable_l4_ilb_subsetting;
        boolean enable_legacy_abac;
        boolean enable_shielded_nodes;
        boolean enable_tpu;
        string endpoint;
        number initial_node_count;
        string label_fingerprint;
        string logging_service;
        string master_version;
        string min_master_version;
        string monitoring_service;
        string network;
        string networking_mode;
        string_list node_locations;
        string node_version;
        string operation;
        string private_ipv6_google_access;
        boolean remove_default_node_pool;
        string_map resource_labels;
        string self_link;
        string services_ipv4_cidr;
        string subnetwork;
        string tpu_ipv4_cidr_block;

        list addons_config: AddonsConfig;
        list authenticator_groups_config: AuthenticatorGroupsConfig;
        list binary_authorization: BinaryAuthorization;
        list cluster_autoscaling: ClusterAutoscaling;
        list cluster_telemetry: ClusterTelemetry;
        list confidential_nodes: EnabledToggle;
        list cost_management_config: EnabledToggle;
        list database_encryption: DatabaseEncryption;
        list default_snat_status: DisabledToggle;
        list dns_config: DnsConfig;
        list gateway_api_config: GatewayApiConfig;
        list identity_service_config: EnabledToggle;
        list ip_allocation_policy: IpAllocationPolicy;
        list logging_config: LoggingConfig;
        list maintenance_policy: MaintenancePolicy;
        list master_auth: MasterAuth;
        list master_authorized_networks_config: MasterAuthorizedNetworksConfig;
        list mesh_certificates: MeshCertificates;
        list monitoring_config: MonitoringConfig;
        list network_policy: NetworkPolicy;
        list node_config: NodeConfig;
        list node_pool: NodePool;
        list node_pool_auto_config: NodePoolAutoConfig;
        list node_pool_defaults: NodePoolDefaults;
        list notification_config: NotificationConfig;
        list pod_security_policy_config: EnabledToggle;
        list private_cluster_config: PrivateClusterConfig;
        list protect_config: ProtectConfig;
        list release_channel: ReleaseChannel;
        list resource_usage_export_config: ResourceUsageExportConfig;
        list service_external_ips_config: EnabledToggle;
        list tpu_config: TpuConfig;
        list vertical_pod_autoscaling: EnabledToggle;
        list workload_identity_config: WorkloadIdentityConfig;
    }
}

output_reference! {
    /// Any block consisting of an `enabled` flag
    pub struct EnabledToggle {
        boolean enabled;
    }
}

output_reference! {
    /// Any block consisting of a `disabled` flag
    pub struct DisabledToggle {
        boolean disabled;
    }
}

output_reference! {
    pub struct AddonsConfig {
        list cloudrun_config: CloudrunConfig;
        list config_connector_config: EnabledToggle;
        list dns_cache_config: EnabledToggle;
        list gce_persistent_disk_csi_driver_config: EnabledToggle;
        list gcp_filestore_csi_driver_config: EnabledToggle;
        list gke_backup_agent_config: EnabledToggle;
        list horizontal_pod_autoscaling: DisabledToggle;
        list http_load_balancing: DisabledToggle;
        list istio_config: IstioConfig;
        list kalm_config: EnabledToggle;
        list network_policy_config: DisabledToggle;
    }
}

output_reference! {
    pub struct CloudrunConfig {
        boolean disabled;
        string load_balancer_type;
    }
}

output_reference! {
    pub struct IstioConfig {
        string auth;
        boolean disabled;
    }
}

output_reference! {
    pub struct AuthenticatorGroupsConfig {
        string security_group;
    }
}

output_reference! {
    pub struct BinaryAuthorization {
        boolean enabled;
        string evaluation_mode;
    }
}

output_reference! {
    pub struct ClusterAutoscaling {
        string autoscaling_profile;
        boolean enabled;
        list auto_provisioning_defaults: AutoProvisioningDefaults;
        list resource_limits: ResourceLimits;
    }
}

output_reference! {
    pub struct AutoProvisioningDefaults {
        string boot_disk_kms_key;
        number disk_size;
        string disk_type;
        string image_type;
        string min_cpu_platform;
        string_list oauth_scopes;
        string service_account;
        list management: AutoProvisioningManagement;
        list shielded_instance_config: ShieldedInstanceConfig;
        list upgrade_settings: UpgradeSettings;
    }
}

output_reference! {
    pub struct ResourceLimits {
        number maximum;
        number minimum;
        string resource_type;
    }
}

output_reference! {
    pub struct ClusterTelemetry {
        string r#type = "type";
    }
}

output_reference! {
    pub struct DatabaseEncryption {
        string key_name;
        string state;
    }
}

output_reference! {
    pub struct DnsConfig {
        string cluster_dns;
        string cluster_dns_domain;
        string cluster_dns_scope;
    }
}

output_reference! {
    pub struct GatewayApiConfig {
        string channel;
    }
}

output_reference! {
    pub struct IpAllocationPolicy {
        string cluster_ipv4_cidr_block;
        string cluster_secondary_range_name;
        string services_ipv4_cidr_block;
        string services_secondary_range_name;
        string stack_type;
        list pod_cidr_overprovision_config: DisabledToggle;
    }
}

output_reference! {
    pub struct LoggingConfig {
        string_list enable_components;
    }
}

output_reference! {
    pub struct MaintenancePolicy {
        list daily_maintenance_window: DailyMaintenanceWindow;
        list maintenance_exclusion: MaintenanceExclusion;
        list recurring_window: RecurringWindow;
    }
}

output_reference! {
    pub struct DailyMaintenanceWindow {
        string duration;
        string start_time;
    }
}

output_reference! {
    /// Element of a set, indexed through `tolist()`
    pub struct MaintenanceExclusion {
        string end_time;
        string exclusion_name;
        string start_time;
        list exclusion_options: ExclusionOptions;
    }
}

output_reference! {
    pub struct ExclusionOptions {
        string scope;
    }
}

output_reference! {
    pub struct RecurringWindow {
        string end_time;
        string recurrence;
        string start_time;
    }
}

output_reference! {
    pub struct MasterAuth {
        string client_certificate;
        string client_key;
        string cluster_ca_certificate;
        list client_certificate_config: ClientCertificateConfig;
    }
}

output_reference! {
    pub struct ClientCertificateConfig {
        boolean issue_client_certificate;
    }
}

output_reference! {
    pub struct MasterAuthorizedNetworksConfig {
        boolean gcp_public_cidrs_access_enabled;
        list cidr_blocks: CidrBlock;
    }
}

output_reference! {
    /// Element of a set, indexed through `tolist()`
    pub struct CidrBlock {
        string cidr_block;
        string display_name;
    }
}

output_reference! {
    pub struct MeshCertificates {
        boolean enable_certificates;
    }
}

output_reference! {
    pub struct MonitoringConfig {
        string_list enable_components;
        list managed_prometheus: EnabledToggle;
    }
}

output_reference! {
    pub struct NetworkPolicy {
        boolean enabled;
        string provider;
    }
}

output_reference! {
    /// `node_config`, both of the cluster and of each node pool
    pub struct NodeConfig {
        string boot_disk_kms_key;
        number disk_size_gb;
        string disk_type;
        string image_type;
        string_map labels;
        number local_ssd_count;
        string logging_variant;
        string machine_type;
        string_map metadata;
        string min_cpu_platform;
        string node_group;
        string_list oauth_scopes;
        boolean preemptible;
        string_map resource_labels;
        string service_account;
        boolean spot;
        string_list tags;
        list advanced_machine_features: AdvancedMachineFeatures;
        list ephemeral_storage_config: LocalSsdCount;
        list ephemeral_storage_local_ssd_config: LocalSsdCount;
        list gcfs_config: EnabledToggle;
        list guest_accelerator: GuestAccelerator;
        list gvnic: EnabledToggle;
        list kubelet_config: KubeletConfig;
        list linux_node_config: LinuxNodeConfig;
        list local_nvme_ssd_block_config: LocalSsdCount;
        list reservation_affinity: ReservationAffinity;
        list sandbox_config: SandboxConfig;
        list shielded_instance_config: ShieldedInstanceConfig;
        list taint: Taint;
        list workload_metadata_config: WorkloadMetadataConfig;
    }
}

output_reference! {
    pub struct AdvancedMachineFeatures {
        number threads_per_core;
    }
}

output_reference! {
    pub struct LocalSsdCount {
        number local_ssd_count;
    }
}

output_reference! {
    pub struct GuestAccelerator {
        number count;
        string gpu_partition_size;
        string r#type = "type";
        list gpu_sharing_config: GpuSharingConfig;
    }
}

output_reference! {
    pub struct GpuSharingConfig {
        string gpu_sharing_strategy;
        number max_shared_clients_per_gpu;
    }
}

output_reference! {
    pub struct KubeletConfig {
        boolean cpu_cfs_quota;
        string cpu_cfs_quota_period;
        string cpu_manager_policy;
        number pod_pids_limit;
    }
}

output_reference! {
    pub struct LinuxNodeConfig {
        string_map sysctls;
    }
}

output_reference! {
    pub struct ReservationAffinity {
        string consume_reservation_type;
        string key;
        string_list values;
    }
}

output_reference! {
    pub struct SandboxConfig {
        string sandbox_type;
    }
}

output_reference! {
    pub struct ShieldedInstanceConfig {
        boolean enable_integrity_monitoring;
        boolean enable_secure_boot;
    }
}

output_reference! {
    pub struct Taint {
        string effect;
        string key;
        string value;
    }
}

output_reference! {
    pub struct WorkloadMetadataConfig {
        string mode;
    }
}

output_reference! {
    pub struct NodePool {
        number initial_node_count;
        string_list instance_group_urls;
        string_list managed_instance_group_urls;
        number max_pods_per_node;
        string name;
        string name_prefix;
        number node_count;
        string_list node_locations;
        string version;
        list autoscaling: NodePoolAutoscaling;
        list management: NodeManagement;
        list network_config: NodePoolNetworkConfig;
        list node_config: NodeConfig;
        list placement_policy: PlacementPolicy;
        list upgrade_settings: UpgradeSettings;
    }
}

output_reference! {
    pub struct NodePoolAutoscaling {
        string location_policy;
        number max_node_count;
        number min_node_count;
        number total_max_node_count;
        number total_min_node_count;
    }
}

output_reference! {
    pub struct NodeManagement {
        boolean auto_repair;
        boolean auto_upgrade;
    }
}

output_reference! {
    /// Node management of auto-provisioned node pools
    pub struct AutoProvisioningManagement {
        boolean auto_repair;
        boolean auto_upgrade;
        list upgrade_options: UpgradeOptions;
    }
}

output_reference! {
    pub struct UpgradeOptions {
        string auto_upgrade_start_time;
        string description;
    }
}

output_reference! {
    pub struct NodePoolNetworkConfig {
        boolean create_pod_range;
        boolean enable_private_nodes;
        string pod_ipv4_cidr_block;
        string pod_range;
        list pod_cidr_overprovision_config: DisabledToggle;
    }
}

output_reference! {
    pub struct PlacementPolicy {
        string r#type = "type";
    }
}

output_reference! {
    pub struct UpgradeSettings {
        number max_surge;
        number max_unavailable;
        string strategy;
        list blue_green_settings: BlueGreenSettings;
    }
}

output_reference! {
    pub struct BlueGreenSettings {
        string node_pool_soak_duration;
        list standard_rollout_policy: StandardRolloutPolicy;
    }
}

output_reference! {
    pub struct StandardRolloutPolicy {
        number batch_node_count;
        number batch_percentage;
        string batch_soak_duration;
    }
}

output_reference! {
    pub struct NodePoolAutoConfig {
        list network_tags: NetworkTags;
    }
}

output_reference! {
    pub struct NetworkTags {
        string_list tags;
    }
}

output_reference! {
    pub struct NodePoolDefaults {
        list node_config_defaults: NodeConfigDefaults;
    }
}

output_reference! {
    pub struct NodeConfigDefaults {
        string logging_variant;
    }
}

output_reference! {
    pub struct NotificationConfig {
        list pubsub: Pubsub;
    }
}

output_reference! {
    pub struct Pubsub {
        boolean enabled;
        string topic;
        list filter: PubsubFilter;
    }
}

output_reference! {
    pub struct PubsubFilter {
        string_list event_type;
    }
}

output_reference! {
    /// Workload vulnerability scanning and configuration auditing
    pub struct ProtectConfig {
        string workload_vulnerability_mode;
        list workload_config: WorkloadConfig;
    }
}

output_reference! {
    pub struct WorkloadConfig {
        string audit_mode;
    }
}

output_reference! {
    pub struct PrivateClusterConfig {
        boolean enable_private_endpoint;
        boolean enable_private_nodes;
        string master_ipv4_cidr_block;
        string peering_name;
        string private_endpoint;
        string private_endpoint_subnetwork;
        string public_endpoint;
        list master_global_access_config: EnabledToggle;
    }
}

output_reference! {
    pub struct ReleaseChannel {
        string channel;
    }
}

output_reference! {
    pub struct ResourceUsageExportConfig {
        boolean enable_network_egress_metering;
        boolean enable_resource_consumption_metering;
        list bigquery_destination: BigqueryDestination;
    }
}

output_reference! {
    pub struct BigqueryDestination {
        string dataset_id;
    }
}

output_reference! {
    pub struct TpuConfig {
        boolean enabled;
        string ipv4_cidr_block;
        boolean use_service_networking;
    }
}

output_reference! {
    pub struct WorkloadIdentityConfig {
        string workload_pool;
    }
}
