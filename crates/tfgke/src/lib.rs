//! # tfgke - typed access to the `google_container_cluster` data source
//!
//! ## Introduction for developers
//!
//! Read this to understand how `tfgke` works internally.
//!
//! ### Terms
//!
//! - **data source**: a terraform `data "google_container_cluster" "<name>" {}` block. Its
//!   arguments are `name` (required), `id`, `location` and `project`; everything else is computed
//!   by the provider and only known once terraform has read it.
//! - **schema**: the provider's description of the data source, in the JSON format printed by
//!   `terraform providers schema -json`. A copy is embedded in this crate ([schema]).
//! - **block**: a schema node with attributes and nested blocks. Nested blocks are repeated
//!   (`list`/`set`) or single.
//! - **path**: the position of a value inside one data source instance, e.g.
//!   `addons_config[0].http_load_balancing[0].disabled` ([path::AttributePath]).
//!
//! ### One schema, no generated code
//!
//! There is exactly one reference type ([reference::OutputReference]) and one list type
//! ([reference::ComplexList]) for all ~100 blocks of the schema. A reference is a block of the
//! schema at a path. Every getter
//! 1. looks the field up in the block (accepting `snake_case` and `camelCase` names) and checks
//!    its declared type, failing with [schema::SchemaError] otherwise
//! 2. appends the field to the path and hands the path to a [resolve::Resolve]r
//! 3. casts the result, failing with [resolve::ResolveError] on `null` or a differently shaped value
//!
//! Nothing is cached and nothing is defaulted.
//!
//! Named accessors (`cluster.addons_config()?.get(0)?.http_load_balancing()`) are thin wrappers
//! declared with [output_reference!] in [cluster]. A test checks every declared accessor against
//! the embedded schema.
//!
//! ### Resolving
//!
//! [resolve::StateResolver] walks a path over the attribute object of one instance. Terraform
//! state uses `snake_case` keys, values produced by CDK style tooling use `camelCase`; both are
//! accepted. [state::ClusterStates] loads instances from `terraform.tfstate`,
//! `terraform show -json` output or bare attribute objects.
//!
//! ### Synthesizing
//!
//! Without state, references still render as terraform expressions. Indexing into a set
//! (`maintenance_exclusion`, `cidr_blocks`) is not possible in terraform, so those paths are
//! rendered through `tolist()`:
//!
//! ```text
//! ${tolist(data.google_container_cluster.primary.master_authorized_networks_config[0].cidr_blocks)[0].cidr_block}
//! ```
//!
//! [cluster::DataGoogleContainerCluster] renders the data block itself as HCL or terraform JSON.
//!
//! ### Evaluating
//!
//! We use [hcl::eval] to evaluate expressions against loaded state. Before evaluation every
//! traversal starting with `data.google_container_cluster.<name>` is walked against the schema:
//! `camelCase` names are rewritten and unknown names are rejected. See
//! [state::ClusterStates::evaluate].

pub mod cluster;
pub mod naming;
pub mod path;
pub mod reference;
pub mod resolve;
pub(crate) mod rewrite;
pub mod schema;
pub mod state;
pub mod value;
pub(crate) mod visit;

#[doc(hidden)]
pub use indexmap;
