//! File naming and default locations shared by the CLI and the pipeline.

// Cluster file naming: cluster_<id>.jsonl
pub const CLUSTER_FILE_PREFIX: &str = "cluster_";
pub const CLUSTER_FILE_SUFFIX: &str = ".jsonl";
pub const CLUSTER_FILE_GLOB: &str = "cluster_*.jsonl";

// Default locations, overridable through flags, env or the config file
pub const DEFAULT_INPUT_DIR: &str = "./cluster_results/";
pub const DEFAULT_OUTPUT_FILE: &str = "./miccai_viz_data.json";
pub const DEFAULT_CONFIG_FILE: &str = "cluster_viz.toml";

// Environment variable names
pub const ENV_INPUT_DIR: &str = "CLUSTER_VIZ_INPUT_DIR";
pub const ENV_OUTPUT: &str = "CLUSTER_VIZ_OUTPUT";
pub const ENV_NORMALIZATION: &str = "CLUSTER_VIZ_NORMALIZATION";
pub const ENV_CONFIG: &str = "CLUSTER_VIZ_CONFIG";

// Record defaults
pub const DEFAULT_TITLE: &str = "No Title";
pub const UNKNOWN_INSTITUTION: &str = "Unknown";
