//! Default locations and platform for staging runs
//!
//! Every command flag that reads one of these defaults also honors the
//! matching `RELSTAGE_*` environment variable (wired up through clap's
//! `env` feature), so CI pipelines can configure the tool without flags.

/// Default path of the release index document
pub const DEFAULT_INDEX_FILE: &str = "metadata/index.json";

/// Default output directory for artifact metadata documents
pub const DEFAULT_OUT_DIR: &str = "out";

/// Default builder platform
pub const DEFAULT_BUILDER: &str = "ubuntu_amd64";

/// Environment variable overriding the index file path
pub const ENV_INDEX_FILE: &str = "RELSTAGE_INDEX_FILE";

/// Environment variable overriding the output directory
pub const ENV_OUT_DIR: &str = "RELSTAGE_OUT_DIR";

/// Environment variable overriding the builder platform
pub const ENV_BUILDER: &str = "RELSTAGE_BUILDER";
