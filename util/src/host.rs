//! Host platform (linux for example) utility functions

use std::env;
use std::path::PathBuf;

/// Name of the environment variable giving the root of the software tree.
pub const SW_ROOT_ENV_VAR: &str = "ARM_SW_ROOT";

/// Get the root directory of the software tree.
///
/// The root is read from the `ARM_SW_ROOT` environment variable, which must
/// point at the directory containing the `params` and `sessions` directories.
pub fn get_arm_sw_root() -> Result<PathBuf, env::VarError> {
    Ok(PathBuf::from(env::var(SW_ROOT_ENV_VAR)?))
}
