/// Build-time git commit SHA stamped by build.rs when available.
pub fn git_sha() -> Option<&'static str> {
    option_env!("TASKDATA_BUILD_GIT_SHA")
}

/// Application version in the `vMAJOR.MINOR.PATCH` form used by data files.
pub const APP_VERSION: &str = concat!("v", env!("CARGO_PKG_VERSION"));
