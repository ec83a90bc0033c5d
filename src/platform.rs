//! Host platform detection and the build-argument policy derived from it.
//!
//! On Linux the Docker daemon maps container uids to host uids one-to-one, so
//! the image must create a user matching the invoking host user or files
//! written into the bind-mounted workspace end up owned by someone else.
//! Docker Desktop platforms (macOS, Windows) run the daemon inside a VM that
//! already isolates the mapping, and some of their host uids collide with
//! reserved ids inside a Linux image, so those hosts build with no arguments
//! and the container runs as root.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Build argument carrying the host user name
pub const USER_NAME_ARG: &str = "USER_NAME";
/// Build argument carrying the numeric host user id
pub const USER_ID_ARG: &str = "USER_ID";
/// Build argument carrying the numeric host group id
pub const GROUP_ID_ARG: &str = "GROUP_ID";

/// Errors raised while resolving the host identity
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// Neither `$USER` nor the user database yielded a name for the current user
    #[error("cannot determine the invoking user's name (USER is unset and uid {uid} has no passwd entry)")]
    MissingUserName {
        /// Effective uid that was looked up
        uid: u32,
    },

    /// Host has no notion of numeric uid/gid
    #[error("host identity lookup is not supported on {os}")]
    UnsupportedHost {
        /// Operating system name
        os: &'static str,
    },
}

/// Host platform classification, resolved once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformProfile {
    /// Native Docker daemon sharing the host's uid space
    Linux,
    /// Docker running inside a virtual machine (macOS, Windows, ...)
    Other,
}

impl PlatformProfile {
    /// Classifies an operating system name such as `"Linux"`, `"linux"` or `"Darwin"`.
    pub fn from_os_name(os_name: &str) -> Self {
        if os_name.to_ascii_lowercase().contains("linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    /// Detects the profile of the running host.
    pub fn detect() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }
}

impl fmt::Display for PlatformProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "Linux"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// Identity of the user invoking the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub user_name: String,
    pub uid: u32,
    pub gid: u32,
}

/// Source of the host identity, injected so policy can be tested without a real host.
pub trait IdentitySource {
    fn identity(&self) -> Result<HostIdentity, ResolutionError>;
}

/// Reads the identity of the current process.
///
/// The name comes from `$USER`, falling back to the passwd entry of the
/// effective uid. Ids are the effective uid/gid.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessIdentity;

impl IdentitySource for ProcessIdentity {
    #[cfg(unix)]
    fn identity(&self) -> Result<HostIdentity, ResolutionError> {
        let uid = users::get_effective_uid();
        let gid = users::get_effective_gid();

        let user_name = std::env::var("USER")
            .ok()
            .filter(|name| !name.is_empty())
            .or_else(|| {
                users::get_user_by_uid(uid)
                    .map(|user| user.name().to_string_lossy().into_owned())
                    .filter(|name| !name.is_empty())
            })
            .ok_or(ResolutionError::MissingUserName { uid })?;

        Ok(HostIdentity {
            user_name,
            uid,
            gid,
        })
    }

    #[cfg(not(unix))]
    fn identity(&self) -> Result<HostIdentity, ResolutionError> {
        Err(ResolutionError::UnsupportedHost {
            os: std::env::consts::OS,
        })
    }
}

/// Complete set of user-mapping build arguments.
///
/// Either all three values are present or the build gets no arguments at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArgs {
    pub user_name: String,
    pub user_id: String,
    pub group_id: String,
}

impl From<HostIdentity> for BuildArgs {
    fn from(identity: HostIdentity) -> Self {
        Self {
            user_name: identity.user_name,
            user_id: identity.uid.to_string(),
            group_id: identity.gid.to_string(),
        }
    }
}

impl BuildArgs {
    /// Renders the arguments as the string map handed to the engine.
    pub fn to_map(&self) -> HashMap<String, String> {
        HashMap::from([
            (USER_NAME_ARG.to_string(), self.user_name.clone()),
            (USER_ID_ARG.to_string(), self.user_id.clone()),
            (GROUP_ID_ARG.to_string(), self.group_id.clone()),
        ])
    }
}

/// Applies the platform policy: Linux builds map the host user, everything else builds as root.
///
/// The identity source is only consulted on the Linux path.
pub fn resolve_build_args(
    profile: PlatformProfile,
    source: &dyn IdentitySource,
) -> Result<Option<BuildArgs>, ResolutionError> {
    match profile {
        PlatformProfile::Linux => Ok(Some(BuildArgs::from(source.identity()?))),
        PlatformProfile::Other => Ok(None),
    }
}
