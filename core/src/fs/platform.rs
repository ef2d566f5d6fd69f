//! Per-OS path conventions and filesystem capabilities.
//!
//! Paths are always stored in generic form: an optional root (`/` or a drive
//! such as `C:`) followed by names. A [`Platform`] knows how to parse user
//! input into that form and how to render it back using the native
//! separator, and it answers the metadata questions (owner, group) whose
//! availability differs between operating systems.

use std::fs::Metadata;
use std::ops::BitOr;
use std::path::Path;

const GENERIC_SEPARATOR: char = '/';
const WINDOWS_SEPARATOR: char = '\\';
const UNC_PREFIX: &str = "\\\\";

/// Capability flags. Platforms report the filesystem ones; paths add
/// [`SEQUENCES`](Self::SEQUENCES) when configured for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Self = Self(0);
    /// Symbolic links can be created and inspected without following them.
    pub const SYMLINKS: Self = Self(1);
    /// Files carry a group owner in addition to a user owner.
    pub const GROUP_OWNERSHIP: Self = Self(1 << 1);
    /// Directory listings include collapsed frame sequences. Set per path,
    /// never by a platform.
    pub const SEQUENCES: Self = Self(1 << 2);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Generic root and names parsed from a path string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPath {
    pub root: String,
    pub names: Vec<String>,
}

pub trait Platform: std::fmt::Debug + Send + Sync {
    /// Short identifier used in diagnostics.
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    /// Parse a generic or native path string.
    fn parse(&self, input: &str) -> ParsedPath;

    /// Render a generic root and names with the native separator.
    fn native_string(&self, root: &str, names: &[String]) -> String;

    /// User name owning the file at `path`, or an empty string when it
    /// cannot be resolved.
    fn owner(&self, path: &Path, metadata: &Metadata) -> String;

    /// Group name owning the file, or an empty string where groups do not apply.
    fn group(&self, metadata: &Metadata) -> String;
}

/// Generic string form shared by every platform: forward slashes, with a
/// drive root followed by a separator (`C:/a`) and `/` as the absolute root.
pub fn generic_string(root: &str, names: &[String]) -> String {
    join(root, names, GENERIC_SEPARATOR)
}

fn join(root: &str, names: &[String], separator: char) -> String {
    let mut result = String::from(root);
    if is_drive(root) && !names.is_empty() {
        result.push(separator);
    }
    for (index, name) in names.iter().enumerate() {
        if index != 0 {
            result.push(separator);
        }
        result.push_str(name);
    }
    result
}

fn split_names(input: &str) -> Vec<String> {
    input.split(GENERIC_SEPARATOR).filter(|name| !name.is_empty()).map(str::to_owned).collect()
}

/// Returns `true` for a bare drive component such as `C:`.
pub fn is_drive(component: &str) -> bool {
    let bytes = component.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Linux and macOS conventions.
///
/// A leading drive-like component (`C:`) is an ordinary relative directory
/// name here, and backslashes are ordinary file name characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixPlatform;

impl Platform for PosixPlatform {
    fn name(&self) -> &'static str {
        "posix"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::SYMLINKS | Capabilities::GROUP_OWNERSHIP
    }

    fn parse(&self, input: &str) -> ParsedPath {
        let root = if input.starts_with(GENERIC_SEPARATOR) { "/" } else { "" };
        ParsedPath { root: root.to_owned(), names: split_names(input) }
    }

    fn native_string(&self, root: &str, names: &[String]) -> String {
        join(root, names, GENERIC_SEPARATOR)
    }

    fn owner(&self, _path: &Path, metadata: &Metadata) -> String {
        unix_ids::owner(metadata)
    }

    fn group(&self, metadata: &Metadata) -> String {
        unix_ids::group(metadata)
    }
}

/// Windows conventions: backslash separators, drive roots and UNC shares.
///
/// A generic path starting with a single `/` names a UNC share
/// (`/server/share` renders as `\\server\share`).
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsPlatform;

impl Platform for WindowsPlatform {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }

    fn parse(&self, input: &str) -> ParsedPath {
        let sanitized = match input.strip_prefix(UNC_PREFIX) {
            Some(rest) => format!("{GENERIC_SEPARATOR}{rest}"),
            None => input.to_owned(),
        };
        let sanitized = sanitized.replace(WINDOWS_SEPARATOR, "/");

        let mut names = split_names(&sanitized);
        let root = if sanitized.starts_with(GENERIC_SEPARATOR) {
            "/".to_owned()
        } else if names.first().is_some_and(|first| is_drive(first)) {
            names.remove(0)
        } else {
            String::new()
        };

        ParsedPath { root, names }
    }

    fn native_string(&self, root: &str, names: &[String]) -> String {
        if root == "/" {
            let mut result = String::from(UNC_PREFIX);
            result.push_str(&join("", names, WINDOWS_SEPARATOR));
            return result;
        }
        join(root, names, WINDOWS_SEPARATOR)
    }

    /// Resolved through the security API when running on Windows; paths
    /// merely rendered with Windows conventions elsewhere report no owner.
    fn owner(&self, path: &Path, _metadata: &Metadata) -> String {
        windows_ids::owner(path)
    }

    fn group(&self, _metadata: &Metadata) -> String {
        String::new()
    }
}

#[cfg(unix)]
mod unix_ids {
    use std::fs::Metadata;
    use std::os::unix::fs::MetadataExt;

    pub fn owner(metadata: &Metadata) -> String {
        uzers::get_user_by_uid(metadata.uid())
            .map(|user| user.name().to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn group(metadata: &Metadata) -> String {
        uzers::get_group_by_gid(metadata.gid())
            .map(|group| group.name().to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(not(unix))]
mod unix_ids {
    use std::fs::Metadata;

    pub fn owner(_metadata: &Metadata) -> String {
        String::new()
    }

    pub fn group(_metadata: &Metadata) -> String {
        String::new()
    }
}

#[cfg(windows)]
mod windows_ids {
    use std::os::windows::ffi::OsStrExt;
    use std::path::Path;
    use std::ptr;

    use windows_sys::Win32::Foundation::{ERROR_SUCCESS, LocalFree, PSID};
    use windows_sys::Win32::Security::Authorization::{GetNamedSecurityInfoW, SE_FILE_OBJECT};
    use windows_sys::Win32::Security::{
        LookupAccountSidW, OWNER_SECURITY_INFORMATION, PSECURITY_DESCRIPTOR, SID_NAME_USE,
    };

    pub fn owner(path: &Path) -> String {
        let wide: Vec<u16> = path.as_os_str().encode_wide().chain(std::iter::once(0)).collect();
        let mut sid: PSID = ptr::null_mut();
        let mut descriptor: PSECURITY_DESCRIPTOR = ptr::null_mut();

        // SAFETY: `wide` is NUL terminated and outlives the call; the out
        // pointers reference locals. `sid` points into `descriptor`, which is
        // released once the name has been copied out.
        let status = unsafe {
            GetNamedSecurityInfoW(
                wide.as_ptr(),
                SE_FILE_OBJECT,
                OWNER_SECURITY_INFORMATION,
                &mut sid,
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
                &mut descriptor,
            )
        };
        if status != ERROR_SUCCESS {
            return String::new();
        }

        let name = account_name(sid);
        // SAFETY: `descriptor` was allocated by GetNamedSecurityInfoW.
        unsafe { LocalFree(descriptor) };
        name
    }

    fn account_name(sid: PSID) -> String {
        let mut name_len = 0u32;
        let mut domain_len = 0u32;
        let mut usage: SID_NAME_USE = 0;

        // First call only reports the buffer sizes.
        // SAFETY: null buffers with zero lengths are the documented size query.
        unsafe {
            LookupAccountSidW(
                ptr::null(),
                sid,
                ptr::null_mut(),
                &mut name_len,
                ptr::null_mut(),
                &mut domain_len,
                &mut usage,
            )
        };
        if name_len == 0 {
            return String::new();
        }

        let mut name = vec![0u16; name_len as usize];
        let mut domain = vec![0u16; domain_len.max(1) as usize];
        // SAFETY: both buffers are sized as reported by the first call.
        let found = unsafe {
            LookupAccountSidW(
                ptr::null(),
                sid,
                name.as_mut_ptr(),
                &mut name_len,
                domain.as_mut_ptr(),
                &mut domain_len,
                &mut usage,
            )
        };
        if found == 0 {
            return String::new();
        }
        String::from_utf16_lossy(&name[..name_len as usize])
    }
}

#[cfg(not(windows))]
mod windows_ids {
    use std::path::Path;

    pub fn owner(_path: &Path) -> String {
        String::new()
    }
}

static POSIX: PosixPlatform = PosixPlatform;
static WINDOWS: WindowsPlatform = WindowsPlatform;

/// Conventions of the operating system this crate was built for.
pub fn host() -> &'static dyn Platform {
    if cfg!(windows) { &WINDOWS } else { &POSIX }
}

pub fn posix() -> &'static dyn Platform {
    &POSIX
}

pub fn windows() -> &'static dyn Platform {
    &WINDOWS
}
