// Disk space lookup
// reason: sysinfo for cross-platform disk enumeration

use std::path::Path;
use sysinfo::Disks;
use tracing::debug;

/// Free bytes on the disk holding `path`, if that disk can be identified
///
/// Blocking; call from `spawn_blocking`.
pub(crate) fn available_space(path: &Path) -> Option<u64> {
    let target = path.canonicalize().ok()?;
    let disks = Disks::new_with_refreshed_list();

    let disk = disks
        .list()
        .iter()
        .filter(|disk| target.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())?;

    debug!(
        path = %target.display(),
        mount = %disk.mount_point().display(),
        available = disk.available_space(),
        "Disk space checked"
    );
    Some(disk.available_space())
}
