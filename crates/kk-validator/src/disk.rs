//! Disk-space probe. Low disk is a warning, never a block.

use std::path::Path;

pub const MIN_DISK_SPACE_GB: f64 = 5.0;

/// Free gigabytes on the filesystem holding `path`.
pub fn check_disk_space(path: &Path) -> std::io::Result<f64> {
    let available = fs2::available_space(path)?;
    Ok(available as f64 / (1024.0 * 1024.0 * 1024.0))
}

/// Warning text when free space is below the soft threshold.
pub fn low_disk_warning(path: &Path) -> Option<String> {
    let available_gb = check_disk_space(path).ok()?;
    if available_gb < MIN_DISK_SPACE_GB {
        Some(format!(
            "Low disk space: {:.1}GB free, recommend >= {:.0}GB",
            available_gb, MIN_DISK_SPACE_GB
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_space_probe_works_on_tmp() {
        let gb = check_disk_space(Path::new("/tmp")).unwrap();
        assert!(gb >= 0.0);
    }
}
