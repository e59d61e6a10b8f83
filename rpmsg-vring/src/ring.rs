//! Ring creation and mapping.

use crate::config::VringConfig;
use crate::error::VringError;
use crate::layout::VringLayout;
use crate::shm::SharedMemory;
use std::path::Path;

/// Creates a zeroed ring in a new backing file and writes its control block
/// and descriptor table.
///
/// Both sides then map it: the coprocessor with
/// [`DeviceQueue::open`](crate::DeviceQueue::open), the host with
/// [`DriverQueue::open`](crate::DriverQueue::open).
///
/// # Errors
/// Returns [`VringError::Config`] for an invalid configuration, or an IO
/// error if the file cannot be created or mapped.
pub fn create(path: &Path, config: &VringConfig) -> Result<VringLayout, VringError> {
    config.validate()?;
    let layout = VringLayout::new(config);
    let mut shm = SharedMemory::create(path, layout.total_size())?;
    layout.init(shm.as_mut_slice());
    tracing::debug!(
        "Created ring at {} (depth {}, {} byte slots, {} bytes)",
        path.display(),
        layout.depth(),
        layout.buf_size(),
        layout.total_size()
    );
    Ok(layout)
}

/// Maps an existing ring and reads back its layout.
pub(crate) fn map(path: &Path) -> Result<(SharedMemory, VringLayout), VringError> {
    let shm = SharedMemory::open(path)?;
    let layout = VringLayout::from_region(shm.as_slice())?;
    Ok((shm, layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_and_map() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ring");
        let config = VringConfig::default().depth(8);

        let layout = create(&path, &config).unwrap();
        let (shm, mapped) = map(&path).unwrap();
        assert_eq!(mapped, layout);
        assert_eq!(shm.size(), layout.total_size());
    }

    #[test]
    fn test_create_rejects_invalid_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad_ring");

        let err = create(&path, &VringConfig::default().depth(3)).unwrap_err();
        assert!(matches!(err, VringError::Config { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_map_missing_file() {
        let dir = tempdir().unwrap();
        let err = map(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, VringError::Io(_)));
    }

    #[test]
    fn test_map_rejects_foreign_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("foreign");
        std::fs::write(&path, vec![0xFFu8; 4096]).unwrap();

        let err = map(&path).unwrap_err();
        assert!(matches!(err, VringError::LayoutMismatch { .. }));
    }
}
