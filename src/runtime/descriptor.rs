//! Borrowing externally owned file descriptors
//!
//! Blocks never open or close the descriptors they move data through. On
//! Unix a borrowed descriptor is duplicated into a [`File`]: the duplicate
//! shares the original's file offset and status flags, so reads, writes and
//! rewinds through it are seen by the owner, while dropping it closes only
//! the duplicate.

use std::fs::File;
use std::io;
use std::os::fd::AsFd;

/// Duplicate a borrowed descriptor into a `File` that leaves the original open
///
/// ```no_run
/// let stdout = fdblocks::runtime::descriptor::borrow_file(std::io::stdout())?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn borrow_file(fd: impl AsFd) -> io::Result<File> {
    Ok(File::from(fd.as_fd().try_clone_to_owned()?))
}
