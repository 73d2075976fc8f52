//! Modification-time values.

use std::fmt;

use filetime::FileTime;

/// A point on the modification-time axis.
///
/// Stamps the tool generates are whole seconds, so a value written to a file
/// reads back equal to itself regardless of the filesystem's native mtime
/// resolution. Stamps read back from disk may carry nanoseconds; ordering
/// and equality account for both parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stamp(FileTime);

impl Stamp {
    /// The Unix epoch. Orders below every stamp a clock can hand out, which
    /// makes it both the "missing file" sentinel and the initial floor.
    pub fn epoch() -> Self {
        Stamp(FileTime::zero())
    }

    /// A whole-second stamp.
    pub fn from_unix_secs(secs: i64) -> Self {
        Stamp(FileTime::from_unix_time(secs, 0))
    }

    pub fn from_file_time(time: FileTime) -> Self {
        Stamp(time)
    }

    pub fn file_time(&self) -> FileTime {
        self.0
    }

    pub fn unix_seconds(&self) -> i64 {
        self.0.unix_seconds()
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.0.unix_seconds(), self.0.nanoseconds())
    }
}
