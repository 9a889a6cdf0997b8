//! Naming conventions of the reference installation tree and its logs.

/// Format of attempt directory names, e.g. `20251030_125909UTC`.
///
/// Lexicographic order of names in this format equals chronological order.
pub const ATTEMPT_DIR_FORMAT: &str = "%Y%m%d_%H%M%SUTC";

/// Subdirectory of an attempt holding the build log and easyconfig.
pub const ATTEMPT_LOG_SUBDIR: &str = "easybuild";

/// Prefix of a build log file name; followed by `<unit>-`.
pub const LOG_FILE_PREFIX: &str = "easybuild-";

/// Extension every build log carries before an optional compression suffix.
pub const LOG_FILE_EXT: &str = ".log";

/// Glob (relative to the attempt's log subdirectory) naming the easyblocks used.
pub const EASYBLOCKS_GLOB: &str = "reprod/easyblocks/*.py";

/// Extension of an easyconfig file.
pub const EASYCONFIG_EXT: &str = ".eb";

/// Unit name of the build tool itself.
pub const DEFAULT_TOOL_UNIT: &str = "EasyBuild";

/// Default root prefix when the tree is derived from a generation label.
pub const DEFAULT_PREFIX: &str = "/cvmfs/software.eessi.io/versions";

/// Default maximum accumulated build time per manifest, in minutes.
pub const DEFAULT_MAX_BATCH_MINUTES: u64 = 240;

/// Minimum width of the zero-padded sequence number in manifest file names.
pub const MIN_SEQUENCE_WIDTH: usize = 3;
