//! Test data and file fixtures for copyperf tests and benchmarks

use copyperf_types::CopyStrategy;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test data generation patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestDataPattern {
    /// All zeros, the shape of a sparse or freshly allocated file
    Zeros,
    /// All ones
    Ones,
    /// Deterministic pseudo-random bytes
    Random,
    /// Structured bytes with a short period
    Realistic,
}

impl TestDataPattern {
    /// Every pattern
    pub const ALL: [TestDataPattern; 4] = [
        TestDataPattern::Zeros,
        TestDataPattern::Ones,
        TestDataPattern::Random,
        TestDataPattern::Realistic,
    ];
}

/// Generate `size` bytes following `pattern`.
///
/// The output is reproducible, so a failing test or a benchmark baseline
/// can be rerun against identical input.
pub fn generate_test_data(size: usize, pattern: TestDataPattern) -> Vec<u8> {
    match pattern {
        TestDataPattern::Zeros => vec![0u8; size],
        TestDataPattern::Ones => vec![0xFFu8; size],
        TestDataPattern::Random => {
            // xorshift64, fixed seed
            let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
            (0..size)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    (state >> 56) as u8
                })
                .collect()
        }
        TestDataPattern::Realistic => (0..size).map(|i| ((i * 7 + 13) % 256) as u8).collect(),
    }
}

/// Create a file named `name` in `temp_dir` holding `size` bytes of `pattern`
pub fn create_test_file(
    temp_dir: &TempDir,
    name: &str,
    size: usize,
    pattern: TestDataPattern,
) -> PathBuf {
    let file_path = temp_dir.path().join(name);
    let data = generate_test_data(size, pattern);
    fs::write(&file_path, data).expect("Failed to write test file");
    file_path
}

/// Destination path for `strategy` next to `source`, unique per strategy
pub fn destination_for(source: &Path, strategy: CopyStrategy) -> PathBuf {
    let mut name = source
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(strategy.program_name());
    source.with_file_name(name)
}

/// Common file sizes for tests and benchmarks
pub struct CommonFileSizes;

impl CommonFileSizes {
    /// Nothing at all
    pub const EMPTY: usize = 0;
    /// 1KB, well under a page
    pub const TINY: usize = 1024;
    /// One page plus one byte on 4KB-page systems
    pub const PAGE_PLUS_ONE: usize = 4 * 1024 + 1;
    /// 64KB
    pub const MEDIUM: usize = 64 * 1024;
    /// 1MB
    pub const LARGE: usize = 1024 * 1024;
    /// 16MB
    pub const XLARGE: usize = 16 * 1024 * 1024;

    /// Sizes small enough for correctness tests
    pub fn correctness() -> Vec<(&'static str, usize)> {
        vec![
            ("empty", Self::EMPTY),
            ("1KB", Self::TINY),
            ("4KB+1", Self::PAGE_PLUS_ONE),
            ("64KB", Self::MEDIUM),
            ("1MB", Self::LARGE),
        ]
    }

    /// Sizes for benchmarks
    pub fn performance() -> Vec<(&'static str, usize)> {
        vec![
            ("64KB", Self::MEDIUM),
            ("1MB", Self::LARGE),
            ("16MB", Self::XLARGE),
        ]
    }
}

/// Buffer sizes worth comparing for the read/write strategy
pub struct CommonBufferSizes;

impl CommonBufferSizes {
    /// 512 bytes, a classic sector
    pub const SECTOR: usize = 512;
    /// 4KB, the usual page
    pub const PAGE: usize = 4 * 1024;
    /// 64KB
    pub const MEDIUM: usize = 64 * 1024;
    /// 1MB
    pub const LARGE: usize = 1024 * 1024;

    /// All of them, labelled
    pub fn all() -> Vec<(&'static str, usize)> {
        vec![
            ("512B", Self::SECTOR),
            ("4KB", Self::PAGE),
            ("64KB", Self::MEDIUM),
            ("1MB", Self::LARGE),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_test_data_patterns() {
        let size = 1024;

        let zeros = generate_test_data(size, TestDataPattern::Zeros);
        assert_eq!(zeros.len(), size);
        assert!(zeros.iter().all(|&b| b == 0));

        let ones = generate_test_data(size, TestDataPattern::Ones);
        assert!(ones.iter().all(|&b| b == 0xFF));

        let random = generate_test_data(size, TestDataPattern::Random);
        assert_eq!(random.len(), size);
        assert_eq!(random, generate_test_data(size, TestDataPattern::Random));
        assert!(random.iter().any(|&b| b != random[0]));
    }

    #[test]
    fn test_create_test_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = create_test_file(&temp_dir, "test.dat", 1024, TestDataPattern::Zeros);

        assert!(file_path.exists());
        assert_eq!(fs::metadata(&file_path).unwrap().len(), 1024);
    }

    #[test]
    fn test_destination_for_is_unique_per_strategy() {
        let source = Path::new("/tmp/data.bin");
        let destinations: Vec<_> = CopyStrategy::ALL
            .into_iter()
            .map(|strategy| destination_for(source, strategy))
            .collect();
        assert_eq!(destinations[1], Path::new("/tmp/data.bin.read-write"));
        for (i, a) in destinations.iter().enumerate() {
            for b in &destinations[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
