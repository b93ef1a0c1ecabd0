use std::time::Duration;

use rand::Rng;

pub(crate) const PRIVILEGE_PROMPT_DELAY: Duration = Duration::from_secs(1);
const DOWNLOAD_LINE_DELAY: Duration = Duration::from_millis(800);
const MIN_LINE_DELAY_MS: u64 = 100;
const MAX_LINE_DELAY_MS: u64 = 500;

/// Canned apt transcript replayed on hosts without a supported package manager.
pub(crate) const SIMULATED_UPDATE_LINES: &[&str] = &[
    "Hit:1 http://archive.ubuntu.com/ubuntu noble InRelease",
    "Reading package lists... Done",
    "Building dependency tree... Done",
    "Reading state information... Done",
    "Calculated upgrade... Done",
    "The following packages will be upgraded:",
    "  firefox firefox-locale-en libglib2.0-0 libglib2.0-bin",
    "4 upgraded, 0 newly installed, 0 to remove and 0 not upgraded.",
    "Need to get 42.5 MB of archives.",
    "After this operation, 1024 KB of additional disk space will be used.",
    "Get:1 http://archive.ubuntu.com/ubuntu noble-updates/main amd64 libglib2.0-0 amd64 2.80.0 [1,540 kB]",
    "Fetched 42.5 MB in 2s (18.5 MB/s)",
    "(Reading database ... 185432 files and directories currently installed.)",
    "Preparing to unpack .../libglib2.0-0_2.80.0_amd64.deb ...",
    "Unpacking libglib2.0-0:amd64 (2.80.0) over (2.79.0) ...",
    "Setting up libglib2.0-0:amd64 (2.80.0) ...",
    "done.",
];

pub(crate) fn simulated_line_delay(line: &str) -> Duration {
    if line.contains("Get:") {
        return DOWNLOAD_LINE_DELAY;
    }
    Duration::from_millis(rand::rng().random_range(MIN_LINE_DELAY_MS..=MAX_LINE_DELAY_MS))
}

/// `round(100 * index / total)` for a zero-based line index.
pub(crate) fn simulated_progress(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = ((100 * index) as f64 / total as f64).round();
    percent.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_line_delay_stays_in_bounds() {
        for line in SIMULATED_UPDATE_LINES {
            let delay = simulated_line_delay(line);
            if line.contains("Get:") {
                assert_eq!(delay, DOWNLOAD_LINE_DELAY);
            } else {
                assert!(delay >= Duration::from_millis(MIN_LINE_DELAY_MS));
                assert!(delay <= Duration::from_millis(MAX_LINE_DELAY_MS));
            }
        }
    }

    #[test]
    fn simulated_progress_is_non_decreasing_and_bounded() {
        let total = SIMULATED_UPDATE_LINES.len();
        let values: Vec<u8> = (0..total).map(|index| simulated_progress(index, total)).collect();

        assert_eq!(values[0], 0);
        assert!(values.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(values.iter().all(|value| *value < 100));
    }

    #[test]
    fn simulated_progress_rounds_to_nearest_percent() {
        assert_eq!(simulated_progress(1, 3), 33);
        assert_eq!(simulated_progress(2, 3), 67);
        assert_eq!(simulated_progress(0, 0), 100);
    }
}
