/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use chrono::DateTime;
use chrono::Utc;
use std::path::{Path, PathBuf};

pub fn generate_file_name(prefix: &str, suffix: &str) -> String {
    let current_utc: DateTime<Utc> = Utc::now();
    let rfc3339_name: String = current_utc.to_rfc3339();

    format!("{}.{}.{}", prefix, rfc3339_name.replace(":", "-"), suffix)
}

/// Timestamped `gnat-<command>-<name>.<rfc3339>.<suffix>` path under `directory`.
pub fn generate_output_path(directory: &Path, command: &str, name: &str, suffix: &str) -> PathBuf {
    let prefix = format!("gnat-{}-{}", command, name);
    directory.join(generate_file_name(&prefix, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_output_path() {
        let path = generate_output_path(Path::new("/tmp"), "anomaly", "long_low_data", "jsonl");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("gnat-anomaly-long_low_data."));
        assert!(name.ends_with(".jsonl"));
        assert!(!name.contains(':'));
        assert_eq!(path.parent(), Some(Path::new("/tmp")));
    }
}
