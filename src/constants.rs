// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Deployment label/annotation keys that declare a secret binding
pub mod binding {
    /// Name of a single secret to mount
    pub const SECRET_NAME: &str = "secret-name";
    /// When set to "true", mounts every secret matching the bulk selector
    pub const BULK: &str = "secret-bulk-bind";
    /// Dot-separated list of secret entry keys to project (optional)
    pub const SECRET_KEYS: &str = "secret-keys";
    /// In-container mount path override (optional)
    pub const MOUNT_PATH: &str = "secret-mount-path";
}

/// The operator name, used as work queue and log identity
pub const OPERATOR_NAME: &str = "secret-mounter";

/// Suffix appended to a secret name to form its volume name
pub const VOLUME_SUFFIX: &str = "-secret-volume";

/// Mount path used when a binding does not override it
pub const DEFAULT_MOUNT_PATH: &str = "/etc/secret-mounter-data/";

/// Selector used by bulk bindings unless configured otherwise
pub const DEFAULT_BULK_SELECTOR: &str = "app=secret-mounter";

/// File mode of projected secret files (0644), matching the API server default
pub const DEFAULT_FILE_MODE: i32 = 0o644;

/// Capacity of the channel between the event source and the work queue
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Work queue retry configuration
pub mod queue {
    /// Delay before the first retry, in milliseconds
    pub const BASE_DELAY_MS: u64 = 5;
    /// Maximum retry delay in seconds (exponential backoff cap)
    pub const MAX_DELAY_SECS: u64 = 1000;
}
