//! Default risk-scoring weights.
//!
//! These are the defaults behind `ScoringConfig`; a config file can override
//! any of them.

/// Every allowed flow starts here.
pub const BASE_SCORE: u32 = 1;

/// Source and destination namespaces differ.
pub const WEIGHT_CROSS_NAMESPACE: u32 = 4;

/// Destination is labelled `env=prod` or lives in a namespace containing "prod".
pub const WEIGHT_PROD_DESTINATION: u32 = 5;

/// Destination is labelled `role=db` or its `app` label contains "db".
pub const WEIGHT_DATABASE_DESTINATION: u32 = 6;

/// Destination is labelled `tier=backend` or its `app` label contains "api".
pub const WEIGHT_BACKEND_DESTINATION: u32 = 2;

/// A dev/staging source reaches a prod destination.
pub const WEIGHT_NON_PROD_TO_PROD: u32 = 3;

/// Destination `app` label contains "admin" or "root".
pub const WEIGHT_PRIVILEGED_DESTINATION: u32 = 3;

/// Raw scores below this are not reported.
pub const REPORT_THRESHOLD: u32 = 5;

/// Raw score multiplier used for normalization.
pub const SCORE_MULTIPLIER: u32 = 7;

/// Upper bound of the normalized score.
pub const MAX_SCORE: u32 = 100;

/// Normalized score at or above which a flow is `critical`.
pub const LEVEL_CRITICAL: u32 = 80;

/// Normalized score at or above which a flow is `high`.
pub const LEVEL_HIGH: u32 = 60;

/// Normalized score at or above which a flow is `medium`.
pub const LEVEL_MEDIUM: u32 = 40;

/// Well-known service ports and the weight they add when targeted.
pub const SENSITIVE_PORTS: &[(u16, u32)] = &[
    (22, 4),    // ssh
    (3306, 5),  // mysql
    (5432, 5),  // postgres
    (6379, 4),  // redis
    (27017, 4), // mongodb
    (1433, 5),  // mssql
    (1521, 5),  // oracle
    (5984, 3),  // couchdb
    (9200, 4),  // elasticsearch
    (8080, 2),  // http-alt
    (8443, 3),  // https-alt
];
