//! Connection pool behavior tests
//!
//! Tests marked `#[ignore]` need a reachable PostgreSQL instance.

use db_pool::{create_pool, DbConfig};

#[test]
fn test_pool_config_min_less_than_max() {
    let config = DbConfig::for_service("engagement-service");

    assert!(
        config.min_connections < config.max_connections,
        "min_connections ({}) must be < max_connections ({})",
        config.min_connections,
        config.max_connections
    );
}

#[test]
fn test_unknown_service_gets_conservative_limits() {
    let config = DbConfig::for_service("unknown-service-xyz");

    // Unknown services should get minimal connections (fail-safe)
    assert!(
        config.max_connections <= 2,
        "Unknown service should get conservative connection limit"
    );
}

#[test]
fn test_pool_has_acquire_timeout() {
    let config = DbConfig::for_service("engagement-service");

    assert!(
        config.acquire_timeout_secs > 0,
        "Acquire timeout must be configured to prevent indefinite hangs"
    );
    assert!(
        config.acquire_timeout_secs <= 30,
        "Acquire timeout too long ({}s), should be <=30s",
        config.acquire_timeout_secs
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_pool_creation_fails_with_invalid_url() {
    let mut config = DbConfig::for_service("test-service");
    config.database_url = "invalid://not-a-database".to_string();

    let result = create_pool(config).await;

    assert!(
        result.is_err(),
        "Pool creation should fail with invalid DATABASE_URL"
    );
}

#[tokio::test]
#[ignore = "Requires PostgreSQL database"]
async fn test_pool_creation_timeout_enforced() {
    let mut config = DbConfig::for_service("test-service");
    config.database_url = "postgres://127.0.0.1:9999/nonexistent".to_string();
    config.connect_timeout_secs = 1;
    config.acquire_timeout_secs = 1;

    let start = std::time::Instant::now();
    let result = create_pool(config).await;
    let elapsed = start.elapsed();

    assert!(
        result.is_err(),
        "Pool creation should fail for unreachable DB"
    );
    assert!(
        elapsed.as_secs() < 5,
        "Pool creation timeout not enforced (took {}s)",
        elapsed.as_secs()
    );
}
