//! LiveKit credential fixtures.

use std::collections::HashMap;

/// LiveKit URL used by test servers.
pub const TEST_LIVEKIT_URL: &str = "wss://shams-test.livekit.cloud";

/// LiveKit API key used by test servers (token issuer).
pub const TEST_API_KEY: &str = "APItestkey";

/// LiveKit API secret used by test servers (signing key).
pub const TEST_API_SECRET: &str = "test-secret-test-secret-test-secret";

/// Environment for a fully configured issuer bound to a random local port.
pub fn test_livekit_vars() -> HashMap<String, String> {
    HashMap::from([
        ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
        ("LIVEKIT_URL".to_string(), TEST_LIVEKIT_URL.to_string()),
        ("LIVEKIT_API_KEY".to_string(), TEST_API_KEY.to_string()),
        ("LIVEKIT_API_SECRET".to_string(), TEST_API_SECRET.to_string()),
    ])
}
