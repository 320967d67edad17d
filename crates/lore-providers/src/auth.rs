//! API key resolution and request authentication.

/// Read an API key from `env_key`. Empty values count as missing.
pub fn resolve_api_key(env_key: &str) -> Option<String> {
    std::env::var(env_key).ok().filter(|k| !k.trim().is_empty())
}

/// Local endpoints (ollama, llama.cpp, test servers) run without auth.
pub fn is_local_endpoint(base_url: &str) -> bool {
    base_url.contains("localhost") || base_url.contains("127.0.0.1")
}

pub fn apply_bearer(
    req: reqwest::RequestBuilder,
    api_key: Option<&str>,
) -> reqwest::RequestBuilder {
    match api_key {
        Some(key) => req.header("Authorization", format!("Bearer {key}")),
        None => req,
    }
}
