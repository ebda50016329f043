const RATE_LIMIT_PREFIX: &str = "rate_limit:";

pub fn rate_limit_key(client: &str) -> String {
    format!("{}{}", RATE_LIMIT_PREFIX, client)
}
