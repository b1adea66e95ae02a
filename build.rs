//! Embeds the build stamp printed by `asset-schema-cli version`.
//!
//! `SOURCE_DATE_EPOCH` pins the stamp for reproducible builds;
//! `ASSET_SCHEMA_BUILD_DATE` / `ASSET_SCHEMA_BUILD_TIME` override either half.

use time::format_description;
use time::OffsetDateTime;

const DATE_VAR: &str = "ASSET_SCHEMA_BUILD_DATE";
const TIME_VAR: &str = "ASSET_SCHEMA_BUILD_TIME";

fn stamp_time() -> OffsetDateTime {
    std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .unwrap_or_else(OffsetDateTime::now_utc)
}

fn render(at: OffsetDateTime, pattern: &str) -> String {
    let items = match format_description::parse(pattern) {
        Ok(items) => items,
        Err(_) => return "unknown".to_string(),
    };
    at.format(&items).unwrap_or_else(|_| "unknown".to_string())
}

fn main() {
    let at = stamp_time();
    let stamps = [
        (DATE_VAR, "[year]-[month]-[day]"),
        (TIME_VAR, "[hour]:[minute]:[second] UTC"),
    ];
    for (var, pattern) in stamps {
        let value = std::env::var(var).unwrap_or_else(|_| render(at, pattern));
        println!("cargo:rerun-if-env-changed={}", var);
        println!("cargo:rustc-env={}={}", var, value);
    }
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
}
