//! Client version information.

/// Current client version.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the User-Agent string sent with every request.
pub fn build_user_agent(suffix: Option<&str>) -> String {
    let mut ua = format!(
        "Quandl-Rust/{} ({}; {})",
        SDK_VERSION,
        std::env::consts::OS,
        std::env::consts::ARCH
    );

    if let Some(s) = suffix {
        ua.push(' ');
        ua.push_str(s);
    }

    ua
}
