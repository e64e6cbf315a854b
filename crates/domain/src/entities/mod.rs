//! Domain Entities

mod asset_server_settings;
mod command_spec;
mod engine_settings;
mod lifecycle_timings;
mod process_record;
mod service_settings;

pub use asset_server_settings::AssetServerSettings;
pub use command_spec::CommandSpec;
pub use engine_settings::EngineSettings;
pub use lifecycle_timings::LifecycleTimings;
pub use process_record::ProcessRecord;
pub use service_settings::ServiceSettings;

/// Map wildcard bind addresses to a loopback address that can be connected to
pub(crate) fn connect_host(host: &str) -> &str {
    match host {
        "" | "0.0.0.0" | "*" => "127.0.0.1",
        "::" | "[::]" => "::1",
        other => other,
    }
}

/// `http://host:port`, bracketing IPv6 literals
pub(crate) fn http_url(host: &str, port: u16) -> String {
    let host = connect_host(host);
    if host.contains(':') {
        format!("http://[{host}]:{port}")
    } else {
        format!("http://{host}:{port}")
    }
}
