//! Launch arguments passed by the Stream Deck host
//!
//! The host starts the plugin as
//! `kasa-deck -port 28196 -pluginUUID <uuid> -registerEvent registerPlugin -info <json>`.
//! Those single-dash long flags are rewritten to `--flag` before clap sees them.

use clap::Parser;

const HOST_FLAGS: [&str; 4] = ["-port", "-pluginUUID", "-registerEvent", "-info"];

#[derive(Debug, Clone, Parser)]
#[command(name = "kasa-deck", about = "Stream Deck plugin for Kasa smart plugs")]
pub struct LaunchArgs {
    /// Local port of the host WebSocket server
    #[arg(long)]
    pub port: u16,

    /// Identifier used to register with the host
    #[arg(long = "pluginUUID")]
    pub plugin_uuid: String,

    /// Event name the registration message must carry
    #[arg(long = "registerEvent")]
    pub register_event: String,

    /// JSON blob describing the host application and devices
    #[arg(long)]
    pub info: Option<String>,
}

impl LaunchArgs {
    /// Plugin version reported by the host in `-info`, if any
    pub fn plugin_version(&self) -> Option<String> {
        let info: serde_json::Value = serde_json::from_str(self.info.as_deref()?).ok()?;
        info.get("plugin")?
            .get("version")?
            .as_str()
            .map(|s| s.to_string())
    }

    pub fn websocket_url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.port)
    }
}

/// Parse launch arguments (first item is the binary name)
pub fn parse_from<I, T>(args: I) -> Result<LaunchArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let normalized = args.into_iter().map(Into::into).map(|arg| {
        if HOST_FLAGS.contains(&arg.as_str()) {
            format!("-{}", arg)
        } else {
            arg
        }
    });

    LaunchArgs::try_parse_from(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_style_arguments() {
        let args = parse_from([
            "kasa-deck",
            "-port",
            "28196",
            "-pluginUUID",
            "6A2F0C9E",
            "-registerEvent",
            "registerPlugin",
            "-info",
            r#"{"plugin":{"uuid":"com.kasadeck","version":"1.2.0"}}"#,
        ])
        .unwrap();

        assert_eq!(args.port, 28196);
        assert_eq!(args.plugin_uuid, "6A2F0C9E");
        assert_eq!(args.register_event, "registerPlugin");
        assert_eq!(args.plugin_version(), Some("1.2.0".to_string()));
        assert_eq!(args.websocket_url(), "ws://127.0.0.1:28196");
    }

    #[test]
    fn test_double_dash_still_accepted() {
        let args = parse_from([
            "kasa-deck",
            "--port",
            "1234",
            "--pluginUUID",
            "abc",
            "--registerEvent",
            "registerPlugin",
        ])
        .unwrap();

        assert_eq!(args.port, 1234);
        assert!(args.info.is_none());
        assert_eq!(args.plugin_version(), None);
    }

    #[test]
    fn test_missing_port_is_rejected() {
        let result = parse_from([
            "kasa-deck",
            "-pluginUUID",
            "abc",
            "-registerEvent",
            "registerPlugin",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_info_has_no_version() {
        let args = parse_from([
            "kasa-deck",
            "-port",
            "1",
            "-pluginUUID",
            "abc",
            "-registerEvent",
            "registerPlugin",
            "-info",
            "not json",
        ])
        .unwrap();
        assert_eq!(args.plugin_version(), None);
    }
}
