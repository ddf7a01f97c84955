use std::process::Command;
use tracing::info;

/// Environment variables that toolkits consult for scaling
const SCALING_ENV_VARS: &[&str] = &["GDK_SCALE", "GDK_DPI_SCALE", "QT_SCALE_FACTOR"];

/// Session details relevant to display scaling
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemInfo {
    pub kernel: Option<String>,
    pub session_type: Option<String>,
    pub desktop: Option<String>,
    pub display: Option<String>,
    /// Toolkit scaling overrides that are set, as (name, value)
    pub scaling_overrides: Vec<(String, String)>,
}

impl SystemInfo {
    /// Gather information from the running system
    pub fn collect() -> Self {
        let mut info = Self::from_env(|name| std::env::var(name).ok());
        info.kernel = get_command_output("uname", &["-sr"])
            .ok()
            .filter(|k| !k.is_empty());
        info
    }

    /// Gather the environment-derived fields through `lookup`
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());
        Self {
            kernel: None,
            session_type: non_empty("XDG_SESSION_TYPE"),
            desktop: non_empty("XDG_CURRENT_DESKTOP"),
            display: non_empty("DISPLAY"),
            scaling_overrides: SCALING_ENV_VARS
                .iter()
                .filter_map(|name| non_empty(name).map(|v| (name.to_string(), v)))
                .collect(),
        }
    }

    /// Human readable report lines
    pub fn report_lines(&self) -> Vec<String> {
        let unknown = || "unknown".to_string();
        let mut lines = vec![
            format!("Kernel: {}", self.kernel.clone().unwrap_or_else(unknown)),
            format!(
                "Session Type: {}",
                self.session_type.clone().unwrap_or_else(unknown)
            ),
            format!(
                "Desktop Environment: {}",
                self.desktop.clone().unwrap_or_else(unknown)
            ),
            format!("Display: {}", self.display.clone().unwrap_or_else(unknown)),
        ];
        for (name, value) in &self.scaling_overrides {
            lines.push(format!("Scaling Override: {}={}", name, value));
        }
        lines
    }
}

/// Log system information for debugging purposes
pub fn log_system_info(info: &SystemInfo) {
    info!("=== System Information ===");
    for line in info.report_lines() {
        info!("{}", line);
    }
    info!("==========================");
}

fn get_command_output(cmd: &str, args: &[&str]) -> anyhow::Result<String> {
    let output = Command::new(cmd).args(args).output()?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_env_skips_empty_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("XDG_SESSION_TYPE", "x11"),
            ("XDG_CURRENT_DESKTOP", ""),
            ("DISPLAY", ":0"),
            ("GDK_SCALE", "2"),
        ]);
        let info = SystemInfo::from_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(info.session_type.as_deref(), Some("x11"));
        assert_eq!(info.desktop, None);
        assert_eq!(info.display.as_deref(), Some(":0"));
        assert_eq!(
            info.scaling_overrides,
            vec![("GDK_SCALE".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_report_lines() {
        let info = SystemInfo {
            kernel: Some("Linux 6.8.0".into()),
            session_type: Some("x11".into()),
            scaling_overrides: vec![("QT_SCALE_FACTOR".into(), "1.5".into())],
            ..Default::default()
        };
        let lines = info.report_lines();
        assert_eq!(lines[0], "Kernel: Linux 6.8.0");
        assert_eq!(lines[2], "Desktop Environment: unknown");
        assert_eq!(lines.last().unwrap(), "Scaling Override: QT_SCALE_FACTOR=1.5");
    }
}
