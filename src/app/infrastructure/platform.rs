use std::process::Command;

/// Resolve the desktop's preferred color scheme.
///
/// Used once at startup when the configured theme is `SystemDefault`.
/// Anything that cannot be probed reads as light.
pub fn detect_system_dark_mode() -> bool {
    #[cfg(target_os = "windows")]
    {
        use winreg::RegKey;
        use winreg::enums::HKEY_CURRENT_USER;

        let personalize = RegKey::predef(HKEY_CURRENT_USER)
            .open_subkey("Software\\Microsoft\\Windows\\CurrentVersion\\Themes\\Personalize");
        if let Ok(key) = personalize {
            // AppsUseLightTheme: 0 = dark
            if let Ok(light) = key.get_value::<u32, _>("AppsUseLightTheme") {
                return light == 0;
            }
        }
        false
    }

    #[cfg(target_os = "macos")]
    {
        probe("defaults", &["read", "-g", "AppleInterfaceStyle"])
            .is_some_and(|out| mentions_dark(&out))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let probes: [&[&str]; 2] = [
            &["get", "org.gnome.desktop.interface", "color-scheme"],
            &["get", "org.gnome.desktop.interface", "gtk-theme"],
        ];
        probes
            .iter()
            .filter_map(|args| probe("gsettings", args))
            .any(|out| mentions_dark(&out))
    }
}

#[allow(dead_code)]
fn probe(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// `'prefer-dark'`, `'Adwaita-dark'`, `Dark` all count.
fn mentions_dark(value: &str) -> bool {
    value.to_lowercase().contains("dark")
}
