use std::process::{Command, Stdio};

/// Which network-denial wrapper (if any) prefixes the Codex command line.
/// The sandbox contract is best-effort: when neither launcher is usable,
/// the dispatcher proceeds without a wrapper and relies on the caller
/// having been told so via the startup log entry (spec.md §4.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkSandbox {
    Firejail,
    Unshare,
    None,
}

impl NetworkSandbox {
    /// Probes the host for a namespace-capable launcher, preferring
    /// `firejail --net=none` (no probe needed, it always exists as an
    /// invariant flag set) and falling back to `unshare -n` only after a
    /// one-shot probe confirms the kernel actually grants the capability.
    pub fn probe() -> Self {
        if which("firejail") {
            return NetworkSandbox::Firejail;
        }
        if which("unshare") && unshare_probe_succeeds() {
            return NetworkSandbox::Unshare;
        }
        NetworkSandbox::None
    }

    /// Prefixes `argv` with the wrapper's invariant flags, if active.
    /// `argv[0]` remains the Codex binary; the wrapper and its flags are
    /// prepended ahead of it.
    pub fn wrap(self, mut argv: Vec<std::ffi::OsString>) -> Vec<std::ffi::OsString> {
        match self {
            NetworkSandbox::Firejail => {
                let mut wrapped = vec!["firejail".into(), "--net=none".into()];
                wrapped.append(&mut argv);
                wrapped
            }
            NetworkSandbox::Unshare => {
                let mut wrapped = vec!["unshare".into(), "-n".into()];
                wrapped.append(&mut argv);
                wrapped
            }
            NetworkSandbox::None => argv,
        }
    }

    pub fn is_active(self) -> bool {
        self != NetworkSandbox::None
    }

    pub fn describe(self) -> &'static str {
        match self {
            NetworkSandbox::Firejail => "firejail --net=none",
            NetworkSandbox::Unshare => "unshare -n",
            NetworkSandbox::None => "none (best-effort sandbox unavailable)",
        }
    }
}

fn which(binary: &str) -> bool {
    let Some(path_var) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path_var).any(|dir| dir.join(binary).is_file())
}

fn unshare_probe_succeeds() -> bool {
    Command::new("unshare")
        .args(["-n", "true"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_is_identity_when_inactive() {
        let argv: Vec<std::ffi::OsString> = vec!["codex".into(), "exec".into()];
        let wrapped = NetworkSandbox::None.wrap(argv.clone());
        assert_eq!(wrapped, argv);
    }

    #[test]
    fn wrap_prefixes_firejail_flags() {
        let argv: Vec<std::ffi::OsString> = vec!["codex".into()];
        let wrapped = NetworkSandbox::Firejail.wrap(argv);
        assert_eq!(
            wrapped,
            vec![
                std::ffi::OsString::from("firejail"),
                std::ffi::OsString::from("--net=none"),
                std::ffi::OsString::from("codex"),
            ]
        );
    }

    #[test]
    fn describe_is_non_empty_for_every_variant() {
        assert!(!NetworkSandbox::Firejail.describe().is_empty());
        assert!(!NetworkSandbox::Unshare.describe().is_empty());
        assert!(!NetworkSandbox::None.describe().is_empty());
    }
}
