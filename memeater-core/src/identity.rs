use memeater_io::{Pid, ProcessLabel, LABEL_MAX};
use log::warn;

/// Used when the process table will not give us a name.
pub const DEFAULT_NAME: &str = "memeater";

/// The parent's identity: whatever the process table calls us.
pub fn base_identity(labels: &impl ProcessLabel) -> String {
    labels.get_label().unwrap_or_else(|| {
        warn!("Falling back to default program name \"{}\"", DEFAULT_NAME);
        DEFAULT_NAME.to_string()
    })
}

/// A forked child's identity: `{base}-{pid}`, cut at the tail to fit the
/// process table's label width.
pub fn child_identity(base: &str, pid: Pid) -> String {
    let mut identity = format!("{}-{}", base, pid);
    if identity.len() > LABEL_MAX {
        let mut end = LABEL_MAX;
        while !identity.is_char_boundary(end) {
            end -= 1;
        }
        identity.truncate(end);
    }
    identity
}

#[cfg(test)]
mod tests {
    use super::*;
    use memeater_io::PlatformError;

    struct FixedLabel(Option<&'static str>);

    impl ProcessLabel for FixedLabel {
        fn get_label(&self) -> Option<String> {
            self.0.map(str::to_string)
        }

        fn set_label(&self, _label: &str) -> Result<(), PlatformError> {
            Ok(())
        }
    }

    #[test]
    fn test_base_identity_prefers_process_table() {
        assert_eq!(base_identity(&FixedLabel(Some("eater"))), "eater");
        assert_eq!(base_identity(&FixedLabel(None)), DEFAULT_NAME);
    }

    #[test]
    fn test_child_identity_appends_pid() {
        assert_eq!(child_identity("memeater", Pid::from_raw(4242)), "memeater-4242");
    }

    #[test]
    fn test_child_identity_is_cut_to_label_width() {
        let identity = child_identity("memeater", Pid::from_raw(1234567));
        assert_eq!(identity, "memeater-123456");
        assert_eq!(identity.len(), LABEL_MAX);

        let long = child_identity("averyveryverylongname", Pid::from_raw(7));
        assert_eq!(long, "averyveryverylo");
    }

    #[test]
    fn test_child_identity_respects_char_boundaries() {
        // 14 ASCII bytes then a two-byte char straddling the limit.
        let identity = child_identity("abcdefghijklmné", Pid::from_raw(1));
        assert_eq!(identity, "abcdefghijklmn");
    }

    #[test]
    fn test_child_identity_is_deterministic() {
        let pid = Pid::from_raw(31337);
        assert_eq!(child_identity("eater", pid), child_identity("eater", pid));
        assert_ne!(child_identity("eater", pid), child_identity("eater", Pid::from_raw(31338)));
    }
}
