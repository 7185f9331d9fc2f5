//! Privileged cache-clear command.
//!
//! A single operator, identified by display name, can reset another user's
//! quota and session context by sending `清除用户缓存:<display name>`.

/// Phrase that marks a cache-clear request.
pub const CLEAR_CACHE_TRIGGER: &str = "清除用户缓存";

/// Display name allowed to issue admin commands when none is configured.
pub const DEFAULT_ADMIN_NAME: &str = "锐";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// Clear cached state for the users whose display name equals `target`.
    /// `None` when the command carried no name.
    ClearCache { target: Option<String> },
}

impl AdminCommand {
    /// Recognize an admin command in `request_text` sent by `sender_name`.
    ///
    /// Returns `None` unless the text contains the trigger phrase and the
    /// sender is exactly `admin_name`.
    pub fn parse(request_text: &str, sender_name: &str, admin_name: &str) -> Option<Self> {
        if sender_name != admin_name {
            return None;
        }
        let (_, after_trigger) = request_text.split_once(CLEAR_CACHE_TRIGGER)?;
        // The name runs up to the next colon.
        let target = after_trigger
            .split([':', '：'])
            .nth(1)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Some(AdminCommand::ClearCache { target })
    }
}

pub fn cleared_notice(target: &str) -> String {
    format!("清除用户{target}缓存成功")
}

pub fn target_not_found_notice(target: &str) -> String {
    format!("未找到用户{target}，没有清除任何缓存")
}

pub fn usage_notice() -> String {
    format!("用法：{CLEAR_CACHE_TRIGGER}:<用户昵称>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_target_after_colon() {
        let cmd = AdminCommand::parse("清除用户缓存:Alice", "锐", DEFAULT_ADMIN_NAME);
        assert_eq!(
            cmd,
            Some(AdminCommand::ClearCache {
                target: Some("Alice".to_string())
            })
        );
    }

    #[test]
    fn test_target_stops_at_next_colon() {
        let cmd = AdminCommand::parse("清除用户缓存:Alice:x", "锐", "锐");
        assert_eq!(
            cmd,
            Some(AdminCommand::ClearCache {
                target: Some("Alice".to_string())
            })
        );

        let cmd = AdminCommand::parse("清除用户缓存：Bob:extra：more", "锐", "锐");
        assert_eq!(
            cmd,
            Some(AdminCommand::ClearCache {
                target: Some("Bob".to_string())
            })
        );
    }

    #[test]
    fn test_accepts_full_width_colon_and_whitespace() {
        let cmd = AdminCommand::parse("清除用户缓存： Bob ", "锐", "锐");
        assert_eq!(
            cmd,
            Some(AdminCommand::ClearCache {
                target: Some("Bob".to_string())
            })
        );
    }

    #[test]
    fn test_matches_as_substring_of_composed_text() {
        let composed = "earlier question:earlier answer清除用户缓存:Carol";
        let cmd = AdminCommand::parse(composed, "锐", "锐");
        assert_eq!(
            cmd,
            Some(AdminCommand::ClearCache {
                target: Some("Carol".to_string())
            })
        );
    }

    #[test]
    fn test_missing_target_is_none() {
        assert_eq!(
            AdminCommand::parse("清除用户缓存", "锐", "锐"),
            Some(AdminCommand::ClearCache { target: None })
        );
        assert_eq!(
            AdminCommand::parse("清除用户缓存:  ", "锐", "锐"),
            Some(AdminCommand::ClearCache { target: None })
        );
    }

    #[test]
    fn test_non_admin_sender_is_ignored() {
        assert_eq!(AdminCommand::parse("清除用户缓存:Alice", "Mallory", "锐"), None);
    }

    #[test]
    fn test_text_without_trigger_is_ignored() {
        assert_eq!(AdminCommand::parse("hello:Alice", "锐", "锐"), None);
    }

    #[test]
    fn test_notices_name_the_target() {
        assert_eq!(cleared_notice("Alice"), "清除用户Alice缓存成功");
        assert!(target_not_found_notice("Zed").contains("Zed"));
        assert!(usage_notice().contains(CLEAR_CACHE_TRIGGER));
    }
}
