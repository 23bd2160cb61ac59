use crate::{env_optional, ConfigError, FromEnv};

/// WeChat Official Account configuration.
///
/// All fields are optional at load time: credentials may instead be supplied
/// per publish call, and the image path mapping only matters when the server
/// runs in a container that mounts host images under a different prefix.
#[derive(Clone, Debug, Default)]
pub struct WeChatConfig {
    /// Default app id, overridable per call (`WECHAT_APP_ID`)
    pub app_id: Option<String>,
    /// Default app secret, overridable per call (`WECHAT_APP_SECRET`)
    pub app_secret: Option<String>,
    /// Override for the WeChat API base URL (`WECHAT_API_BASE`)
    pub api_base: Option<String>,
    /// Host-side prefix of local image references (`HOST_IMAGE_PATH`)
    pub host_image_path: Option<String>,
    /// Container-side prefix substituted for the host prefix (`CONTAINER_IMAGE_PATH`)
    pub container_image_path: Option<String>,
}

impl WeChatConfig {
    /// The host-to-container path substitution, when both sides are configured.
    pub fn path_mapping(&self) -> Option<(String, String)> {
        match (&self.host_image_path, &self.container_image_path) {
            (Some(host), Some(container)) => Some((host.clone(), container.clone())),
            _ => None,
        }
    }
}

impl FromEnv for WeChatConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            app_id: env_optional("WECHAT_APP_ID"),
            app_secret: env_optional("WECHAT_APP_SECRET"),
            api_base: env_optional("WECHAT_API_BASE"),
            host_image_path: env_optional("HOST_IMAGE_PATH"),
            container_image_path: env_optional("CONTAINER_IMAGE_PATH"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wechat_config_defaults_to_empty() {
        temp_env::with_vars(
            [
                ("WECHAT_APP_ID", None::<&str>),
                ("WECHAT_APP_SECRET", None),
                ("WECHAT_API_BASE", None),
                ("HOST_IMAGE_PATH", None),
                ("CONTAINER_IMAGE_PATH", None),
            ],
            || {
                let config = WeChatConfig::from_env().unwrap();
                assert_eq!(config.app_id, None);
                assert_eq!(config.app_secret, None);
                assert_eq!(config.path_mapping(), None);
            },
        );
    }

    #[test]
    fn test_wechat_config_reads_credentials() {
        temp_env::with_vars(
            [
                ("WECHAT_APP_ID", Some("wx1234567890123456")),
                ("WECHAT_APP_SECRET", Some("secret")),
            ],
            || {
                let config = WeChatConfig::from_env().unwrap();
                assert_eq!(config.app_id.as_deref(), Some("wx1234567890123456"));
                assert_eq!(config.app_secret.as_deref(), Some("secret"));
            },
        );
    }

    #[test]
    fn test_path_mapping_requires_both_sides() {
        temp_env::with_vars(
            [
                ("HOST_IMAGE_PATH", Some("/Users/me/images")),
                ("CONTAINER_IMAGE_PATH", None::<&str>),
            ],
            || {
                let config = WeChatConfig::from_env().unwrap();
                assert_eq!(config.path_mapping(), None);
            },
        );

        temp_env::with_vars(
            [
                ("HOST_IMAGE_PATH", Some("/Users/me/images")),
                ("CONTAINER_IMAGE_PATH", Some("/mnt/images")),
            ],
            || {
                let config = WeChatConfig::from_env().unwrap();
                assert_eq!(
                    config.path_mapping(),
                    Some(("/Users/me/images".to_string(), "/mnt/images".to_string()))
                );
            },
        );
    }
}
