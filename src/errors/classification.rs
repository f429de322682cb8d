use super::types::PocForgeError;

/// How an error surfaces to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Shown as a warning notification.
    Warning,
    /// Shown as an error notification.
    Error,
    /// Diagnostics only.
    Silent,
}

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub surface: Surface,
}

impl PocForgeError {
    /// Classify this error to determine how it is surfaced. Nothing is retried
    /// automatically, so there is no retryable flag here.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            PocForgeError::Validation(_) => ErrorClassification {
                error_type: "ValidationError",
                surface: Surface::Warning,
            },
            PocForgeError::SessionBusy => ErrorClassification {
                error_type: "ValidationError",
                surface: Surface::Warning,
            },
            PocForgeError::Transport { .. } => ErrorClassification {
                error_type: "TransportError",
                surface: Surface::Error,
            },
            PocForgeError::Protocol(_) => ErrorClassification {
                error_type: "ProtocolError",
                surface: Surface::Silent,
            },
            PocForgeError::Application(_) => ErrorClassification {
                error_type: "ApplicationError",
                surface: Surface::Error,
            },
            PocForgeError::NotFound(_) => ErrorClassification {
                error_type: "NotFoundError",
                surface: Surface::Error,
            },
            PocForgeError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                surface: Surface::Error,
            },
            PocForgeError::Io(_) => ErrorClassification {
                error_type: "IoError",
                surface: Surface::Error,
            },
            PocForgeError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                surface: Surface::Error,
            },
            PocForgeError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                surface: Surface::Error,
            },
        }
    }

    /// The user-facing text for a notification. Application messages pass
    /// through untouched; transport failures get a generic prefix.
    pub fn user_message(&self) -> String {
        match self {
            PocForgeError::Validation(msg) => msg.clone(),
            PocForgeError::Application(msg) => msg.clone(),
            PocForgeError::Transport { message, .. } => format!("Network error: {}", message),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_warning() {
        let err = PocForgeError::Validation("vulnerability info is required".into());
        let class = err.classify();
        assert_eq!(class.surface, Surface::Warning);
        assert_eq!(class.error_type, "ValidationError");
    }

    #[test]
    fn test_session_busy_classified_as_validation() {
        assert_eq!(PocForgeError::SessionBusy.classify().error_type, "ValidationError");
    }

    #[test]
    fn test_protocol_is_silent() {
        let err = PocForgeError::Protocol("bad frame".into());
        assert_eq!(err.classify().surface, Surface::Silent);
    }

    #[test]
    fn test_application_message_verbatim() {
        let err = PocForgeError::Application("LLM quota exhausted".into());
        assert_eq!(err.classify().surface, Surface::Error);
        assert_eq!(err.user_message(), "LLM quota exhausted");
        assert_eq!(err.to_string(), "LLM quota exhausted");
    }

    #[test]
    fn test_transport_message_prefixed() {
        let err = PocForgeError::transport(Some(502), "HTTP 502 Bad Gateway");
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.user_message(), "Network error: HTTP 502 Bad Gateway");
    }

    #[test]
    fn test_config_error_surfaces() {
        let err = PocForgeError::Config("invalid config".into());
        assert_eq!(err.classify().surface, Surface::Error);
        assert_eq!(err.status(), None);
    }
}
