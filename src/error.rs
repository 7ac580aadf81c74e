/// Main error type for the library.
#[derive(Debug)]
pub enum CloudError {
    /// Used when the user pass a logical invalid parameter to a function.
    InvalidParameter(String),
    Io(std::io::Error),
    Parser(String),
    /// Failures from the graphics stack: device creation, swapchain, drawing.
    Render(String),
}

impl std::fmt::Display for CloudError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CloudError::Io(err) => write!(f, "IO error: {}", err),
            CloudError::Parser(err) => write!(f, "Parser error: {}", err),
            CloudError::InvalidParameter(err) => write!(f, "Parameter error: {}", err),
            CloudError::Render(err) => write!(f, "Render error: {}", err),
        }
    }
}

impl CloudError {
    /// Create a error with the kind `InvalidParameter`.
    /// # Arguments
    /// * `msg` - The error message.
    pub fn invalid_parameter<T: ToString>(msg: T) -> Self {
        CloudError::InvalidParameter(msg.to_string())
    }

    /// Create a error with the kind `Render`.
    pub fn render<T: ToString>(msg: T) -> Self {
        CloudError::Render(msg.to_string())
    }
}

impl std::error::Error for CloudError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CloudError::Io(err) => Some(err),
            CloudError::Parser(_) => None,
            CloudError::InvalidParameter(_) => None,
            CloudError::Render(_) => None,
        }
    }
}

impl From<std::io::Error> for CloudError {
    fn from(err: std::io::Error) -> Self {
        CloudError::Io(err)
    }
}

impl From<serde_json::Error> for CloudError {
    fn from(err: serde_json::Error) -> Self {
        CloudError::Parser(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::CloudError;
    use std::error::Error;

    #[test]
    fn test_display_has_kind_prefix() {
        let err = CloudError::invalid_parameter("points must have 3 columns");
        assert_eq!(
            err.to_string(),
            "Parameter error: points must have 3 columns"
        );
        assert_eq!(
            CloudError::render("no device").to_string(),
            "Render error: no device"
        );
    }

    #[test]
    fn test_io_error_is_source() {
        let err: CloudError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.source().is_some());
        assert!(CloudError::Parser("bad".into()).source().is_none());
    }
}
