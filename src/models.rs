use std::fmt;

use serde::Serialize;

/// A single bug report, built per request and dropped after the send attempt
#[derive(Debug, Clone, Default, Serialize)]
pub struct BugReport {
    pub product: String,
    pub category: String,
    pub email: String,
    pub action: String,
    pub context: String,
    pub description: String,
    pub screenshot: Option<Screenshot>,
}

impl BugReport {
    /// Attach the uploaded screenshot. Nothing else is mutated after decoding.
    pub fn attach(&mut self, screenshot: Screenshot) {
        self.screenshot = Some(screenshot);
    }
}

/// An uploaded file held in memory until the email is composed
#[derive(Clone, Serialize)]
pub struct Screenshot {
    pub filename: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Screenshot {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }
}

// Keeps the raw bytes out of the success log line
impl fmt::Debug for Screenshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screenshot")
            .field("filename", &self.filename)
            .field("size", &self.data.len())
            .finish()
    }
}
