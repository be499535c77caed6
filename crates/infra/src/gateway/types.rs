use serde::Deserialize;

/// Any gateway object; only the identifier is consumed.
#[derive(Debug, Deserialize)]
pub(crate) struct ObjectRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl ErrorBody {
    pub fn describe(&self) -> String {
        let message = self.message.as_deref().unwrap_or("unknown gateway error");
        match (&self.kind, &self.code) {
            (_, Some(code)) => format!("{message} ({code})"),
            (Some(kind), None) => format!("{message} ({kind})"),
            (None, None) => message.to_string(),
        }
    }
}
