use crate::error::WidgetError;
use std::fmt;
use url::Url;

/// Repeated field carrying the ids of the selected bundles.
pub const SELECTION_FIELD: &str = "tar_files";
/// Field carrying the requested name in a rename submission.
pub const RENAME_FIELD: &str = "new_name";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
        })
    }
}

/// An HTML-style form submission headed back to the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub method: Method,
    pub action: String,
    pub fields: Vec<(String, String)>,
}

impl FormSubmission {
    /// Following a plain link: `GET` with no body.
    pub fn link(href: &str) -> Self {
        FormSubmission {
            method: Method::Get,
            action: href.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn post(action: &str) -> Self {
        FormSubmission {
            method: Method::Post,
            action: action.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    /// Values submitted under `name`, in field order.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn encoded_body(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields.iter())
            .finish()
    }

    /// Absolute target of this submission. Relative actions need `base`.
    pub fn resolve(&self, base: Option<&Url>) -> Result<Url, WidgetError> {
        match Url::parse(&self.action) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = base.ok_or_else(|| WidgetError::InvalidUrl {
                    url: self.action.clone(),
                    reason: "relative URL and no portal base URL configured".to_string(),
                })?;
                base.join(&self.action).map_err(|e| WidgetError::InvalidUrl {
                    url: self.action.clone(),
                    reason: e.to_string(),
                })
            }
            Err(e) => Err(WidgetError::InvalidUrl {
                url: self.action.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

impl fmt::Display for FormSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.action)?;
        if !self.fields.is_empty() {
            write!(f, " [{}]", self.encoded_body())?;
        }
        Ok(())
    }
}
