use crate::form::{FormSubmission, Method};
use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Delivers form submissions to the portal.
pub trait Submitter {
    /// Send `form`, returning a one-line outcome for the status bar.
    fn submit(&mut self, form: &FormSubmission) -> Result<String>;
}

pub struct HttpSubmitter {
    client: Client,
    base: Option<Url>,
}

impl HttpSubmitter {
    pub fn new(base: Option<Url>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .context("Could not initialize HTTP client for the portal")?;
        Ok(HttpSubmitter { client, base })
    }
}

impl Submitter for HttpSubmitter {
    fn submit(&mut self, form: &FormSubmission) -> Result<String> {
        let url = form.resolve(self.base.as_ref())?;
        let request = match form.method {
            Method::Get => self.client.get(url.clone()),
            Method::Post => self.client.post(url.clone()).form(&form.fields),
        };
        let response = request
            .send()
            .with_context(|| format!("{} {url} failed", form.method))?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "portal rejected submission");
            bail!("{} {url} returned {status}", form.method);
        }
        info!(%url, %status, "submission accepted");
        Ok(format!("{} {url}: {status}", form.method))
    }
}

/// Records submissions instead of sending them.
#[derive(Debug, Default)]
pub struct DryRunSubmitter {
    pub sent: Vec<FormSubmission>,
}

impl Submitter for DryRunSubmitter {
    fn submit(&mut self, form: &FormSubmission) -> Result<String> {
        info!(%form, "dry run: submission not sent");
        self.sent.push(form.clone());
        Ok(format!("dry run: {form}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::SELECTION_FIELD;

    #[test]
    fn dry_run_keeps_every_form() {
        let mut submitter = DryRunSubmitter::default();
        let form = FormSubmission::post("/s").field(SELECTION_FIELD, "1");
        let outcome = submitter.submit(&form).unwrap();
        assert_eq!(outcome, "dry run: POST /s [tar_files=1]");
        assert_eq!(submitter.sent, [form]);
    }

    #[test]
    fn http_submitter_rejects_relative_url_without_base() {
        let mut submitter = HttpSubmitter::new(None).unwrap();
        let err = submitter.submit(&FormSubmission::link("/d")).unwrap_err();
        assert!(err.to_string().contains("relative URL"));
    }
}
