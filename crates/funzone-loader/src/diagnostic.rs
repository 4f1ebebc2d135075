//! The document shown in place of a bundle that failed to load.

use funzone_core::BundleDescriptor;

use crate::probe::ResourceStatus;

/// Escape text for safe inclusion in HTML text and attribute values.
#[must_use]
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Inputs for a diagnostic document.
#[derive(Debug, Clone)]
pub struct DiagnosticDocument<'a> {
    /// The bundle that failed.
    pub descriptor: &'a BundleDescriptor,
    /// Human-readable failure message.
    pub message: &'a str,
    /// Probe result, if the probe finished.
    pub status: Option<ResourceStatus>,
    /// Where the entry can be opened directly.
    pub entry_location: &'a str,
}

impl DiagnosticDocument<'_> {
    /// Render the document.
    ///
    /// The retry control carries `data-funzone-action="retry"` and the
    /// bundle id so the host can route it back to the loader.
    #[must_use]
    pub fn render(&self) -> String {
        let title = html_escape(self.descriptor.title());
        let id = html_escape(self.descriptor.id().as_str());
        let message = html_escape(self.message);
        let location = html_escape(self.entry_location);
        let entry_path = html_escape(self.descriptor.entry_path());

        let status = self.status.map_or_else(String::new, |s| {
            format!(
                "\n      <p class=\"funzone-error-status\"><strong>Resources:</strong><br>\n        \
                 Markup: {}<br>\n        Stylesheet: {}<br>\n        Script: {}\n      </p>",
                mark(s.entry_ok),
                mark(s.style_ok),
                mark(s.script_ok)
            )
        });

        format!(
            "<div class=\"funzone-error\" data-bundle-id=\"{id}\">
  <div style=\"text-align: center; padding: 40px; max-width: 500px; margin: 0 auto;\">
    <h3 style=\"color: #e74c3c;\">\u{26a0}\u{fe0f} Failed to load application</h3>
    <p><strong>{title}</strong> could not be loaded.</p>
    <div style=\"background: #f8f9fa; padding: 15px; border-radius: 8px; margin: 20px 0; text-align: left;\">
      <p style=\"margin: 5px 0;\"><strong>Details:</strong></p>
      <p class=\"funzone-error-message\" style=\"margin: 5px 0; font-size: 14px; color: #666;\">{message}</p>{status}
    </div>
    <div style=\"display: flex; gap: 10px; justify-content: center; margin-top: 20px;\">
      <button type=\"button\" data-funzone-action=\"retry\" data-bundle-id=\"{id}\">\u{1f504} Try again</button>
      <a href=\"{location}\" target=\"_blank\" rel=\"noopener\" data-funzone-action=\"open\">\u{1f517} Open in new tab</a>
    </div>
    <p style=\"margin-top: 20px; font-size: 12px; color: #999;\">
      If the problem persists, check that the files exist at:<br>
      <code>{entry_path}</code>
    </p>
  </div>
</div>"
        )
    }
}

fn mark(ok: bool) -> &'static str {
    if ok { "\u{2705}" } else { "\u{274c}" }
}
