use std::fs;
use std::path::Path;

use minijinja::{context, Environment};

use crate::error::AppError;
use crate::models::BugReport;

/// The pages the server knows how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Report,
    Success,
    Error,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Report, Page::Success, Page::Error];

    /// Map a request path (without the leading slash) to a page.
    /// The empty path is the report form.
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "" | "report" => Some(Page::Report),
            "success" => Some(Page::Success),
            "error" => Some(Page::Error),
            _ => None,
        }
    }

    pub fn template_name(self) -> &'static str {
        match self {
            Page::Report => "report.html",
            Page::Success => "success.html",
            Page::Error => "error.html",
        }
    }
}

/// Page templates, parsed once at startup and read-only afterwards
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn load(views_dir: &Path) -> Result<Self, AppError> {
        let mut env = Environment::new();

        for page in Page::ALL {
            let path = views_dir.join(page.template_name());
            let source = fs::read_to_string(&path).map_err(|e| {
                AppError::Config(format!("cannot read template '{}': {}", path.display(), e))
            })?;
            env.add_template_owned(page.template_name(), source)?;
        }

        Ok(Self { env })
    }

    pub fn render(&self, page: Page, report: Option<&BugReport>) -> Result<String, AppError> {
        let template = self.env.get_template(page.template_name())?;
        Ok(template.render(context! { report => report })?)
    }
}
