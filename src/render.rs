//! Pages handed from the controllers to the browser.
//!
//! Controllers produce a [`Page`] value; [`render`] turns it into a small
//! HTML document. All dynamic text is escaped.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::consts::CSRF_FIELD;

/// A form input the example asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
}

/// Something the form needs from an earlier example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prerequisite {
    pub satisfied: bool,
    /// Shown instead of the form when not satisfied.
    pub hint: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPage {
    pub eg: String,
    pub csrf_token: String,
    pub title: String,
    /// Browser tab title.
    pub page_title: String,
    pub description: String,
    pub source_file: String,
    pub source_url: String,
    pub documentation: Option<String>,
    pub fields: Vec<FormField>,
    pub prerequisite: Option<Prerequisite>,
    pub flash: Option<String>,
}

impl FormPage {
    /// False when a prerequisite is missing and the form cannot be submitted.
    pub fn submittable(&self) -> bool {
        self.prerequisite.as_ref().is_none_or(|p| p.satisfied)
    }
}

/// One line of the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub eg: String,
    pub api: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Index {
        entries: Vec<IndexEntry>,
        user: Option<String>,
        flash: Option<String>,
    },
    Form(FormPage),
    /// Success page. `json` is the serialized worker result.
    ExampleDone {
        title: String,
        message: String,
        json: String,
    },
    Error {
        err: String,
        error_code: Option<String>,
        error_message: Option<String>,
    },
    MustAuthenticate {
        flash: Option<String>,
    },
}

pub fn render(page: &Page) -> String {
    match page {
        Page::Index {
            entries,
            user,
            flash,
        } => {
            let mut body = flash_html(flash.as_deref());
            match user {
                Some(user) => body.push_str(&format!(
                    "<p>Logged in as {} (<a href=\"/ds/logout\">log out</a>)</p>\n",
                    text(user)
                )),
                None => body.push_str("<p><a href=\"/ds/login\">Log in</a></p>\n"),
            }
            body.push_str("<ul>\n");
            for e in entries {
                body.push_str(&format!(
                    "<li><a href=\"/{}\">{}</a> <small>{}</small></li>\n",
                    attr(&e.eg),
                    text(&e.name),
                    text(&e.api)
                ));
            }
            body.push_str("</ul>\n");
            layout("Examples", &body)
        }
        Page::Form(form) => layout(&form.page_title, &form_html(form)),
        Page::ExampleDone {
            title,
            message,
            json,
        } => {
            let body = format!(
                "<h2>{}</h2>\n<p>{}</p>\n<pre id=\"json\">{}</pre>\n<p><a href=\"/\">Continue</a></p>\n",
                text(title),
                text(message),
                text(json)
            );
            layout(title, &body)
        }
        Page::Error {
            err,
            error_code,
            error_message,
        } => {
            let mut body = String::from("<h2>Problem: an error occurred</h2>\n");
            if let Some(code) = error_code {
                body.push_str(&format!(
                    "<p>Error code: <code id=\"errorCode\">{}</code></p>\n",
                    text(code)
                ));
            }
            if let Some(message) = error_message {
                body.push_str(&format!(
                    "<p>Error message: <span id=\"errorMessage\">{}</span></p>\n",
                    text(message)
                ));
            }
            body.push_str(&format!("<pre id=\"err\">{}</pre>\n", text(err)));
            body.push_str("<p><a href=\"/\">Continue</a></p>\n");
            layout("Error", &body)
        }
        Page::MustAuthenticate { flash } => {
            let mut body = flash_html(flash.as_deref());
            body.push_str(
                "<h2>Please authenticate</h2>\n<p><a href=\"/ds/login\">Log in</a> to continue.</p>\n",
            );
            layout("Authentication required", &body)
        }
    }
}

fn form_html(form: &FormPage) -> String {
    let mut body = flash_html(form.flash.as_deref());
    body.push_str(&format!(
        "<h2>{}</h2>\n<p>{}</p>\n",
        text(&form.title),
        text(&form.description)
    ));
    if let Some(doc) = &form.documentation {
        body.push_str(&format!(
            "<p><a target=\"_blank\" href=\"{}\">Documentation</a></p>\n",
            attr(doc)
        ));
    }
    body.push_str(&format!(
        "<p>View source file <a target=\"_blank\" href=\"{}\">{}</a> on GitHub.</p>\n",
        attr(&form.source_url),
        text(&form.source_file)
    ));

    if let Some(pre) = &form.prerequisite
        && !pre.satisfied
    {
        body.push_str(&format!("<p class=\"notice\">{}</p>\n", text(pre.hint)));
        body.push_str("<p><a href=\"/\">Continue</a></p>\n");
        return body;
    }

    body.push_str(&format!(
        "<form method=\"post\" action=\"/{}\">\n<input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
        attr(&form.eg),
        CSRF_FIELD,
        attr(&form.csrf_token)
    ));
    for field in &form.fields {
        body.push_str(&format!(
            "<label for=\"{name}\">{label}</label>\n<input type=\"text\" id=\"{name}\" name=\"{name}\"{required}>\n",
            name = attr(field.name),
            label = text(field.label),
            required = if field.required { " required" } else { "" },
        ));
    }
    body.push_str("<button type=\"submit\">Submit</button>\n</form>\n");
    body
}

fn flash_html(flash: Option<&str>) -> String {
    flash
        .map(|f| format!("<div class=\"flash\">{}</div>\n", text(f)))
        .unwrap_or_default()
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}</body>\n</html>\n",
        text(title),
        body
    )
}
