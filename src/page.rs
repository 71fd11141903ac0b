//! Render state for one page: the elements a template declares and the
//! charts bound to its canvases.

use crate::chart::{ChartBindings, ChartConfig};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub text: Option<String>,
    /// Trusted markup replacing the text content.
    pub html: Option<String>,
    pub value: Option<String>,
    pub src: Option<String>,
    pub classes: BTreeSet<String>,
    pub disabled: bool,
}

#[derive(Debug, Default)]
pub struct Page {
    elements: BTreeMap<String, Element>,
    charts: ChartBindings,
    alert: Option<String>,
}

impl Page {
    /// Declares one element per `{{id}}` / `{{id.attr}}` placeholder in the
    /// template. Upper-case placeholders are page-level slots, not elements.
    pub fn from_template(template: &str) -> Self {
        let mut page = Self::default();
        for name in placeholders(template) {
            let id = name.split('.').next().unwrap_or(name);
            if id.chars().any(|c| c.is_ascii_lowercase()) {
                page.elements.entry(id.to_string()).or_default();
            }
        }
        page
    }

    pub fn has(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn elements(&self) -> impl Iterator<Item = (&str, &Element)> {
        self.elements.iter().map(|(id, el)| (id.as_str(), el))
    }

    pub fn charts(&self) -> &ChartBindings {
        &self.charts
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn raise_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    /// Applies `f` to the element if the page has it; returns whether it did.
    pub fn update(&mut self, id: &str, f: impl FnOnce(&mut Element)) -> bool {
        match self.elements.get_mut(id) {
            Some(element) => {
                f(element);
                true
            }
            None => {
                debug!("page has no element '{id}', skipping");
                false
            }
        }
    }

    pub fn set_text(&mut self, id: &str, text: impl Into<String>) -> bool {
        let text = text.into();
        self.update(id, |el| {
            el.text = Some(text);
            el.html = None;
        })
    }

    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update(id, |el| el.value = Some(value))
    }

    pub fn set_src(&mut self, id: &str, src: impl Into<String>) -> bool {
        let src = src.into();
        self.update(id, |el| el.src = Some(src))
    }

    pub fn toggle_class(&mut self, id: &str, class: &str, on: bool) -> bool {
        self.update(id, |el| {
            if on {
                el.classes.insert(class.to_string());
            } else {
                el.classes.remove(class);
            }
        })
    }

    /// Replaces `container`'s content with a fresh canvas and declares it.
    pub fn insert_canvas(&mut self, container: &str, canvas_id: &str) -> bool {
        let markup = format!(r#"<canvas id="{canvas_id}"></canvas>"#);
        if !self.update(container, |el| {
            el.text = None;
            el.html = Some(markup);
        }) {
            return false;
        }
        self.elements.entry(canvas_id.to_string()).or_default();
        true
    }

    /// Mounts trusted markup into `container`, declaring the element ids it
    /// carries so later updates can address them.
    pub fn mount(&mut self, container: &str, markup: String, declares: &[&str]) -> bool {
        if !self.update(container, |el| {
            el.text = None;
            el.html = Some(markup);
        }) {
            return false;
        }
        for id in declares {
            self.elements.entry(id.to_string()).or_default();
        }
        true
    }

    /// Binds a chart to a canvas the page has. A chart already on that
    /// canvas is replaced.
    pub fn bind_chart(&mut self, canvas_id: &str, config: ChartConfig) -> bool {
        if !self.has(canvas_id) {
            debug!("page has no canvas '{canvas_id}', chart not bound");
            return false;
        }
        if let Some(previous) = self.charts.bind(canvas_id, config) {
            debug!("replaced {:?} chart on '{}'", previous.config.kind, previous.canvas_id);
        }
        true
    }
}

/// Holds a control in its busy state; the control's label and enabled state
/// come back when the guard is dropped, whichever way the work ended.
pub struct BusyControl<'a> {
    page: &'a mut Page,
    id: String,
    label: Option<String>,
    disabled: bool,
}

impl<'a> BusyControl<'a> {
    pub fn engage(page: &'a mut Page, id: &str, busy_label: &str) -> Self {
        let (label, disabled) = page
            .element(id)
            .map(|el| (el.text.clone(), el.disabled))
            .unwrap_or((None, false));
        page.update(id, |el| {
            el.text = Some(busy_label.to_string());
            el.disabled = true;
        });
        Self {
            page,
            id: id.to_string(),
            label,
            disabled,
        }
    }

    pub fn page(&mut self) -> &mut Page {
        &mut *self.page
    }
}

impl Drop for BusyControl<'_> {
    fn drop(&mut self) {
        let label = self.label.take();
        let disabled = self.disabled;
        self.page.update(&self.id, |el| {
            el.text = label;
            el.disabled = disabled;
        });
    }
}

/// Names inside `{{ }}` in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                names.push(after[..end].trim());
                rest = &after[end + 2..];
            }
            None => break,
        }
    }
    names
}
