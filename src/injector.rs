//! Applies one-shot commands to the live page model. The injector is
//! stateless: every command is resolved fresh against the page at call
//! time, and nothing is queued or retried.

use tracing::{debug, warn};

use crate::messages::PageCommand;
use crate::page::{Element, ElementId, Page, SEARCH_PROBES};

/// What a command resolved the focused element to. Resolution happens once
/// per command, against the live page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// A focused native input or textarea.
    NativeField(ElementId),
    /// A focused editable-content region.
    EditableRegion(ElementId),
    /// Nothing editable holds focus.
    None,
}

#[derive(Debug, Default)]
pub struct PageInjector;

impl PageInjector {
    pub fn new() -> Self {
        Self
    }

    /// Classify the focused element into the closed target set.
    pub fn resolve_target(&self, page: &Page) -> EditTarget {
        match page.focused_element() {
            Some((id, Element::Input { .. })) | Some((id, Element::TextArea { .. })) => {
                EditTarget::NativeField(id)
            }
            Some((id, Element::Editable { .. })) => EditTarget::EditableRegion(id),
            _ => EditTarget::None,
        }
    }

    /// Apply one command to the page. Every failure mode is absorbed here;
    /// the only explicit signal is the no-target warning on insert.
    pub fn apply(&self, page: &mut Page, command: &PageCommand) {
        match command {
            PageCommand::SearchText { value } => self.apply_search(page, value),
            PageCommand::InsertAtCursor { value } => self.apply_insert(page, value),
        }
    }

    fn apply_search(&self, page: &mut Page, text: &str) {
        // A focused native field wins outright.
        if let EditTarget::NativeField(id) = self.resolve_target(page) {
            overwrite_field_and_notify(page, id, text);
            return;
        }

        // Probe the fixed priority list, first match wins.
        for probe in SEARCH_PROBES {
            if let Some(id) = page.first_match(*probe) {
                overwrite_field_and_notify(page, id, text);
                return;
            }
        }

        // Last resort: the first editable-content region on the page.
        if let Some(id) = page.first_editable() {
            page.overwrite_editable(id, text);
            page.fire_input(id);
            page.focus(id);
            return;
        }

        debug!("search text: nothing editable on page");
    }

    fn apply_insert(&self, page: &mut Page, text: &str) {
        match self.resolve_target(page) {
            EditTarget::NativeField(id) => {
                page.splice_field_selection(id, text);
                page.fire_input(id);
            }
            EditTarget::EditableRegion(id) => {
                // Without an active range there is nothing to anchor the
                // insert to.
                if page.insert_at_editable_selection(id, text) {
                    page.fire_input(id);
                }
            }
            EditTarget::None => {
                warn!("insert at cursor: no editable field focused");
            }
        }
    }
}

fn overwrite_field_and_notify(page: &mut Page, id: ElementId, text: &str) {
    page.overwrite_field(id, text);
    page.fire_input(id);
    page.focus(id);
}
